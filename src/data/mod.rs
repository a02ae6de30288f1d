/// Data layer: core types, decoding, and grid shaping.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode bytes → Grid (first sheet only)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  shape    │  normalize ragged rows, optional transpose
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  split    │  optional (label, value) column pairs
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod shape;
pub mod split;
