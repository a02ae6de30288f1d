//! Convert spreadsheet tables into Word documents.
//!
//! ```text
//!  uploaded files ──► state::WorkingSet ──► export::BatchExporter ──► sink
//!                     (data::loader,         (plan: transpose, split;
//!                      data::shape)           render: .docx; archive)
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod render;
pub mod state;

pub use config::Settings;
pub use data::model::{Cell, Grid, SourceTable};
pub use error::{
    ArchiveError, DecodeError, DeliveryError, EmptyInputError, ExportError, RenderError,
};
pub use export::{
    BatchExporter, Delivery, ExportArtifact, ExportOptions, ExportReport, ExportTarget,
};
pub use state::{UploadedFile, WorkingSet};
