use thiserror::Error;

/// Failure to turn an uploaded file into a grid. Isolated per file.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("workbook contains no sheets")]
    NoSheets,
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected JSON layout: {0}")]
    JsonLayout(String),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Nothing to export.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmptyInputError {
    #[error("no files loaded")]
    NoTables,
    #[error("no file selected")]
    NoSelection,
    /// `index` is 0-based; the message counts from 1.
    #[error("selected file #{} is out of range ({len} loaded)", .index + 1)]
    SelectionOutOfRange { index: usize, len: usize },
}

/// The document encoder failed for one artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoder error: {0}")]
    Encoder(String),
}

/// The archive could not be built or serialized.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The delivery sink refused an artifact.
#[derive(Debug, Error)]
#[error("could not deliver {file_name}: {source}")]
pub struct DeliveryError {
    pub file_name: String,
    #[source]
    pub source: std::io::Error,
}

/// Summary error of one export invocation.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    EmptyInput(#[from] EmptyInputError),
    #[error("rendering {file_name} failed after {delivered} document(s) were delivered: {source}")]
    Render {
        file_name: String,
        delivered: usize,
        #[source]
        source: RenderError,
    },
    #[error("building the archive failed: {0}")]
    Archive(#[from] ArchiveError),
    #[error("delivery failed after {delivered} document(s): {source}")]
    Delivery {
        delivered: usize,
        #[source]
        source: DeliveryError,
    },
}
