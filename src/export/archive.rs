use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

use crate::error::ArchiveError;

/// In-memory zip archive whose entries all live under one folder.
pub struct ArchiveBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    folder: String,
    entries: usize,
}

impl ArchiveBuilder {
    pub fn create(folder: &str) -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            folder: folder.trim_matches('/').to_string(),
            entries: 0,
        }
    }

    /// Path an entry named `file_name` is stored under.
    pub fn entry_path(&self, file_name: &str) -> String {
        if self.folder.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{file_name}", self.folder)
        }
    }

    pub fn add_entry(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        // .docx payloads are already deflated
        let options =
            FileOptions::<()>::default().compression_method(zip::CompressionMethod::Stored);
        let path = self.entry_path(file_name);
        self.zip.start_file(path.as_str(), options)?;
        self.zip.write_all(bytes)?;
        self.entries += 1;
        Ok(())
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Serialize the archive. Nothing is produced on failure.
    pub fn finish(self) -> Result<Vec<u8>, ArchiveError> {
        Ok(self.zip.finish()?.into_inner())
    }
}
