use std::path::{Path, PathBuf};

use super::ExportArtifact;
use crate::error::DeliveryError;

/// Receives finished artifacts one at a time, in delivery order.
pub trait DeliverySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), DeliveryError>;
}

// ---------------------------------------------------------------------------
// Directory sink – one file per artifact
// ---------------------------------------------------------------------------

/// Writes each artifact into a directory, created on first delivery.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DeliverySink for DirectorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), DeliveryError> {
        let path = self.dir.join(file_name);
        std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(&path, bytes))
            .map_err(|source| DeliveryError {
                file_name: file_name.to_string(),
                source,
            })?;
        log::info!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Memory sink – keeps artifacts for the caller
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemorySink {
    pub artifacts: Vec<ExportArtifact>,
}

impl DeliverySink for MemorySink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), DeliveryError> {
        self.artifacts.push(ExportArtifact {
            file_name: file_name.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}
