use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Export settings. Every field has a default, so a JSON file only needs the
/// keys it wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pause between two individually delivered documents.
    pub delivery_delay_ms: u64,
    /// Folder inside the archive holding every document.
    pub archive_folder: String,
    /// File name of the delivered archive.
    pub archive_file_name: String,
    /// Base name for tables whose file name has no stem.
    pub default_document_name: String,
    /// Title size in half-points.
    pub title_font_half_points: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delivery_delay_ms: 300,
            archive_folder: "documents".to_string(),
            archive_file_name: "documents.zip".to_string(),
            default_document_name: "document".to_string(),
            title_font_half_points: 28,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        serde_json::from_str(&text).context("parsing settings JSON")
    }
}
