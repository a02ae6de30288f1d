use rayon::prelude::*;

use crate::data::loader::decode;
use crate::data::model::{Grid, SourceTable};
use crate::data::shape::normalize;
use crate::error::DecodeError;

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// Raw bytes of one uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Outcome of [`WorkingSet::upload`].
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Number of tables appended to the working set.
    pub added: usize,
    /// Working-set index of each uploaded file, `None` where decoding failed.
    pub tables: Vec<Option<usize>>,
    /// Files that could not be decoded, in upload order.
    pub failures: Vec<(String, DecodeError)>,
}

impl UploadReport {
    /// The table produced by the `upload`-th file (0-based) of this batch.
    pub fn table_for(&self, upload: usize) -> Option<usize> {
        self.tables.get(upload).copied().flatten()
    }
}

// ---------------------------------------------------------------------------
// Working set
// ---------------------------------------------------------------------------

/// The loaded tables and the current selection, independent of any UI.
///
/// Single writer: callers must not run an export while mutating the set.
#[derive(Debug, Default)]
pub struct WorkingSet {
    tables: Vec<SourceTable>,
    selected: Option<usize>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &[SourceTable] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_table(&self) -> Option<&SourceTable> {
        self.selected.and_then(|i| self.tables.get(i))
    }

    /// Decode uploaded files and append the successful ones in upload order.
    ///
    /// Files decode in parallel; a decode failure only excludes that file.
    /// When anything was added, the first new table becomes the selection.
    pub fn upload(&mut self, files: Vec<UploadedFile>) -> UploadReport {
        let decoded: Vec<(String, Result<Grid, DecodeError>)> = files
            .into_par_iter()
            .map(|file| {
                let grid = decode(&file.file_name, &file.bytes);
                (file.file_name, grid)
            })
            .collect();

        let first_new = self.tables.len();
        let mut report = UploadReport::default();
        for (file_name, result) in decoded {
            match result {
                Ok(grid) => {
                    let grid = normalize(&grid);
                    log::info!(
                        "Loaded {file_name}: {} rows x {} columns",
                        grid.row_count(),
                        grid.max_cols()
                    );
                    report.tables.push(Some(self.tables.len()));
                    self.tables.push(SourceTable::new(file_name, grid));
                    report.added += 1;
                }
                Err(e) => {
                    log::warn!("Failed to decode {file_name}: {e}");
                    report.tables.push(None);
                    report.failures.push((file_name, e));
                }
            }
        }

        if report.added > 0 {
            self.selected = Some(first_new);
        }
        report
    }

    /// Add an already-decoded table.
    pub fn push(&mut self, table: SourceTable) {
        self.tables.push(SourceTable {
            grid: normalize(&table.grid),
            ..table
        });
        if self.selected.is_none() {
            self.selected = Some(self.tables.len() - 1);
        }
    }

    /// Remove a table, keeping the selection on a valid index.
    pub fn remove(&mut self, index: usize) -> Option<SourceTable> {
        if index >= self.tables.len() {
            return None;
        }
        let removed = self.tables.remove(index);
        self.selected = match self.selected {
            _ if self.tables.is_empty() => None,
            Some(sel) if sel > index => Some(sel - 1),
            Some(sel) => Some(sel.min(self.tables.len() - 1)),
            None => None,
        };
        Some(removed)
    }

    /// Select a table. Returns `false` and keeps the selection when out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.tables.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Swap a table's grid after re-processing it.
    pub fn replace_grid(&mut self, index: usize, grid: Grid) -> bool {
        match self.tables.get_mut(index) {
            Some(table) => {
                table.grid = normalize(&grid);
                true
            }
            None => false,
        }
    }
}
