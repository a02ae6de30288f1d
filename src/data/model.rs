use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Cell – a single spreadsheet value
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as decoded from a spreadsheet.
///
/// `Text` never holds an empty string: build cells through [`Cell::text`] or
/// the `From` impls so that `""` and an absent cell compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Text cell, or `Empty` for the empty string.
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Number(v) if v.is_nan() => write!(f, "NaN"),
            Cell::Number(v) if v.is_infinite() => {
                if *v > 0.0 {
                    write!(f, "Infinity")
                } else {
                    write!(f, "-Infinity")
                }
            }
            // `-0` prints as `0`
            Cell::Number(v) if *v == 0.0 => write!(f, "0"),
            Cell::Number(v) if v.abs() >= 1e21 || v.abs() < 1e-6 => {
                // `1e21` → `1e+21`, `1.5e-7` stays as is
                let sci = format!("{v:e}");
                match sci.split_once('e') {
                    Some((mantissa, exp)) if !exp.starts_with('-') => {
                        write!(f, "{mantissa}e+{exp}")
                    }
                    _ => write!(f, "{sci}"),
                }
            }
            Cell::Number(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::text(s)
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Empty, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Grid – rows of cells
// ---------------------------------------------------------------------------

/// An ordered sequence of rows. Rows may be ragged until normalized.
///
/// Grids are values: every transformation in [`crate::data::shape`] and
/// [`crate::data::split`] returns a new grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Grid { rows }
    }

    /// Build a grid from anything convertible into cells.
    pub fn from_rows<R, C>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        Grid {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn max_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether every row has the same length.
    pub fn is_rectangular(&self) -> bool {
        let width = self.max_cols();
        self.rows.iter().all(|row| row.len() == width)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Cell at `(row, col)`, treating anything out of bounds as empty.
    pub fn cell_or_empty(&self, row: usize, col: usize) -> Cell {
        self.get(row, col).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// SourceTable – one uploaded spreadsheet
// ---------------------------------------------------------------------------

/// A decoded spreadsheet in the working set.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    /// File name with its extension removed. May be empty (e.g. `.xlsx`).
    pub display_name: String,
    pub original_file_name: String,
    pub grid: Grid,
}

impl SourceTable {
    pub fn new(original_file_name: impl Into<String>, grid: Grid) -> Self {
        let original_file_name = original_file_name.into();
        SourceTable {
            display_name: strip_extension(&original_file_name).to_string(),
            original_file_name,
            grid,
        }
    }
}

/// Remove the last `.ext` from a file name.
///
/// A trailing dot or a dot inside a directory component is not an extension.
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains(['/', '\\']) => stem,
        _ => file_name,
    }
}

/// Lower-cased extension of a file name, or `""`.
pub fn extension_of(file_name: &str) -> String {
    let stem = strip_extension(file_name);
    if stem.len() == file_name.len() {
        return String::new();
    }
    file_name[stem.len() + 1..].to_ascii_lowercase()
}
