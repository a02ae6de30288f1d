/// Rendering: grid + title → document bytes.
///
/// [`DocumentRenderer`] builds an encoder-independent [`DocumentModel`] and
/// hands it to a [`DocumentEncoder`]; [`docx::DocxEncoder`] is the default.
pub mod docx;

use crate::data::model::Grid;
use crate::error::RenderError;

pub use docx::DocxEncoder;

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

/// A bold title paragraph followed by one full-width table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentModel {
    pub title: String,
    /// Title size in half-points (28 = 14pt).
    pub title_half_points: u32,
    /// Rows of cell text. Rows keep the width they had in the source grid.
    pub table: Vec<Vec<String>>,
}

/// Turns a [`DocumentModel`] into file bytes.
pub trait DocumentEncoder: Send + Sync {
    fn encode(&self, doc: &DocumentModel) -> Result<Vec<u8>, RenderError>;
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

pub struct DocumentRenderer {
    encoder: Box<dyn DocumentEncoder>,
    title_half_points: u32,
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new(Box::new(DocxEncoder), 28)
    }
}

impl DocumentRenderer {
    pub fn new(encoder: Box<dyn DocumentEncoder>, title_half_points: u32) -> Self {
        Self {
            encoder,
            title_half_points,
        }
    }

    /// Title is `"<title> <suffix>"`, or just `title` when the suffix is empty.
    pub fn build(&self, grid: &Grid, title: &str, title_suffix: &str) -> DocumentModel {
        let title = if title_suffix.is_empty() {
            title.to_string()
        } else {
            format!("{title} {title_suffix}")
        };
        DocumentModel {
            title,
            title_half_points: self.title_half_points,
            table: grid
                .rows()
                .iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect(),
        }
    }

    /// Render one document. Encoder failures are returned as-is, never retried.
    pub fn render(
        &self,
        grid: &Grid,
        title: &str,
        title_suffix: &str,
    ) -> Result<Vec<u8>, RenderError> {
        let doc = self.build(grid, title, title_suffix);
        log::debug!(
            "Rendering \"{}\" ({} rows)",
            doc.title,
            doc.table.len()
        );
        self.encoder.encode(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;
    use pretty_assertions::assert_eq;

    struct Broken;

    impl DocumentEncoder for Broken {
        fn encode(&self, _doc: &DocumentModel) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Encoder("out of ink".into()))
        }
    }

    #[test]
    fn title_with_and_without_suffix() {
        let renderer = DocumentRenderer::default();
        let grid = Grid::default();
        assert_eq!(renderer.build(&grid, "People", "Alice").title, "People Alice");
        assert_eq!(renderer.build(&grid, "People", "").title, "People");
    }

    #[test]
    fn ragged_rows_are_not_renormalized() {
        let renderer = DocumentRenderer::default();
        let grid = Grid::new(vec![
            vec![Cell::from("a"), Cell::Empty, Cell::Number(2.5)],
            vec![Cell::Bool(false)],
        ]);
        let doc = renderer.build(&grid, "t", "");
        assert_eq!(
            doc.table,
            vec![
                vec!["a".to_string(), String::new(), "2.5".to_string()],
                vec!["false".to_string()],
            ]
        );
        assert_eq!(doc.title_half_points, 28);
    }

    #[test]
    fn encoder_failure_propagates() {
        let renderer = DocumentRenderer::new(Box::new(Broken), 28);
        let err = renderer.render(&Grid::default(), "t", "").unwrap_err();
        assert!(matches!(err, RenderError::Encoder(_)));
    }
}
