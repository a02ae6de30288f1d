use super::model::{Cell, Grid};

// ---------------------------------------------------------------------------
// Normalization: ragged rows → rectangular grid
// ---------------------------------------------------------------------------

/// Pad every row with empty cells up to the widest row.
///
/// A grid with zero rows is returned unchanged. Normalizing a rectangular
/// grid is a no-op.
pub fn normalize(grid: &Grid) -> Grid {
    let width = grid.max_cols();
    Grid::new(
        grid.rows()
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.resize(width, Cell::Empty);
                row
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Transposition
// ---------------------------------------------------------------------------

/// Swap rows and columns: `out[c][r] == grid[r][c]`.
///
/// Ragged input is read as if normalized, so the output is always
/// rectangular with `max_cols` rows of `row_count` cells each.
pub fn transpose(grid: &Grid) -> Grid {
    let rows = grid.row_count();
    Grid::new(
        (0..grid.max_cols())
            .map(|c| (0..rows).map(|r| grid.cell_or_empty(r, c)).collect())
            .collect(),
    )
}
