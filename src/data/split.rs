use super::model::Grid;

// ---------------------------------------------------------------------------
// Column pairs: (label column, value column) sub-grids
// ---------------------------------------------------------------------------

/// A width-2 grid built from column 0 and one value column of a source grid.
///
/// `source_column` is `None` for the "nothing to split" fallback, which holds
/// the input grid unchanged and has no derivable group name.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPair {
    pub grid: Grid,
    pub source_column: Option<usize>,
}

impl ColumnPair {
    /// Group name for file naming; never empty.
    ///
    /// `position` is the pair's index in the split output, used for the
    /// fallback item which has no source column of its own.
    pub fn resolved_group_name(&self, position: usize) -> String {
        match self.source_column {
            Some(col) => resolve_group_name(&self.grid, col),
            None => column_placeholder(position + 1),
        }
    }
}

/// Placeholder group name for a source column index: column 1 → `column2`.
pub fn column_placeholder(source_column: usize) -> String {
    format!("column{}", source_column + 1)
}

/// Resolve the group name of a width-2 grid taken from `source_column`.
pub fn resolve_group_name(pair: &Grid, source_column: usize) -> String {
    match pair.get(0, 1).map(ToString::to_string) {
        Some(name) if !name.is_empty() => name,
        _ => column_placeholder(source_column),
    }
}

/// Split a grid into one [`ColumnPair`] per column beyond the label column.
///
/// With `max_cols <= 1` there is nothing to split and the result is a single
/// fallback item wrapping the input grid. Otherwise pairs are ordered by
/// source column, starting at column 1; missing cells become empty.
pub fn split_into_column_pairs(grid: &Grid) -> Vec<ColumnPair> {
    let width = grid.max_cols();
    if width <= 1 {
        return vec![ColumnPair {
            grid: grid.clone(),
            source_column: None,
        }];
    }

    (1..width)
        .map(|col| ColumnPair {
            grid: Grid::new(
                (0..grid.row_count())
                    .map(|r| vec![grid.cell_or_empty(r, 0), grid.cell_or_empty(r, col)])
                    .collect(),
            ),
            source_column: Some(col),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_column_falls_back_to_input() {
        let g = Grid::from_rows(vec![vec!["only"], vec!["one"]]);
        let pairs = split_into_column_pairs(&g);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].grid, g);
        assert_eq!(pairs[0].source_column, None);
        assert_eq!(pairs[0].resolved_group_name(0), "column2");
    }

    #[test]
    fn produces_width_minus_one_pairs() {
        let g = Grid::from_rows(vec![
            vec!["k", "a", "b", "c"],
            vec!["x", "1", "2", "3"],
        ]);
        let pairs = split_into_column_pairs(&g);
        assert_eq!(pairs.len(), 3);
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.source_column, Some(i + 1));
            for r in 0..g.row_count() {
                assert_eq!(
                    pair.grid.rows()[r],
                    vec![g.cell_or_empty(r, 0), g.cell_or_empty(r, i + 1)]
                );
            }
        }
    }

    #[test]
    fn name_alice_bob() {
        let g = Grid::from_rows(vec![vec!["Name", "Alice", "Bob"], vec!["Age", "30", "25"]]);
        let pairs = split_into_column_pairs(&g);
        assert_eq!(
            pairs[0].grid,
            Grid::from_rows(vec![vec!["Name", "Alice"], vec!["Age", "30"]])
        );
        assert_eq!(
            pairs[1].grid,
            Grid::from_rows(vec![vec!["Name", "Bob"], vec!["Age", "25"]])
        );
        assert_eq!(pairs[0].resolved_group_name(0), "Alice");
        assert_eq!(pairs[1].resolved_group_name(1), "Bob");
    }

    #[test]
    fn empty_header_uses_placeholder() {
        let g = Grid::from_rows(vec![vec!["Label", "", "x"], vec!["v"]]);
        let pairs = split_into_column_pairs(&g);
        assert_eq!(pairs[0].source_column, Some(1));
        assert_eq!(pairs[0].resolved_group_name(0), "column2");
        assert_eq!(pairs[1].resolved_group_name(1), "x");
        // ragged rows are filled with empty cells
        assert_eq!(pairs[1].grid.rows()[1], vec![Cell::from("v"), Cell::Empty]);

        let pair = Grid::from_rows(vec![vec!["Label", ""]]);
        assert_eq!(resolve_group_name(&pair, 4), "column5");
    }

    #[test]
    fn numeric_header_is_a_group_name() {
        let g = Grid::new(vec![vec![Cell::from("Year"), Cell::Number(2024.0)]]);
        let pairs = split_into_column_pairs(&g);
        assert_eq!(pairs[0].resolved_group_name(0), "2024");
    }
}
