use std::collections::HashSet;

use serde::Serialize;

use super::ExportOptions;
use crate::config::Settings;
use crate::data::model::{Grid, SourceTable};
use crate::data::shape::transpose;
use crate::data::split::split_into_column_pairs;

/// One document to render: its file name, title parts and final grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedDocument {
    pub file_name: String,
    pub title: String,
    pub title_suffix: String,
    pub grid: Grid,
}

/// Shape one table into the documents it produces, in column order.
///
/// `position` is the table's 0-based index in the working set, used for the
/// default name of tables without a display name.
pub fn plan_table(
    position: usize,
    table: &SourceTable,
    options: ExportOptions,
    settings: &Settings,
) -> Vec<PlannedDocument> {
    let base = if table.display_name.is_empty() {
        format!("{}{}", settings.default_document_name, position + 1)
    } else {
        table.display_name.clone()
    };

    let grid = if options.transpose {
        transpose(&table.grid)
    } else {
        table.grid.clone()
    };

    if !options.split_columns {
        return vec![PlannedDocument {
            file_name: format!("{}.docx", sanitize(&base)),
            title: base,
            title_suffix: String::new(),
            grid,
        }];
    }

    split_into_column_pairs(&grid)
        .into_iter()
        .enumerate()
        .map(|(i, pair)| {
            let group = pair.resolved_group_name(i);
            PlannedDocument {
                file_name: format!("{}_{}.docx", sanitize(&base), sanitize(&group)),
                title: base.clone(),
                // the unsplit fallback has no group name to show
                title_suffix: if pair.source_column.is_some() {
                    group
                } else {
                    String::new()
                },
                grid: pair.grid,
            }
        })
        .collect()
}

/// Plan several tables in order, making file names unique across all of them.
pub fn plan_tables<'a>(
    tables: impl IntoIterator<Item = (usize, &'a SourceTable)>,
    options: ExportOptions,
    settings: &Settings,
) -> Vec<PlannedDocument> {
    let mut docs: Vec<PlannedDocument> = tables
        .into_iter()
        .flat_map(|(position, table)| plan_table(position, table, options, settings))
        .collect();
    dedupe_file_names(&mut docs);
    docs
}

/// Later duplicates get `_2`, `_3`, ... before the extension.
fn dedupe_file_names(docs: &mut [PlannedDocument]) {
    let mut taken: HashSet<String> = HashSet::new();
    for doc in docs {
        if taken.insert(doc.file_name.clone()) {
            continue;
        }
        let stem = doc
            .file_name
            .strip_suffix(".docx")
            .unwrap_or(doc.file_name.as_str())
            .to_string();
        let mut n = 2;
        loop {
            let candidate = format!("{stem}_{n}.docx");
            if taken.insert(candidate.clone()) {
                log::debug!("Renamed duplicate {} to {candidate}", doc.file_name);
                doc.file_name = candidate;
                break;
            }
            n += 1;
        }
    }
}

/// Replace path separators and characters file systems reject.
fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
