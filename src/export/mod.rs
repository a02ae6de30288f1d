/// Export orchestration.
///
/// Every invocation walks the same phases:
/// ```text
///   Idle → Validating → Processing → Delivering → Done
///              │             │            │
///              └─────────────┴────────────┴──────→ Failed
/// ```
/// Validating picks the target tables, Processing shapes them into
/// [`plan::PlannedDocument`]s, Delivering renders each document and hands it to
/// a [`sink::DeliverySink`], either one by one or bundled into one archive.
pub mod archive;
pub mod plan;
pub mod sink;

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::data::model::SourceTable;
use crate::error::{EmptyInputError, ExportError};
use crate::render::{DocumentRenderer, DocxEncoder};
use crate::state::WorkingSet;

use archive::ArchiveBuilder;
use plan::{plan_tables, PlannedDocument};
use sink::DeliverySink;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub transpose: bool,
    pub split_columns: bool,
}

/// A finished document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Which tables of the working set to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    /// The working set's current selection.
    Selected,
    /// One table by index.
    Index(usize),
    /// Every table, in insertion order.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Each document goes to the sink separately, paced by the delivery delay.
    Individual,
    /// All documents go into one archive, delivered once.
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Validating,
    Processing,
    Delivering,
    Done,
    Failed,
}

/// Summary of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub artifact_count: usize,
    /// Document names in delivery order.
    pub file_names: Vec<String>,
    /// Set when the documents were delivered as an archive.
    pub archive_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Exporter
// ---------------------------------------------------------------------------

/// Runs exports over a [`WorkingSet`]. Not reentrant: callers serialize calls.
pub struct BatchExporter {
    renderer: DocumentRenderer,
    settings: Settings,
    phase: ExportPhase,
}

impl BatchExporter {
    pub fn new(settings: Settings) -> Self {
        let renderer =
            DocumentRenderer::new(Box::new(DocxEncoder), settings.title_font_half_points);
        Self::with_renderer(settings, renderer)
    }

    pub fn with_renderer(settings: Settings, renderer: DocumentRenderer) -> Self {
        Self {
            renderer,
            settings,
            phase: ExportPhase::Idle,
        }
    }

    /// Phase reached by the last invocation.
    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    /// Export the selected table as individual documents.
    pub fn export_current(
        &mut self,
        set: &WorkingSet,
        options: ExportOptions,
        sink: &mut dyn DeliverySink,
    ) -> Result<ExportReport, ExportError> {
        self.export(set, ExportTarget::Selected, Delivery::Individual, options, sink)
    }

    /// Export every table as individual documents.
    pub fn export_all(
        &mut self,
        set: &WorkingSet,
        options: ExportOptions,
        sink: &mut dyn DeliverySink,
    ) -> Result<ExportReport, ExportError> {
        self.export(set, ExportTarget::All, Delivery::Individual, options, sink)
    }

    /// Export every table into one archive.
    pub fn export_archive(
        &mut self,
        set: &WorkingSet,
        options: ExportOptions,
        sink: &mut dyn DeliverySink,
    ) -> Result<ExportReport, ExportError> {
        self.export(set, ExportTarget::All, Delivery::Archive, options, sink)
    }

    /// Validate and process without rendering or delivering anything.
    pub fn plan(
        &self,
        set: &WorkingSet,
        target: ExportTarget,
        options: ExportOptions,
    ) -> Result<Vec<PlannedDocument>, EmptyInputError> {
        let tables = target_tables(set, target)?;
        Ok(plan_tables(tables, options, &self.settings))
    }

    pub fn export(
        &mut self,
        set: &WorkingSet,
        target: ExportTarget,
        delivery: Delivery,
        options: ExportOptions,
        sink: &mut dyn DeliverySink,
    ) -> Result<ExportReport, ExportError> {
        self.phase = ExportPhase::Idle;
        let result = self.run(set, target, delivery, options, sink);
        match &result {
            Ok(report) => {
                self.enter(ExportPhase::Done);
                log::info!("Exported {} document(s)", report.artifact_count);
            }
            Err(e) => {
                self.enter(ExportPhase::Failed);
                log::error!("Export failed: {e}");
            }
        }
        result
    }

    fn run(
        &mut self,
        set: &WorkingSet,
        target: ExportTarget,
        delivery: Delivery,
        options: ExportOptions,
        sink: &mut dyn DeliverySink,
    ) -> Result<ExportReport, ExportError> {
        self.enter(ExportPhase::Validating);
        let tables = target_tables(set, target)?;

        self.enter(ExportPhase::Processing);
        let docs = plan_tables(tables, options, &self.settings);

        self.enter(ExportPhase::Delivering);
        match delivery {
            Delivery::Individual => self.deliver_individually(&docs, sink),
            Delivery::Archive => self.deliver_archive(&docs, sink),
        }
    }

    fn deliver_individually(
        &self,
        docs: &[PlannedDocument],
        sink: &mut dyn DeliverySink,
    ) -> Result<ExportReport, ExportError> {
        let delay = Duration::from_millis(self.settings.delivery_delay_ms);
        let mut file_names = Vec::with_capacity(docs.len());

        for (i, doc) in docs.iter().enumerate() {
            // pace deliveries; never after the last one
            if i > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }
            let bytes = self
                .renderer
                .render(&doc.grid, &doc.title, &doc.title_suffix)
                .map_err(|source| ExportError::Render {
                    file_name: doc.file_name.clone(),
                    delivered: file_names.len(),
                    source,
                })?;
            sink.deliver(&doc.file_name, &bytes)
                .map_err(|source| ExportError::Delivery {
                    delivered: file_names.len(),
                    source,
                })?;
            log::debug!("Delivered {} ({}/{})", doc.file_name, i + 1, docs.len());
            file_names.push(doc.file_name.clone());
        }

        Ok(ExportReport {
            artifact_count: file_names.len(),
            file_names,
            archive_name: None,
        })
    }

    fn deliver_archive(
        &self,
        docs: &[PlannedDocument],
        sink: &mut dyn DeliverySink,
    ) -> Result<ExportReport, ExportError> {
        let mut archive = ArchiveBuilder::create(&self.settings.archive_folder);
        let mut file_names = Vec::with_capacity(docs.len());

        for doc in docs {
            let bytes = self
                .renderer
                .render(&doc.grid, &doc.title, &doc.title_suffix)
                .map_err(|source| ExportError::Render {
                    file_name: doc.file_name.clone(),
                    delivered: 0,
                    source,
                })?;
            archive.add_entry(&doc.file_name, &bytes)?;
            file_names.push(doc.file_name.clone());
        }

        let artifact_count = archive.entry_count();
        let bytes = archive.finish()?;
        let archive_name = self.settings.archive_file_name.clone();
        log::info!("Archived {artifact_count} document(s) into {archive_name}");
        sink.deliver(&archive_name, &bytes)
            .map_err(|source| ExportError::Delivery {
                delivered: 0,
                source,
            })?;

        Ok(ExportReport {
            artifact_count,
            file_names,
            archive_name: Some(archive_name),
        })
    }

    fn enter(&mut self, phase: ExportPhase) {
        log::debug!("Export phase {:?} -> {phase:?}", self.phase);
        self.phase = phase;
    }
}

/// Resolve the target to `(position, table)` pairs.
fn target_tables(
    set: &WorkingSet,
    target: ExportTarget,
) -> Result<Vec<(usize, &SourceTable)>, EmptyInputError> {
    if set.is_empty() {
        return Err(EmptyInputError::NoTables);
    }
    let index = match target {
        ExportTarget::All => return Ok(set.tables().iter().enumerate().collect()),
        ExportTarget::Selected => set.selected().ok_or(EmptyInputError::NoSelection)?,
        ExportTarget::Index(index) => index,
    };
    set.tables()
        .get(index)
        .map(|table| vec![(index, table)])
        .ok_or(EmptyInputError::SelectionOutOfRange {
            index,
            len: set.len(),
        })
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use pretty_assertions::assert_eq;

    use super::sink::MemorySink;
    use super::*;
    use crate::data::model::Grid;
    use crate::error::RenderError;
    use crate::render::{DocumentEncoder, DocumentModel};

    /// Records the models it is asked to encode and returns their titles as bytes.
    #[derive(Default)]
    struct Recording {
        fail_after: Option<usize>,
        calls: AtomicUsize,
    }

    impl DocumentEncoder for Recording {
        fn encode(&self, doc: &DocumentModel) -> Result<Vec<u8>, RenderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_after.is_some_and(|n| call >= n) {
                return Err(RenderError::Encoder("boom".into()));
            }
            Ok(serde_json::to_vec(&(&doc.title, &doc.table)).unwrap())
        }
    }

    fn quiet() -> Settings {
        Settings {
            delivery_delay_ms: 0,
            ..Settings::default()
        }
    }

    fn recording_exporter(settings: Settings, fail_after: Option<usize>) -> BatchExporter {
        let encoder = Recording {
            fail_after,
            ..Recording::default()
        };
        BatchExporter::with_renderer(settings, DocumentRenderer::new(Box::new(encoder), 28))
    }

    fn decode_artifact(bytes: &[u8]) -> (String, Vec<Vec<String>>) {
        serde_json::from_slice(bytes).unwrap()
    }

    fn set_of(tables: Vec<(&str, Grid)>) -> WorkingSet {
        let mut set = WorkingSet::new();
        for (name, grid) in tables {
            set.push(SourceTable::new(name, grid));
        }
        set
    }

    fn people() -> Grid {
        Grid::from_rows(vec![vec!["Name", "Alice", "Bob"], vec!["Age", "30", "25"]])
    }

    #[test]
    fn split_columns_into_one_document_per_person() {
        let set = set_of(vec![("people.xlsx", people())]);
        let mut exporter = recording_exporter(quiet(), None);
        let mut sink = MemorySink::default();
        let options = ExportOptions {
            transpose: false,
            split_columns: true,
        };

        let report = exporter.export_current(&set, options, &mut sink).unwrap();
        assert_eq!(report.artifact_count, 2);
        assert_eq!(exporter.phase(), ExportPhase::Done);

        let names: Vec<_> = sink.artifacts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["people_Alice.docx", "people_Bob.docx"]);

        let (title, rows) = decode_artifact(&sink.artifacts[0].bytes);
        assert_eq!(title, "people Alice");
        assert_eq!(rows, vec![vec!["Name", "Alice"], vec!["Age", "30"]]);
        let (title, rows) = decode_artifact(&sink.artifacts[1].bytes);
        assert_eq!(title, "people Bob");
        assert_eq!(rows, vec![vec!["Name", "Bob"], vec!["Age", "25"]]);
    }

    #[test]
    fn transpose_ragged_table() {
        let grid = Grid::from_rows(vec![vec!["A", "B"], vec!["1", "2"], vec!["3"]]);
        let set = set_of(vec![("ragged.csv", grid)]);
        let mut exporter = recording_exporter(quiet(), None);
        let mut sink = MemorySink::default();
        let options = ExportOptions {
            transpose: true,
            split_columns: false,
        };

        let report = exporter.export_current(&set, options, &mut sink).unwrap();
        assert_eq!(report.file_names, vec!["ragged.docx"]);
        let (title, rows) = decode_artifact(&sink.artifacts[0].bytes);
        assert_eq!(title, "ragged");
        assert_eq!(rows, vec![vec!["A", "1", "3"], vec!["B", "2", ""]]);
    }

    #[test]
    fn archive_holds_every_document_under_the_folder() {
        let set = set_of(vec![
            ("a.csv", people()),
            ("b.csv", Grid::from_rows(vec![vec!["x", "y"]])),
            ("c.csv", Grid::from_rows(vec![vec!["only"]])),
        ]);
        let mut exporter = BatchExporter::new(quiet());
        let mut sink = MemorySink::default();

        let report = exporter
            .export_archive(&set, ExportOptions::default(), &mut sink)
            .unwrap();
        assert_eq!(report.artifact_count, 3);
        assert_eq!(report.archive_name.as_deref(), Some("documents.zip"));
        assert_eq!(sink.artifacts.len(), 1);
        assert_eq!(sink.artifacts[0].file_name, "documents.zip");

        let mut zip = zip::ZipArchive::new(Cursor::new(sink.artifacts[0].bytes.clone())).unwrap();
        let mut names: Vec<_> = zip.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["documents/a.docx", "documents/b.docx", "documents/c.docx"]
        );

        // each entry is itself a docx package
        let mut entry = Vec::new();
        zip.by_name("documents/a.docx")
            .unwrap()
            .read_to_end(&mut entry)
            .unwrap();
        let inner = zip::ZipArchive::new(Cursor::new(entry)).unwrap();
        assert!(inner.file_names().any(|n| n == "word/document.xml"));
    }

    #[test]
    fn archive_counts_split_documents_and_is_deterministic() {
        let set = set_of(vec![
            ("a.csv", people()),
            ("b.csv", Grid::from_rows(vec![vec!["k", "v1", "v2", "v3"]])),
        ]);
        let options = ExportOptions {
            transpose: false,
            split_columns: true,
        };
        let mut first = MemorySink::default();
        let mut second = MemorySink::default();
        let mut exporter = recording_exporter(quiet(), None);

        let report = exporter.export_archive(&set, options, &mut first).unwrap();
        exporter.export_archive(&set, options, &mut second).unwrap();
        assert_eq!(report.artifact_count, 5);
        assert_eq!(
            report.file_names,
            vec!["a_Alice.docx", "a_Bob.docx", "b_v1.docx", "b_v2.docx", "b_v3.docx"]
        );
        let names = |sink: &MemorySink| -> Vec<String> {
            let zip = zip::ZipArchive::new(Cursor::new(sink.artifacts[0].bytes.clone())).unwrap();
            zip.file_names().map(str::to_string).collect()
        };
        let mut first_names = names(&first);
        let mut second_names = names(&second);
        first_names.sort();
        second_names.sort();
        assert_eq!(first_names, second_names);
    }

    #[test]
    fn export_all_keeps_insertion_order() {
        let set = set_of(vec![
            ("z.csv", Grid::from_rows(vec![vec!["1"]])),
            ("a.csv", Grid::from_rows(vec![vec!["2"]])),
        ]);
        let mut exporter = recording_exporter(quiet(), None);
        let mut sink = MemorySink::default();
        let report = exporter
            .export_all(&set, ExportOptions::default(), &mut sink)
            .unwrap();
        assert_eq!(report.file_names, vec!["z.docx", "a.docx"]);
    }

    #[test]
    fn empty_working_set_is_rejected() {
        let set = WorkingSet::new();
        let mut exporter = recording_exporter(quiet(), None);
        let mut sink = MemorySink::default();
        let err = exporter
            .export_all(&set, ExportOptions::default(), &mut sink)
            .unwrap_err();
        assert!(matches!(err, ExportError::EmptyInput(EmptyInputError::NoTables)));
        assert_eq!(exporter.phase(), ExportPhase::Failed);
        assert!(sink.artifacts.is_empty());
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let set = set_of(vec![("a.csv", people())]);
        let mut exporter = recording_exporter(quiet(), None);
        let mut sink = MemorySink::default();
        let err = exporter
            .export(
                &set,
                ExportTarget::Index(3),
                Delivery::Individual,
                ExportOptions::default(),
                &mut sink,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::EmptyInput(EmptyInputError::SelectionOutOfRange { index: 3, len: 1 })
        ));
        assert_eq!(err.to_string(), "selected file #4 is out of range (1 loaded)");
    }

    #[test]
    fn render_failure_stops_but_keeps_delivered_documents() {
        let set = set_of(vec![
            ("a.csv", Grid::from_rows(vec![vec!["1"]])),
            ("b.csv", Grid::from_rows(vec![vec!["2"]])),
            ("c.csv", Grid::from_rows(vec![vec!["3"]])),
        ]);
        let mut exporter = recording_exporter(quiet(), Some(1));
        let mut sink = MemorySink::default();

        let err = exporter
            .export_all(&set, ExportOptions::default(), &mut sink)
            .unwrap_err();
        match err {
            ExportError::Render {
                file_name,
                delivered,
                ..
            } => {
                assert_eq!(file_name, "b.docx");
                assert_eq!(delivered, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.artifacts.len(), 1);
        assert_eq!(sink.artifacts[0].file_name, "a.docx");
        assert_eq!(exporter.phase(), ExportPhase::Failed);
    }

    #[test]
    fn render_failure_produces_no_archive() {
        let set = set_of(vec![
            ("a.csv", Grid::from_rows(vec![vec!["1"]])),
            ("b.csv", Grid::from_rows(vec![vec!["2"]])),
        ]);
        let mut exporter = recording_exporter(quiet(), Some(1));
        let mut sink = MemorySink::default();
        let err = exporter
            .export_archive(&set, ExportOptions::default(), &mut sink)
            .unwrap_err();
        assert!(matches!(err, ExportError::Render { .. }));
        assert!(sink.artifacts.is_empty());
    }

    #[test]
    fn deliveries_are_paced() {
        let set = set_of(vec![
            ("a.csv", Grid::from_rows(vec![vec!["1"]])),
            ("b.csv", Grid::from_rows(vec![vec!["2"]])),
            ("c.csv", Grid::from_rows(vec![vec!["3"]])),
        ]);
        let settings = Settings {
            delivery_delay_ms: 150,
            ..Settings::default()
        };
        let mut exporter = recording_exporter(settings, None);
        let mut sink = MemorySink::default();

        let started = Instant::now();
        exporter
            .export_all(&set, ExportOptions::default(), &mut sink)
            .unwrap();
        let elapsed = started.elapsed();
        // two gaps between three documents, none before the first or after the last
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(420), "{elapsed:?}");
        assert_eq!(sink.artifacts.len(), 3);
    }

    #[test]
    fn single_document_is_not_delayed() {
        let set = set_of(vec![("a.csv", Grid::from_rows(vec![vec!["1"]]))]);
        let settings = Settings {
            delivery_delay_ms: 500,
            ..Settings::default()
        };
        let mut exporter = recording_exporter(settings, None);
        let mut sink = MemorySink::default();

        let started = Instant::now();
        exporter
            .export_current(&set, ExportOptions::default(), &mut sink)
            .unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_millis(250), "{elapsed:?}");
        assert_eq!(sink.artifacts.len(), 1);
    }

    #[test]
    fn plan_matches_export_names() {
        let set = set_of(vec![("a.csv", people())]);
        let exporter = BatchExporter::new(quiet());
        let options = ExportOptions {
            transpose: false,
            split_columns: true,
        };
        let docs = exporter.plan(&set, ExportTarget::All, options).unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["a_Alice.docx", "a_Bob.docx"]);
        assert_eq!(exporter.phase(), ExportPhase::Idle);
    }
}
