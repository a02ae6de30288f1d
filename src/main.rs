use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use sheetdoc::export::sink::DirectorySink;
use sheetdoc::{
    BatchExporter, Delivery, ExportOptions, ExportTarget, Settings, UploadedFile, WorkingSet,
};

/// Convert spreadsheets (xlsx, xls, ods, csv, json, parquet) into .docx tables.
#[derive(Debug, Parser)]
#[command(name = "sheetdoc", version, about)]
struct Cli {
    /// Input spreadsheets, exported in the order given.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Swap rows and columns before exporting.
    #[arg(long)]
    transpose: bool,

    /// One document per value column, paired with the first (label) column.
    #[arg(long)]
    split_columns: bool,

    /// Bundle every document into a single zip archive.
    #[arg(long, conflicts_with = "select")]
    archive: bool,

    /// Export only the N-th input file as given on the command line (1-based).
    #[arg(long, value_name = "N")]
    select: Option<usize>,

    /// Directory the documents (or the archive) are written to.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pause between individually written documents, in milliseconds.
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Print the planned documents as JSON instead of writing them.
    #[arg(long)]
    inspect: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(ms) = cli.delay_ms {
        settings.delivery_delay_ms = ms;
    }

    // upload position of each input, `None` when it could not be read
    let mut inputs = Vec::with_capacity(cli.files.len());
    let mut uploads = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        match std::fs::read(path) {
            Ok(bytes) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                inputs.push(Some(uploads.len()));
                uploads.push(UploadedFile::new(name, bytes));
            }
            Err(e) => {
                log::error!("Failed to read {}: {e}", path.display());
                inputs.push(None);
            }
        }
    }

    let mut set = WorkingSet::new();
    let report = set.upload(uploads);
    for (name, e) in &report.failures {
        eprintln!("skipped {name}: {e}");
    }

    let target = match cli.select {
        Some(n) => {
            let Some(path) = n.checked_sub(1).and_then(|i| cli.files.get(i)) else {
                bail!("--select {n}: expected a value from 1 to {}", cli.files.len());
            };
            let table = inputs
                .get(n - 1)
                .copied()
                .flatten()
                .and_then(|upload| report.table_for(upload));
            match table {
                Some(index) if set.select(index) => {}
                _ => bail!("--select {n}: {} was not loaded", path.display()),
            }
            if let Some(table) = set.selected_table() {
                log::info!("Selected {}", table.original_file_name);
            }
            ExportTarget::Selected
        }
        None => ExportTarget::All,
    };
    let delivery = if cli.archive {
        Delivery::Archive
    } else {
        Delivery::Individual
    };
    let options = ExportOptions {
        transpose: cli.transpose,
        split_columns: cli.split_columns,
    };

    let mut exporter = BatchExporter::new(settings);

    if cli.inspect {
        let docs = exporter.plan(&set, target, options)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&docs).context("serializing plan")?
        );
        return Ok(());
    }

    let mut sink = DirectorySink::new(&cli.out_dir);
    let report = exporter
        .export(&set, target, delivery, options, &mut sink)
        .context("export failed")?;

    match &report.archive_name {
        Some(name) => println!(
            "Wrote {} document(s) into {}",
            report.artifact_count,
            sink.dir().join(name).display()
        ),
        None => {
            for path in sink.written() {
                println!("{}", path.display());
            }
            println!(
                "Wrote {} document(s) to {}",
                report.artifact_count,
                sink.dir().display()
            );
        }
    }
    Ok(())
}
