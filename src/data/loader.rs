use std::io::Cursor;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{extension_of, Cell, Grid};
use crate::error::DecodeError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Decode an uploaded file into a (possibly ragged) grid.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.xla` / `.ods` – first sheet only
/// * `.csv` / `.tsv` – no header row, ragged records allowed
/// * `.json`    – `[[...], ...]` rows, or `[{...}, ...]` records
/// * `.parquet` – header row of field names, then one row per record
pub fn decode(file_name: &str, bytes: &[u8]) -> Result<Grid, DecodeError> {
    match extension_of(file_name).as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "ods" => decode_workbook(bytes),
        "csv" => decode_delimited(bytes, b','),
        "tsv" => decode_delimited(bytes, b'\t'),
        "json" => decode_json(bytes),
        "parquet" | "pq" => decode_parquet(bytes),
        other => Err(DecodeError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Workbook decoder (calamine)
// ---------------------------------------------------------------------------

/// Reads the first sheet. The used range is padded back to absolute sheet
/// coordinates so that cell A1 is always `grid[0][0]`.
fn decode_workbook(bytes: &[u8]) -> Result<Grid, DecodeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DecodeError::NoSheets)??;

    // NOTE: calamine `Range` rows are relative to `range.start()`.
    let (top, left) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); top];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; left];
        cells.extend(row.iter().map(convert_value));
        rows.push(cells);
    }
    Ok(Grid::new(rows))
}

fn convert_value(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::Bool(v) => Cell::Bool(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::String(v) => Cell::text(v.as_str()),
        Data::DateTime(v) => Cell::Number(v.as_f64()),
        Data::DateTimeIso(v) | Data::DurationIso(v) => Cell::text(v.as_str()),
        Data::Error(e) => Cell::text(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Delimited text decoder
// ---------------------------------------------------------------------------

fn decode_delimited(bytes: &[u8], delimiter: u8) -> Result<Grid, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::text).collect());
    }
    Ok(Grid::new(rows))
}

// ---------------------------------------------------------------------------
// JSON decoder
// ---------------------------------------------------------------------------

/// Expected JSON layouts:
///
/// ```json
/// [["Name", "Alice", "Bob"], ["Age", 30, 25]]
/// ```
///
/// or records, which get a header row built from the keys in first-seen order:
///
/// ```json
/// [{ "name": "Alice", "age": 30 }, { "name": "Bob", "age": 25 }]
/// ```
fn decode_json(bytes: &[u8]) -> Result<Grid, DecodeError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let items = root
        .as_array()
        .ok_or_else(|| DecodeError::JsonLayout("expected a top-level array".into()))?;

    if items.iter().all(JsonValue::is_array) {
        let rows = items
            .iter()
            .filter_map(JsonValue::as_array)
            .map(|row| row.iter().map(json_to_cell).collect())
            .collect();
        return Ok(Grid::new(rows));
    }

    let mut header: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| DecodeError::JsonLayout(format!("row {i} is not an object")))?;
        for key in obj.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
        records.push(obj);
    }

    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(header.iter().map(|k| Cell::text(k.as_str())).collect());
    for obj in records {
        rows.push(
            header
                .iter()
                .map(|k| obj.get(k).map_or(Cell::Empty, json_to_cell))
                .collect(),
        );
    }
    Ok(Grid::new(rows))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::Null => Cell::Empty,
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Number(n) => n
            .as_f64()
            .map_or_else(|| Cell::text(n.to_string()), Cell::Number),
        JsonValue::String(s) => Cell::text(s.as_str()),
        other => Cell::text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet decoder
// ---------------------------------------------------------------------------

fn decode_parquet(bytes: &[u8]) -> Result<Grid, DecodeError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))?;
    let header: Vec<Cell> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| Cell::text(f.name().as_str()))
        .collect();
    let reader = builder.build()?;

    let mut rows = vec![header];
    for batch in reader {
        let batch = batch?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
    }
    Ok(Grid::new(rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<Cell, DecodeError> {
    if col.is_null(row) {
        return Ok(Cell::Empty);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::text(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => Cell::text(col.as_string::<i64>().value(row)),
        DataType::Boolean => Cell::Bool(col.as_boolean().value(row)),
        DataType::Int8 => Cell::Number(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => Cell::Number(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => Cell::Number(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => Cell::Number(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::UInt8 => Cell::Number(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => Cell::Number(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => Cell::Number(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => Cell::Number(col.as_primitive::<UInt64Type>().value(row) as f64),
        DataType::Float32 => Cell::Number(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => Cell::Number(col.as_primitive::<Float64Type>().value(row)),
        // dates, decimals, lists, ... use arrow's own text form
        _ => {
            let formatter = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())?;
            Cell::text(formatter.value(row).to_string())
        }
    };
    Ok(cell)
}
