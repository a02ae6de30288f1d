use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = self.state[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

/// Writes `sample_table.parquet` and `sample_table.csv`: one label column and
/// one column per person, ready for `sheetdoc --split-columns`.
fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let people = ["Alice", "Bob", "Carol", "Dave"];
    let departments = ["Research", "Sales", "Support"];
    let labels = ["Age", "Department", "Score", "Badge"];

    // columns[0] is the label column, then one column per person
    let mut columns: Vec<Vec<String>> = vec![labels.iter().map(|s| s.to_string()).collect()];
    for (i, _) in people.iter().enumerate() {
        columns.push(vec![
            (25 + rng.below(30)).to_string(),
            departments[rng.below(departments.len() as u64) as usize].to_string(),
            format!("{:.1}", 50.0 + rng.below(500) as f64 / 10.0),
            format!("B-{:04}", 1000 + i),
        ]);
    }

    let mut fields = vec![Field::new("Name", DataType::Utf8, false)];
    fields.extend(people.iter().map(|p| Field::new(*p, DataType::Utf8, false)));
    let schema = Arc::new(Schema::new(fields));

    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|col| Arc::new(StringArray::from(col.clone())) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let parquet_path = "sample_table.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    let csv_path = "sample_table.csv";
    let mut csv = csv::Writer::from_path(csv_path).context("creating CSV file")?;
    let mut header = vec!["Name"];
    header.extend(people);
    csv.write_record(&header)?;
    for row in 0..labels.len() {
        csv.write_record(columns.iter().map(|col| col[row].as_str()))?;
    }
    csv.flush()?;

    println!(
        "Wrote {} people x {} fields to {parquet_path} and {csv_path}",
        people.len(),
        labels.len()
    );
    Ok(())
}
