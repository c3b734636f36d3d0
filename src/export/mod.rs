use anyhow::{Context, Result};
use arrow::{
    array::{Array, Date32Array, Float64Array, Int64Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use parquet::{
    arrow::ArrowWriter,
    basic::{BrotliLevel, Compression},
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    path::Path,
    sync::Arc,
};
use tracing::debug;

use crate::ingest::DailyTests;

// NaiveDate::default() is the Unix epoch.
fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

fn archive_schema(has_neg_pct: bool) -> Schema {
    let mut fields = vec![
        Field::new("specimen_collection_date", DataType::Date32, true),
        Field::new("tests", DataType::Int64, true),
        Field::new("pos", DataType::Int64, true),
        Field::new("pct", DataType::Float64, true),
        Field::new("neg", DataType::Int64, true),
        Field::new("indeterminate", DataType::Int64, true),
    ];
    if has_neg_pct {
        fields.push(Field::new("neg_pct", DataType::Float64, true));
    }
    Schema::new(fields)
}

/// Write the records as a single Parquet file. Returns bytes on disk.
pub fn write_parquet(records: &[DailyTests], has_neg_pct: bool, path: &Path) -> Result<u64> {
    let schema = Arc::new(archive_schema(has_neg_pct));

    let dates: Date32Array = records
        .iter()
        .map(|r| r.specimen_collection_date.map(days_since_epoch))
        .collect();
    let tests: Int64Array = records.iter().map(|r| r.tests).collect();
    let pos: Int64Array = records.iter().map(|r| r.pos).collect();
    let pct: Float64Array = records.iter().map(|r| r.pct).collect();
    let neg: Int64Array = records.iter().map(|r| r.neg).collect();
    let indeterminate: Int64Array = records.iter().map(|r| r.indeterminate).collect();

    let mut columns: Vec<Arc<dyn Array>> = vec![
        Arc::new(dates),
        Arc::new(tests),
        Arc::new(pos),
        Arc::new(pct),
        Arc::new(neg),
        Arc::new(indeterminate),
    ];
    if has_neg_pct {
        let neg_pct: Float64Array = records.iter().map(|r| r.neg_pct).collect();
        columns.push(Arc::new(neg_pct));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns)
        .context("building record batch for archive")?;

    let file = File::create(path).with_context(|| format!("creating file {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::BROTLI(BrotliLevel::try_new(5)?))
        .build();
    let mut writer =
        ArrowWriter::try_new(file, schema, Some(props)).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch to parquet")?;
    writer.close().context("closing parquet writer")?;

    let metadata = fs::metadata(path).context("getting file metadata")?;
    debug!(rows = records.len(), bytes = metadata.len(), "wrote archive");

    Ok(metadata.len())
}
