//! Exporting cleaned records to CSV or JSON

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

use crate::batch::BatchResult;
use crate::cleaner::CleanedRecord;

/// Output format for exported results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// One exported row
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    source: &'a str,
    original: &'a str,
    cleaned: &'a str,
    removed: String,
}

impl<'a> ExportRow<'a> {
    fn new(source: &'a str, record: &'a CleanedRecord) -> Self {
        Self {
            source,
            original: &record.original,
            cleaned: &record.cleaned,
            removed: record.removed_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    generated_at: DateTime<Utc>,
    records: Vec<ExportRow<'a>>,
}

fn rows(results: &[BatchResult]) -> Vec<ExportRow<'_>> {
    results
        .iter()
        .flat_map(|result| {
            result
                .records
                .iter()
                .map(|record| ExportRow::new(&result.source, record))
        })
        .collect()
}

/// Write results as CSV with a header row
pub fn write_csv<W: Write>(results: &[BatchResult], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let rows = rows(results);

    if rows.is_empty() {
        csv_writer
            .write_record(["source", "original", "cleaned", "removed"])
            .context("Failed to write CSV header")?;
    }
    for row in rows {
        csv_writer.serialize(row).context("Failed to write CSV row")?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write results as a pretty-printed JSON document
pub fn write_json<W: Write>(results: &[BatchResult], mut writer: W) -> Result<()> {
    let export = JsonExport {
        generated_at: Utc::now(),
        records: rows(results),
    };
    serde_json::to_writer_pretty(&mut writer, &export).context("Failed to serialize results")?;
    writeln!(writer).context("Failed to write JSON output")?;
    Ok(())
}

/// Write results in the given format
pub fn export<W: Write>(results: &[BatchResult], format: ExportFormat, writer: W) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(results, writer),
        ExportFormat::Json => write_json(results, writer),
    }
}
