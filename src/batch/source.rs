//! Input sources and row extraction
//!
//! A source is one logical input: a list of names, a text or CSV blob, or a
//! decoded spreadsheet. Extraction turns it into one `Row` per line or table
//! row so progress can be computed from the row index.

use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cleaner::{trim_name, BYTE_ORDER_MARK};
use crate::error::{ScrubError, ScrubResult};

/// Extensions decoded as spreadsheets rather than text
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// A single decoded spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::Error(_) => Cell::Empty,
        }
    }
}

/// One logical input yielding zero or more raw names
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Names typed directly, one per entry
    Names(Vec<String>),
    /// Pasted text or CSV content; the first column of each line is the name
    Text(String),
    /// Rows of an already decoded spreadsheet; the first cell is the name
    Table(Vec<Vec<Cell>>),
}

/// What a single source row contributes to a run
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Blank line, or an empty, zero or `false` first cell; produces no record
    Skip,
    /// A raw name to clean
    Name(String),
    /// A first cell holding a non-text value; produces an empty record
    NonText,
}

impl Source {
    /// Extract one row per line, entry or table row, in source order
    pub fn rows(&self) -> Vec<Row> {
        match self {
            Source::Names(names) => names.iter().map(|name| text_row(name)).collect(),
            Source::Text(text) => text
                .split('\n')
                .map(|line| {
                    let line = trim_name(line);
                    let first = line.split(',').next().unwrap_or_default();
                    if line.is_empty() {
                        Row::Skip
                    } else {
                        Row::Name(first.to_string())
                    }
                })
                .collect(),
            Source::Table(rows) => rows
                .iter()
                .map(|cells| match cells.first() {
                    None | Some(Cell::Empty) => Row::Skip,
                    Some(Cell::Text(s)) if s.is_empty() => Row::Skip,
                    Some(Cell::Number(n)) if *n == 0.0 || n.is_nan() => Row::Skip,
                    Some(Cell::Bool(false)) => Row::Skip,
                    Some(Cell::Text(s)) => Row::Name(s.clone()),
                    Some(Cell::Number(_)) | Some(Cell::Bool(_)) => Row::NonText,
                })
                .collect(),
        }
    }
}

fn text_row(name: &str) -> Row {
    if trim_name(name).is_empty() {
        Row::Skip
    } else {
        Row::Name(name.to_string())
    }
}

/// A source together with the name it was loaded from
#[derive(Debug, Clone)]
pub struct NamedSource {
    pub name: String,
    pub source: Source,
}

/// Display name for a source path
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read a source from disk, decoding spreadsheets by extension
pub async fn load_source(path: &Path) -> ScrubResult<NamedSource> {
    let name = source_name(path);

    let source = if is_spreadsheet(path) {
        let owned: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || read_first_sheet(&owned))
            .await
            .map_err(|e| ScrubError::unreadable(&name, format!("decode task failed: {}", e)))?
            .map_err(|reason| ScrubError::unreadable(&name, reason))?
    } else {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScrubError::unreadable(&name, e))?;
        match text.strip_prefix(BYTE_ORDER_MARK) {
            Some(stripped) => Source::Text(stripped.to_string()),
            None => Source::Text(text),
        }
    };

    debug!("Loaded source {}", name);
    Ok(NamedSource { name, source })
}

/// Decode the first worksheet of a workbook into table rows
fn read_first_sheet(path: &Path) -> Result<Source, String> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| format!("failed to open workbook: {}", e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "no worksheet found".to_string())?
        .map_err(|e| format!("failed to read worksheet: {}", e))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(Cell::from).collect())
        .collect();

    Ok(Source::Table(rows))
}
