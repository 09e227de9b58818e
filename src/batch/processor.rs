//! Batch processing of sources with progress reporting
//!
//! A single source is processed by a lazy `BatchRun` iterator that yields
//! progress events and ends with exactly one completion event. Several sources
//! are driven concurrently by `BatchProcessor::process_paths`, each with its
//! own run and its own results.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::source::{load_source, Row, Source};
use crate::cleaner::{clean_with, CleanedRecord, OptionSet, StripSet};
use crate::error::ScrubError;

/// Progress is reported every this many rows
pub const PROGRESS_INTERVAL: usize = 100;

/// Transient progress notification for one source
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub file_index: usize,
    pub total_files: usize,
    /// Percentage of rows visited, in [0, 100]
    pub file_progress: f64,
}

/// Cleaned records of one source, in original row order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    /// Name of the source the records came from
    pub source: String,
    pub records: Vec<CleanedRecord>,
}

/// Event emitted while processing sources
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Progress(ProgressEvent),
    Complete {
        file_index: usize,
        total_files: usize,
        result: BatchResult,
    },
    Error {
        file_index: usize,
        total_files: usize,
        error: ScrubError,
    },
}

impl BatchEvent {
    pub fn file_index(&self) -> usize {
        match self {
            BatchEvent::Progress(p) => p.file_index,
            BatchEvent::Complete { file_index, .. } | BatchEvent::Error { file_index, .. } => {
                *file_index
            }
        }
    }
}

/// Lazy run over a single source
///
/// Yields a progress event for every row whose index is a multiple of
/// `PROGRESS_INTERVAL`, then one `Complete` event. Dropping the iterator early
/// abandons the run; the records cleaned so far stay available via `partial`.
pub struct BatchRun {
    options: OptionSet,
    strip: StripSet,
    name: String,
    rows: Vec<Row>,
    next_row: usize,
    file_index: usize,
    total_files: usize,
    records: Vec<CleanedRecord>,
    finished: bool,
}

impl BatchRun {
    /// Records cleaned so far
    pub fn partial(&self) -> &[CleanedRecord] {
        &self.records
    }

    /// Number of rows in the source, including skipped ones
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    fn visit(&mut self, index: usize) {
        match &self.rows[index] {
            Row::Skip => {}
            Row::Name(raw) => self.records.push(clean_with(raw, &self.options, &self.strip)),
            Row::NonText => self.records.push(CleanedRecord::empty()),
        }
    }

    fn progress(&self, index: usize) -> ProgressEvent {
        ProgressEvent {
            file_index: self.file_index,
            total_files: self.total_files,
            file_progress: 100.0 * index as f64 / self.rows.len() as f64,
        }
    }
}

impl Iterator for BatchRun {
    type Item = BatchEvent;

    fn next(&mut self) -> Option<BatchEvent> {
        while self.next_row < self.rows.len() {
            let index = self.next_row;
            self.next_row += 1;
            self.visit(index);

            if index % PROGRESS_INTERVAL == 0 {
                return Some(BatchEvent::Progress(self.progress(index)));
            }
        }

        if self.finished {
            return None;
        }
        self.finished = true;

        debug!("Cleaned {} records from {}", self.records.len(), self.name);
        Some(BatchEvent::Complete {
            file_index: self.file_index,
            total_files: self.total_files,
            result: BatchResult {
                source: self.name.clone(),
                records: std::mem::take(&mut self.records),
            },
        })
    }
}

/// Applies one option set to any number of sources
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    options: OptionSet,
    strip: StripSet,
}

impl BatchProcessor {
    /// Create a processor; the options are fixed for every run it starts
    pub fn new(options: OptionSet) -> Self {
        Self {
            strip: options.strip_set(),
            options,
        }
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// Start a lazy run over one source
    pub fn run(
        &self,
        name: impl Into<String>,
        source: &Source,
        file_index: usize,
        total_files: usize,
    ) -> BatchRun {
        BatchRun {
            options: self.options,
            strip: self.strip,
            name: name.into(),
            rows: source.rows(),
            next_row: 0,
            file_index,
            total_files,
            records: Vec::new(),
            finished: false,
        }
    }

    /// Clean a whole source at once, discarding progress
    pub fn process(&self, name: impl Into<String>, source: &Source) -> BatchResult {
        let name = name.into();
        self.run(name.clone(), source, 0, 1)
            .find_map(|event| match event {
                BatchEvent::Complete { result, .. } => Some(result),
                _ => None,
            })
            .unwrap_or(BatchResult {
                source: name,
                records: Vec::new(),
            })
    }

    /// Load and process several files concurrently
    ///
    /// Events for each file arrive in row order and end with that file's
    /// `Complete` or `Error`. Files are independent; one failing to load
    /// does not stop the others. Returns once every file has reported.
    pub async fn process_paths(
        &self,
        paths: Vec<PathBuf>,
        parallelism: usize,
        event_tx: mpsc::Sender<BatchEvent>,
    ) {
        let total_files = paths.len();
        info!("Processing {} source(s)", total_files);

        stream::iter(paths.into_iter().enumerate())
            .map(|(file_index, path)| {
                let event_tx = event_tx.clone();
                async move {
                    match load_source(&path).await {
                        Ok(loaded) => {
                            let run = self.run(loaded.name, &loaded.source, file_index, total_files);
                            for event in run {
                                if event_tx.send(event).await.is_err() {
                                    debug!("Event receiver dropped, abandoning {}", path.display());
                                    return;
                                }
                            }
                        }
                        Err(error) => {
                            warn!("Skipping source {}: {}", path.display(), error);
                            let _ = event_tx
                                .send(BatchEvent::Error {
                                    file_index,
                                    total_files,
                                    error,
                                })
                                .await;
                        }
                    }
                }
            })
            .buffer_unordered(parallelism.max(1))
            .collect::<Vec<()>>()
            .await;

        info!("Finished processing {} source(s)", total_files);
    }
}
