//! Batch processing of text, CSV and spreadsheet sources

pub mod processor;
pub mod source;

pub use processor::{BatchEvent, BatchProcessor, BatchResult, ProgressEvent};
pub use source::{load_source, Cell, Source};
