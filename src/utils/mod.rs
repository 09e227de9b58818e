//! Utility functions

pub mod export;

pub use export::ExportFormat;
