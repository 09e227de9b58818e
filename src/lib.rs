//! namescrub - Clean filenames in bulk
//!
//! The core is `cleaner` (a pure transform from a raw name and an option set
//! to a cleaned record) and `batch` (applying it to every row of text, CSV
//! and spreadsheet sources with progress events).

pub mod batch;
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod error;
pub mod utils;
