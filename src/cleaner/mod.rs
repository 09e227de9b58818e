//! Filename cleaning rules

mod name;
mod options;
mod presets;

pub use name::{
    clean, clean_with, trim_name, CleanedRecord, BYTE_ORDER_MARK, StripSet, RESERVED, SEPARATORS,
};
pub use options::{OptionSet, SpaceReplacement, TextCase};
pub use presets::{preset, PRESET_NAMES};
