//! Error taxonomy for option validation and source acquisition
//!
//! Cleaning a single name never fails. Errors only surface where option
//! values come in from the outside world and where sources are read.

use thiserror::Error;

/// Errors raised by the cleaning core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrubError {
    /// An option field holds a value outside its domain. Rejects the whole run.
    #[error("invalid value {value:?} for option `{field}` (expected {expected})")]
    InvalidOption {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// A source could not be read or decoded. Scoped to that source only.
    #[error("could not read {name}: {reason}")]
    UnreadableSource { name: String, reason: String },
}

impl ScrubError {
    pub fn invalid_option(field: impl Into<String>, value: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidOption {
            field: field.into(),
            value: value.into(),
            expected,
        }
    }

    pub fn unreadable(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::UnreadableSource {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

pub type ScrubResult<T> = std::result::Result<T, ScrubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_option_message() {
        let err = ScrubError::invalid_option("text_case", "sideways", "none, lower, upper or title");
        assert_eq!(
            err.to_string(),
            "invalid value \"sideways\" for option `text_case` (expected none, lower, upper or title)"
        );
    }

    #[test]
    fn test_unreadable_message() {
        let err = ScrubError::unreadable("names.xlsx", "no worksheet found");
        assert_eq!(err.to_string(), "could not read names.xlsx: no worksheet found");
    }
}
