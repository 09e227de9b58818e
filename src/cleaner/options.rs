//! Cleaning options and their validation

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::name::StripSet;
use crate::error::{ScrubError, ScrubResult};

const SPACE_EXPECTED: &str = "none, underscore, hyphen or remove";
const CASE_EXPECTED: &str = "none, lower, upper or title";
const BOOL_EXPECTED: &str = "true or false";

/// How literal space characters are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpaceReplacement {
    /// Leave spaces untouched
    #[default]
    #[serde(alias = "original")]
    #[value(alias = "original")]
    None,
    /// Replace each space with `_`
    Underscore,
    /// Replace each space with `-`
    Hyphen,
    /// Delete all spaces
    Remove,
}

/// Case transform applied after space handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    /// Keep the original case
    #[default]
    #[serde(alias = "original")]
    #[value(alias = "original")]
    None,
    Lower,
    Upper,
    /// Capitalize each whitespace-delimited word
    Title,
}

impl FromStr for SpaceReplacement {
    type Err = ScrubError;

    fn from_str(s: &str) -> ScrubResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "original" => Ok(Self::None),
            "underscore" => Ok(Self::Underscore),
            "hyphen" => Ok(Self::Hyphen),
            "remove" => Ok(Self::Remove),
            _ => Err(ScrubError::invalid_option("space_replacement", s, SPACE_EXPECTED)),
        }
    }
}

impl FromStr for TextCase {
    type Err = ScrubError;

    fn from_str(s: &str) -> ScrubResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "original" => Ok(Self::None),
            "lower" => Ok(Self::Lower),
            "upper" => Ok(Self::Upper),
            "title" => Ok(Self::Title),
            _ => Err(ScrubError::invalid_option("text_case", s, CASE_EXPECTED)),
        }
    }
}

impl fmt::Display for SpaceReplacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Underscore => "underscore",
            Self::Hyphen => "hyphen",
            Self::Remove => "remove",
        };
        f.write_str(name)
    }
}

impl fmt::Display for TextCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Title => "title",
        };
        f.write_str(name)
    }
}

/// Full rule set for one cleaning run
///
/// Missing fields deserialize to their defaults, so an absent `keep_*` flag
/// means the character is stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSet {
    pub space_replacement: SpaceReplacement,
    pub text_case: TextCase,
    pub keep_slash: bool,
    pub keep_backslash: bool,
    pub keep_colon: bool,
    pub keep_asterisk: bool,
    pub keep_question: bool,
    pub keep_dquote: bool,
    /// Covers both `<` and `>`
    pub keep_ltgt: bool,
    pub keep_pipe: bool,
    /// Collapse runs of the same `-`, `_` or `.` into one
    pub remove_repeats: bool,
}

impl OptionSet {
    /// Build an option set from raw key/value pairs (form fields, query bodies)
    pub fn from_pairs<I, K, V>(pairs: I) -> ScrubResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.set(key.as_ref(), value.as_ref())?;
        }
        Ok(options)
    }

    /// Apply a single raw key/value pair. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: &str) -> ScrubResult<()> {
        let key = key.trim();
        match key {
            "space_replacement" => self.space_replacement = value.parse()?,
            "text_case" => self.text_case = value.parse()?,
            "keep_slash" => self.keep_slash = parse_flag(key, value)?,
            "keep_backslash" => self.keep_backslash = parse_flag(key, value)?,
            "keep_colon" => self.keep_colon = parse_flag(key, value)?,
            "keep_asterisk" => self.keep_asterisk = parse_flag(key, value)?,
            "keep_question" => self.keep_question = parse_flag(key, value)?,
            "keep_dquote" => self.keep_dquote = parse_flag(key, value)?,
            "keep_ltgt" => self.keep_ltgt = parse_flag(key, value)?,
            "keep_pipe" => self.keep_pipe = parse_flag(key, value)?,
            "remove_repeats" => self.remove_repeats = parse_flag(key, value)?,
            other => debug!("Ignoring unknown option key: {}", other),
        }
        Ok(())
    }

    /// Keep or strip a reserved character. Returns false if `c` is not reserved.
    pub fn set_keep(&mut self, c: char, keep: bool) -> bool {
        let flag = match c {
            '/' => &mut self.keep_slash,
            '\\' => &mut self.keep_backslash,
            ':' => &mut self.keep_colon,
            '*' => &mut self.keep_asterisk,
            '?' => &mut self.keep_question,
            '"' => &mut self.keep_dquote,
            '<' | '>' => &mut self.keep_ltgt,
            '|' => &mut self.keep_pipe,
            _ => return false,
        };
        *flag = keep;
        true
    }

    /// Set every `keep_*` flag at once
    pub fn set_keep_all(&mut self, keep: bool) {
        self.keep_slash = keep;
        self.keep_backslash = keep;
        self.keep_colon = keep;
        self.keep_asterisk = keep;
        self.keep_question = keep;
        self.keep_dquote = keep;
        self.keep_ltgt = keep;
        self.keep_pipe = keep;
    }

    /// Reserved characters that survive stripping under these options
    pub fn kept_chars(&self) -> String {
        let strip = self.strip_set();
        super::name::RESERVED
            .iter()
            .filter(|c| !strip.strips(**c))
            .collect()
    }

    /// Derive the character-removal predicate for these options
    pub fn strip_set(&self) -> StripSet {
        StripSet::from_options(self)
    }
}

fn parse_flag(field: &str, value: &str) -> ScrubResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" | "" => Ok(false),
        _ => Err(ScrubError::invalid_option(field, value, BOOL_EXPECTED)),
    }
}
