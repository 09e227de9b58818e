//! Filename cleaning transform
//!
//! Stages run in a fixed order, each on the output of the previous one:
//! trim, space handling, case transform, character removal, repeat
//! collapsing, final trim.

use serde::Serialize;
use std::collections::BTreeSet;

use super::options::{OptionSet, SpaceReplacement, TextCase};

/// Characters conventionally disallowed in filenames
pub const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Characters subject to repeat collapsing
pub const SEPARATORS: &[char] = &['-', '_', '.'];

/// Result of cleaning one raw name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanedRecord {
    /// Trimmed input
    pub original: String,
    pub cleaned: String,
    /// Distinct characters deleted by the removal stage
    pub removed: BTreeSet<char>,
}

impl CleanedRecord {
    /// Record produced for empty or non-text input
    pub fn empty() -> Self {
        Self::default()
    }

    /// Removed characters as a display string, in code point order
    pub fn removed_string(&self) -> String {
        self.removed.iter().collect()
    }
}

/// Immutable predicate deciding which characters the removal stage deletes
///
/// ASCII control characters (0x00-0x1F) are always stripped; reserved
/// characters are stripped unless their `keep_*` flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripSet {
    slash: bool,
    backslash: bool,
    colon: bool,
    asterisk: bool,
    question: bool,
    dquote: bool,
    ltgt: bool,
    pipe: bool,
}

impl StripSet {
    pub fn from_options(options: &OptionSet) -> Self {
        Self {
            slash: !options.keep_slash,
            backslash: !options.keep_backslash,
            colon: !options.keep_colon,
            asterisk: !options.keep_asterisk,
            question: !options.keep_question,
            dquote: !options.keep_dquote,
            ltgt: !options.keep_ltgt,
            pipe: !options.keep_pipe,
        }
    }

    /// Whether `c` is deleted by the removal stage
    pub fn strips(&self, c: char) -> bool {
        match c {
            '\u{0}'..='\u{1F}' => true,
            '/' => self.slash,
            '\\' => self.backslash,
            ':' => self.colon,
            '*' => self.asterisk,
            '?' => self.question,
            '"' => self.dquote,
            '<' | '>' => self.ltgt,
            '|' => self.pipe,
            _ => false,
        }
    }
}

/// Byte-order mark left at the start of files exported by spreadsheet tools
pub const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Trim whitespace and stray byte-order marks from both ends
pub fn trim_name(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == BYTE_ORDER_MARK)
}

/// Clean one raw name under the given options
pub fn clean(raw: &str, options: &OptionSet) -> CleanedRecord {
    clean_with(raw, options, &options.strip_set())
}

/// Clean with a pre-derived strip set, for callers cleaning many names
pub fn clean_with(raw: &str, options: &OptionSet, strip: &StripSet) -> CleanedRecord {
    let original = trim_name(raw);
    if original.is_empty() {
        return CleanedRecord::empty();
    }

    let spaced = replace_spaces(original, options.space_replacement);
    let cased = apply_case(&spaced, options.text_case);
    let (stripped, removed) = strip_chars(&cased, strip);
    let collapsed = if options.remove_repeats {
        collapse_repeats(&stripped)
    } else {
        stripped
    };

    CleanedRecord {
        original: original.to_string(),
        cleaned: trim_name(&collapsed).to_string(),
        removed,
    }
}

fn replace_spaces(name: &str, mode: SpaceReplacement) -> String {
    match mode {
        SpaceReplacement::None => name.to_string(),
        SpaceReplacement::Underscore => name.replace(' ', "_"),
        SpaceReplacement::Hyphen => name.replace(' ', "-"),
        SpaceReplacement::Remove => name.replace(' ', ""),
    }
}

fn apply_case(name: &str, case: TextCase) -> String {
    match case {
        TextCase::None => name.to_string(),
        TextCase::Lower => name.to_lowercase(),
        TextCase::Upper => name.to_uppercase(),
        TextCase::Title => title_case(name),
    }
}

/// Capitalize the first word character of each whitespace-delimited word and
/// lowercase the rest of it. Leading punctuation in a word is left alone, and
/// apostrophes or hyphens do not start a new word.
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;

    for c in name.chars() {
        if c.is_whitespace() {
            in_word = false;
            out.push(c);
        } else if in_word {
            out.extend(c.to_lowercase());
        } else if c.is_alphanumeric() || c == '_' {
            in_word = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}

fn strip_chars(name: &str, strip: &StripSet) -> (String, BTreeSet<char>) {
    let mut removed = BTreeSet::new();
    let kept = name
        .chars()
        .filter(|&c| {
            if strip.strips(c) {
                removed.insert(c);
                false
            } else {
                true
            }
        })
        .collect();
    (kept, removed)
}

/// Collapse runs of the same separator. Mixed runs such as `-_` are untouched.
fn collapse_repeats(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev: Option<char> = None;

    for c in name.chars() {
        if prev == Some(c) && SEPARATORS.contains(&c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keep_all() -> OptionSet {
        let mut options = OptionSet::default();
        options.set_keep_all(true);
        options
    }

    fn set(chars: &[char]) -> BTreeSet<char> {
        chars.iter().copied().collect()
    }

    #[test]
    fn test_underscore_lower_with_repeats() {
        let options = OptionSet {
            space_replacement: SpaceReplacement::Underscore,
            text_case: TextCase::Lower,
            remove_repeats: true,
            ..OptionSet::default()
        };
        let record = clean("My File!!.txt", &options);
        assert_eq!(record.original, "My File!!.txt");
        assert_eq!(record.cleaned, "my_file!!.txt");
        assert!(record.removed.is_empty());
    }

    #[test]
    fn test_strip_selected_reserved() {
        let mut options = keep_all();
        options.keep_slash = false;
        options.keep_backslash = false;
        options.keep_colon = false;
        let record = clean("a/b\\c:d", &options);
        assert_eq!(record.cleaned, "abcd");
        assert_eq!(record.removed, set(&['/', '\\', ':']));
    }

    #[test]
    fn test_collapse_separator_runs() {
        let options = OptionSet {
            remove_repeats: true,
            ..keep_all()
        };
        assert_eq!(clean("weird---name___here", &options).cleaned, "weird-name_here");
        assert_eq!(clean("a--_.___b", &options).cleaned, "a-_._b");
        assert_eq!(clean("file..txt", &options).cleaned, "file.txt");
    }

    #[test]
    fn test_repeats_only_touch_separators() {
        let options = OptionSet {
            remove_repeats: true,
            ..keep_all()
        };
        assert_eq!(clean("aabb", &options).cleaned, "aabb");
        assert_eq!(clean("a-_-b", &options).cleaned, "a-_-b");
    }

    #[test]
    fn test_repeats_kept_when_disabled() {
        assert_eq!(clean("a--b", &keep_all()).cleaned, "a--b");
    }

    #[test]
    fn test_empty_input() {
        let options = OptionSet::default();
        assert_eq!(clean("", &options), CleanedRecord::empty());
        assert_eq!(clean("   \t ", &options), CleanedRecord::empty());
    }

    #[test]
    fn test_all_removed_yields_empty() {
        let record = clean("<>:|", &OptionSet::default());
        assert_eq!(record.original, "<>:|");
        assert_eq!(record.cleaned, "");
        assert_eq!(record.removed, set(&['<', '>', ':', '|']));
    }

    #[test]
    fn test_control_chars_always_stripped() {
        let record = clean("a\u{1}b\u{7}c", &keep_all());
        assert_eq!(record.cleaned, "abc");
        assert_eq!(record.removed, set(&['\u{1}', '\u{7}']));
    }

    #[test]
    fn test_bang_and_other_punctuation_survive() {
        let record = clean("hello!#%&.txt", &OptionSet::default());
        assert_eq!(record.cleaned, "hello!#%&.txt");
    }

    #[test]
    fn test_original_is_trimmed_input() {
        let record = clean("  spaced  ", &OptionSet::default());
        assert_eq!(record.original, "spaced");
    }

    #[test]
    fn test_byte_order_mark_is_trimmed() {
        let options = crate::cleaner::preset("windows").unwrap();
        let record = clean("\u{FEFF}Report.txt", &options);
        assert_eq!(record.original, "Report.txt");
        assert_eq!(record.cleaned, "report.txt");
        assert!(record.removed.is_empty());

        assert_eq!(clean("\u{FEFF}  ", &options), CleanedRecord::empty());
        assert_eq!(trim_name(" \u{FEFF}a b\u{FEFF}\n"), "a b");
    }

    #[test]
    fn test_space_modes() {
        let name = "a b  c";
        let mut options = keep_all();
        assert_eq!(clean(name, &options).cleaned, "a b  c");
        options.space_replacement = SpaceReplacement::Underscore;
        assert_eq!(clean(name, &options).cleaned, "a_b__c");
        options.space_replacement = SpaceReplacement::Hyphen;
        assert_eq!(clean(name, &options).cleaned, "a-b--c");
        options.space_replacement = SpaceReplacement::Remove;
        assert_eq!(clean(name, &options).cleaned, "abc");
    }

    #[test]
    fn test_space_replacement_before_collapse() {
        let options = OptionSet {
            space_replacement: SpaceReplacement::Underscore,
            remove_repeats: true,
            ..keep_all()
        };
        assert_eq!(clean("a   b", &options).cleaned, "a_b");
    }

    #[test]
    fn test_title_case() {
        let options = OptionSet {
            text_case: TextCase::Title,
            ..keep_all()
        };
        assert_eq!(clean("hELLO wORLD.TXT", &options).cleaned, "Hello World.txt");
        assert_eq!(clean("(draft) notes", &options).cleaned, "(Draft) Notes");
        assert_eq!(clean("don't stop-me", &options).cleaned, "Don't Stop-me");
    }

    #[test]
    fn test_title_case_after_underscore_is_one_word() {
        let options = OptionSet {
            space_replacement: SpaceReplacement::Underscore,
            text_case: TextCase::Title,
            ..keep_all()
        };
        assert_eq!(clean("big REPORT", &options).cleaned, "Big_report");
    }

    #[test]
    fn test_upper_case() {
        let options = OptionSet {
            text_case: TextCase::Upper,
            ..keep_all()
        };
        assert_eq!(clean("report v2.pdf", &options).cleaned, "REPORT V2.PDF");
    }

    #[test]
    fn test_removal_can_create_collapsible_run() {
        let options = OptionSet {
            remove_repeats: true,
            ..OptionSet::default()
        };
        let record = clean("a-:-b", &options);
        assert_eq!(record.cleaned, "a-b");
        assert_eq!(record.removed, set(&[':']));
    }

    #[test]
    fn test_final_trim_after_removal() {
        let record = clean("name \u{1}", &OptionSet::default());
        assert_eq!(record.cleaned, "name");
    }

    #[test]
    fn test_cleaned_is_fixed_point() {
        let options = OptionSet {
            space_replacement: SpaceReplacement::Hyphen,
            text_case: TextCase::Lower,
            remove_repeats: true,
            ..OptionSet::default()
        };
        for name in ["My  Holiday: Photos?.jpg", "a//b\\\\c", "--x__y..z--", "plain"] {
            let once = clean(name, &options).cleaned;
            let twice = clean(&once, &options).cleaned;
            assert_eq!(once, twice, "not a fixed point for {:?}", name);
        }
    }

    #[test]
    fn test_no_stripped_char_survives() {
        let options = OptionSet::default();
        let strip = options.strip_set();
        let record = clean("x/y\\z:*?\"<>|\u{0}\u{1F}end", &options);
        assert!(!record.cleaned.chars().any(|c| strip.strips(c)));
        assert_eq!(record.cleaned, "xyzend");
        assert_eq!(record.removed.len(), 11);
    }

    #[test]
    fn test_removed_string_order() {
        let record = clean("a|b/c", &OptionSet::default());
        assert_eq!(record.removed_string(), "/|");
    }
}
