//! Built-in option presets

use super::options::{OptionSet, SpaceReplacement, TextCase};
use crate::error::{ScrubError, ScrubResult};

/// Names of the built-in presets, in display order
pub const PRESET_NAMES: &[&str] = &["windows", "unix", "strict", "keepall"];

/// Look up a built-in preset by name (case-insensitive)
pub fn preset(name: &str) -> ScrubResult<OptionSet> {
    let options = match name.trim().to_ascii_lowercase().as_str() {
        "windows" => OptionSet {
            space_replacement: SpaceReplacement::Underscore,
            text_case: TextCase::Lower,
            remove_repeats: true,
            ..OptionSet::default()
        },
        "unix" => {
            let mut options = OptionSet {
                space_replacement: SpaceReplacement::Hyphen,
                remove_repeats: true,
                ..OptionSet::default()
            };
            options.set_keep_all(true);
            options.keep_backslash = false;
            options
        }
        "strict" => OptionSet {
            space_replacement: SpaceReplacement::Remove,
            text_case: TextCase::Lower,
            remove_repeats: true,
            ..OptionSet::default()
        },
        "keepall" => {
            let mut options = OptionSet::default();
            options.set_keep_all(true);
            options
        }
        _ => return Err(ScrubError::invalid_option("preset", name, "windows, unix, strict or keepall")),
    };
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::clean;

    #[test]
    fn test_all_named_presets_resolve() {
        for name in PRESET_NAMES {
            assert!(preset(name).is_ok(), "preset {} missing", name);
        }
    }

    #[test]
    fn test_preset_lookup_case_insensitive() {
        assert_eq!(preset("Windows").unwrap(), preset("windows").unwrap());
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            preset("amiga"),
            Err(ScrubError::InvalidOption { ref field, .. }) if field == "preset"
        ));
    }

    #[test]
    fn test_windows_preset() {
        let record = clean("My Report: Q1?.xlsx", &preset("windows").unwrap());
        assert_eq!(record.cleaned, "my_report_q1.xlsx");
    }

    #[test]
    fn test_unix_preset_strips_only_backslash() {
        let options = preset("unix").unwrap();
        assert_eq!(options.kept_chars(), "/:*?\"<>|");
        let record = clean("dir\\Name  Here:v1", &options);
        assert_eq!(record.cleaned, "dirName-Here:v1");
    }

    #[test]
    fn test_strict_preset() {
        let record = clean("Alpha Beta.txt", &preset("strict").unwrap());
        assert_eq!(record.cleaned, "alphabeta.txt");
    }

    #[test]
    fn test_keepall_preset_only_strips_controls() {
        let options = preset("keepall").unwrap();
        let record = clean("A <b>  c\u{2}", &options);
        assert_eq!(record.cleaned, "A <b>  c");
    }
}
