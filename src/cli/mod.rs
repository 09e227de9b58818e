//! CLI module for namescrub

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

use crate::cleaner::{OptionSet, SpaceReplacement, TextCase};
use crate::config::Settings;
use crate::error::{ScrubError, ScrubResult};
use crate::utils::ExportFormat;

#[derive(Parser, Debug)]
#[command(name = "namescrub", about = "Clean filenames in bulk")]
#[command(version, author)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file
    #[arg(long, global = true, env = "NAMESCRUB_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean names given as arguments, or read one per line from stdin
    Clean {
        /// Names to clean
        names: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: PreviewFormat,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Clean the first column of CSV, text or spreadsheet files
    Batch {
        /// Input files (.csv, .txt, .xlsx, .xls, .ods, ...)
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Output file ("-" for stdout). Defaults to cleaned_names.<format>
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Export format (inferred from the output extension when omitted)
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// Number of files processed concurrently
        #[arg(short, long, default_value = "4")]
        parallel: usize,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// List built-in and user presets
    Presets,

    /// Edit the stored default options (interactive when no option flags are given)
    Config {
        /// Print the stored settings and exit
        #[arg(long, conflicts_with_all = ["reset", "save_as"])]
        show: bool,

        /// Restore built-in defaults
        #[arg(long)]
        reset: bool,

        /// Store the options as a named user preset instead of the defaults
        #[arg(long, value_name = "NAME")]
        save_as: Option<String>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Output format for the `clean` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PreviewFormat {
    Text,
    Json,
    Csv,
}

/// Option flags shared by commands that clean names
///
/// Layered in order: stored defaults, preset, raw pairs, individual flags.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// Start from a named preset (windows, unix, strict, keepall or a user preset)
    #[arg(long)]
    pub preset: Option<String>,

    /// Raw option as key=value, e.g. -O keep_colon=true (repeatable)
    #[arg(short = 'O', long = "option", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub pairs: Vec<(String, String)>,

    /// Space handling
    #[arg(long, value_enum)]
    pub spaces: Option<SpaceReplacement>,

    /// Case transform
    #[arg(long = "case", value_enum)]
    pub text_case: Option<TextCase>,

    /// Reserved characters to keep, e.g. --keep ':/'
    #[arg(long, value_name = "CHARS")]
    pub keep: Option<String>,

    /// Strip every reserved character
    #[arg(long, conflicts_with = "keep")]
    pub strip_all: bool,

    /// Collapse repeated -, _ and .
    #[arg(long, conflicts_with = "keep_repeats")]
    pub remove_repeats: bool,

    /// Leave repeated separators alone
    #[arg(long)]
    pub keep_repeats: bool,
}

impl OptionArgs {
    /// Whether any option flag was given
    pub fn is_empty(&self) -> bool {
        self.preset.is_none()
            && self.pairs.is_empty()
            && self.spaces.is_none()
            && self.text_case.is_none()
            && self.keep.is_none()
            && !self.strip_all
            && !self.remove_repeats
            && !self.keep_repeats
    }

    /// Resolve the final option set on top of the stored settings
    pub fn resolve(&self, settings: &Settings) -> ScrubResult<OptionSet> {
        let mut options = match &self.preset {
            Some(name) => settings.preset(name)?,
            None => settings.defaults,
        };

        for (key, value) in &self.pairs {
            options.set(key, value)?;
        }

        if let Some(spaces) = self.spaces {
            options.space_replacement = spaces;
        }
        if let Some(case) = self.text_case {
            options.text_case = case;
        }
        if self.strip_all {
            options.set_keep_all(false);
        }
        if let Some(chars) = &self.keep {
            for c in chars.chars().filter(|c| !c.is_whitespace() && *c != ',') {
                if !options.set_keep(c, true) {
                    return Err(ScrubError::invalid_option(
                        "keep",
                        c.to_string(),
                        "reserved characters / \\ : * ? \" < > |",
                    ));
                }
            }
        }
        if self.remove_repeats {
            options.remove_repeats = true;
        }
        if self.keep_repeats {
            options.remove_repeats = false;
        }

        Ok(options)
    }
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::preset;

    #[test]
    fn test_cli_parses() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_empty_args_use_stored_defaults() {
        let mut settings = Settings::default();
        settings.defaults.text_case = TextCase::Upper;
        let args = OptionArgs::default();
        assert!(args.is_empty());
        assert_eq!(args.resolve(&settings).unwrap(), settings.defaults);
    }

    #[test]
    fn test_flags_override_preset() {
        let args = OptionArgs {
            preset: Some("windows".to_string()),
            text_case: Some(TextCase::Title),
            keep: Some(": /".to_string()),
            keep_repeats: true,
            ..OptionArgs::default()
        };
        let options = args.resolve(&Settings::default()).unwrap();

        assert_eq!(options.space_replacement, SpaceReplacement::Underscore);
        assert_eq!(options.text_case, TextCase::Title);
        assert!(options.keep_colon);
        assert!(options.keep_slash);
        assert!(!options.keep_pipe);
        assert!(!options.remove_repeats);
    }

    #[test]
    fn test_pairs_apply_before_flags() {
        let args = OptionArgs {
            pairs: vec![
                ("space_replacement".to_string(), "remove".to_string()),
                ("keep_pipe".to_string(), "true".to_string()),
            ],
            spaces: Some(SpaceReplacement::Hyphen),
            ..OptionArgs::default()
        };
        let options = args.resolve(&Settings::default()).unwrap();
        assert_eq!(options.space_replacement, SpaceReplacement::Hyphen);
        assert!(options.keep_pipe);
    }

    #[test]
    fn test_strip_all_clears_preset_keeps() {
        let args = OptionArgs {
            preset: Some("keepall".to_string()),
            strip_all: true,
            ..OptionArgs::default()
        };
        let options = args.resolve(&Settings::default()).unwrap();
        assert_eq!(options.kept_chars(), "");
        assert_eq!(options, OptionSet::default());
        assert_ne!(options, preset("keepall").unwrap());
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let bad_keep = OptionArgs {
            keep: Some("a".to_string()),
            ..OptionArgs::default()
        };
        assert!(bad_keep.resolve(&Settings::default()).is_err());

        let bad_pair = OptionArgs {
            pairs: vec![("text_case".to_string(), "shouty".to_string())],
            ..OptionArgs::default()
        };
        assert!(bad_pair.resolve(&Settings::default()).is_err());

        let bad_preset = OptionArgs {
            preset: Some("amiga".to_string()),
            ..OptionArgs::default()
        };
        assert!(bad_preset.resolve(&Settings::default()).is_err());
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("keep_colon = true").unwrap(),
            ("keep_colon".to_string(), "true".to_string())
        );
        assert!(parse_pair("keep_colon").is_err());
    }
}
