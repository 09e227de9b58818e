//! CLI command handlers

use anyhow::{Context, Result};
use clap::ValueEnum;
use clap_complete::generate;
use colored::Colorize;
use dialoguer::{Confirm, MultiSelect, Select};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{OptionArgs, PreviewFormat};
use crate::batch::{BatchEvent, BatchProcessor, BatchResult, Source};
use crate::cleaner::{CleanedRecord, OptionSet, SpaceReplacement, TextCase, PRESET_NAMES};
use crate::config::Settings;
use crate::utils::{export, ExportFormat};

/// Reserved characters offered in the interactive config, with labels
const KEEP_CHOICES: &[(char, &str)] = &[
    ('/', "/  slash"),
    ('\\', "\\  backslash"),
    (':', ":  colon"),
    ('*', "*  asterisk"),
    ('?', "?  question mark"),
    ('"', "\"  double quote"),
    ('<', "< > angle brackets"),
    ('|', "|  pipe"),
];

/// Handle the `clean` command
pub fn clean(
    config: Option<&Path>,
    names: Vec<String>,
    format: PreviewFormat,
    args: &OptionArgs,
) -> Result<()> {
    let settings = Settings::load(config)?;
    let options = args.resolve(&settings)?;

    let names = if names.is_empty() {
        read_stdin_names()?
    } else {
        names
    };

    let processor = BatchProcessor::new(options);
    let result = processor.process("input", &Source::Names(names));
    debug!("Cleaned {} names", result.records.len());

    match format {
        PreviewFormat::Text => print_preview(&result.records),
        PreviewFormat::Json => {
            let stdout = io::stdout();
            serde_json::to_writer_pretty(stdout.lock(), &result.records)
                .context("Failed to serialize results")?;
            println!();
        }
        PreviewFormat::Csv => export::write_csv(&[result], io::stdout().lock())?,
    }

    Ok(())
}

fn read_stdin_names() -> Result<Vec<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("{}", "Enter names, one per line (Ctrl-D to finish):".cyan());
    }
    stdin
        .lock()
        .lines()
        .collect::<io::Result<Vec<_>>>()
        .context("Failed to read names from stdin")
}

fn print_preview(records: &[CleanedRecord]) {
    if records.is_empty() {
        println!("{}", "No names to clean.".yellow());
        return;
    }

    for record in records {
        println!("  {}", record.original);
        if record.cleaned == record.original {
            println!("  {} {}", "=".dimmed(), record.cleaned.dimmed());
        } else if record.cleaned.is_empty() {
            println!("  {} {}", "→".red(), "(empty)".red());
        } else {
            println!("  {} {}", "→".green(), record.cleaned.green());
        }
        if !record.removed.is_empty() {
            println!("    Removed: {}", describe_removed(record).yellow());
        }
    }
}

fn describe_removed(record: &CleanedRecord) -> String {
    record
        .removed
        .iter()
        .map(|c| {
            if c.is_control() {
                format!("U+{:04X}", *c as u32)
            } else {
                c.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Handle the `batch` command
pub async fn batch(
    config: Option<&Path>,
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    format: Option<ExportFormat>,
    parallel: usize,
    args: &OptionArgs,
) -> Result<()> {
    let settings = Settings::load(config)?;
    let options = args.resolve(&settings)?;
    let format = format
        .or_else(|| output.as_deref().and_then(format_from_extension))
        .unwrap_or(ExportFormat::Csv);
    let output =
        output.unwrap_or_else(|| PathBuf::from(format!("cleaned_names.{}", format.extension())));

    let total_files = files.len();
    eprintln!("{}", format!("Cleaning names from {} file(s)...", total_files).cyan());

    let multi = MultiProgress::new();
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        .unwrap()
        .progress_chars("#>-");
    let bars: Vec<ProgressBar> = files
        .iter()
        .map(|path| {
            let bar = multi.add(ProgressBar::new(100));
            bar.set_style(style.clone());
            bar.set_message(crate::batch::source::source_name(path));
            bar
        })
        .collect();

    let processor = BatchProcessor::new(options);
    let (event_tx, mut event_rx) = mpsc::channel(256);

    let mut results: Vec<Option<BatchResult>> = vec![None; total_files];
    let mut failures = Vec::new();

    let receive = async {
        while let Some(event) = event_rx.recv().await {
            match event {
                BatchEvent::Progress(progress) => {
                    bars[progress.file_index].set_position(progress.file_progress as u64);
                }
                BatchEvent::Complete {
                    file_index, result, ..
                } => {
                    let bar = &bars[file_index];
                    bar.set_position(100);
                    bar.finish_with_message(format!(
                        "{} ({} names)",
                        result.source,
                        result.records.len()
                    ));
                    results[file_index] = Some(result);
                }
                BatchEvent::Error {
                    file_index, error, ..
                } => {
                    bars[file_index].abandon_with_message(format!("Failed: {}", error));
                    failures.push((file_index, error));
                }
            }
        }
    };

    tokio::join!(processor.process_paths(files, parallel, event_tx), receive);

    let results: Vec<BatchResult> = results.into_iter().flatten().collect();
    if results.is_empty() && !failures.is_empty() {
        anyhow::bail!("No files could be read ({} failed)", failures.len());
    }

    write_export(&results, format, &output)?;

    let record_count: usize = results.iter().map(|r| r.records.len()).sum();
    let changed = results
        .iter()
        .flat_map(|r| &r.records)
        .filter(|r| r.cleaned != r.original)
        .count();
    info!("Exported {} records", record_count);

    eprintln!();
    eprintln!("{}", "Batch complete!".green().bold());
    eprintln!("  Files processed: {}", results.len());
    eprintln!("  Names cleaned: {}", record_count);
    eprintln!("  Names changed: {}", changed);
    if !failures.is_empty() {
        eprintln!("  {}", format!("Files failed: {}", failures.len()).red());
        for (_, error) in &failures {
            eprintln!("    - {}", error);
        }
    }
    if output != Path::new("-") {
        eprintln!("  Output: {}", output.display());
    }

    Ok(())
}

fn format_from_extension(path: &Path) -> Option<ExportFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ExportFormat::from_str(&ext, true).ok()
}

fn write_export(results: &[BatchResult], format: ExportFormat, output: &Path) -> Result<()> {
    if output == Path::new("-") {
        return export::export(results, format, io::stdout().lock());
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to create output file {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    export::export(results, format, &mut writer)?;
    writer.flush().context("Failed to write output file")?;
    Ok(())
}

/// Handle the `presets` command
pub fn presets(config: Option<&Path>) -> Result<()> {
    let settings = Settings::load(config)?;

    println!("{}", "Built-in presets:".green().bold());
    for name in PRESET_NAMES {
        let options = crate::cleaner::preset(name)?;
        let shadowed = if settings.presets.contains_key(*name) {
            " (overridden by user preset)".yellow().to_string()
        } else {
            String::new()
        };
        println!("  {:<10} {}{}", name.cyan(), summarize(&options), shadowed);
    }

    if !settings.presets.is_empty() {
        println!();
        println!("{}", "User presets:".green().bold());
        for (name, options) in &settings.presets {
            println!("  {:<10} {}", name.cyan(), summarize(options));
        }
    }

    Ok(())
}

fn summarize(options: &OptionSet) -> String {
    let kept = options.kept_chars();
    format!(
        "spaces={} case={} keep={} repeats={}",
        options.space_replacement,
        options.text_case,
        if kept.is_empty() { "none".to_string() } else { kept },
        if options.remove_repeats { "collapse" } else { "keep" }
    )
}

/// Handle the `config` command
pub fn config(
    config: Option<&Path>,
    show: bool,
    reset: bool,
    save_as: Option<String>,
    args: &OptionArgs,
) -> Result<()> {
    let mut settings = Settings::load(config)?;

    if show {
        println!("Defaults: {}", summarize(&settings.defaults));
        for (name, options) in &settings.presets {
            println!("Preset {}: {}", name.cyan(), summarize(options));
        }
        return Ok(());
    }

    let options = if reset {
        OptionSet::default()
    } else if args.is_empty() {
        prompt_options(&settings.defaults)?
    } else {
        args.resolve(&settings)?
    };

    match save_as {
        Some(name) => {
            settings.presets.insert(name.clone(), options);
            println!("Saved preset {}: {}", name.cyan(), summarize(&options));
        }
        None => {
            settings.defaults = options;
            println!("Saved defaults: {}", summarize(&options));
        }
    }

    let path = settings.save(config)?;
    println!("{}", format!("Settings written to {}", path.display()).green());
    Ok(())
}

/// Ask for each option interactively, starting from `current`
fn prompt_options(current: &OptionSet) -> Result<OptionSet> {
    let mut options = *current;

    let spaces = SpaceReplacement::value_variants();
    let labels: Vec<String> = spaces.iter().map(|s| s.to_string()).collect();
    let selected = Select::new()
        .with_prompt("Space handling")
        .items(&labels)
        .default(spaces.iter().position(|s| *s == current.space_replacement).unwrap_or(0))
        .interact()?;
    options.space_replacement = spaces[selected];

    let cases = TextCase::value_variants();
    let labels: Vec<String> = cases.iter().map(|c| c.to_string()).collect();
    let selected = Select::new()
        .with_prompt("Case transform")
        .items(&labels)
        .default(cases.iter().position(|c| *c == current.text_case).unwrap_or(0))
        .interact()?;
    options.text_case = cases[selected];

    let kept = current.kept_chars();
    let labels: Vec<&str> = KEEP_CHOICES.iter().map(|(_, label)| *label).collect();
    let defaults: Vec<bool> = KEEP_CHOICES.iter().map(|(c, _)| kept.contains(*c)).collect();
    let chosen = MultiSelect::new()
        .with_prompt("Reserved characters to keep (space to toggle)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;
    for (index, (c, _)) in KEEP_CHOICES.iter().enumerate() {
        options.set_keep(*c, chosen.contains(&index));
    }

    options.remove_repeats = Confirm::new()
        .with_prompt("Collapse repeated -, _ and . ?")
        .default(current.remove_repeats)
        .interact()?;

    Ok(options)
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = super::Cli::command();
    generate(shell, &mut cmd, "namescrub", &mut io::stdout());
}

// Extension trait for Cli to get clap Command
impl super::Cli {
    fn command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::{clean, preset};

    #[test]
    fn test_format_from_extension() {
        assert_eq!(format_from_extension(Path::new("out.JSON")), Some(ExportFormat::Json));
        assert_eq!(format_from_extension(Path::new("out.csv")), Some(ExportFormat::Csv));
        assert_eq!(format_from_extension(Path::new("out.xlsx")), None);
        assert_eq!(format_from_extension(Path::new("-")), None);
    }

    #[test]
    fn test_summarize() {
        assert_eq!(
            summarize(&preset("windows").unwrap()),
            "spaces=underscore case=lower keep=none repeats=collapse"
        );
        assert_eq!(
            summarize(&preset("keepall").unwrap()),
            "spaces=none case=none keep=/\\:*?\"<>| repeats=keep"
        );
    }

    #[test]
    fn test_describe_removed_shows_control_codes() {
        let record = clean("a\u{1}b:c", &OptionSet::default());
        assert_eq!(describe_removed(&record), "U+0001, :");
    }

    #[test]
    fn test_write_export_to_file() {
        let path = std::env::temp_dir().join(format!("namescrub_export_{}.csv", std::process::id()));
        let results = vec![BatchResult {
            source: "names.txt".to_string(),
            records: vec![clean("a b", &preset("windows").unwrap())],
        }];

        write_export(&results, ExportFormat::Csv, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(written, "source,original,cleaned,removed\nnames.txt,a b,a_b,\n");
    }
}
