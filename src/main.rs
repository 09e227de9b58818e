//! namescrub - Clean filenames in bulk

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use namescrub::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "namescrub=debug"
    } else {
        "namescrub=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Clean {
            names,
            format,
            options,
        } => {
            cli::commands::clean(config, names, format, &options)?;
        }
        Commands::Batch {
            files,
            output,
            format,
            parallel,
            options,
        } => {
            cli::commands::batch(config, files, output, format, parallel, &options).await?;
        }
        Commands::Presets => {
            cli::commands::presets(config)?;
        }
        Commands::Config {
            show,
            reset,
            save_as,
            options,
        } => {
            cli::commands::config(config, show, reset, save_as, &options)?;
        }
        Commands::Completion { shell } => {
            cli::commands::completion(shell);
        }
    }

    Ok(())
}
