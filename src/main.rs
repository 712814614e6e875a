use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use tsimport::cli::{Cli, Commands};
use tsimport::config::Config;
use tsimport::logging::init_logging;
use tsimport::metrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // A broken config file is reported by the command itself
    let config = Config::load(&project_root).unwrap_or_default();

    // The guard MUST be held until program exit to ensure logs are flushed
    let _logging_guard = init_logging(&config.logging, &project_root)?;

    tracing::info!("tsimport starting up");
    tracing::debug!("Workspace root: {}", project_root.display());

    metrics::register_metrics();

    match cli.command {
        Commands::Init { force } => {
            tsimport::commands::init::run(force).await?;
        }
        Commands::Index => {
            tsimport::commands::index::run().await?;
        }
        Commands::Complete {
            query,
            modules,
            exact,
            anywhere,
            limit,
        } => {
            tsimport::commands::complete::run(&query, modules, exact, anywhere, limit).await?;
        }
        Commands::Fix { file, diagnostic } => {
            tsimport::commands::fix::run(&file, &diagnostic).await?;
        }
        Commands::Import {
            file,
            name,
            from,
            write,
        } => {
            tsimport::commands::import::run(&file, &name, from.as_deref(), write).await?;
        }
        Commands::Watch { debounce_ms } => {
            tsimport::commands::watch::run(debounce_ms).await?;
        }
        Commands::Stats { prometheus } => {
            tsimport::commands::stats::run(prometheus).await?;
        }
    }

    Ok(())
}
