//! Subcommand implementations for the `tsimport` binary.
//!
//! Every command works on the current directory. The index lives in memory,
//! so commands that query it scan the workspace first.

pub mod complete;
pub mod fix;
pub mod import;
pub mod index;
pub mod init;
pub mod stats;
pub mod watch;

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::ImportEngine;
use crate::Config;

/// Build an engine for the current directory and populate its index.
pub(crate) async fn open_engine(show_output: bool) -> Result<(PathBuf, Arc<ImportEngine>)> {
    let root = env::current_dir()?;
    let config = Config::load(&root)?;
    let engine = Arc::new(ImportEngine::new(&root, config)?);

    let report = engine.reindex(show_output).await?;
    if show_output {
        report.print_summary();
    }

    Ok((root, engine))
}
