//! File system watcher for incremental re-indexing
//!
//! Debounced notify events are turned into [`FileChange`]s, filtered through
//! the indexer's include/exclude globs and applied one file at a time.

pub mod change;

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_full::{new_debouncer, DebouncedEvent};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::engine::ImportEngine;
use crate::indexer::FileOutcome;

pub use change::{dedupe, ChangeType, FileChange, WatchStats};

/// Watches a workspace and feeds changes to an [`ImportEngine`]
pub struct FileWatcher {
    engine: Arc<ImportEngine>,
    debounce_ms: u64,
}

impl FileWatcher {
    pub fn new(engine: Arc<ImportEngine>, debounce_ms: u64) -> Self {
        Self {
            engine,
            debounce_ms,
        }
    }

    /// Start watching for file changes
    ///
    /// Runs until the shutdown signal is received and returns the
    /// accumulated statistics.
    pub async fn run(self, mut shutdown_rx: oneshot::Receiver<()>) -> Result<WatchStats> {
        let debounce_duration = Duration::from_millis(self.debounce_ms);
        let root = self.engine.root().to_path_buf();

        let (tx, mut rx) = mpsc::channel::<Vec<DebouncedEvent>>(100);

        let mut debouncer = new_debouncer(
            debounce_duration,
            None,
            move |result: std::result::Result<Vec<DebouncedEvent>, Vec<notify::Error>>| {
                match result {
                    Ok(events) => {
                        if !events.is_empty() {
                            if let Err(e) = tx.blocking_send(events) {
                                error!("Failed to send debounced events: {}", e);
                            }
                        }
                    }
                    Err(errors) => {
                        for error in errors {
                            error!("Watch error: {}", error);
                        }
                    }
                }
            },
        )
        .context("Failed to create file watcher debouncer")?;

        debouncer
            .watch(&root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch directory: {:?}", root))?;

        info!("Watching directory: {:?}", root);
        info!("Debounce delay: {}ms", self.debounce_ms);

        let mut total_stats = WatchStats::default();

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received, stopping watcher");
                    break;
                }

                Some(events) = rx.recv() => {
                    let changes = self.convert_events(events);

                    if !changes.is_empty() {
                        info!("Processing {} file changes", changes.len());
                        let stats = self.apply_changes(changes).await;
                        Self::print_stats(&stats);
                        total_stats.merge(&stats);
                    }
                }
            }
        }

        Ok(total_stats)
    }

    /// Convert debounced events into deduplicated changes to indexable files
    fn convert_events(&self, events: Vec<DebouncedEvent>) -> Vec<FileChange> {
        let mut changes = Vec::new();

        for event in &events {
            let Some(change_type) = ChangeType::from_event_kind(&event.kind) else {
                continue;
            };

            for path in &event.paths {
                if path.is_dir() {
                    continue;
                }
                if !self.is_watched(path) {
                    debug!("Skipping file (not matched): {:?}", path);
                    continue;
                }

                debug!("File change detected: {} -> {:?}", change_type, path);
                changes.push(FileChange::new(path.clone(), change_type));
            }
        }

        dedupe(changes)
    }

    fn is_watched(&self, path: &std::path::Path) -> bool {
        match self.engine.indexer().relativize(path) {
            Some(relative) => self.engine.indexer().matcher().matches(&relative),
            None => false,
        }
    }

    /// Re-index each changed file through the engine
    pub async fn apply_changes(&self, changes: Vec<FileChange>) -> WatchStats {
        let mut stats = WatchStats::default();

        for change in changes {
            match self.engine.scan_file(&change.path).await {
                Ok(FileOutcome::Indexed(count)) => {
                    stats.files_indexed += 1;
                    stats.symbols_indexed += count;
                }
                Ok(FileOutcome::Removed(count)) => {
                    stats.files_removed += 1;
                    stats.symbols_removed += count;
                }
                Ok(FileOutcome::Failed(reason)) => {
                    debug!("{} ({}) failed: {}", change.path.display(), change.change_type, reason);
                    stats.files_failed += 1;
                }
                Ok(FileOutcome::Skipped) => {}
                Err(e) => {
                    error!("Failed to apply change to {:?}: {:#}", change.path, e);
                    stats.errors += 1;
                }
            }
        }

        stats
    }

    fn print_stats(stats: &WatchStats) {
        if stats.files_indexed > 0 {
            println!(
                "  ~ {} files re-indexed ({} symbols)",
                stats.files_indexed, stats.symbols_indexed
            );
        }
        if stats.files_removed > 0 {
            println!(
                "  - {} files removed ({} symbols)",
                stats.files_removed, stats.symbols_removed
            );
        }
        if stats.files_failed > 0 {
            warn!("  {} files failed to parse", stats.files_failed);
        }
        if stats.errors > 0 {
            warn!("  {} errors occurred", stats.errors);
        }
    }
}

/// Handle to control a running watcher
pub struct WatcherHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<Result<WatchStats>>>,
}

impl WatcherHandle {
    /// Spawn `watcher` on the current runtime.
    pub fn spawn(watcher: FileWatcher) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(watcher.run(shutdown_rx));
        Self {
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Request graceful shutdown
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the watcher to finish and get the final stats
    pub async fn wait(mut self) -> Result<WatchStats> {
        match self.task.take() {
            Some(task) => task.await.context("Watcher task panicked")?,
            None => Ok(WatchStats::default()),
        }
    }
}
