//! Workspace scanning: walks the tree, parses files in parallel and commits
//! each file's exports to the shared [`SymbolIndex`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::metrics;
use crate::paths;
use crate::symbol::{Symbol, SymbolIndex};

use super::errors::{ErrorCollector, ScanReport, ScanStage};
use super::package::PackageResolver;
use super::parser::{ExportParser, ParseError};
use super::status::IndexerStatus;
use super::walker::{FileMatcher, Walker};

/// Result of re-indexing a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// File parsed; number of symbols now attributed to it
    Indexed(usize),
    /// File deleted or no longer matched; number of symbols dropped
    Removed(usize),
    /// Path lies outside the workspace
    Skipped,
    /// Read or parse failure; the file's previous symbols were dropped
    Failed(String),
}

/// Shared pieces a scan worker needs to commit one file.
#[derive(Clone)]
struct FileCommitter {
    index: Arc<SymbolIndex>,
    packages: Arc<PackageResolver>,
}

impl FileCommitter {
    /// Parse `absolute` and replace its entries in the index.
    fn commit(
        &self,
        parser: &mut ExportParser,
        absolute: &Path,
        relative: &Path,
    ) -> Result<usize, ParseError> {
        let declarations = parser.parse_file(absolute)?;
        let package = self.packages.specifier_for(relative);

        let symbols = declarations
            .into_iter()
            .map(|decl| {
                let symbol = Symbol::new(decl.name, decl.kind, relative);
                match decl.ambient_module.or_else(|| package.clone()) {
                    Some(specifier) => symbol.with_specifier(specifier),
                    None => symbol,
                }
            })
            .collect();

        Ok(self.index.replace_file(relative, symbols))
    }

    /// Drop a failed file's previous contributions.
    fn discard(&self, relative: &Path, error: &ParseError) {
        warn!("Skipping {}: {}", relative.display(), error);
        metrics::PARSE_ERRORS.inc();
        self.index.remove_file(relative);
    }
}

fn stage_of(error: &ParseError) -> ScanStage {
    match error {
        ParseError::Read { .. } => ScanStage::Read,
        _ => ScanStage::Parse,
    }
}

/// Populates a [`SymbolIndex`] from the files of one workspace root.
///
/// Full scans and single-file updates are serialized; a newer full scan
/// supersedes an older one, which stops committing files as soon as it
/// notices.
pub struct WorkspaceIndexer {
    root: PathBuf,
    walker: Arc<Walker>,
    committer: FileCommitter,
    pool: Arc<rayon::ThreadPool>,
    scan_lock: Mutex<()>,
    generation: Arc<AtomicU64>,
    status: watch::Sender<IndexerStatus>,
}

impl WorkspaceIndexer {
    pub fn new(root: &Path, config: &ScanConfig, index: Arc<SymbolIndex>) -> Result<Self> {
        let root = std::fs::canonicalize(root)
            .with_context(|| format!("Workspace root not found: {}", root.display()))?;

        let threads = config.parallel_threads.unwrap_or_else(num_cpus::get).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("tsimport-scan-{}", i))
            .build()
            .context("Failed to initialize scan thread pool")?;
        debug!("Using {} threads for parallel parsing", threads);

        let walker = Walker::new(root.clone(), config)?;
        let (status, _) = watch::channel(IndexerStatus::Initializing);

        Ok(Self {
            committer: FileCommitter {
                index,
                packages: Arc::new(PackageResolver::new(root.clone())),
            },
            root,
            walker: Arc::new(walker),
            pool: Arc::new(pool),
            scan_lock: Mutex::new(()),
            generation: Arc::new(AtomicU64::new(0)),
            status,
        })
    }

    /// Canonical workspace root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &Arc<SymbolIndex> {
        &self.committer.index
    }

    /// Include/exclude filter applied to every scanned path
    pub fn matcher(&self) -> &FileMatcher {
        self.walker.matcher()
    }

    pub fn status(&self) -> IndexerStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<IndexerStatus> {
        self.status.subscribe()
    }

    pub(crate) fn set_status(&self, status: IndexerStatus) {
        debug!("Indexer status: {}", status);
        self.status.send_replace(status);
    }

    /// Mark any running scan as stale.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    /// Scan every matching file, replacing each file's entries as it goes.
    ///
    /// Files that were indexed before but are no longer found are dropped.
    pub async fn scan_all(&self, show_output: bool) -> Result<ScanReport> {
        let generation = self.next_generation();
        let _guard = self.scan_lock.lock().await;
        self.scan_locked(generation, show_output).await
    }

    /// Clear the index and scan from scratch.
    pub async fn rebuild(&self, show_output: bool) -> Result<ScanReport> {
        let generation = self.next_generation();
        let _guard = self.scan_lock.lock().await;
        if self.is_stale(generation) {
            debug!("Rebuild superseded before it started");
            return Ok(ScanReport::cancelled());
        }
        self.committer.index.reset_index();
        self.scan_locked(generation, show_output).await
    }

    async fn scan_locked(&self, generation: u64, show_output: bool) -> Result<ScanReport> {
        if self.is_stale(generation) {
            return Ok(ScanReport::cancelled());
        }

        self.set_status(IndexerStatus::Scanning);
        let start = Instant::now();

        let errors = ErrorCollector::new();
        let walker = self.walker.clone();
        let walk_errors = errors.clone();
        let files = match tokio::task::spawn_blocking(move || walker.collect_files(&walk_errors))
            .await
        {
            Ok(files) => files,
            Err(e) => {
                self.set_status(IndexerStatus::Error(e.to_string()));
                return Err(e).context("Workspace walk failed");
            }
        };
        self.committer.packages.clear_cache();

        info!("Scanning {} files in {}", files.len(), self.root.display());

        let progress = show_output.then(|| create_progress_bar(files.len()));

        let worker = ScanWorker {
            root: self.root.clone(),
            committer: self.committer.clone(),
            errors: errors.clone(),
            progress: progress.clone(),
            generation: self.generation.clone(),
        };
        let pool = self.pool.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            pool.install(|| worker.run(&files, generation))
        })
        .await;

        let (scanned, seen) = match outcome {
            Ok(result) => result,
            Err(e) => {
                self.set_status(IndexerStatus::Error(e.to_string()));
                return Err(e).context("Scan worker failed");
            }
        };

        if self.is_stale(generation) {
            if let Some(pb) = &progress {
                pb.abandon_with_message("Superseded");
            }
            info!("Scan superseded after {} files", scanned);
            return Ok(ScanReport::cancelled());
        }

        for stale in self.committer.index.list_files() {
            if !seen.contains(&stale) {
                self.committer.index.remove_file(&stale);
            }
        }

        let errors = errors.take();
        let stats = self.committer.index.stats();
        let duration = start.elapsed();

        if let Some(pb) = &progress {
            pb.finish_with_message("Complete");
        }

        metrics::FILES_SCANNED.inc_by(scanned as f64);
        metrics::SCAN_DURATION.observe(duration.as_secs_f64());
        self.update_gauges();

        info!(
            "Scan completed in {:.2}s: {} symbols in {} modules ({} files failed)",
            duration.as_secs_f64(),
            stats.symbols,
            stats.modules,
            errors.len()
        );

        self.set_status(IndexerStatus::Ready);

        Ok(ScanReport {
            files_scanned: scanned,
            files_failed: errors.len(),
            symbols_indexed: stats.symbols,
            errors,
            duration,
            cancelled: false,
        })
    }

    /// Re-index one file after it was created, changed or deleted.
    pub async fn scan_file(&self, path: &Path) -> Result<FileOutcome> {
        let _guard = self.scan_lock.lock().await;

        let Some(relative) = self.relativize(path) else {
            debug!("Ignoring {} outside the workspace", path.display());
            return Ok(FileOutcome::Skipped);
        };
        let absolute = self.root.join(&relative);

        let previous = self.status();
        self.set_status(IndexerStatus::Updating(relative.clone()));

        let outcome = if !absolute.is_file() || !self.walker.accepts(&relative) {
            FileOutcome::Removed(self.committer.index.remove_file(&relative))
        } else {
            let committer = self.committer.clone();
            let rel = relative.clone();
            let result = tokio::task::spawn_blocking(move || {
                let mut parser = ExportParser::new();
                match committer.commit(&mut parser, &absolute, &rel) {
                    Ok(count) => FileOutcome::Indexed(count),
                    Err(e) => {
                        committer.discard(&rel, &e);
                        FileOutcome::Failed(e.to_string())
                    }
                }
            })
            .await;

            match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.set_status(previous);
                    return Err(e).context("File update worker failed");
                }
            }
        };

        debug!("Updated {}: {:?}", relative.display(), outcome);
        self.update_gauges();
        self.set_status(if previous.is_ready() {
            IndexerStatus::Ready
        } else {
            previous
        });

        Ok(outcome)
    }

    /// Workspace-relative form of `path`, or None if it lies outside.
    pub(crate) fn relativize(&self, path: &Path) -> Option<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let absolute = paths::normalize(&absolute);

        if let Ok(relative) = absolute.strip_prefix(&self.root) {
            return Some(relative.to_path_buf());
        }

        // the caller may hold a non-canonical path to the same tree
        let canonical = match std::fs::canonicalize(&absolute) {
            Ok(canonical) => canonical,
            Err(_) => {
                let parent = std::fs::canonicalize(absolute.parent()?).ok()?;
                parent.join(absolute.file_name()?)
            }
        };
        canonical
            .strip_prefix(&self.root)
            .ok()
            .map(Path::to_path_buf)
    }

    fn update_gauges(&self) {
        let stats = self.committer.index.stats();
        metrics::INDEXED_SYMBOLS.set(stats.symbols as f64);
        metrics::INDEXED_MODULES.set(stats.modules as f64);
    }
}

/// Everything one blocking scan job owns.
struct ScanWorker {
    root: PathBuf,
    committer: FileCommitter,
    errors: ErrorCollector,
    progress: Option<ProgressBar>,
    generation: Arc<AtomicU64>,
}

impl ScanWorker {
    /// Parse and commit `files` on the current rayon pool.
    ///
    /// Returns the number of committed files and every relative path visited.
    fn run(&self, files: &[PathBuf], generation: u64) -> (usize, HashSet<PathBuf>) {
        let visited: Vec<(PathBuf, bool)> = files
            .par_iter()
            .map_init(ExportParser::new, |parser, absolute| {
                if self.generation.load(Ordering::SeqCst) != generation {
                    return None;
                }

                let relative = paths::relative_to(absolute, &self.root);
                let committed = match self.committer.commit(parser, absolute, &relative) {
                    Ok(_) => true,
                    Err(e) => {
                        self.committer.discard(&relative, &e);
                        self.errors.record(relative.clone(), &e, stage_of(&e));
                        false
                    }
                };

                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
                Some((relative, committed))
            })
            .flatten()
            .collect();

        let scanned = visited.iter().filter(|(_, ok)| *ok).count();
        (scanned, visited.into_iter().map(|(path, _)| path).collect())
    }
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] Files: [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => debug!("Falling back to default progress style: {}", e),
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
