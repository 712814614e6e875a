//! The importer façade hosts talk to.
//!
//! One [`ImportEngine`] serves one workspace root: it owns the symbol index,
//! the indexer that fills it and the resolver that turns symbols into
//! import edits.

pub mod completion;
pub mod diagnostics;
pub mod notifier;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::Config;
use crate::indexer::{FileOutcome, IndexerStatus, ScanReport, WorkspaceIndexer};
use crate::metrics;
use crate::resolver::{ImportEdit, ImportError, ImportResolver};
use crate::symbol::{MatchMode, Symbol, SymbolIndex};

pub use completion::{completion_context, CompletionCategory, CompletionContext, CompletionItem};
pub use notifier::{NotificationKind, Notifier, TracingNotifier};

/// Completion queries over the index.
pub trait CompletionSource {
    fn query_symbols(&self, query: &str, prefix_only: bool, mode: MatchMode) -> Vec<CompletionItem>;

    fn query_modules(&self, query: &str, prefix_only: bool, mode: MatchMode) -> Vec<CompletionItem>;

    /// Completions for the cursor at character `column` of `line`.
    fn complete_at(&self, line: &str, column: usize) -> Vec<CompletionItem> {
        match completion_context(line, column) {
            Some(CompletionContext::Module { query, .. }) => {
                self.query_modules(&query, true, MatchMode::Any)
            }
            Some(CompletionContext::Symbol { prefix }) => {
                self.query_symbols(&prefix, true, MatchMode::Any)
            }
            None => Vec::new(),
        }
    }
}

/// An import action offered for an unresolved identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickFix {
    /// The import statement the action would add
    pub title: String,
    pub symbol: Symbol,
}

/// Import suggestions for compiler diagnostics.
pub trait QuickFixSource {
    fn suggest_imports_for_diagnostic(&self, document_path: &Path, message: &str) -> Vec<QuickFix>;
}

pub struct ImportEngine {
    config: Config,
    index: Arc<SymbolIndex>,
    indexer: WorkspaceIndexer,
    resolver: ImportResolver,
    notifier: Arc<dyn Notifier>,
}

impl ImportEngine {
    pub fn new(root: &Path, config: Config) -> Result<Self> {
        Self::with_notifier(root, config, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(root: &Path, config: Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let index = Arc::new(SymbolIndex::new());
        let indexer = WorkspaceIndexer::new(root, &config.scan, index.clone())?;
        if !config.importer.enabled {
            indexer.set_status(IndexerStatus::Disabled);
        }

        Ok(Self {
            resolver: ImportResolver::new(config.style.clone()),
            config,
            index,
            indexer,
            notifier,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.importer.enabled
    }

    /// Canonical workspace root
    pub fn root(&self) -> &Path {
        self.indexer.root()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &Arc<SymbolIndex> {
        &self.index
    }

    pub fn indexer(&self) -> &WorkspaceIndexer {
        &self.indexer
    }

    pub fn resolver(&self) -> &ImportResolver {
        &self.resolver
    }

    pub fn status(&self) -> IndexerStatus {
        self.indexer.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<IndexerStatus> {
        self.indexer.subscribe()
    }

    fn notify(&self, kind: NotificationKind, message: &str) {
        if kind.allowed_by(self.config.importer.notifications) {
            self.notifier.notify(kind, message);
        }
    }

    /// Clear the index and rebuild it from the workspace.
    ///
    /// The summary is only announced when `show_output` is set; failures
    /// are announced either way.
    pub async fn reindex(&self, show_output: bool) -> Result<ScanReport> {
        if !self.is_enabled() {
            debug!("Importer disabled, skipping reindex");
            return Ok(ScanReport::default());
        }

        match self.indexer.rebuild(show_output).await {
            Ok(report) => {
                if report.cancelled {
                    return Ok(report);
                }
                if report.has_errors() {
                    self.notify(
                        NotificationKind::Error,
                        &format!("{} files could not be indexed", report.files_failed),
                    );
                }
                if show_output {
                    self.notify(NotificationKind::Info, &report.summary());
                }
                Ok(report)
            }
            Err(e) => {
                self.notify(NotificationKind::Error, &format!("Indexing failed: {:#}", e));
                Err(e)
            }
        }
    }

    /// Re-index a single created, changed or deleted file.
    pub async fn scan_file(&self, path: &Path) -> Result<FileOutcome> {
        if !self.is_enabled() {
            return Ok(FileOutcome::Skipped);
        }
        self.indexer.scan_file(path).await
    }

    /// Workspace-relative form of a document path, when it lies inside.
    fn document_path(&self, path: &Path) -> PathBuf {
        self.indexer
            .relativize(path)
            .unwrap_or_else(|| path.to_path_buf())
    }

    /// Compute the edit importing `symbol` into the document at
    /// `document_path` whose current contents are `text`.
    pub fn import_symbol(
        &self,
        document_path: &Path,
        text: &str,
        symbol: &Symbol,
    ) -> Result<ImportEdit, ImportError> {
        let document = self.document_path(document_path);
        match self.resolver.import_symbol(&document, text, symbol) {
            Ok(edit) => {
                if !edit.is_noop() {
                    metrics::IMPORT_EDITS.inc();
                }
                Ok(edit)
            }
            Err(e) => {
                if matches!(e, ImportError::Unresolved { .. }) {
                    warn!("{}", e);
                }
                Err(e)
            }
        }
    }
}

impl CompletionSource for ImportEngine {
    fn query_symbols(&self, query: &str, prefix_only: bool, mode: MatchMode) -> Vec<CompletionItem> {
        if !self.is_enabled() {
            return Vec::new();
        }
        metrics::QUERY_REQUESTS.inc();
        self.index
            .get_symbols(query, prefix_only, mode)
            .into_iter()
            .map(CompletionItem::for_symbol)
            .collect()
    }

    fn query_modules(&self, query: &str, prefix_only: bool, mode: MatchMode) -> Vec<CompletionItem> {
        if !self.is_enabled() {
            return Vec::new();
        }
        metrics::QUERY_REQUESTS.inc();
        self.index
            .get_modules(query, prefix_only, mode)
            .into_iter()
            .map(CompletionItem::for_module)
            .collect()
    }
}

impl QuickFixSource for ImportEngine {
    fn suggest_imports_for_diagnostic(&self, document_path: &Path, message: &str) -> Vec<QuickFix> {
        if !self.is_enabled() {
            return Vec::new();
        }
        let Some(name) = diagnostics::missing_name(message) else {
            return Vec::new();
        };
        metrics::QUERY_REQUESTS.inc();

        let document = self.document_path(document_path);
        let binding = self.resolver.create_import_definition(name);

        self.index
            .get_symbols(name, false, MatchMode::Exact)
            .into_iter()
            .filter_map(|symbol| match self.resolver.resolve_module(&document, &symbol) {
                Ok(specifier) => Some(QuickFix {
                    title: self
                        .resolver
                        .create_import_statement(std::slice::from_ref(&binding), &specifier),
                    symbol,
                }),
                Err(ImportError::Unresolved { .. }) => {
                    warn!(
                        "No import path from {} to {}",
                        document.display(),
                        symbol.module_path.display()
                    );
                    None
                }
                Err(_) => None,
            })
            .collect()
    }
}
