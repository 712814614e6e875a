//! In-memory symbol index for fast lookups

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use super::kind::{Symbol, SymbolKind};

/// Query matching discipline shared by symbol and module lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Case-sensitive equality
    Exact,
    /// Case-insensitive containment (or prefix, with `prefix_only`)
    #[default]
    Any,
}

impl MatchMode {
    /// Test a candidate. `query_lower` must be `query.to_lowercase()`.
    fn matches(self, candidate: &str, query: &str, query_lower: &str, prefix_only: bool) -> bool {
        match self {
            MatchMode::Exact => candidate == query,
            MatchMode::Any => {
                let candidate = candidate.to_lowercase();
                if prefix_only {
                    candidate.starts_with(query_lower)
                } else {
                    candidate.contains(query_lower)
                }
            }
        }
    }
}

/// All symbols reachable through one module specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleEntry {
    pub specifier: String,
    /// Ordered by name, then module path
    pub symbols: Vec<Symbol>,
}

/// Counts reported after scans and by the `stats` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub symbols: usize,
    pub modules: usize,
    pub files: usize,
}

/// Set view of the index, used to compare two scans of the same tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSnapshot {
    pub symbols: BTreeSet<(String, PathBuf, SymbolKind, Option<String>)>,
    pub modules: BTreeSet<String>,
}

#[derive(Default)]
struct IndexData {
    by_name: HashMap<String, Vec<Symbol>>,
    by_module: BTreeMap<String, ModuleEntry>,
    by_file: HashMap<PathBuf, Vec<Symbol>>,
    symbol_count: usize,
}

impl IndexData {
    fn remove_file(&mut self, path: &Path) -> usize {
        let Some(symbols) = self.by_file.remove(path) else {
            return 0;
        };

        for symbol in &symbols {
            if let Some(refs) = self.by_name.get_mut(&symbol.name) {
                refs.retain(|s| !s.is_declared_in(path));
                if refs.is_empty() {
                    self.by_name.remove(&symbol.name);
                }
            }

            let key = symbol.module_key();
            if let Some(entry) = self.by_module.get_mut(&key) {
                entry.symbols.retain(|s| !s.is_declared_in(path));
                if entry.symbols.is_empty() {
                    self.by_module.remove(&key);
                }
            }
        }

        self.symbol_count -= symbols.len();
        symbols.len()
    }

    fn insert(&mut self, symbol: Symbol) {
        self.by_name
            .entry(symbol.name.clone())
            .or_default()
            .push(symbol.clone());

        let key = symbol.module_key();
        let entry = self
            .by_module
            .entry(key.clone())
            .or_insert_with(|| ModuleEntry {
                specifier: key,
                symbols: Vec::new(),
            });
        let position = entry
            .symbols
            .partition_point(|s| (&s.name, &s.module_path) < (&symbol.name, &symbol.module_path));
        entry.symbols.insert(position, symbol.clone());

        self.by_file
            .entry(symbol.module_path.clone())
            .or_default()
            .push(symbol);

        self.symbol_count += 1;
    }

    fn clear(&mut self) {
        self.by_name.clear();
        self.by_module.clear();
        self.by_file.clear();
        self.symbol_count = 0;
    }
}

/// Name and module index over every exported symbol in the workspace.
///
/// Mutations take the write lock for the in-memory swap only, so a reader
/// sees either all or none of a file's replacement.
#[derive(Default)]
pub struct SymbolIndex {
    data: RwLock<IndexData>,
}

impl SymbolIndex {
    /// Create a new empty symbol index
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop every symbol and module.
    pub fn reset_index(&self) {
        self.write().clear();
        info!("Symbol index cleared");
    }

    /// Replace everything previously attributed to `path` with `symbols`.
    ///
    /// Symbols are re-attributed to `path`; repeated names (overloads) keep
    /// the first declaration. Returns the number of symbols inserted.
    pub fn replace_file(&self, path: &Path, symbols: Vec<Symbol>) -> usize {
        let mut seen = HashSet::new();
        let symbols: Vec<Symbol> = symbols
            .into_iter()
            .filter(|s| seen.insert(s.name.clone()))
            .map(|mut s| {
                s.module_path = path.to_path_buf();
                s
            })
            .collect();
        let inserted = symbols.len();

        let removed = {
            let mut data = self.write();
            let removed = data.remove_file(path);
            for symbol in symbols {
                data.insert(symbol);
            }
            removed
        };

        debug!(
            "Replaced {:?}: {} symbols removed, {} inserted",
            path, removed, inserted
        );
        inserted
    }

    /// Remove every symbol declared in `path`.
    pub fn remove_file(&self, path: &Path) -> usize {
        let removed = self.write().remove_file(path);
        debug!("Removed {:?}: {} symbols", path, removed);
        removed
    }

    /// Find symbols by name.
    ///
    /// Exact name matches come first, then the rest ordered by name and
    /// module path.
    pub fn get_symbols(&self, query: &str, prefix_only: bool, mode: MatchMode) -> Vec<Symbol> {
        let mut results: Vec<Symbol> = {
            let data = self.read();
            match mode {
                MatchMode::Exact => data.by_name.get(query).cloned().unwrap_or_default(),
                MatchMode::Any => {
                    let query_lower = query.to_lowercase();
                    data.by_name
                        .iter()
                        .filter(|(name, _)| mode.matches(name, query, &query_lower, prefix_only))
                        .flat_map(|(_, refs)| refs.iter().cloned())
                        .collect()
                }
            }
        };

        results.sort_by(|a, b| {
            (a.name != query, &a.name, &a.module_path).cmp(&(
                b.name != query,
                &b.name,
                &b.module_path,
            ))
        });
        results
    }

    /// Find module specifiers, exact match first, then lexicographic.
    pub fn get_modules(&self, query: &str, prefix_only: bool, mode: MatchMode) -> Vec<String> {
        let query_lower = query.to_lowercase();
        let mut results: Vec<String> = self
            .read()
            .by_module
            .keys()
            .filter(|specifier| mode.matches(specifier, query, &query_lower, prefix_only))
            .cloned()
            .collect();

        // keys come out sorted; a stable sort only lifts the exact match
        results.sort_by_key(|specifier| specifier != query);
        results
    }

    /// Look up the module entry for a specifier.
    pub fn get_module(&self, specifier: &str) -> Option<ModuleEntry> {
        self.read().by_module.get(specifier).cloned()
    }

    /// Get all symbols attributed to a file
    pub fn symbols_in_file(&self, path: &Path) -> Vec<Symbol> {
        self.read().by_file.get(path).cloned().unwrap_or_default()
    }

    /// List all files with symbols
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.read().by_file.keys().cloned().collect();
        files.sort();
        files
    }

    pub fn stats(&self) -> IndexStats {
        let data = self.read();
        IndexStats {
            symbols: data.symbol_count,
            modules: data.by_module.len(),
            files: data.by_file.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read().symbol_count == 0
    }

    /// Capture the symbol and module sets.
    pub fn snapshot(&self) -> IndexSnapshot {
        let data = self.read();
        IndexSnapshot {
            symbols: data
                .by_name
                .values()
                .flatten()
                .map(|s| {
                    (
                        s.name.clone(),
                        s.module_path.clone(),
                        s.kind,
                        s.module_specifier.clone(),
                    )
                })
                .collect(),
            modules: data.by_module.keys().cloned().collect(),
        }
    }

    /// Check that the name mapping and the module mapping hold the same
    /// symbols, each exactly once.
    pub fn is_consistent(&self) -> bool {
        let data = self.read();

        let mut by_name: Vec<(&str, &Path)> = data
            .by_name
            .values()
            .flatten()
            .map(|s| (s.name.as_str(), s.module_path.as_path()))
            .collect();
        let mut by_module: Vec<(&str, &Path)> = data
            .by_module
            .iter()
            .flat_map(|(key, entry)| {
                entry
                    .symbols
                    .iter()
                    .filter(move |s| &s.module_key() == key)
            })
            .map(|s| (s.name.as_str(), s.module_path.as_path()))
            .collect();

        let module_total: usize = data.by_module.values().map(|e| e.symbols.len()).sum();

        by_name.sort();
        by_module.sort();
        by_name == by_module && module_total == data.symbol_count && by_name.len() == data.symbol_count
    }
}
