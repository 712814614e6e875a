use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::paths;

use super::errors::{ErrorCollector, ScanStage};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Include/exclude glob filter over workspace-relative paths
#[derive(Debug, Clone)]
pub struct FileMatcher {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    /// Directory prefixes of `.../**` excludes, used to prune the walk
    excluded_dirs: Vec<Pattern>,
}

impl FileMatcher {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let compile = |patterns: &[String]| -> Result<Vec<Pattern>> {
            patterns
                .iter()
                .map(|p| Pattern::new(p).with_context(|| format!("Invalid glob pattern '{}'", p)))
                .collect()
        };

        let excluded_dirs = config
            .exclude
            .iter()
            .filter_map(|p| p.strip_suffix("/**"))
            .filter_map(|p| Pattern::new(p).ok())
            .collect();

        Ok(Self {
            include: compile(&config.include)?,
            exclude: compile(&config.exclude)?,
            excluded_dirs,
        })
    }

    /// True if a workspace-relative file path should be indexed.
    pub fn matches(&self, relative: &Path) -> bool {
        let path = paths::to_slash(relative);
        self.include.iter().any(|p| p.matches_with(&path, MATCH_OPTIONS))
            && !self.exclude.iter().any(|p| p.matches_with(&path, MATCH_OPTIONS))
    }

    /// True if a workspace-relative directory can be skipped entirely.
    pub fn prunes_dir(&self, relative: &Path) -> bool {
        let path = paths::to_slash(relative);
        self.excluded_dirs
            .iter()
            .any(|p| p.matches_with(&path, MATCH_OPTIONS))
    }
}

/// Walks the workspace, applying .gitignore rules and the configured globs
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    matcher: FileMatcher,
    respect_gitignore: bool,
}

impl Walker {
    /// Create a new Walker with the given root directory and configuration
    pub fn new(root: PathBuf, config: &ScanConfig) -> Result<Self> {
        Ok(Self {
            root,
            matcher: FileMatcher::new(config)?,
            respect_gitignore: config.respect_gitignore,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn matcher(&self) -> &FileMatcher {
        &self.matcher
    }

    /// Walk the directory tree and return an iterator of absolute file paths
    ///
    /// Entries the walk cannot read are recorded in `errors` and skipped.
    pub fn walk(&self, errors: ErrorCollector) -> impl Iterator<Item = PathBuf> + '_ {
        let mut builder = WalkBuilder::new(&self.root);

        builder.git_ignore(self.respect_gitignore);
        builder.git_global(self.respect_gitignore);
        builder.git_exclude(self.respect_gitignore);
        builder.require_git(false);
        builder.hidden(true);

        let root = self.root.clone();
        let matcher = self.matcher.clone();
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            if !is_dir || entry.depth() == 0 {
                return true;
            }
            let relative = paths::relative_to(entry.path(), &root);
            !matcher.prunes_dir(&relative)
        });

        builder
            .build()
            .filter_map(move |entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    self.record_walk_error(&errors, &e);
                    None
                }
            })
            .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .filter(move |entry| {
                let relative = paths::relative_to(entry.path(), &self.root);
                self.matcher.matches(&relative)
            })
            .map(|entry| entry.into_path())
    }

    /// Collect all walkable files into a sorted Vec
    pub fn collect_files(&self, errors: &ErrorCollector) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.walk(errors.clone()).collect();
        files.sort();
        files
    }

    fn record_walk_error(&self, errors: &ErrorCollector, error: &ignore::Error) {
        warn!("Walk error: {}", error);
        let path = error_path(error)
            .map(|p| paths::relative_to(p, &self.root))
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."));
        errors.record(path, error, ScanStage::Walk);
    }

    /// True if a full walk would yield this workspace-relative file.
    ///
    /// Applies the globs, hidden-entry skipping and the same ignore files
    /// the walk reads, so single-file updates agree with full scans.
    pub fn accepts(&self, relative: &Path) -> bool {
        self.matcher.matches(relative) && !is_hidden(relative) && !self.is_ignored(relative)
    }

    fn is_ignored(&self, relative: &Path) -> bool {
        let absolute = self.root.join(relative);

        let mut dirs = vec![self.root.clone()];
        if let Some(parent) = relative.parent() {
            let mut dir = self.root.clone();
            for component in parent.components() {
                dir.push(component);
                dirs.push(dir.clone());
            }
        }

        // the innermost ignore file with a matching rule decides
        for dir in dirs.iter().rev() {
            let Some(rules) = self.ignore_rules(dir, dir == &self.root) else {
                continue;
            };
            let matched = rules.matched_path_or_any_parents(&absolute, false);
            if matched.is_ignore() {
                return true;
            }
            if matched.is_whitelist() {
                return false;
            }
        }
        false
    }

    /// Rules of the ignore files in `dir`, lowest precedence first.
    fn ignore_rules(&self, dir: &Path, is_root: bool) -> Option<Gitignore> {
        let mut candidates = Vec::new();
        if self.respect_gitignore {
            if is_root {
                candidates.push(dir.join(".git").join("info").join("exclude"));
            }
            candidates.push(dir.join(".gitignore"));
        }
        candidates.push(dir.join(".ignore"));

        let mut builder = GitignoreBuilder::new(dir);
        let mut found = false;
        for file in candidates.into_iter().filter(|f| f.is_file()) {
            if let Some(e) = builder.add(&file) {
                debug!("Skipping unreadable ignore file {:?}: {}", file, e);
                continue;
            }
            found = true;
        }
        if !found {
            return None;
        }

        match builder.build() {
            Ok(rules) => Some(rules),
            Err(e) => {
                debug!("Invalid ignore rules in {:?}: {}", dir, e);
                None
            }
        }
    }
}

fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

fn error_path(error: &ignore::Error) -> Option<&Path> {
    match error {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Partial(errors) => errors.iter().find_map(error_path),
        _ => None,
    }
}
