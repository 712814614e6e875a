//! Package specifiers for files installed under `node_modules`.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Deserialize;
use tracing::debug;

use crate::paths;

#[derive(Debug, Deserialize)]
struct PackageManifest {
    name: Option<String>,
    types: Option<String>,
    typings: Option<String>,
    main: Option<String>,
}

#[derive(Debug, Clone)]
struct PackageInfo {
    name: String,
    /// Module key of the public entry file, relative to the package dir
    entry_key: String,
    /// Directory holding the entry file, relative to the package dir
    entry_dir: String,
}

impl PackageInfo {
    fn from_manifest(manifest: PackageManifest) -> Option<Self> {
        let name = manifest.name.filter(|n| !n.is_empty())?;
        let entry = manifest
            .types
            .or(manifest.typings)
            .or(manifest.main)
            .unwrap_or_else(|| "index".to_string());
        let entry = entry.trim_start_matches("./");

        let entry_dir = match entry.rfind('/') {
            Some(pos) => entry[..pos].to_string(),
            None => String::new(),
        };

        Some(Self {
            name,
            entry_key: paths::collapse_index(paths::strip_source_extension(entry)),
            entry_dir,
        })
    }

    /// Specifier for a file at `sub_path` inside this package.
    fn specifier(&self, sub_path: &str) -> String {
        let key = paths::collapse_index(paths::strip_source_extension(sub_path));
        if key == self.entry_key {
            return self.name.clone();
        }

        let rest = if self.entry_dir.is_empty() {
            key.as_str()
        } else {
            key.strip_prefix(&self.entry_dir)
                .and_then(|r| r.strip_prefix('/'))
                .unwrap_or(key.as_str())
        };
        let rest = paths::collapse_index(rest);
        if rest.is_empty() || rest == "index" {
            self.name.clone()
        } else {
            format!("{}/{}", self.name, rest)
        }
    }
}

/// Maps workspace files inside installed packages to package specifiers.
///
/// `package.json` manifests are read once per package directory and cached
/// until [`PackageResolver::clear_cache`].
pub struct PackageResolver {
    root: PathBuf,
    cache: Mutex<HashMap<PathBuf, Option<PackageInfo>>>,
}

impl PackageResolver {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Package specifier for a workspace-relative file, if it belongs to a
    /// package under `node_modules`.
    pub fn specifier_for(&self, relative: &Path) -> Option<String> {
        let components: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let boundary = components.iter().rposition(|c| c == "node_modules")?;
        let first = components.get(boundary + 1)?;
        let package_len = if first.starts_with('@') { 2 } else { 1 };
        let sub_start = boundary + 1 + package_len;
        if components.len() <= sub_start {
            return None;
        }

        let package_dir: PathBuf = components[..sub_start].iter().collect();
        let sub_path = components[sub_start..].join("/");

        let info = self.package_info(&package_dir)?;
        Some(info.specifier(&sub_path))
    }

    fn package_info(&self, package_dir: &Path) -> Option<PackageInfo> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.get(package_dir) {
            return cached.clone();
        }

        let manifest_path = self.root.join(package_dir).join("package.json");
        let info = std::fs::read_to_string(&manifest_path)
            .ok()
            .and_then(|content| match serde_json::from_str::<PackageManifest>(&content) {
                Ok(manifest) => PackageInfo::from_manifest(manifest),
                Err(e) => {
                    debug!("Ignoring unreadable manifest {:?}: {}", manifest_path, e);
                    None
                }
            });

        cache.insert(package_dir.to_path_buf(), info.clone());
        info
    }

    /// Forget cached manifests so edits to `package.json` are picked up.
    pub fn clear_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
