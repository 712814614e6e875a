//! Path helpers shared by the index and the resolver.
//!
//! Module paths are stored workspace-relative. These helpers turn them into
//! the slash-separated, extension-less strings used as module keys and
//! import specifiers.

use std::path::{Component, Path, PathBuf};

/// Source extensions stripped from specifiers, longest first so that
/// `.d.ts` wins over `.ts`.
const SOURCE_EXTENSIONS: &[&str] = &[
    ".d.mts", ".d.cts", ".d.ts", ".tsx", ".mts", ".cts", ".ts", ".jsx", ".mjs", ".cjs", ".js",
];

/// Join path components with forward slashes regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir => None,
            Component::RootDir | Component::Prefix(_) => Some(String::new()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Strip a known source extension, if any.
pub fn strip_source_extension(path: &str) -> &str {
    for ext in SOURCE_EXTENSIONS {
        if let Some(stripped) = path.strip_suffix(ext) {
            if !stripped.is_empty() && !stripped.ends_with('/') {
                return stripped;
            }
        }
    }
    path
}

/// False for names that are nothing but a source extension, like `.ts`.
pub fn has_file_stem(file_name: &str) -> bool {
    !file_name.is_empty() && !SOURCE_EXTENSIONS.contains(&file_name)
}

/// Collapse a trailing `index` segment.
///
/// `./foo/index` becomes `./foo`, `./index` becomes `.`, `../index` becomes
/// `..`. A bare `index` is left alone since it has no parent to collapse to.
pub fn collapse_index(specifier: &str) -> String {
    if specifier == "index" {
        return specifier.to_string();
    }
    match specifier.strip_suffix("/index") {
        Some(parent) if !parent.is_empty() => parent.to_string(),
        _ => specifier.to_string(),
    }
}

/// Module key of a workspace file: slash path, no extension, no `/index`.
pub fn module_key(module_path: &Path) -> String {
    let slashed = to_slash(module_path);
    collapse_index(strip_source_extension(&slashed))
}

/// Lexically normalize `.` and `..` components without touching the disk.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    _ => false,
                };
                if !popped {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Make `path` relative to `root` when it lies underneath it.
pub fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_source_extension() {
        assert_eq!(strip_source_extension("src/a.ts"), "src/a");
        assert_eq!(strip_source_extension("src/a.tsx"), "src/a");
        assert_eq!(strip_source_extension("types/a.d.ts"), "types/a");
        assert_eq!(strip_source_extension("src/a.css"), "src/a.css");
        assert_eq!(strip_source_extension(".ts"), ".ts");
    }

    #[test]
    fn test_collapse_index() {
        assert_eq!(collapse_index("./foo/index"), "./foo");
        assert_eq!(collapse_index("./index"), ".");
        assert_eq!(collapse_index("../index"), "..");
        assert_eq!(collapse_index("index"), "index");
        assert_eq!(collapse_index("./reindex"), "./reindex");
    }

    #[test]
    fn test_module_key() {
        assert_eq!(module_key(Path::new("src/util/strings.ts")), "src/util/strings");
        assert_eq!(module_key(Path::new("src/util/index.ts")), "src/util");
        assert_eq!(module_key(Path::new("index.ts")), "index");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn test_has_file_stem() {
        assert!(has_file_stem("a.ts"));
        assert!(!has_file_stem(".ts"));
        assert!(!has_file_stem(".d.ts"));
    }
}
