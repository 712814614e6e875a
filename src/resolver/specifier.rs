//! Relative module specifiers between two workspace files.

use std::path::{Component, Path};

use crate::paths;

/// Specifier that imports `module_path` from a file at `document`.
///
/// Both paths must be relative to the same root, or both absolute. The
/// result always starts with `./` or `../` (or is `.`/`..`), has its source
/// extension stripped and a trailing `/index` collapsed. Returns None when
/// the two paths cannot be related.
pub fn relative_specifier(document: &Path, module_path: &Path) -> Option<String> {
    if document.is_absolute() != module_path.is_absolute() {
        return None;
    }

    let target = paths::normalize(module_path);
    let file_name = target.file_name()?.to_str()?;
    if !paths::has_file_stem(file_name) {
        return None;
    }

    let document = paths::normalize(document);
    let from_dir = document.parent().unwrap_or_else(|| Path::new(""));

    let from: Vec<Component> = from_dir.components().collect();
    let to: Vec<Component> = target.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for component in &from[common..] {
        match component {
            Component::Normal(_) => parts.push("..".to_string()),
            // cannot walk back out of a `..` or a different root
            _ => return None,
        }
    }
    for component in &to[common..] {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            Component::ParentDir => parts.push("..".to_string()),
            _ => return None,
        }
    }

    let joined = parts.join("/");
    let stripped = paths::strip_source_extension(&joined);
    let prefixed = if stripped.starts_with("../") {
        stripped.to_string()
    } else {
        format!("./{}", stripped)
    };

    Some(paths::collapse_index(&prefixed))
}
