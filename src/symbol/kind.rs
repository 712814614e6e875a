//! Exported symbol records and their kind classification.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::paths;

/// Kind of an exported declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Class,
    Interface,
    Function,
    Variable,
    Unknown,
}

impl SymbolKind {
    /// Best-effort classification from a free-text declaration description.
    ///
    /// The description is usually a tree-sitter node kind such as
    /// `abstract_class_declaration` or `function_signature`; only keyword
    /// containment is checked.
    pub fn classify(description: &str) -> Self {
        let description = description.to_ascii_lowercase();
        if description.contains("class") {
            SymbolKind::Class
        } else if description.contains("interface") {
            SymbolKind::Interface
        } else if description.contains("function") {
            SymbolKind::Function
        } else if description.contains("variable") || description.contains("lexical") {
            SymbolKind::Variable
        } else {
            SymbolKind::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Function => "function",
            SymbolKind::Variable => "variable",
            SymbolKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named export discovered in a workspace file.
///
/// Identity is `(name, module_path)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Symbol {
    /// Exported name
    pub name: String,
    /// Declaration kind
    pub kind: SymbolKind,
    /// Workspace-relative path of the declaring file
    pub module_path: PathBuf,
    /// Package specifier, when the file belongs to an importable package
    pub module_specifier: Option<String>,
}

impl Symbol {
    /// Create a workspace symbol without a package specifier.
    pub fn new(name: impl Into<String>, kind: SymbolKind, module_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            module_path: module_path.into(),
            module_specifier: None,
        }
    }

    /// Attach a package specifier.
    pub fn with_specifier(mut self, specifier: impl Into<String>) -> Self {
        self.module_specifier = Some(specifier.into());
        self
    }

    /// Key of the module entry this symbol belongs to.
    pub fn module_key(&self) -> String {
        match &self.module_specifier {
            Some(specifier) => specifier.clone(),
            None => paths::module_key(&self.module_path),
        }
    }

    /// Whether this symbol was declared in `path`.
    pub fn is_declared_in(&self, path: &Path) -> bool {
        self.module_path == path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        assert_eq!(SymbolKind::classify("class_declaration"), SymbolKind::Class);
        assert_eq!(
            SymbolKind::classify("abstract_class_declaration"),
            SymbolKind::Class
        );
        assert_eq!(
            SymbolKind::classify("interface_declaration"),
            SymbolKind::Interface
        );
        assert_eq!(SymbolKind::classify("function_signature"), SymbolKind::Function);
        assert_eq!(SymbolKind::classify("lexical_declaration"), SymbolKind::Variable);
        assert_eq!(SymbolKind::classify("variable_declaration"), SymbolKind::Variable);
        assert_eq!(SymbolKind::classify("enum_declaration"), SymbolKind::Unknown);
        assert_eq!(SymbolKind::classify(""), SymbolKind::Unknown);
    }

    #[test]
    fn test_module_key_prefers_specifier() {
        let local = Symbol::new("Foo", SymbolKind::Class, "src/foo/index.ts");
        assert_eq!(local.module_key(), "src/foo");

        let package = Symbol::new("Bar", SymbolKind::Function, "node_modules/bar/index.d.ts")
            .with_specifier("bar");
        assert_eq!(package.module_key(), "bar");
    }
}
