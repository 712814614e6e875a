//! Turns "import symbol X into document D" into a text edit.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::StyleConfig;
use crate::symbol::Symbol;

use super::edit::{ImportEdit, ImportEditKind, TextEdit};
use super::imports::{blank_comments, scan_imports, ImportDeclaration};
use super::specifier::relative_specifier;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("`{name}` is declared in {}; a file cannot import itself", path.display())]
    SelfImport { name: String, path: PathBuf },

    #[error("`{name}` is already bound by an import from \"{existing_module}\"")]
    AmbiguousBinding {
        name: String,
        existing_module: String,
    },

    #[error("cannot compute a module specifier for `{name}` in {}", module_path.display())]
    Unresolved { name: String, module_path: PathBuf },
}

/// One binding inside an import's braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportBinding {
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {}", self.name, alias),
            None => self.name.clone(),
        }
    }
}

/// Resolves module specifiers and produces import edits in the configured
/// style.
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    style: StyleConfig,
}

impl ImportResolver {
    pub fn new(style: StyleConfig) -> Self {
        Self { style }
    }

    /// Specifier to import `symbol` from, as seen from `document`.
    ///
    /// `document` must be relative to the same root as the symbol's
    /// module path.
    pub fn resolve_module(&self, document: &Path, symbol: &Symbol) -> Result<String, ImportError> {
        if symbol.is_declared_in(document) {
            return Err(ImportError::SelfImport {
                name: symbol.name.clone(),
                path: document.to_path_buf(),
            });
        }

        if let Some(specifier) = &symbol.module_specifier {
            return Ok(specifier.clone());
        }

        relative_specifier(document, &symbol.module_path).ok_or_else(|| ImportError::Unresolved {
            name: symbol.name.clone(),
            module_path: symbol.module_path.clone(),
        })
    }

    pub fn create_import_definition(&self, name: &str) -> ImportBinding {
        ImportBinding {
            name: name.to_string(),
            alias: None,
        }
    }

    /// Render `import { A, B } from "specifier";` in the configured style.
    pub fn create_import_statement(&self, bindings: &[ImportBinding], specifier: &str) -> String {
        let quote = self.style.quote.as_char();
        let names = bindings
            .iter()
            .map(ImportBinding::render)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "import {{ {} }} from {}{}{}{}",
            names,
            quote,
            specifier,
            quote,
            if self.style.semicolons { ";" } else { "" }
        )
    }

    /// Compute the edit that imports `symbol` into `document`, whose current
    /// contents are `text`.
    ///
    /// Merges into an existing declaration of the same module when one
    /// exists, otherwise inserts a new statement after the last import (or
    /// after the file's header comments).
    pub fn import_symbol(
        &self,
        document: &Path,
        text: &str,
        symbol: &Symbol,
    ) -> Result<ImportEdit, ImportError> {
        let specifier = self.resolve_module(document, symbol)?;
        let binding = self.create_import_definition(&symbol.name);
        let declarations = scan_imports(text);

        for decl in &declarations {
            if !decl.local_names().any(|n| n == binding.local_name()) {
                continue;
            }
            let same_binding = decl.specifier == specifier
                && decl
                    .named
                    .iter()
                    .any(|n| n.name == binding.name && n.local_name() == binding.local_name());
            if same_binding {
                debug!("`{}` already imported from {}", binding.name, specifier);
                return Ok(ImportEdit {
                    kind: ImportEditKind::AlreadyImported,
                    specifier,
                    edit: TextEdit::insert(text, decl.span.end, ""),
                });
            }
            return Err(ImportError::AmbiguousBinding {
                name: binding.local_name().to_string(),
                existing_module: decl.specifier.clone(),
            });
        }

        let same_module = declarations
            .iter()
            .filter(|d| d.specifier == specifier && !d.type_only);

        let mut default_only = None;
        for decl in same_module {
            if let Some(named_span) = &decl.named_span {
                return Ok(ImportEdit {
                    kind: ImportEditKind::Merged,
                    specifier,
                    edit: merge_into_named(text, named_span.clone(), &binding.render()),
                });
            }
            if decl.namespace.is_none() && default_only.is_none() {
                default_only = decl.default_end;
            }
        }

        if let Some(default_end) = default_only {
            return Ok(ImportEdit {
                kind: ImportEditKind::Merged,
                specifier,
                edit: TextEdit::insert(text, default_end, format!(", {{ {} }}", binding.render())),
            });
        }

        let statement = self.create_import_statement(std::slice::from_ref(&binding), &specifier);
        Ok(ImportEdit {
            kind: ImportEditKind::Inserted,
            edit: insert_statement(text, &declarations, &statement),
            specifier,
        })
    }
}

/// Append `rendered` after the last binding of a brace list, keeping
/// existing text and comments.
fn merge_into_named(text: &str, named_span: std::ops::Range<usize>, rendered: &str) -> TextEdit {
    let content = blank_comments(&text[named_span.clone()]);
    let trimmed = content.trim_end();
    let at = named_span.start + trimmed.len();

    if trimmed.trim_start().is_empty() {
        TextEdit::replace(text, named_span.start, named_span.end, format!(" {} ", rendered))
    } else if trimmed.ends_with(',') {
        TextEdit::insert(text, at, format!(" {},", rendered))
    } else {
        TextEdit::insert(text, at, format!(", {}", rendered))
    }
}

fn insert_statement(text: &str, declarations: &[ImportDeclaration], statement: &str) -> TextEdit {
    if let Some(last) = declarations.last() {
        return TextEdit::insert(text, last.span.end, format!("\n{}", statement));
    }

    let at = header_end(text);
    let (before, rest) = text.split_at(at);
    let lead = if before.is_empty() || before.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    let new_text = if rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n") {
        format!("{}{}\n", lead, statement)
    } else {
        format!("{}{}\n\n", lead, statement)
    };
    TextEdit::insert(text, at, new_text)
}

/// Byte offset just past a leading shebang and file header comments.
///
/// A comment only belongs to the header when a blank line or the end of
/// the file follows it; a comment directly above code documents that code.
fn header_end(text: &str) -> usize {
    let mut header = 0;
    let mut offset = 0;
    let mut in_block = false;
    let mut reached_end = true;

    for (index, line) in text.split_inclusive('\n').enumerate() {
        let trimmed = line.trim();
        if in_block {
            in_block = !trimmed.contains("*/");
        } else if index == 0 && trimmed.starts_with("#!") {
            header = offset + line.len();
        } else if trimmed.starts_with("/*") {
            in_block = !trimmed.contains("*/");
        } else if trimmed.is_empty() && offset > 0 {
            header = offset + line.len();
        } else if !trimmed.starts_with("//") {
            reached_end = false;
            break;
        }
        offset += line.len();
    }

    if reached_end {
        offset
    } else {
        header
    }
}
