//! Completion items and cursor context detection.

use std::ops::Range;

use serde::Serialize;

use crate::symbol::{Symbol, SymbolKind};

/// Icon-level category shown next to a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionCategory {
    Class,
    Interface,
    Variable,
    File,
}

impl From<SymbolKind> for CompletionCategory {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Class => CompletionCategory::Class,
            SymbolKind::Interface => CompletionCategory::Interface,
            SymbolKind::Function | SymbolKind::Variable => CompletionCategory::Variable,
            SymbolKind::Unknown => CompletionCategory::File,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub category: CompletionCategory,
    /// Where the item comes from: a package specifier or a workspace path
    pub detail: String,
    /// Backing symbol; None for module completions
    pub symbol: Option<Symbol>,
}

impl CompletionItem {
    pub fn for_symbol(symbol: Symbol) -> Self {
        let detail = symbol
            .module_specifier
            .clone()
            .unwrap_or_else(|| symbol.module_path.display().to_string());
        Self {
            label: symbol.name.clone(),
            category: symbol.kind.into(),
            detail,
            symbol: Some(symbol),
        }
    }

    pub fn for_module(specifier: String) -> Self {
        Self {
            label: specifier.clone(),
            category: CompletionCategory::File,
            detail: specifier,
            symbol: None,
        }
    }
}

/// What the text around a cursor asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// Inside the quotes of an `import ... from "..."` line
    Module {
        query: String,
        /// Character range the chosen specifier replaces
        replace: Range<usize>,
    },
    /// The identifier under the cursor
    Symbol { prefix: String },
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Classify the cursor at character `column` of `line`.
///
/// On a line mentioning both `import` and `from`, the text between the
/// nearest opening quote and the cursor is a module query. Elsewhere the
/// word around the cursor is a symbol prefix. Returns None when there is
/// nothing to complete.
pub fn completion_context(line: &str, column: usize) -> Option<CompletionContext> {
    let chars: Vec<char> = line.chars().collect();
    let end = column.min(chars.len());

    if line.contains("import") && line.contains("from") {
        if end == 0 {
            return None;
        }
        let mut start = end - 1;
        while start > 0 && chars[start] != '"' && chars[start] != '\'' {
            start -= 1;
        }
        if start == 0 {
            return None;
        }
        return Some(CompletionContext::Module {
            query: chars[start + 1..end].iter().collect(),
            replace: start + 1..end,
        });
    }

    let mut word_start = end;
    while word_start > 0 && is_word_char(chars[word_start - 1]) {
        word_start -= 1;
    }
    let mut word_end = end;
    while word_end < chars.len() && is_word_char(chars[word_end]) {
        word_end += 1;
    }

    if word_start == word_end {
        return None;
    }
    Some(CompletionContext::Symbol {
        prefix: chars[word_start..word_end].iter().collect(),
    })
}
