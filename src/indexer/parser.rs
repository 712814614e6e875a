//! Export discovery over the tree-sitter TypeScript grammar.
//!
//! Only top-level `export` statements are inspected, plus the bodies of
//! ambient `declare module "name" { ... }` blocks, whose declarations are
//! importable under the quoted module name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::symbol::SymbolKind;

/// Failure to turn one file into export declarations.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in {path} at line {line}")]
    Syntax { path: PathBuf, line: usize },

    #[error("parser produced no tree for {path}")]
    NoTree { path: PathBuf },

    #[error("failed to load {dialect} grammar: {message}")]
    Language {
        dialect: &'static str,
        message: String,
    },
}

/// Grammar variant, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsx") | Some("jsx") => Dialect::Tsx,
            _ => Dialect::TypeScript,
        }
    }

    fn language(self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Dialect::TypeScript => "typescript",
            Dialect::Tsx => "tsx",
        }
    }
}

/// One exported name found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDeclaration {
    pub name: String,
    pub kind: SymbolKind,
    /// Quoted name of the enclosing `declare module`, if any
    pub ambient_module: Option<String>,
}

/// Reusable parser; holds one tree-sitter parser per dialect.
///
/// Not `Sync`; scans keep one instance per worker thread.
#[derive(Default)]
pub struct ExportParser {
    parsers: HashMap<Dialect, Parser>,
}

impl ExportParser {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_parser(&mut self, dialect: Dialect) -> Result<&mut Parser, ParseError> {
        if !self.parsers.contains_key(&dialect) {
            let mut parser = Parser::new();
            parser
                .set_language(&dialect.language())
                .map_err(|e| ParseError::Language {
                    dialect: dialect.name(),
                    message: e.to_string(),
                })?;
            self.parsers.insert(dialect, parser);
        }
        self.parsers
            .get_mut(&dialect)
            .ok_or(ParseError::Language {
                dialect: dialect.name(),
                message: "parser missing after initialization".to_string(),
            })
    }

    /// Read and parse a file from disk.
    pub fn parse_file(&mut self, path: &Path) -> Result<Vec<ExportedDeclaration>, ParseError> {
        let source = std::fs::read_to_string(path).map_err(|source| ParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_exports(path, &source)
    }

    /// Parse source text and collect its exported declarations.
    ///
    /// Any syntax error in the tree fails the whole file.
    pub fn parse_exports(
        &mut self,
        path: &Path,
        source: &str,
    ) -> Result<Vec<ExportedDeclaration>, ParseError> {
        let parser = self.get_parser(Dialect::for_path(path))?;
        let tree = parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| ParseError::NoTree {
                path: path.to_path_buf(),
            })?;

        if let Some(line) = first_error_line(&tree) {
            return Err(ParseError::Syntax {
                path: path.to_path_buf(),
                line,
            });
        }

        let root = tree.root_node();
        let bytes = source.as_bytes();
        let locals = local_declaration_kinds(root, bytes);

        let mut exports = Vec::new();
        collect_exports(root, bytes, None, &locals, &mut exports);

        debug!("Found {} exports in {:?}", exports.len(), path);
        Ok(exports)
    }
}

fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// 1-indexed line of the first error or missing node, if the tree has one.
fn first_error_line(tree: &Tree) -> Option<usize> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }

    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return Some(root.start_position().row + 1);
            }
        }
    }
}

/// Kinds of non-exported top-level declarations, for `export { name }`.
fn local_declaration_kinds(root: Node, source: &[u8]) -> HashMap<String, SymbolKind> {
    let mut locals = HashMap::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        let mut found = Vec::new();
        declaration_names(child, source, &mut found);
        for (name, kind) in found {
            locals.entry(name).or_insert(kind);
        }
    }
    locals
}

fn collect_exports(
    scope: Node,
    source: &[u8],
    ambient_module: Option<&str>,
    locals: &HashMap<String, SymbolKind>,
    out: &mut Vec<ExportedDeclaration>,
) {
    let push = |name: String, kind: SymbolKind, out: &mut Vec<ExportedDeclaration>| {
        out.push(ExportedDeclaration {
            name,
            kind,
            ambient_module: ambient_module.map(str::to_string),
        })
    };

    let mut cursor = scope.walk();
    for child in scope.named_children(&mut cursor) {
        match child.kind() {
            "export_statement" => {
                for (name, kind) in export_statement_names(child, source, locals) {
                    push(name, kind, out);
                }
            }
            "ambient_declaration" if ambient_module.is_none() => {
                if let Some((module, body)) = ambient_module_body(child, source) {
                    let module_locals = HashMap::new();
                    collect_exports(body, source, Some(&module), &module_locals, out);
                }
            }
            // declarations inside `declare module` are exported implicitly
            _ if ambient_module.is_some() => {
                let mut found = Vec::new();
                declaration_names(child, source, &mut found);
                for (name, kind) in found {
                    push(name, kind, out);
                }
            }
            _ => {}
        }
    }
}

fn export_statement_names(
    node: Node,
    source: &[u8],
    locals: &HashMap<String, SymbolKind>,
) -> Vec<(String, SymbolKind)> {
    let mut names = Vec::new();

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();

    // default exports have no importable name
    if children.iter().any(|c| c.kind() == "default") {
        return names;
    }

    if let Some(declaration) = node.child_by_field_name("declaration") {
        declaration_names(declaration, source, &mut names);
        return names;
    }

    let re_export = node.child_by_field_name("source").is_some();
    for clause in children.iter().filter(|c| c.kind() == "export_clause") {
        let mut clause_cursor = clause.walk();
        for specifier in clause.named_children(&mut clause_cursor) {
            if specifier.kind() != "export_specifier" {
                continue;
            }
            let Some(local) = specifier.child_by_field_name("name") else {
                continue;
            };
            let local = node_text(&local, source);
            let exported = specifier
                .child_by_field_name("alias")
                .map(|alias| node_text(&alias, source))
                .unwrap_or(local);
            let kind = if re_export {
                SymbolKind::Unknown
            } else {
                locals.get(local).copied().unwrap_or(SymbolKind::Unknown)
            };
            names.push((trim_quotes(exported).to_string(), kind));
        }
    }

    names
}

/// Names bound by a declaration node.
fn declaration_names(node: Node, source: &[u8], out: &mut Vec<(String, SymbolKind)>) {
    match node.kind() {
        "lexical_declaration" | "variable_declaration" => {
            let kind = SymbolKind::classify(node.kind());
            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(name) = declarator.child_by_field_name("name") {
                    // destructuring patterns are not indexed
                    if name.kind() == "identifier" {
                        out.push((node_text(&name, source).to_string(), kind));
                    }
                }
            }
        }
        "ambient_declaration" => {
            let mut cursor = node.walk();
            for inner in node.named_children(&mut cursor) {
                declaration_names(inner, source, out);
            }
        }
        "class_declaration"
        | "abstract_class_declaration"
        | "interface_declaration"
        | "function_declaration"
        | "generator_function_declaration"
        | "function_signature"
        | "type_alias_declaration"
        | "enum_declaration"
        | "internal_module"
        | "module" => {
            if let Some(name) = node.child_by_field_name("name") {
                if name.kind() != "string" {
                    out.push((
                        node_text(&name, source).to_string(),
                        SymbolKind::classify(node.kind()),
                    ));
                }
            }
        }
        _ => {}
    }
}

/// `declare module "name" { ... }` → (name, body)
fn ambient_module_body<'t>(node: Node<'t>, source: &[u8]) -> Option<(String, Node<'t>)> {
    let mut cursor = node.walk();
    let module = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "module")?;
    let name = module.child_by_field_name("name")?;
    if name.kind() != "string" {
        return None;
    }
    let body = module.child_by_field_name("body")?;
    Some((trim_quotes(node_text(&name, source)).to_string(), body))
}

fn trim_quotes(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}
