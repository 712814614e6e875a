//! Fixed-format scan of a document's top-level import declarations.
//!
//! This is not a TypeScript parser. It recognizes the common shapes
//! (`import A from`, `import * as A from`, `import { A, B as C } from`,
//! `import type { A } from`, `import "side-effect"`) at the start of a line
//! or right after another statement's `;`, which is all the import merger
//! needs.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IMPORT_DECLARATION: Regex = Regex::new(
        r#"(?m)(?:^|;)[ \t]*(?P<stmt>import\b\s*(?P<type>type\s+)?(?:(?P<default>[A-Za-z_$][\w$]*)\s*,?\s*)?(?:\*\s*as\s+(?P<namespace>[A-Za-z_$][\w$]*)\s*)?(?:\{(?P<named>[^}]*)\}\s*)?(?:from\s*)?['"](?P<specifier>[^'"\n]*)['"][ \t]*;?)"#
    )
    .expect("import declaration pattern is valid");
    static ref NAMED_BINDING: Regex = Regex::new(
        r"^(?:type\s+)?(?P<name>[A-Za-z_$][\w$]*)(?:\s+as\s+(?P<alias>[A-Za-z_$][\w$]*))?$"
    )
    .expect("named binding pattern is valid");
    static ref COMMENT: Regex =
        Regex::new(r"//[^\n]*|/\*(?s:.*?)\*/").expect("comment pattern is valid");
}

/// One `{ name as alias }` entry of a named import list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    pub name: String,
    pub alias: Option<String>,
}

impl NamedImport {
    /// Name bound in the importing file
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A recognized import declaration and the byte ranges the merger edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    /// Whole statement, including a trailing `;` when present
    pub span: Range<usize>,
    pub specifier: String,
    pub type_only: bool,
    pub default_binding: Option<String>,
    /// End of the default binding identifier
    pub default_end: Option<usize>,
    pub namespace: Option<String>,
    pub named: Vec<NamedImport>,
    /// Text between `{` and `}`
    pub named_span: Option<Range<usize>>,
}

impl ImportDeclaration {
    /// Every local name this declaration introduces.
    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.default_binding
            .as_deref()
            .into_iter()
            .chain(self.namespace.as_deref())
            .chain(self.named.iter().map(NamedImport::local_name))
    }

    pub fn is_side_effect(&self) -> bool {
        self.default_binding.is_none() && self.namespace.is_none() && self.named_span.is_none()
    }
}

/// Scan `text` for import declarations, in document order.
pub fn scan_imports(text: &str) -> Vec<ImportDeclaration> {
    let mut imports = Vec::new();
    let mut at = 0;

    while let Some(caps) = IMPORT_DECLARATION.captures_at(text, at) {
        let Some(stmt) = caps.name("stmt") else {
            break;
        };
        // leave a closing `;` for the next statement's anchor
        at = if stmt.as_str().ends_with(';') {
            stmt.end() - 1
        } else {
            stmt.end()
        };

        let named_match = caps.name("named");
        let named = named_match
            .map(|m| parse_named(m.as_str()))
            .unwrap_or_default();

        imports.push(ImportDeclaration {
            span: stmt.range(),
            specifier: caps["specifier"].to_string(),
            type_only: caps.name("type").is_some(),
            default_binding: caps.name("default").map(|m| m.as_str().to_string()),
            default_end: caps.name("default").map(|m| m.end()),
            namespace: caps.name("namespace").map(|m| m.as_str().to_string()),
            named,
            named_span: named_match.map(|m| m.range()),
        });
    }

    imports
}

/// Replace `//` and `/* */` comments with spaces, keeping byte offsets and
/// line breaks.
pub(crate) fn blank_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for comment in COMMENT.find_iter(text) {
        out.push_str(&text[last..comment.start()]);
        for c in comment.as_str().chars() {
            if c == '\n' {
                out.push('\n');
            } else {
                out.extend(std::iter::repeat(' ').take(c.len_utf8()));
            }
        }
        last = comment.end();
    }
    out.push_str(&text[last..]);
    out
}

fn parse_named(list: &str) -> Vec<NamedImport> {
    blank_comments(list)
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let caps = NAMED_BINDING.captures(entry)?;
            Some(NamedImport {
                name: caps["name"].to_string(),
                alias: caps.name("alias").map(|m| m.as_str().to_string()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_imports() {
        let text = "import { A, B as C } from \"./m\";\nconst x = 1;\n";
        let imports = scan_imports(text);

        assert_eq!(imports.len(), 1);
        let decl = &imports[0];
        assert_eq!(decl.specifier, "./m");
        assert_eq!(&text[decl.span.clone()], "import { A, B as C } from \"./m\";");
        assert_eq!(&text[decl.named_span.clone().unwrap()], " A, B as C ");
        assert_eq!(
            decl.local_names().collect::<Vec<_>>(),
            vec!["A", "C"]
        );
    }

    #[test]
    fn test_default_namespace_and_side_effect() {
        let text = r#"import React from 'react';
import * as path from "path";
import Default, { helper } from "./lib"
import "./polyfill";
"#;
        let imports = scan_imports(text);
        assert_eq!(imports.len(), 4);

        assert_eq!(imports[0].default_binding.as_deref(), Some("React"));
        assert_eq!(imports[0].specifier, "react");
        assert!(imports[0].named_span.is_none());

        assert_eq!(imports[1].namespace.as_deref(), Some("path"));

        assert_eq!(imports[2].default_binding.as_deref(), Some("Default"));
        assert_eq!(imports[2].named[0].name, "helper");
        assert!(text[imports[2].span.clone()].ends_with("\"./lib\""));

        assert!(imports[3].is_side_effect());
        assert_eq!(imports[3].specifier, "./polyfill");
    }

    #[test]
    fn test_type_only_and_multiline() {
        let text = "import type { Props } from \"./types\";\nimport {\n  First,\n  Second,\n} from \"./many\";\n";
        let imports = scan_imports(text);

        assert_eq!(imports.len(), 2);
        assert!(imports[0].type_only);
        assert_eq!(imports[0].named[0].name, "Props");
        assert!(!imports[1].type_only);
        assert_eq!(
            imports[1].named.iter().map(|n| n.name.as_str()).collect::<Vec<_>>(),
            vec!["First", "Second"]
        );
    }

    #[test]
    fn test_non_imports_ignored() {
        let text = "const imports = 1;\nexport { A } from \"./a\";\nawait import(\"./lazy\");\n";
        assert!(scan_imports(text).is_empty());
    }

    #[test]
    fn test_two_imports_on_one_line() {
        let text = "import { A } from \"./a\"; import { B } from \"./b\";\n";
        let imports = scan_imports(text);

        assert_eq!(imports.len(), 2);
        assert_eq!(&text[imports[0].span.clone()], "import { A } from \"./a\";");
        assert_eq!(&text[imports[1].span.clone()], "import { B } from \"./b\";");
        assert_eq!(imports[1].named[0].name, "B");
    }

    #[test]
    fn test_commented_bindings_are_not_imports() {
        let text = "import {\n  A, // first, B\n  /* C, */ D,\n} from \"./m\";\n";
        let imports = scan_imports(text);

        assert_eq!(
            imports[0].local_names().collect::<Vec<_>>(),
            vec!["A", "D"]
        );
    }

    #[test]
    fn test_blank_comments_keeps_offsets() {
        let text = "A, // é\n/* x\ny */ B";
        let blanked = blank_comments(text);

        assert_eq!(blanked.len(), text.len());
        assert_eq!(blanked, "A,      \n    \n     B");
    }
}
