use serde::Serialize;

/// Zero-based line and UTF-16 column, as editors count them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    /// Position of byte `offset` in `text`.
    pub fn at(text: &str, offset: usize) -> Self {
        let before = &text[..offset.min(text.len())];
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        Self {
            line: before.matches('\n').count() as u32,
            character: before[line_start..].encode_utf16().count() as u32,
        }
    }
}

/// Replacement of a byte range in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub start_position: Position,
    pub end_position: Position,
    pub new_text: String,
}

impl TextEdit {
    pub fn insert(text: &str, offset: usize, new_text: impl Into<String>) -> Self {
        Self::replace(text, offset, offset, new_text)
    }

    pub fn replace(text: &str, start: usize, end: usize, new_text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            start_position: Position::at(text, start),
            end_position: Position::at(text, end),
            new_text: new_text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end && self.new_text.is_empty()
    }

    /// Apply to the text the edit was computed against.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.new_text.len());
        out.push_str(&text[..self.start]);
        out.push_str(&self.new_text);
        out.push_str(&text[self.end..]);
        out
    }
}

/// How an import edit changes the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportEditKind {
    /// Binding appended to an existing declaration
    Merged,
    /// New import statement inserted
    Inserted,
    /// Binding already present; the edit changes nothing
    AlreadyImported,
}

/// Edit that makes a symbol importable in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportEdit {
    pub kind: ImportEditKind,
    /// Module specifier the symbol is imported from
    pub specifier: String,
    pub edit: TextEdit,
}

impl ImportEdit {
    pub fn is_noop(&self) -> bool {
        self.kind == ImportEditKind::AlreadyImported
    }

    pub fn apply(&self, text: &str) -> String {
        self.edit.apply(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at() {
        let text = "ab\ncdé\nx";
        assert_eq!(Position::at(text, 0), Position { line: 0, character: 0 });
        assert_eq!(Position::at(text, 3), Position { line: 1, character: 0 });
        // é is two bytes but one UTF-16 unit
        assert_eq!(Position::at(text, 7), Position { line: 1, character: 3 });
        assert_eq!(Position::at(text, 8), Position { line: 2, character: 0 });
    }

    #[test]
    fn test_apply_insert_and_replace() {
        let text = "hello world";
        assert_eq!(TextEdit::insert(text, 5, ",").apply(text), "hello, world");
        assert_eq!(TextEdit::replace(text, 6, 11, "there").apply(text), "hello there");
        assert!(TextEdit::insert(text, 3, "").is_empty());
    }
}
