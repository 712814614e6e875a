//! Module specifier resolution and import edit generation.

pub mod edit;
pub mod importer;
pub mod imports;
pub mod specifier;

pub use edit::{ImportEdit, ImportEditKind, Position, TextEdit};
pub use importer::{ImportBinding, ImportError, ImportResolver};
pub use imports::{scan_imports, ImportDeclaration, NamedImport};
pub use specifier::relative_specifier;
