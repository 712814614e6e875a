pub mod errors;
pub mod package;
pub mod parser;
pub mod status;
pub mod walker;
pub mod workspace;

pub use errors::{ErrorCollector, FileError, ScanReport, ScanStage};
pub use package::PackageResolver;
pub use parser::{Dialect, ExportParser, ExportedDeclaration, ParseError};
pub use status::IndexerStatus;
pub use walker::{FileMatcher, Walker};
pub use workspace::{FileOutcome, WorkspaceIndexer};
