pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod indexer;
pub mod logging;
pub mod metrics;
pub mod paths;
pub mod resolver;
pub mod symbol;
pub mod watcher;

pub use config::Config;
pub use engine::{CompletionSource, ImportEngine, QuickFix, QuickFixSource};
pub use symbol::{MatchMode, Symbol, SymbolIndex, SymbolKind};
