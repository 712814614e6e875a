//! Symbol indexing module
//!
//! This module provides the in-memory index of exported symbols
//! (classes, interfaces, functions, constants) discovered in the workspace,
//! queried by name and by module specifier.

pub mod index;
pub mod kind;

pub use index::{IndexSnapshot, IndexStats, MatchMode, ModuleEntry, SymbolIndex};
pub use kind::{Symbol, SymbolKind};
