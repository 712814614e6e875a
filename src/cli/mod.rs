use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tsimport")]
#[command(author, version, about = "Workspace symbol index and auto-import for TypeScript")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default .tsimport/config.toml in the current directory
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Scan the workspace and report what was indexed
    Index,

    /// Query symbols (or modules) the way an editor completion would
    Complete {
        /// Name or module fragment to look up
        query: String,

        /// Query module specifiers instead of symbol names
        #[arg(short, long)]
        modules: bool,

        /// Case-sensitive exact match
        #[arg(short, long, conflicts_with = "anywhere")]
        exact: bool,

        /// Match anywhere in the name instead of only as a prefix
        #[arg(short, long)]
        anywhere: bool,

        /// Maximum number of results to print
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// List import actions for a "Cannot find name" diagnostic
    Fix {
        /// Document the diagnostic was reported in
        file: PathBuf,

        /// Diagnostic message, e.g. "Cannot find name 'Foo'."
        diagnostic: String,
    },

    /// Add an import of a symbol to a file
    Import {
        /// Document to add the import to
        file: PathBuf,

        /// Exported name to import
        name: String,

        /// Workspace-relative file declaring the symbol, when the name is ambiguous
        #[arg(short, long)]
        from: Option<PathBuf>,

        /// Write the result back instead of printing the edit
        #[arg(short, long)]
        write: bool,
    },

    /// Watch for file changes and keep the index current
    Watch {
        /// Debounce delay in milliseconds (defaults to the configured value)
        #[arg(short, long)]
        debounce_ms: Option<u64>,
    },

    /// Show index statistics and metrics
    Stats {
        /// Output in Prometheus format
        #[arg(long)]
        prometheus: bool,
    },
}
