use anyhow::Result;

use super::open_engine;
use crate::engine::CompletionSource;
use crate::symbol::MatchMode;

/// Print completions for `query`, one per line.
pub async fn run(
    query: &str,
    modules: bool,
    exact: bool,
    anywhere: bool,
    limit: usize,
) -> Result<()> {
    let (_, engine) = open_engine(false).await?;

    let mode = if exact { MatchMode::Exact } else { MatchMode::Any };
    let prefix_only = !anywhere;

    let items = if modules {
        engine.query_modules(query, prefix_only, mode)
    } else {
        engine.query_symbols(query, prefix_only, mode)
    };

    if items.is_empty() {
        println!("No matches for '{}'", query);
        return Ok(());
    }

    for item in items.iter().take(limit) {
        println!("{:<32} {:<10} {}", item.label, format!("{:?}", item.category), item.detail);
    }
    if items.len() > limit {
        println!("... and {} more", items.len() - limit);
    }

    Ok(())
}
