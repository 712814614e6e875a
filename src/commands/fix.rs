use anyhow::Result;
use std::path::Path;

use super::open_engine;
use crate::engine::QuickFixSource;

/// List the import actions offered for a diagnostic reported in `file`.
pub async fn run(file: &Path, diagnostic: &str) -> Result<()> {
    let (root, engine) = open_engine(false).await?;

    let fixes = engine.suggest_imports_for_diagnostic(&root.join(file), diagnostic);
    if fixes.is_empty() {
        println!("No import suggestions");
        return Ok(());
    }

    for (i, fix) in fixes.iter().enumerate() {
        println!(
            "{}. {}    ({})",
            i + 1,
            fix.title,
            fix.symbol.module_path.display()
        );
    }

    Ok(())
}
