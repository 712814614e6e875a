//! Index command: full scan with a progress bar and error summary.

use anyhow::Result;

use super::open_engine;

pub async fn run() -> Result<()> {
    let (root, engine) = open_engine(true).await?;

    if !engine.is_enabled() {
        println!("Importer is disabled in {}", root.join(".tsimport/config.toml").display());
        return Ok(());
    }

    let stats = engine.index().stats();
    println!("Project root: {}", engine.root().display());
    println!(
        "Index: {} symbols in {} modules from {} files",
        stats.symbols, stats.modules, stats.files
    );

    Ok(())
}
