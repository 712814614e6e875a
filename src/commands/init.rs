use anyhow::{bail, Result};
use std::env;
use tracing::info;

use crate::Config;

pub async fn run(force: bool) -> Result<()> {
    let root = env::current_dir()?;

    if Config::is_initialized(&root) && !force {
        bail!(
            "tsimport is already initialized in {:?} (use --force to overwrite)",
            Config::config_dir(&root)
        );
    }

    let config = Config::default();
    config.save(&root)?;

    info!("Initialized tsimport in {:?}", Config::config_dir(&root));
    println!(
        "✓ Created {} with default configuration",
        Config::config_dir(&root).display()
    );
    println!("\nNext steps:");
    println!("  1. Edit .tsimport/config.toml to adjust include globs and import style");
    println!("  2. Run 'tsimport index' to check what gets indexed");
    println!("  3. Run 'tsimport watch' to keep the index current while editing");

    Ok(())
}
