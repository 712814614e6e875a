//! Watch command implementation
//!
//! Scans once, then keeps the index current until Ctrl+C.

use anyhow::Result;
use tokio::signal;

use super::open_engine;
use crate::watcher::{FileWatcher, WatcherHandle};

pub async fn run(debounce_ms: Option<u64>) -> Result<()> {
    let (root, engine) = open_engine(true).await?;
    let debounce_ms = debounce_ms.unwrap_or(engine.config().watch.debounce_ms);

    println!("Starting watch mode...");
    println!("Watching directory: {:?}", root);
    println!("Debounce delay: {}ms", debounce_ms);
    println!("Include: {:?}", engine.config().scan.include);
    println!();
    println!("Press Ctrl+C to stop.");
    println!();

    let mut handle = WatcherHandle::spawn(FileWatcher::new(engine.clone(), debounce_ms));

    signal::ctrl_c().await?;

    println!();
    println!("Shutting down...");

    handle.shutdown();
    let stats = handle.wait().await?;

    let index = engine.index().stats();
    println!();
    println!("Watch session complete!");
    println!("----------------------------------------");
    println!("  Files re-indexed: {}", stats.files_indexed);
    println!("  Files removed:    {}", stats.files_removed);
    println!("  Files failed:     {}", stats.files_failed);
    println!("  Errors:           {}", stats.errors);
    println!("  Index now holds {} symbols in {} modules", index.symbols, index.modules);

    Ok(())
}
