//! Stats command for displaying index statistics and metrics

use anyhow::Result;

use super::open_engine;
use crate::metrics::{gather_metrics, MetricSnapshot};

/// Run the stats command
///
/// Scans the workspace, then prints index counts and metric values, or the
/// raw Prometheus exposition when `prometheus` is set.
pub async fn run(prometheus: bool) -> Result<()> {
    let (root, engine) = open_engine(false).await?;

    if prometheus {
        print!("{}", gather_metrics());
        return Ok(());
    }

    let stats = engine.index().stats();
    let snapshot = MetricSnapshot::capture();

    println!("tsimport Index Statistics");
    println!("=========================\n");

    println!("Workspace: {}", root.display());
    println!("Status:    {}", engine.status());
    println!();

    println!("Index Contents:");
    println!("  Files with exports: {}", stats.files);
    println!("  Symbols:            {}", stats.symbols);
    println!("  Modules:            {}", stats.modules);
    println!();

    println!("Scan Metrics:");
    println!("  Files scanned:   {:.0}", snapshot.files_scanned_total);
    println!("  Parse errors:    {:.0}", snapshot.parse_errors_total);
    println!("  Scan duration:   {:.3}s", snapshot.scan_duration_avg);

    Ok(())
}
