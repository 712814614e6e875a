//! Error collection and reporting for workspace scans

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Stage where a file failed during a scan
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum ScanStage {
    Walk,
    Read,
    Parse,
}

impl std::fmt::Display for ScanStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStage::Walk => write!(f, "Walk"),
            ScanStage::Read => write!(f, "File Read"),
            ScanStage::Parse => write!(f, "Parse"),
        }
    }
}

/// Error that occurred while processing a file
#[derive(Debug, Clone)]
pub struct FileError {
    pub path: PathBuf,
    pub error: String,
    pub stage: ScanStage,
}

/// Collects per-file errors from parallel workers
#[derive(Clone, Default)]
pub struct ErrorCollector {
    errors: Arc<Mutex<Vec<FileError>>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error that occurred during processing
    pub fn record(&self, path: PathBuf, error: impl Display, stage: ScanStage) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FileError {
                path,
                error: error.to_string(),
                stage,
            });
    }

    pub fn error_count(&self) -> usize {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Take all collected errors, sorted by path
    pub fn take(&self) -> Vec<FileError> {
        let mut errors =
            std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner));
        errors.sort_by(|a, b| a.path.cmp(&b.path));
        errors
    }
}

/// Outcome of a full workspace scan
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Files that were parsed and indexed
    pub files_scanned: usize,
    pub files_failed: usize,
    pub symbols_indexed: usize,
    pub errors: Vec<FileError>,
    pub duration: Duration,
    /// A newer scan superseded this one before it finished
    pub cancelled: bool,
}

impl ScanReport {
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Default::default()
        }
    }

    pub fn by_stage(&self) -> BTreeMap<ScanStage, Vec<&FileError>> {
        let mut by_stage: BTreeMap<ScanStage, Vec<&FileError>> = BTreeMap::new();
        for error in &self.errors {
            by_stage.entry(error.stage).or_default().push(error);
        }
        by_stage
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// One-line summary suitable for a notification
    pub fn summary(&self) -> String {
        if self.cancelled {
            return "Scan cancelled".to_string();
        }
        let mut summary = format!(
            "Indexed {} symbols from {} files in {:.2}s",
            self.symbols_indexed,
            self.files_scanned,
            self.duration.as_secs_f64()
        );
        if self.files_failed > 0 {
            summary.push_str(&format!(" ({} files failed)", self.files_failed));
        }
        summary
    }

    /// Print a summary of the scan and its errors to stdout
    pub fn print_summary(&self) {
        if !self.has_errors() {
            println!("✅ {}", self.summary());
            return;
        }

        println!("⚠️  {}", self.summary());
        println!();

        for (stage, errors) in self.by_stage() {
            println!("  {}: {} errors", stage, errors.len());

            for error in errors.iter().take(5) {
                println!("    - {}: {}", error.path.display(), error.error);
            }

            if errors.len() > 5 {
                println!("    ... and {} more", errors.len() - 5);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_across_threads() {
        let collector = ErrorCollector::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let collector = collector.clone();
                std::thread::spawn(move || {
                    collector.record(
                        PathBuf::from(format!("src/{}.ts", i)),
                        "boom",
                        ScanStage::Parse,
                    );
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(collector.error_count(), 4);
        let errors = collector.take();
        assert_eq!(errors[0].path, PathBuf::from("src/0.ts"));
        assert_eq!(collector.error_count(), 0);
    }

    #[test]
    fn test_report_summary() {
        let report = ScanReport {
            files_scanned: 9,
            files_failed: 1,
            symbols_indexed: 12,
            errors: vec![FileError {
                path: PathBuf::from("src/broken.ts"),
                error: "syntax error".to_string(),
                stage: ScanStage::Parse,
            }],
            duration: Duration::from_millis(250),
            cancelled: false,
        };

        assert!(report.has_errors());
        assert_eq!(report.by_stage()[&ScanStage::Parse].len(), 1);
        assert!(report.summary().contains("12 symbols from 9 files"));
        assert!(report.summary().contains("1 files failed"));
        assert_eq!(ScanReport::cancelled().summary(), "Scan cancelled");
    }
}
