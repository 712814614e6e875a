//! Prometheus metrics for tsimport
//!
//! Counters and gauges for workspace scans, index queries and generated
//! import edits.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Scan metrics
    // ============================================================================

    /// Files parsed and committed to the index
    pub static ref FILES_SCANNED: Counter = Counter::with_opts(
        Opts::new(
            "tsimport_files_scanned_total",
            "Files parsed and committed to the index"
        )
    ).expect("Failed to create FILES_SCANNED counter");

    /// Files that could not be read or parsed
    pub static ref PARSE_ERRORS: Counter = Counter::with_opts(
        Opts::new(
            "tsimport_parse_errors_total",
            "Files that could not be read or parsed"
        )
    ).expect("Failed to create PARSE_ERRORS counter");

    pub static ref INDEXED_SYMBOLS: Gauge = Gauge::with_opts(
        Opts::new(
            "tsimport_indexed_symbols",
            "Exported symbols currently in the index"
        )
    ).expect("Failed to create INDEXED_SYMBOLS gauge");

    pub static ref INDEXED_MODULES: Gauge = Gauge::with_opts(
        Opts::new(
            "tsimport_indexed_modules",
            "Modules currently in the index"
        )
    ).expect("Failed to create INDEXED_MODULES gauge");

    /// Full workspace scan duration in seconds
    pub static ref SCAN_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "tsimport_scan_duration_seconds",
            "Full workspace scan duration in seconds"
        ).buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0])
    ).expect("Failed to create SCAN_DURATION histogram");

    // ============================================================================
    // Query metrics
    // ============================================================================

    /// Symbol and module lookups served
    pub static ref QUERY_REQUESTS: Counter = Counter::with_opts(
        Opts::new(
            "tsimport_query_requests_total",
            "Symbol and module lookups served"
        )
    ).expect("Failed to create QUERY_REQUESTS counter");

    /// Import edits produced
    pub static ref IMPORT_EDITS: Counter = Counter::with_opts(
        Opts::new(
            "tsimport_import_edits_total",
            "Import edits produced"
        )
    ).expect("Failed to create IMPORT_EDITS counter");
}

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry
///
/// Safe to call more than once; only the first call registers.
/// Panics if metrics registration fails.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(FILES_SCANNED.clone()))
            .expect("Failed to register FILES_SCANNED");
        REGISTRY
            .register(Box::new(PARSE_ERRORS.clone()))
            .expect("Failed to register PARSE_ERRORS");
        REGISTRY
            .register(Box::new(INDEXED_SYMBOLS.clone()))
            .expect("Failed to register INDEXED_SYMBOLS");
        REGISTRY
            .register(Box::new(INDEXED_MODULES.clone()))
            .expect("Failed to register INDEXED_MODULES");
        REGISTRY
            .register(Box::new(SCAN_DURATION.clone()))
            .expect("Failed to register SCAN_DURATION");
        REGISTRY
            .register(Box::new(QUERY_REQUESTS.clone()))
            .expect("Failed to register QUERY_REQUESTS");
        REGISTRY
            .register(Box::new(IMPORT_EDITS.clone()))
            .expect("Failed to register IMPORT_EDITS");
    });
}

/// Gather all metrics and encode them in Prometheus text format
///
/// Returns an empty string if encoding fails.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Metrics contained invalid UTF-8: {}", e);
        String::new()
    })
}

/// Current metric values in a human-readable form, for the CLI stats command.
pub struct MetricSnapshot {
    pub files_scanned_total: f64,
    pub parse_errors_total: f64,
    pub indexed_symbols: f64,
    pub indexed_modules: f64,
    pub scan_duration_avg: f64,
    pub query_requests_total: f64,
    pub import_edits_total: f64,
}

impl MetricSnapshot {
    /// Capture the current state of all metrics
    pub fn capture() -> Self {
        Self {
            files_scanned_total: FILES_SCANNED.get(),
            parse_errors_total: PARSE_ERRORS.get(),
            indexed_symbols: INDEXED_SYMBOLS.get(),
            indexed_modules: INDEXED_MODULES.get(),
            scan_duration_avg: calculate_histogram_avg(&SCAN_DURATION),
            query_requests_total: QUERY_REQUESTS.get(),
            import_edits_total: IMPORT_EDITS.get(),
        }
    }
}

fn calculate_histogram_avg(histogram: &Histogram) -> f64 {
    let count = histogram.get_sample_count();
    if count == 0 {
        return 0.0;
    }
    histogram.get_sample_sum() / count as f64
}
