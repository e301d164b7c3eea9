//! Observability utilities for the FAQ sync engine.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Custom metrics for FAQ synchronization and bulk uploads
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, FaqSyncMetrics, SyncTimer};
//!
//! // Initialize metrics recorder
//! init_metrics();
//!
//! let _timer = SyncTimer::new("create");
//! FaqSyncMetrics::record_operation("create", "ok");
//! ```

pub mod faqs;

pub use faqs::{FaqSyncMetrics, SyncTimer};

// Re-export metrics macros for convenience
pub use metrics::{counter, histogram};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// This should be called once at application startup. Returns `None` when
/// another global recorder is already installed.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Some(handle);
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder initialized");
            register_metric_descriptions();
            Some(METRICS_HANDLE.get_or_init(|| handle))
        }
        Err(e) => {
            warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Render the current metrics in Prometheus text format
pub fn render_metrics() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

/// Register metric descriptions for documentation
fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_histogram;

    describe_counter!(
        "faq_sync_operations_total",
        "FAQ sync operations by operation and outcome"
    );
    describe_histogram!(
        "faq_sync_operation_duration_seconds",
        "FAQ sync operation duration in seconds"
    );
    describe_counter!(
        "faq_sync_fallback_vectors_total",
        "Fallback vectors substituted for failed embeddings"
    );
    describe_counter!(
        "faq_sync_index_skipped_total",
        "Index writes skipped while the index store was unavailable"
    );
    describe_counter!(
        "faq_sync_compensations_total",
        "Compensating record deletes by outcome"
    );
    describe_counter!(
        "faq_bulk_upload_items_total",
        "Bulk upload items by result"
    );
}
