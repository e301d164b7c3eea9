//! FAQ synchronization metrics.

use crate::{counter, histogram};
use std::time::Instant;

/// FAQ sync metrics recorder
pub struct FaqSyncMetrics;

impl FaqSyncMetrics {
    // =========================================================================
    // Operation Metrics
    // =========================================================================

    /// Record the outcome of a synchronized operation
    pub fn record_operation(operation: &'static str, outcome: &'static str) {
        counter!(
            "faq_sync_operations_total",
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
    }

    /// Record a fallback vector substituted for a failed embedding
    pub fn record_fallback_vector(operation: &'static str) {
        counter!("faq_sync_fallback_vectors_total", "operation" => operation).increment(1);
    }

    /// Record an index write skipped because the index store was unavailable
    pub fn record_index_skipped(operation: &'static str) {
        counter!("faq_sync_index_skipped_total", "operation" => operation).increment(1);

        tracing::warn!(operation = operation, "Index store unavailable, skipped index write");
    }

    // =========================================================================
    // Compensation Metrics
    // =========================================================================

    /// Record a record-store rollback after a failed index write
    pub fn record_rollback(operation: &'static str) {
        counter!(
            "faq_sync_compensations_total",
            "operation" => operation,
            "outcome" => "rolled_back"
        )
        .increment(1);
    }

    /// Record a record that could not be rolled back and now lacks an index entry
    pub fn record_orphan(operation: &'static str, faq_id: &str) {
        counter!(
            "faq_sync_compensations_total",
            "operation" => operation,
            "outcome" => "orphaned"
        )
        .increment(1);

        tracing::error!(
            operation = operation,
            faq_id = faq_id,
            "Compensating delete failed, record left without index entry"
        );
    }

    // =========================================================================
    // Bulk Upload Metrics
    // =========================================================================

    /// Record per-item results of a bulk upload
    pub fn record_bulk_items(succeeded: usize, skipped: usize, failed: usize) {
        counter!("faq_bulk_upload_items_total", "result" => "succeeded").increment(succeeded as u64);
        counter!("faq_bulk_upload_items_total", "result" => "skipped").increment(skipped as u64);
        counter!("faq_bulk_upload_items_total", "result" => "failed").increment(failed as u64);

        tracing::info!(
            succeeded = succeeded,
            skipped = skipped,
            failed = failed,
            "Bulk upload completed"
        );
    }
}

/// Timer guard for operation duration.
///
/// Records into `faq_sync_operation_duration_seconds` on `stop()` or drop.
pub struct SyncTimer {
    start: Instant,
    operation: &'static str,
    stopped: bool,
}

impl SyncTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
            stopped: false,
        }
    }

    /// Stop the timer and record the duration. Returns elapsed milliseconds.
    pub fn stop(&mut self) -> u64 {
        if self.stopped {
            return 0;
        }
        self.stopped = true;

        let duration = self.start.elapsed();
        histogram!(
            "faq_sync_operation_duration_seconds",
            "operation" => self.operation
        )
        .record(duration.as_secs_f64());

        duration.as_millis() as u64
    }
}

impl Drop for SyncTimer {
    fn drop(&mut self) {
        if !self.stopped {
            self.stop();
        }
    }
}
