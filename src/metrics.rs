use std::time::{Duration, Instant};

use anyhow::Result;
use metrics::{counter, gauge, histogram};

/// Metric names emitted by the store
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    // Storage operation metrics
    pub operations_total: &'static str,
    pub operation_duration: &'static str,

    // Entity metrics
    pub rooms_created_total: &'static str,
    pub rooms_deleted_total: &'static str,
    pub messages_created_total: &'static str,
    pub messages_deleted_total: &'static str,
    pub messages_returned: &'static str,

    // Pool metrics
    pub db_connection_pool_size: &'static str,

    // Error metrics
    pub errors_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            operations_total: "chat_store_operations_total",
            operation_duration: "chat_store_operation_duration_seconds",

            rooms_created_total: "chat_store_rooms_created_total",
            rooms_deleted_total: "chat_store_rooms_deleted_total",
            messages_created_total: "chat_store_messages_created_total",
            messages_deleted_total: "chat_store_messages_deleted_total",
            messages_returned: "chat_store_messages_returned",

            db_connection_pool_size: "chat_store_db_connection_pool_size",

            errors_total: "chat_store_errors_total",
        }
    }
}

impl MetricsCollector {
    /// Install the no-op recorder so the facade is initialised even when no
    /// exporter is configured. Fails if a recorder is already installed.
    pub fn init() -> Result<()> {
        metrics::set_global_recorder(metrics::NoopRecorder)
            .map_err(|e| anyhow::anyhow!("Failed to initialize metrics recorder: {}", e))?;

        Ok(())
    }

    /// Record a storage operation and, on failure, its error kind
    pub fn record_operation(&self, operation: &'static str, duration: Duration, error_kind: Option<&'static str>) {
        let status = if error_kind.is_some() { "error" } else { "success" };

        counter!(self.operations_total, "operation" => operation, "status" => status).increment(1);
        histogram!(self.operation_duration, "operation" => operation).record(duration.as_secs_f64());

        if let Some(kind) = error_kind {
            self.record_error(kind, operation);
        }
    }

    /// Record a created room
    pub fn record_room_created(&self) {
        counter!(self.rooms_created_total).increment(1);
    }

    /// Record a deleted room and the messages removed with it
    pub fn record_room_deleted(&self, messages_removed: usize) {
        counter!(self.rooms_deleted_total).increment(1);
        counter!(self.messages_deleted_total).increment(messages_removed as u64);
    }

    /// Record a created message
    pub fn record_message_created(&self) {
        counter!(self.messages_created_total).increment(1);
    }

    /// Record how many messages a read returned
    pub fn record_messages_returned(&self, operation: &'static str, count: usize) {
        histogram!(self.messages_returned, "operation" => operation).record(count as f64);
    }

    /// Record error metrics
    pub fn record_error(&self, error_type: &'static str, operation: &'static str) {
        counter!(self.errors_total, "type" => error_type, "operation" => operation).increment(1);
    }

    /// Update connection pool size
    pub fn update_connection_pool_size(&self, size: u32) {
        gauge!(self.db_connection_pool_size).set(f64::from(size));
    }
}

/// Times one operation and reports it when finished
pub struct MetricsTimer<'a> {
    collector: &'a MetricsCollector,
    operation: &'static str,
    start: Instant,
}

impl<'a> MetricsTimer<'a> {
    /// Start timing `operation`
    #[must_use]
    pub fn new(collector: &'a MetricsCollector, operation: &'static str) -> Self {
        Self {
            collector,
            operation,
            start: Instant::now(),
        }
    }

    /// Stop the timer and record the outcome
    pub fn finish(self, error_kind: Option<&'static str>) -> Duration {
        let duration = self.start.elapsed();
        self.collector.record_operation(self.operation, duration, error_kind);
        duration
    }
}
