//! Construction-time pipeline configuration.
//!
//! The core persists no state — external configuration files are a
//! collaborator's concern. This module only defines the handful of numeric
//! knobs the pipeline needs at construction time, with defaults matching the
//! numbers named throughout the component design.

/// Tunables for a single channel's executors, mailboxes, and buffer pool.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Capacity of the bounded stage → mixer mailbox.
    pub stage_mailbox_capacity: usize,
    /// In-flight frame ticket limit between stage and output.
    pub ticket_limit: usize,
    /// Soft cap on pooled host buffers per `(tag, size)` key before the pool frees excess.
    pub buffer_pool_soft_cap: usize,
    /// Fraction of a tick a producer's `receive()` is budgeted before it is treated as late.
    pub tick_deadline_fraction: f64,
    /// Consecutive GPU tick failures after which a channel is marked degraded.
    pub max_consecutive_gpu_failures: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_mailbox_capacity: 2,
            ticket_limit: 3,
            buffer_pool_soft_cap: 8,
            tick_deadline_fraction: 0.5,
            max_consecutive_gpu_failures: 4,
        }
    }
}
