//! Prometheus metrics for the pulse automation layer.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent
//! failure. These panics only occur during static initialization, never at
//! runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, register_int_gauge, Counter,
    CounterVec, HistogramVec, IntGauge,
};

/// Total actions by kind and terminal outcome.
/// Labels: kind (open/close/side_wager), outcome (matched/timed_out/cancelled).
pub static ACTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pulse_actions_total",
        "Total actions by kind and terminal outcome",
        &["kind", "outcome"]
    )
    .unwrap()
});

/// Round-trip confirmation latency in milliseconds.
pub static CONFIRMATION_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "pulse_confirmation_latency_ms",
        "Action confirmation round-trip latency in milliseconds",
        &["kind"],
        vec![10.0, 25.0, 50.0, 100.0, 200.0, 350.0, 500.0, 1000.0, 2000.0]
    )
    .unwrap()
});

/// Currently pending (claimed or registered) actions.
pub static PENDING_ACTIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "pulse_pending_actions",
        "Currently pending actions awaiting confirmation"
    )
    .unwrap()
});

/// Total state updates accepted from the push stream.
pub static STATE_UPDATES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "pulse_state_updates_total",
        "Total state updates accepted from the push stream"
    )
    .unwrap()
});

/// Total malformed state updates dropped.
pub static MALFORMED_UPDATES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "pulse_malformed_updates_total",
        "Total malformed state updates dropped"
    )
    .unwrap()
});
