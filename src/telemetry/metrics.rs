//! Metric instruments.
//!
//! Created from the globally-registered `MeterProvider`; without one they
//! are no-ops.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("letterfreq")
}

/// Counter: worker processes started.
pub fn jobs_spawned() -> Counter<u64> {
    meter()
        .u64_counter("letterfreq.jobs.spawned")
        .with_description("Number of worker processes spawned")
        .build()
}

/// Counter: observed job outcomes.
/// Labels: `outcome` ("completed" | "failed"), `reason`.
pub fn job_outcomes() -> Counter<u64> {
    meter()
        .u64_counter("letterfreq.jobs.outcomes")
        .with_description("Number of job outcomes observed")
        .build()
}

/// Counter: histogram records persisted.
pub fn records_written() -> Counter<u64> {
    meter()
        .u64_counter("letterfreq.records.written")
        .with_description("Number of histogram records written")
        .build()
}

/// Histogram: spawn-to-reap time per job in milliseconds.
pub fn job_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("letterfreq.job.duration_ms")
        .with_description("Job duration from spawn to reap")
        .with_unit("ms")
        .build()
}
