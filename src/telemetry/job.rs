//! Job span helpers.

use tracing::Span;

use crate::model::{Job, JobState};

/// Start a span covering one job's lifecycle.
///
/// `job.pid` and `job.state` are declared empty and filled in by
/// [`record_pid`] and [`record_state_transition`].
pub fn start_job_span(job: &Job) -> Span {
    tracing::info_span!(
        "job",
        "job.id" = job.id.0,
        "job.input" = %job.input,
        "job.pid" = tracing::field::Empty,
        "job.state" = tracing::field::Empty,
    )
}

pub fn record_pid(span: &Span, pid: u32) {
    span.record("job.pid", pid);
}

/// Record a state transition on the span and emit a debug event inside it.
pub fn record_state_transition(span: &Span, from: JobState, to: JobState) {
    span.record("job.state", tracing::field::display(to));
    span.in_scope(|| {
        tracing::debug!(%from, %to, "state_transition");
    });
}
