//! Integration tests for telemetry initialization and span helpers.

use letterfreq::model::{Job, JobId, JobState};
use letterfreq::telemetry::job::{record_pid, record_state_transition, start_job_span};

#[test]
fn telemetry_initializes_without_endpoint() {
    // A global subscriber can only be set once per process, so a second
    // init in the same test binary returning Err is acceptable.
    let config = letterfreq::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "letterfreq-test".to_string(),
        log_level: "info".to_string(),
    };
    if let Ok(guard) = letterfreq::telemetry::init_telemetry(config) {
        assert!(!guard.is_exporting());
    }
}

#[test]
fn job_span_records_pid_and_transitions() {
    let job = Job::new(JobId(4), "a.txt");
    let span = start_job_span(&job);
    record_pid(&span, 1234);
    record_state_transition(&span, JobState::Spawned, JobState::Running);
    record_state_transition(&span, JobState::Running, JobState::Completed);
}

#[test]
fn metric_instruments_are_usable_without_provider() {
    use letterfreq::telemetry::metrics;
    metrics::jobs_spawned().add(1, &[]);
    metrics::records_written().add(1, &[]);
    metrics::job_duration_ms().record(12.5, &[]);
}
