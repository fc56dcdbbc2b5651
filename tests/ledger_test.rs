//! Integration tests for the job lifecycle and ledger bookkeeping.

use letterfreq::Error;
use letterfreq::engine::JobLedger;
use letterfreq::model::{Job, JobId, JobState};

fn ledger_with(n: usize) -> JobLedger {
    let mut ledger = JobLedger::new();
    for i in 0..n {
        ledger
            .register(Job::new(JobId(i), format!("input-{i}.txt")))
            .unwrap();
    }
    ledger
}

// ---------------------------------------------------------------------------
// State graph
// ---------------------------------------------------------------------------

#[test]
fn lifecycle_edges_are_allowed() {
    use JobState::*;
    assert!(Spawned.can_transition_to(Running));
    assert!(Running.can_transition_to(Completed));
    assert!(Running.can_transition_to(Failed));
    assert!(Completed.can_transition_to(Reaped));
    assert!(Failed.can_transition_to(Reaped));
}

#[test]
fn shortcuts_and_reversals_are_rejected() {
    use JobState::*;
    assert!(!Spawned.can_transition_to(Completed));
    assert!(!Spawned.can_transition_to(Failed));
    assert!(!Spawned.can_transition_to(Reaped));
    assert!(!Running.can_transition_to(Reaped));
    assert!(!Completed.can_transition_to(Failed));
    assert!(!Reaped.can_transition_to(Reaped));
    assert!(!Reaped.can_transition_to(Running));
}

#[test]
fn only_reaped_is_terminal() {
    assert!(JobState::Reaped.is_terminal());
    assert!(!JobState::Completed.is_terminal());
    assert!(JobState::Completed.is_settled());
    assert!(JobState::Failed.is_settled());
    assert!(!JobState::Running.is_settled());
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[test]
fn outstanding_starts_at_job_count() {
    let ledger = ledger_with(3);
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger.outstanding(), 3);
    assert_eq!(ledger.state(JobId(1)), Some(JobState::Spawned));
}

#[test]
fn full_lifecycle_decrements_once() {
    let mut ledger = ledger_with(2);

    ledger.mark_running(JobId(0), 100).unwrap();
    ledger.mark_running(JobId(1), 101).unwrap();
    assert_eq!(ledger.pid(JobId(1)), Some(101));
    assert_eq!(ledger.outstanding(), 2);

    ledger.transition(JobId(1), JobState::Failed).unwrap();
    assert_eq!(ledger.outstanding(), 1);
    ledger.transition(JobId(1), JobState::Reaped).unwrap();
    assert_eq!(ledger.outstanding(), 1);

    ledger.transition(JobId(0), JobState::Completed).unwrap();
    ledger.transition(JobId(0), JobState::Reaped).unwrap();
    assert_eq!(ledger.outstanding(), 0);
    assert!(ledger.all_reaped());
}

#[test]
fn double_reap_is_rejected() {
    let mut ledger = ledger_with(1);
    ledger.mark_running(JobId(0), 1).unwrap();
    ledger.transition(JobId(0), JobState::Completed).unwrap();
    ledger.transition(JobId(0), JobState::Reaped).unwrap();

    let err = ledger.transition(JobId(0), JobState::Reaped).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTransition {
            from: JobState::Reaped,
            to: JobState::Reaped,
            ..
        }
    ));
    assert_eq!(ledger.outstanding(), 0);
}

#[test]
fn settling_twice_does_not_double_count() {
    let mut ledger = ledger_with(2);
    ledger.mark_running(JobId(0), 1).unwrap();
    ledger.transition(JobId(0), JobState::Failed).unwrap();

    assert!(ledger.transition(JobId(0), JobState::Completed).is_err());
    assert_eq!(ledger.outstanding(), 1);
}

#[test]
fn settling_without_running_is_rejected() {
    let mut ledger = ledger_with(1);
    let err = ledger.transition(JobId(0), JobState::Completed).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
    assert_eq!(ledger.outstanding(), 1);
}

#[test]
fn unknown_job_is_rejected() {
    let mut ledger = ledger_with(1);
    let err = ledger.transition(JobId(9), JobState::Running).unwrap_err();
    assert!(matches!(err, Error::UnknownJob(JobId(9))));
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut ledger = ledger_with(1);
    assert!(ledger.register(Job::new(JobId(0), "again.txt")).is_err());
    assert_eq!(ledger.outstanding(), 1);
}

#[test]
fn sentinel_job_is_recognised() {
    assert!(Job::new(JobId(0), "SIG").is_sentinel());
    assert!(!Job::new(JobId(0), "SIG.txt").is_sentinel());
}
