//! Orchestrator: spawns one worker per input, collects outcomes in the
//! order workers terminate, and persists each histogram.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use serde::Serialize;
use tracing::{Instrument, Span, info, warn};

use super::ledger::JobLedger;
use super::worker::{self, WorkerCommand};
use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::event::{self, Termination, WatcherSet};
use crate::model::{Job, JobId, JobState, RecordKey, WorkerOutcome};
use crate::telemetry::job::{record_pid, record_state_transition, start_job_span};
use crate::telemetry::metrics;
use crate::writer::ResultWriter;

/// How per-job failures affect the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure on the job and keep collecting.
    #[default]
    Isolate,
    /// Abort the run on the first failed job, channel error, or write error.
    Strict,
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub worker: WorkerCommand,
    pub policy: FailurePolicy,
}

/// Final account of one job.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub job: JobId,
    pub input: String,
    pub pid: u32,
    pub outcome: WorkerOutcome,
    /// Where the histogram was persisted, if it was.
    pub record: Option<PathBuf>,
    pub write_error: Option<String>,
    pub spawned_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl JobReport {
    /// Histogram produced and persisted.
    pub fn succeeded(&self) -> bool {
        self.outcome.is_completed() && self.record.is_some()
    }
}

/// Result of a whole run, jobs in argument order.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub jobs: Vec<JobReport>,
    pub completed: usize,
    pub failed: usize,
    pub write_failures: usize,
}

impl RunSummary {
    fn from_reports(mut jobs: Vec<JobReport>) -> Self {
        jobs.sort_by_key(|r| r.job);
        let completed = jobs.iter().filter(|r| r.outcome.is_completed()).count();
        let write_failures = jobs.iter().filter(|r| r.write_error.is_some()).count();
        Self {
            failed: jobs.len() - completed,
            completed,
            write_failures,
            jobs,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.jobs.iter().all(JobReport::succeeded)
    }
}

/// A job whose worker has been spawned but not yet reaped.
struct LiveJob {
    channel: Channel,
    span: Span,
    started: Instant,
}

pub struct Orchestrator<W> {
    config: OrchestratorConfig,
    writer: W,
}

impl<W: ResultWriter> Orchestrator<W> {
    pub fn new(config: OrchestratorConfig, writer: W) -> Self {
        Self { config, writer }
    }

    /// Process every input and return once all workers are accounted for.
    ///
    /// On an early error return every worker not yet reaped is killed.
    pub async fn run(&self, inputs: &[String]) -> Result<RunSummary> {
        if inputs.is_empty() {
            return Err(Error::Usage("no input files provided".to_string()));
        }

        let (tx, mut rx) = event::termination_queue();
        let mut ledger = JobLedger::new();
        let mut live: HashMap<JobId, LiveJob> = HashMap::with_capacity(inputs.len());
        let mut watchers = WatcherSet::with_capacity(inputs.len());

        for (index, input) in inputs.iter().enumerate() {
            let job = Job::new(JobId(index), input.clone());
            let span = start_job_span(&job);
            ledger.register(job.clone())?;

            let spawned = worker::spawn(&self.config.worker, &job)?;
            record_pid(&span, spawned.pid);
            ledger.mark_running(job.id, spawned.pid)?;
            record_state_transition(&span, JobState::Spawned, JobState::Running);
            metrics::jobs_spawned().add(1, &[]);

            watchers.push(event::watch(job.id, spawned.pid, spawned.child, tx.clone()));
            live.insert(
                job.id,
                LiveJob {
                    channel: spawned.channel,
                    span,
                    started: Instant::now(),
                },
            );
        }
        // Only the watchers hold senders now; the queue closes once they are done.
        drop(tx);

        info!(jobs = inputs.len(), "all workers spawned");

        let mut reports = Vec::with_capacity(inputs.len());
        while ledger.outstanding() > 0 {
            let Some(termination) = rx.recv().await else {
                return Err(Error::QueueClosed {
                    outstanding: ledger.outstanding(),
                });
            };
            let job = live
                .remove(&termination.job)
                .ok_or(Error::UnknownJob(termination.job))?;
            let span = job.span.clone();
            let report = self
                .reap(&mut ledger, job, termination)
                .instrument(span)
                .await?;
            reports.push(report);
        }

        let summary = RunSummary::from_reports(reports);
        info!(
            completed = summary.completed,
            failed = summary.failed,
            write_failures = summary.write_failures,
            "all workers accounted for"
        );
        Ok(summary)
    }

    /// Read a terminated worker's channel, settle its job, and persist the result.
    async fn reap(
        &self,
        ledger: &mut JobLedger,
        live: LiveJob,
        termination: Termination,
    ) -> Result<JobReport> {
        let id = termination.job;
        let pid = termination.pid;
        let strict = self.config.policy == FailurePolicy::Strict;

        let payload = match live.channel.receive().await {
            Err(source) if strict => return Err(Error::Transport { job: id, source }),
            other => other,
        };
        let outcome = worker::classify(&termination.status, payload);
        let settled = outcome.state();
        ledger.transition(id, settled)?;
        record_state_transition(&live.span, JobState::Running, settled);

        let duration_ms = live.started.elapsed().as_millis() as u64;
        let reason = match &outcome {
            WorkerOutcome::Completed(_) => "none",
            WorkerOutcome::Failed(reason) => reason.label(),
        };
        metrics::job_outcomes().add(
            1,
            &[
                KeyValue::new("outcome", settled.to_string()),
                KeyValue::new("reason", reason),
            ],
        );
        metrics::job_duration_ms().record(duration_ms as f64, &[]);

        let job = ledger.job(id).cloned().ok_or(Error::UnknownJob(id))?;
        let mut report = JobReport {
            job: id,
            input: job.input,
            pid,
            outcome,
            record: None,
            write_error: None,
            spawned_at: job.created_at,
            duration_ms,
        };

        match &report.outcome {
            WorkerOutcome::Completed(hist) => {
                let key = RecordKey { job: id, pid };
                match self.writer.write(&key, hist) {
                    Ok(path) => {
                        info!(
                            job = %id,
                            pid,
                            letters = hist.total(),
                            record = %path.display(),
                            duration_ms,
                            "job completed"
                        );
                        metrics::records_written().add(1, &[]);
                        report.record = Some(path);
                    }
                    Err(e) if strict => return Err(e),
                    Err(e) => {
                        warn!(job = %id, pid, error = %e, "record not written");
                        report.write_error = Some(e.to_string());
                    }
                }
            }
            WorkerOutcome::Failed(reason) => {
                warn!(
                    job = %id,
                    pid,
                    input = %report.input,
                    %reason,
                    duration_ms,
                    "job failed"
                );
                if strict {
                    return Err(Error::JobFailed {
                        job: id,
                        reason: reason.clone(),
                    });
                }
            }
        }

        ledger.transition(id, JobState::Reaped)?;
        record_state_transition(&live.span, settled, JobState::Reaped);
        Ok(report)
    }
}
