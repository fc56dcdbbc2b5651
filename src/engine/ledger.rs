//! Per-job bookkeeping for one run.
//!
//! Every job moves `Spawned -> Running -> {Completed, Failed} -> Reaped`.
//! The outstanding count drops exactly once per job, when it settles.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{Job, JobId, JobState};

#[derive(Debug)]
struct Entry {
    job: Job,
    state: JobState,
    pid: Option<u32>,
}

/// State table for all jobs in a run. Owned by the orchestrator's collection path.
#[derive(Debug, Default)]
pub struct JobLedger {
    entries: HashMap<JobId, Entry>,
    outstanding: usize,
}

impl JobLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new job in the `Spawned` state.
    pub fn register(&mut self, job: Job) -> Result<()> {
        if self.entries.contains_key(&job.id) {
            return Err(Error::Other(format!("job {} registered twice", job.id)));
        }
        self.entries.insert(
            job.id,
            Entry {
                job,
                state: JobState::Spawned,
                pid: None,
            },
        );
        self.outstanding += 1;
        Ok(())
    }

    /// Record the worker pid and move the job to `Running`.
    pub fn mark_running(&mut self, id: JobId, pid: u32) -> Result<()> {
        self.transition(id, JobState::Running)?;
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.pid = Some(pid);
        }
        Ok(())
    }

    /// Apply one state transition, rejecting anything off the lifecycle graph.
    pub fn transition(&mut self, id: JobId, to: JobState) -> Result<()> {
        let entry = self.entries.get_mut(&id).ok_or(Error::UnknownJob(id))?;
        let from = entry.state;
        if !from.can_transition_to(to) {
            return Err(Error::InvalidTransition { job: id, from, to });
        }
        entry.state = to;
        if to.is_settled() {
            self.outstanding -= 1;
        }
        Ok(())
    }

    pub fn state(&self, id: JobId) -> Option<JobState> {
        self.entries.get(&id).map(|e| e.state)
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.entries.get(&id).map(|e| &e.job)
    }

    pub fn pid(&self, id: JobId) -> Option<u32> {
        self.entries.get(&id).and_then(|e| e.pid)
    }

    /// Jobs whose worker outcome has not been observed yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all_reaped(&self) -> bool {
        self.entries.values().all(|e| e.state.is_terminal())
    }
}
