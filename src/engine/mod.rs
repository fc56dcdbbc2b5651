//! Orchestration engine: worker processes, job bookkeeping, result collection.

pub mod ledger;
pub mod orchestrator;
pub mod worker;

pub use ledger::JobLedger;
pub use orchestrator::{FailurePolicy, JobReport, Orchestrator, OrchestratorConfig, RunSummary};
pub use worker::{WorkerCommand, WorkerExit};
