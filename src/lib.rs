//! # letterfreq
//!
//! Letter-frequency histograms for a set of files, computed by one worker
//! process per file. The orchestrator collects each worker's result as it
//! terminates and writes one record per successful job.

pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod histogram;
pub mod model;
pub mod telemetry;
pub mod writer;

pub use error::{Error, Result};
