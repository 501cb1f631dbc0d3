//! Error kinds for the simulation core (§7).

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by the simulation engine's control surface and pipeline.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Bad date range, unsupported window, malformed request. Fails the
    /// command immediately; no state is mutated.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Another simulation is already `is_running=true`. Retryable.
    #[error("a simulation is already running")]
    ConcurrentSimulation,

    /// No Movements/Balances for a required day. Not fatal: the day is
    /// processed as if every ROI is 0.0.
    #[error("missing source data for {agent} on {date}")]
    MissingSourceData { agent: String, date: NaiveDate },

    /// Timeouts, connectivity. Retried with bounded backoff at the call
    /// site; on exhaustion the orchestrator fails the day.
    #[error("backend transient error: {0}")]
    BackendTransient(String),

    /// A persisted row is malformed (negative trade count, cohort size
    /// greater than N, ...). Fatal: the simulation is marked FAILED.
    #[error("backend invariant violated: {0}")]
    BackendInvariantViolation(String),

    /// External cancellation signal observed. The current day is allowed
    /// to finish before the simulation transitions to FAILED.
    #[error("simulation cancelled")]
    Cancelled,
}

pub type CoreResult<T> = Result<T, CoreError>;
