//! Structured error types for the fair share simulator.
//!
//! The engine's stepping path never fails; every error here comes from a
//! boundary: building an engine, validating configuration, loading a
//! workload file, or importing an exported timeline.

use crate::process::ProcessId;

/// The top-level error type for the simulator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum FairShareError {
    // ── Configuration errors ──────────────────────────────

    /// The global quantum was zero.
    #[error("global quantum must be a positive integer")]
    InvalidQuantum,

    /// A group assignment asked for zero groups.
    #[error("group count must be a positive integer")]
    InvalidGroupCount,

    // ── Workload errors ───────────────────────────────────

    /// A process was declared with no CPU time to consume.
    #[error("process {0} has a zero burst time")]
    ZeroBurst(ProcessId),

    /// The same process id was declared twice.
    #[error("process {0} is declared more than once")]
    DuplicateProcess(ProcessId),

    /// The workload could not finish before simulation time runs out.
    #[error("workload runs past the end of simulation time")]
    TimeOverflow,

    /// A workload line could not be parsed.
    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    // ── Timeline errors ───────────────────────────────────

    /// An exported timeline could not be read back.
    #[error("invalid timeline: {0}")]
    InvalidTimeline(String),

    // ── I/O ───────────────────────────────────────────────

    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FairShareError {
    fn from(err: std::io::Error) -> Self {
        FairShareError::Io(err.to_string())
    }
}

/// Convenience alias for `Result<T, FairShareError>`.
pub type FairShareResult<T> = Result<T, FairShareError>;
