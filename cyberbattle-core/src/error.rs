//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum CyberBattleError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// An environment variable could not be parsed.
    #[error("Invalid value {value:?} for environment variable {name}")]
    InvalidEnvVar {
        /// Name of the variable.
        name: String,
        /// Raw value of the variable.
        value: String,
    },

    /// Checkpoint name is neither `none`, `best` nor a number of steps.
    #[error("Checkpoint name {0} is not none, best or stepsdone number")]
    InvalidCheckpoint(String),

    /// Steps of an episode trace must be strictly increasing.
    #[error("Trace step {step} does not follow step {previous}")]
    TraceStepOrder {
        /// Last step in the trace.
        previous: usize,
        /// Rejected step.
        step: usize,
    },

    /// Cumulative reward of a trace row differs from the running sum of the rewards.
    #[error("Cumulative reward {found} of trace step {step} differs from the sum of rewards {expected}")]
    TraceCumulativeReward {
        /// Step of the row.
        step: usize,
        /// Running sum of the rewards.
        expected: f32,
        /// Cumulative reward of the row.
        found: f32,
    },

    /// The environment cannot translate the command into an action.
    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),
}
