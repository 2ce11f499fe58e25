//! Harness error type

use appservice_core::provider::ProviderError;
use appservice_provider::ConfigError;
use thiserror::Error;

/// Errors raised while running an acceptance test
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Provider credentials could not be read from the environment
    #[error("provider configuration: {0}")]
    Config(#[from] ConfigError),

    /// A terraform command exited unsuccessfully
    #[error("terraform {command} failed: {stderr}")]
    Terraform { command: String, stderr: String },

    /// The step declared an expected error but the apply succeeded
    #[error("step {step}: expected an error matching {pattern:?} but the apply succeeded")]
    ExpectedError { step: usize, pattern: String },

    /// The apply failed with an error the step did not expect
    #[error("step {step}: error did not match {pattern:?}: {stderr}")]
    UnexpectedError {
        step: usize,
        pattern: String,
        stderr: String,
    },

    /// A plan after apply still wanted to change something
    #[error("step {step}: after applying this step the plan was not empty")]
    NonEmptyPlan { step: usize },

    /// One or more checks failed
    #[error("check failed: {0}")]
    CheckFailed(String),

    /// The imported state differs from the applied one
    #[error("import of {address}: imported attributes differ: {}", .differences.join(", "))]
    ImportMismatch {
        address: String,
        differences: Vec<String>,
    },

    /// A step needs state that is not there
    #[error("{0} was not found in the state")]
    MissingInstance(String),

    /// A resource survived the final destroy
    #[error("{0} still exists")]
    NotDestroyed(String),

    /// The state file is corrupted or invalid
    #[error("invalid state file: {0}")]
    InvalidState(String),

    #[error("existence check: {0}")]
    Provider(#[from] ProviderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
