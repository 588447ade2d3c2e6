//! SuperKey error types

use crate::ledger::ForgedApplication;
use crate::request::StepKind;
use thiserror::Error;

/// Errors raised while forging or tearing down an application
#[derive(Error, Debug)]
pub enum SuperKeyError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Step {0} appears more than once in the request")]
    DuplicateStep(StepKind),

    #[error("Step {step} requires {requires} to have completed first")]
    MissingDependency { step: StepKind, requires: StepKind },

    #[error("Could not resolve placeholder {placeholder} from {source_name}")]
    UnresolvedSubstitution {
        placeholder: String,
        source_name: String,
    },

    #[error("Step {step} failed for {resource}: {source:#}")]
    StepFailed {
        step: StepKind,
        resource: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Teardown of {step} failed for {resource}: {source:#}")]
    CompensationFailed {
        step: StepKind,
        resource: String,
        #[source]
        source: anyhow::Error,
    },
}

impl SuperKeyError {
    /// Step kind this error is attributed to, if any
    pub fn step(&self) -> Option<StepKind> {
        match self {
            SuperKeyError::DuplicateStep(step)
            | SuperKeyError::MissingDependency { step, .. }
            | SuperKeyError::StepFailed { step, .. }
            | SuperKeyError::CompensationFailed { step, .. } => Some(*step),
            SuperKeyError::ProviderNotFound(_) | SuperKeyError::UnresolvedSubstitution { .. } => {
                None
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SuperKeyError>;

/// A forge attempt that stopped part way through.
///
/// Carries the partially populated ledger so the caller can tear down
/// whatever was already created.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct ForgeFailure {
    pub application: Box<ForgedApplication>,
    #[source]
    pub error: SuperKeyError,
}

impl ForgeFailure {
    pub fn new(application: ForgedApplication, error: SuperKeyError) -> Self {
        Self {
            application: Box::new(application),
            error,
        }
    }

    /// Split into the partial ledger and the error that stopped the forge
    pub fn into_parts(self) -> (ForgedApplication, SuperKeyError) {
        (*self.application, self.error)
    }
}
