use thiserror::Error;

use crate::state::{Operation, Phase};

/// Why a workflow operation did not go through.
///
/// `Validation`, `ConcurrentOperation` and `InvalidState` leave the session
/// untouched. The collaborator failures (`Upload`, `Analysis`, `Question`) have
/// already been recorded in the session when they are returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("upload failed: {0}")]
    Upload(String),

    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error("question failed: {0}")]
    Question(String),

    #[error("{0}")]
    Validation(String),

    #[error("cannot start: {0} already in progress")]
    ConcurrentOperation(Operation),

    #[error("cannot {operation} while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: Phase,
    },
}
