//! Workflow controller for the single-document session: upload, analysis,
//! questions, and the error banner, as an explicit state machine.
//!
//! [`Session`] is the pure reducer; [`WorkflowController`] drives it against a
//! [`DocumentService`](clauselens_core::DocumentService) and owns the timers.

mod controller;
mod drag;
mod error;
mod progress;
mod state;

pub use controller::{ERROR_CLEAR_AFTER, WorkflowController};
pub use drag::DragCounter;
pub use error::WorkflowError;
pub use progress::{PROGRESS_CAP, PROGRESS_INTERVAL, PROGRESS_STEP, SimulatedProgress};
pub use state::{Effect, ErrorNotice, Event, Operation, Phase, QuestionState, Session, StablePhase};
