//! Error types for the order session actor.

use crate::model::MealId;
use crate::session_actor::{AttemptId, CheckoutPhase};
use crate::validation::FieldError;
use thiserror::Error;

/// Errors that can occur while editing or checking out a session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    /// The requested session does not exist (or was abandoned).
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The meal is not on the menu.
    #[error("Meal not found: {0}")]
    MealNotFound(MealId),

    /// The customer profile failed validation. Every failing field is listed.
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Cart is empty")]
    EmptyCart,

    /// The notifier failed, rejected the order, or timed out.
    #[error("Order submission failed: {0}")]
    Submission(String),

    #[error("An order submission is already in progress")]
    SubmissionInProgress,

    #[error("Session cannot be edited while {0}")]
    NotEditing(CheckoutPhase),

    /// A completion arrived for an attempt that is no longer current.
    #[error("Stale submission: {0}")]
    StaleSubmission(AttemptId),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for SessionError {
    fn from(msg: String) -> Self {
        SessionError::ActorCommunicationError(msg)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
