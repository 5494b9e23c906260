use crate::types::enums::{CompositionStatus, DepositionStatus};
use crate::types::ids::DepositionId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaseError {
    #[error("case not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum DepositionError {
    #[error("deposition not found")]
    NotFound,
    #[error("participant not found")]
    ParticipantNotFound,
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: DepositionStatus,
        to: DepositionStatus,
    },
    #[error("schedule conflicts with deposition {conflicting}")]
    ScheduleConflict { conflicting: DepositionId },
    #[error("already on the record")]
    AlreadyOnRecord,
    #[error("not on the record")]
    NotOnRecord,
    #[error("invalid state: {message}")]
    InvalidState { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("conflict: {message}")]
    Conflict { message: String },
}

#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("composition not found")]
    NotFound,
    #[error("deposition has no timeline events")]
    NoEvents,
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: CompositionStatus,
        to: CompositionStatus,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("deposition is not in progress")]
    DepositionNotInProgress,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum DepoError {
    #[error(transparent)]
    Case(#[from] CaseError),
    #[error(transparent)]
    Deposition(#[from] DepositionError),
    #[error(transparent)]
    Composition(#[from] CompositionError),
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DepoError {
    pub fn internal(err: impl ToString) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}
