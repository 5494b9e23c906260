use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use depo_core::error::{
    CaseError, CompositionError, DepoError, DepositionError, TranscriptionError,
};
use depo_core::types::IdError;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &DepoError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        DepoError::Case(case) => map_case_error(case),
        DepoError::Deposition(deposition) => map_deposition_error(deposition),
        DepoError::Composition(composition) => map_composition_error(composition),
        DepoError::Transcription(transcription) => map_transcription_error(transcription),
        DepoError::Internal { message } => {
            tracing::error!(%message, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message.clone(),
            )
        }
    };

    (
        status,
        Json(ErrorEnvelope {
            code,
            message,
            correlation_id,
        }),
    )
}

/// Parses a path id, answering 400 with the usual envelope on failure.
pub(crate) fn parse_id<T>(raw: &str, correlation_id: Option<String>) -> Result<T, Response>
where
    T: FromStr<Err = IdError>,
{
    raw.parse().map_err(|err: IdError| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorEnvelope {
                code: "invalid_input",
                message: err.to_string(),
                correlation_id,
            }),
        )
            .into_response()
    })
}

fn map_case_error(err: &CaseError) -> (StatusCode, &'static str, String) {
    match err {
        CaseError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        CaseError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_deposition_error(err: &DepositionError) -> (StatusCode, &'static str, String) {
    match err {
        DepositionError::NotFound | DepositionError::ParticipantNotFound => {
            (StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        DepositionError::InvalidTransition { .. } | DepositionError::InvalidState { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_state",
            err.to_string(),
        ),
        DepositionError::ScheduleConflict { .. } | DepositionError::Conflict { .. } => {
            (StatusCode::CONFLICT, "conflict", err.to_string())
        }
        DepositionError::AlreadyOnRecord | DepositionError::NotOnRecord => (
            StatusCode::PRECONDITION_FAILED,
            "precondition_failed",
            err.to_string(),
        ),
        DepositionError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_composition_error(err: &CompositionError) -> (StatusCode, &'static str, String) {
    match err {
        CompositionError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        CompositionError::NoEvents => (
            StatusCode::PRECONDITION_FAILED,
            "precondition_failed",
            err.to_string(),
        ),
        CompositionError::InvalidTransition { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_state",
            err.to_string(),
        ),
        CompositionError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_transcription_error(err: &TranscriptionError) -> (StatusCode, &'static str, String) {
    match err {
        TranscriptionError::DepositionNotInProgress => (
            StatusCode::PRECONDITION_FAILED,
            "precondition_failed",
            err.to_string(),
        ),
        TranscriptionError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depo_core::types::DepositionId;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (DepoError::Case(CaseError::NotFound), StatusCode::NOT_FOUND),
            (
                DepoError::Deposition(DepositionError::ScheduleConflict {
                    conflicting: DepositionId::generate(),
                }),
                StatusCode::CONFLICT,
            ),
            (
                DepoError::Deposition(DepositionError::NotOnRecord),
                StatusCode::PRECONDITION_FAILED,
            ),
            (
                DepoError::Composition(CompositionError::NoEvents),
                StatusCode::PRECONDITION_FAILED,
            ),
            (
                DepoError::Deposition(DepositionError::InvalidState {
                    message: "x".to_string(),
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (DepoError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let (status, Json(envelope)) = map_error(&err, Some("corr_1".to_string()));
            assert_eq!(status, expected, "{err}");
            assert_eq!(envelope.correlation_id.as_deref(), Some("corr_1"));
        }
    }

    #[test]
    fn bad_ids_are_invalid_input() {
        let response = parse_id::<DepositionId>("case_nope", None).unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
