use crate::middleware::correlation::CorrelationId;
use crate::routes::with_deposition;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use depo_core::types::io::AddTranscriptionInput;
use depo_core::types::{TimedTranscription, Transcription};
use depo_core::RequestContext;
use depo_events::types::EventSource;
use utoipa::ToSchema;

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct TranscriptionBody {
    speaker_email: Option<String>,
    text: String,
    /// Wall-clock time the utterance started. Defaults to the time of the request.
    at: Option<DateTime<Utc>>,
    #[serde(default)]
    duration_ms: u32,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/depositions/{id}/transcriptions",
            post(add_transcription).get(list_transcriptions),
        )
        .route("/depositions/{id}/transcriptions/timed", get(timed_transcriptions))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/transcriptions",
    params(("id" = String, Path, description = "Deposition ID")),
    request_body = TranscriptionBody,
    responses((status = 200, body = Transcription), (status = 412))
)]
pub(crate) async fn add_transcription(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(body): Json<TranscriptionBody>,
) -> Response {
    let ctx = RequestContext::new(EventSource::Provider, Some(correlation.0));
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        let input = AddTranscriptionInput {
            deposition_id: id.clone(),
            speaker_email: body.speaker_email,
            text: body.text,
            at: body.at.unwrap_or(ctx.at),
            duration_ms: body.duration_ms,
        };
        depo.transcriptions().add(&ctx, input)
    })
}

#[utoipa::path(
    get,
    path = "/api/depositions/{id}/transcriptions",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = Vec<Transcription>))
)]
pub(crate) async fn list_transcriptions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    with_deposition(&state, &id, None, |depo, id| depo.transcriptions().list(id))
}

#[utoipa::path(
    get,
    path = "/api/depositions/{id}/transcriptions/timed",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = Vec<TimedTranscription>), (status = 404))
)]
pub(crate) async fn timed_transcriptions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    with_deposition(&state, &id, None, |depo, id| depo.transcriptions().timed(id))
}
