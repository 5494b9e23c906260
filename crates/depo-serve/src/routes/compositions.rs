use crate::middleware::correlation::CorrelationId;
use crate::routes::error::{map_error, parse_id};
use crate::routes::with_deposition;
use crate::{build_depo, AppState};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use depo_core::error::{CompositionError, DepoError};
use depo_core::types::io::UpdateCompositionInput;
use depo_core::types::{Composition, CompositionId};
use depo_core::RequestContext;
use depo_events::types::EventSource;
use utoipa::ToSchema;

/// Body of the provider's "recording completed" callback.
#[derive(Debug, Default, serde::Deserialize, ToSchema)]
pub struct RecordingCompletedInput {
    completed_at: Option<DateTime<Utc>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/depositions/{id}/compositions",
            post(create_composition),
        )
        .route(
            "/depositions/{id}/compositions/latest",
            get(latest_composition),
        )
        .route("/compositions/{id}", get(get_composition))
        .route("/compositions/{id}/status", post(update_composition_status))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/compositions",
    params(("id" = String, Path, description = "Deposition ID")),
    request_body = RecordingCompletedInput,
    responses((status = 200, body = Composition), (status = 412))
)]
pub(crate) async fn create_composition(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<RecordingCompletedInput>,
) -> Response {
    let ctx = RequestContext::new(EventSource::Provider, Some(correlation.0));
    let completed_at = input.completed_at.unwrap_or(ctx.at);
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.compositions()
            .create_from_recording(&ctx, id, completed_at)
    })
}

#[utoipa::path(
    get,
    path = "/api/depositions/{id}/compositions/latest",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = Composition), (status = 404))
)]
pub(crate) async fn latest_composition(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    with_deposition(&state, &id, None, |depo, id| {
        depo.compositions()
            .latest(id)?
            .ok_or(DepoError::Composition(CompositionError::NotFound))
    })
}

#[utoipa::path(
    get,
    path = "/api/compositions/{id}",
    params(("id" = String, Path, description = "Composition ID")),
    responses((status = 200, body = Composition), (status = 404))
)]
pub(crate) async fn get_composition(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let composition_id: CompositionId = match parse_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let depo = match build_depo(&state) {
        Ok(depo) => depo,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match depo.compositions().get(&composition_id) {
        Ok(Some(composition)) => Json(composition).into_response(),
        Ok(None) => {
            map_error(&DepoError::Composition(CompositionError::NotFound), None).into_response()
        }
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/compositions/{id}/status",
    params(("id" = String, Path, description = "Composition ID")),
    request_body = UpdateCompositionInput,
    responses((status = 200, body = Composition), (status = 400), (status = 422))
)]
pub(crate) async fn update_composition_status(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCompositionInput>,
) -> Response {
    let composition_id: CompositionId = match parse_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let depo = match build_depo(&state) {
        Ok(depo) => depo,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::new(EventSource::Provider, Some(correlation.0));
    match depo
        .compositions()
        .update_status(&ctx, &composition_id, input)
    {
        Ok(composition) => Json(composition).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
