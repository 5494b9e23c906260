use crate::middleware::correlation::CorrelationId;
use crate::routes::error::{map_error, parse_id};
use crate::routes::with_deposition;
use crate::{build_depo, AppState};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use depo_core::error::{DepoError, DepositionError};
use depo_core::types::io::{
    AddParticipantInput, DepositionFilter, RescheduleInput, ScheduleDepositionInput,
};
use depo_core::types::{Deposition, Participant, ParticipantId};
use depo_core::RequestContext;
use depo_events::types::EventSource;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/depositions",
            post(schedule_deposition).get(list_depositions),
        )
        .route("/depositions/{id}", get(get_deposition))
        .route("/depositions/{id}/reschedule", post(reschedule_deposition))
        .route("/depositions/{id}/confirm", post(confirm_deposition))
        .route("/depositions/{id}/cancel", post(cancel_deposition))
        .route(
            "/depositions/{id}/participants",
            post(add_participant).get(list_participants),
        )
        .route(
            "/depositions/{id}/participants/{participant_id}",
            delete(remove_participant),
        )
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/depositions",
    request_body = ScheduleDepositionInput,
    responses((status = 200, body = Deposition), (status = 409))
)]
pub(crate) async fn schedule_deposition(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<ScheduleDepositionInput>,
) -> Response {
    let depo = match build_depo(&state) {
        Ok(depo) => depo,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::new(EventSource::Api, Some(correlation.0));
    match depo.depositions().schedule(&ctx, input) {
        Ok(deposition) => Json(deposition).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/depositions",
    params(DepositionFilter),
    responses((status = 200, body = Vec<Deposition>))
)]
pub(crate) async fn list_depositions(
    State(state): State<AppState>,
    Query(filter): Query<DepositionFilter>,
) -> Response {
    let depo = match build_depo(&state) {
        Ok(depo) => depo,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match depo.depositions().list(filter) {
        Ok(depositions) => Json(depositions).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/depositions/{id}",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = Deposition), (status = 404))
)]
pub(crate) async fn get_deposition(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    with_deposition(&state, &id, None, |depo, id| {
        depo.depositions()
            .get(id)?
            .ok_or(DepoError::Deposition(DepositionError::NotFound))
    })
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/reschedule",
    params(("id" = String, Path, description = "Deposition ID")),
    request_body = RescheduleInput,
    responses((status = 200, body = Deposition), (status = 409), (status = 422))
)]
pub(crate) async fn reschedule_deposition(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<RescheduleInput>,
) -> Response {
    let ctx = RequestContext::new(EventSource::Api, Some(correlation.0));
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.depositions().reschedule(&ctx, id, input)
    })
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/confirm",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = Deposition), (status = 422))
)]
pub(crate) async fn confirm_deposition(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
) -> Response {
    let ctx = RequestContext::new(EventSource::Api, Some(correlation.0));
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.depositions().confirm(&ctx, id)
    })
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/cancel",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = Deposition), (status = 422))
)]
pub(crate) async fn cancel_deposition(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
) -> Response {
    let ctx = RequestContext::new(EventSource::Api, Some(correlation.0));
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.depositions().cancel(&ctx, id)
    })
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/participants",
    params(("id" = String, Path, description = "Deposition ID")),
    request_body = AddParticipantInput,
    responses((status = 200, body = Participant), (status = 409))
)]
pub(crate) async fn add_participant(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<AddParticipantInput>,
) -> Response {
    let ctx = RequestContext::new(EventSource::Api, Some(correlation.0));
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.depositions().add_participant(&ctx, id, input)
    })
}

#[utoipa::path(
    get,
    path = "/api/depositions/{id}/participants",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = Vec<Participant>))
)]
pub(crate) async fn list_participants(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    with_deposition(&state, &id, None, |depo, id| {
        depo.depositions().participants(id)
    })
}

#[utoipa::path(
    delete,
    path = "/api/depositions/{id}/participants/{participant_id}",
    params(
        ("id" = String, Path, description = "Deposition ID"),
        ("participant_id" = String, Path, description = "Participant ID")
    ),
    responses((status = 200), (status = 404))
)]
pub(crate) async fn remove_participant(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path((id, participant_id)): Path<(String, String)>,
) -> Response {
    let ctx = RequestContext::new(EventSource::Api, Some(correlation.0));
    let participant_id: ParticipantId = match parse_id(&participant_id, ctx.correlation_id.clone())
    {
        Ok(value) => value,
        Err(response) => return response,
    };
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.depositions()
            .remove_participant(&ctx, id, &participant_id)
    })
}
