use crate::middleware::correlation::{Actor, CorrelationId};
use crate::routes::with_deposition;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Router};
use chrono::{DateTime, Utc};
use depo_core::types::{Deposition, DepositionEvent, RecordingInterval};
use depo_core::RequestContext;
use depo_events::types::EventSource;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct IntervalsQuery {
    /// Closes a still-open record span. Defaults to the time of the request.
    now: Option<DateTime<Utc>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/depositions/{id}/start", post(start_deposition))
        .route("/depositions/{id}/on-record", post(go_on_record))
        .route("/depositions/{id}/off-record", post(go_off_record))
        .route("/depositions/{id}/join", post(join_deposition))
        .route("/depositions/{id}/leave", post(leave_deposition))
        .route("/depositions/{id}/end", post(end_deposition))
        .route("/depositions/{id}/timeline", get(list_timeline))
        .route("/depositions/{id}/intervals", get(recording_intervals))
        .with_state(state)
}

fn context(correlation: CorrelationId, actor: Actor) -> RequestContext {
    RequestContext::new(EventSource::Api, Some(correlation.0)).with_actor(actor.0)
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/start",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = Deposition), (status = 422))
)]
pub(crate) async fn start_deposition(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Response {
    let ctx = context(correlation, actor);
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.timeline().start(&ctx, id)
    })
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/on-record",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = DepositionEvent), (status = 412), (status = 422))
)]
pub(crate) async fn go_on_record(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Response {
    let ctx = context(correlation, actor);
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.timeline().go_on_record(&ctx, id)
    })
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/off-record",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = DepositionEvent), (status = 412), (status = 422))
)]
pub(crate) async fn go_off_record(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Response {
    let ctx = context(correlation, actor);
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.timeline().go_off_record(&ctx, id)
    })
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/join",
    params(
        ("id" = String, Path, description = "Deposition ID"),
        ("x-actor-email" = String, Header, description = "Joining participant")
    ),
    responses((status = 200, body = DepositionEvent), (status = 400))
)]
pub(crate) async fn join_deposition(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Response {
    let ctx = context(correlation, actor);
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.timeline().join(&ctx, id)
    })
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/leave",
    params(
        ("id" = String, Path, description = "Deposition ID"),
        ("x-actor-email" = String, Header, description = "Leaving participant")
    ),
    responses((status = 200, body = DepositionEvent), (status = 400))
)]
pub(crate) async fn leave_deposition(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Response {
    let ctx = context(correlation, actor);
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.timeline().leave(&ctx, id)
    })
}

#[utoipa::path(
    post,
    path = "/api/depositions/{id}/end",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = Deposition), (status = 422))
)]
pub(crate) async fn end_deposition(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Response {
    let ctx = context(correlation, actor);
    with_deposition(&state, &id, ctx.correlation_id.clone(), |depo, id| {
        depo.timeline().end(&ctx, id)
    })
}

#[utoipa::path(
    get,
    path = "/api/depositions/{id}/timeline",
    params(("id" = String, Path, description = "Deposition ID")),
    responses((status = 200, body = Vec<DepositionEvent>))
)]
pub(crate) async fn list_timeline(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    with_deposition(&state, &id, None, |depo, id| depo.timeline().list(id))
}

#[utoipa::path(
    get,
    path = "/api/depositions/{id}/intervals",
    params(("id" = String, Path, description = "Deposition ID"), IntervalsQuery),
    responses((status = 200, body = Vec<RecordingInterval>))
)]
pub(crate) async fn recording_intervals(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<IntervalsQuery>,
) -> Response {
    let now = query.now.unwrap_or_else(Utc::now);
    with_deposition(&state, &id, None, |depo, id| {
        depo.timeline().recording_intervals(id, now)
    })
}
