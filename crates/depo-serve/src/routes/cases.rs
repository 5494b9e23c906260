use crate::middleware::correlation::CorrelationId;
use crate::routes::error::{map_error, parse_id};
use crate::{build_depo, AppState};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use depo_core::error::{CaseError, DepoError};
use depo_core::types::io::CreateCaseInput;
use depo_core::types::{Case, CaseId};
use depo_core::RequestContext;
use depo_events::types::EventSource;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/cases", post(create_case).get(list_cases))
        .route("/cases/{id}", get(get_case))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/cases",
    request_body = CreateCaseInput,
    responses((status = 200, body = Case))
)]
pub(crate) async fn create_case(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateCaseInput>,
) -> Response {
    let depo = match build_depo(&state) {
        Ok(depo) => depo,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::new(EventSource::Api, Some(correlation.0));
    match depo.cases().create(&ctx, input) {
        Ok(case) => Json(case).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/cases",
    responses((status = 200, body = Vec<Case>))
)]
pub(crate) async fn list_cases(State(state): State<AppState>) -> Response {
    let depo = match build_depo(&state) {
        Ok(depo) => depo,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match depo.cases().list() {
        Ok(cases) => Json(cases).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/cases/{id}",
    params(("id" = String, Path, description = "Case ID")),
    responses((status = 200, body = Case), (status = 404))
)]
pub(crate) async fn get_case(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let case_id: CaseId = match parse_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let depo = match build_depo(&state) {
        Ok(depo) => depo,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match depo.cases().get(&case_id) {
        Ok(Some(case)) => Json(case).into_response(),
        Ok(None) => map_error(&DepoError::Case(CaseError::NotFound), None).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}
