pub mod cases;
pub mod compositions;
pub mod depositions;
pub mod error;
pub mod events;
pub mod timeline;
pub mod transcriptions;

use crate::middleware::correlation::correlation_middleware;
use crate::routes::error::{map_error, parse_id};
use crate::{build_depo, openapi, AppState};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use depo_core::types::DepositionId;
use depo_core::{Depo, DepoError};
use depo_db::store::DbStore;
use serde::Serialize;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(cases::router(state.clone()))
        .merge(depositions::router(state.clone()))
        .merge(timeline::router(state.clone()))
        .merge(compositions::router(state.clone()))
        .merge(transcriptions::router(state.clone()))
        .merge(events::router(state))
        .merge(openapi::router())
        .route_layer(middleware::from_fn(correlation_middleware));

    Router::new().nest("/api", api)
}

/// Shared body of the `/depositions/{id}/...` handlers: parse the id, open
/// the store, run `f` and render its result as JSON or an error envelope.
pub(crate) fn with_deposition<T, F>(
    state: &AppState,
    raw_id: &str,
    correlation_id: Option<String>,
    f: F,
) -> Response
where
    T: Serialize,
    F: FnOnce(&Depo<DbStore>, &DepositionId) -> Result<T, DepoError>,
{
    let deposition_id: DepositionId = match parse_id(raw_id, correlation_id.clone()) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let depo = match build_depo(state) {
        Ok(depo) => depo,
        Err(err) => return map_error(&err, correlation_id).into_response(),
    };
    match f(&depo, &deposition_id) {
        Ok(value) => Json(value).into_response(),
        Err(err) => map_error(&err, correlation_id).into_response(),
    }
}
