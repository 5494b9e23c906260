pub mod config;
pub mod middleware;
pub mod openapi;
pub mod routes;

use axum::Router;
use depo_core::{Depo, DepoError, ScheduleRules};
use depo_db::schema;
use depo_db::store::DbStore;
use depo_events::bus::EventBus;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub db_path: String,
    pub event_bus: EventBus,
    pub rules: ScheduleRules,
}

impl AppState {
    pub fn new(db_path: impl Into<String>, rules: ScheduleRules) -> Self {
        Self {
            db_path: db_path.into(),
            event_bus: EventBus::new(256),
            rules,
        }
    }
}

pub fn build_depo(state: &AppState) -> Result<Depo<DbStore>, DepoError> {
    let conn = schema::open_and_migrate(&state.db_path).map_err(DepoError::internal)?;
    let store = DbStore::new(conn);
    Ok(Depo::new(store, state.event_bus.clone()).with_rules(state.rules))
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, db_path = %state.db_path, "depo api listening");
    axum::serve(listener, app(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct TestApp {
        _dir: tempfile::TempDir,
        state: AppState,
    }

    impl TestApp {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let db_path = dir.path().join("depo.db");
            let state = AppState::new(db_path.to_string_lossy(), ScheduleRules::default());
            Self { _dir: dir, state }
        }

        async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let (status, _, body) = self.call_with(method, uri, body, &[]).await;
            (status, body)
        }

        async fn call_with(
            &self,
            method: Method,
            uri: &str,
            body: Option<Value>,
            headers: &[(&str, &str)],
        ) -> (StatusCode, axum::http::HeaderMap, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            for (name, value) in headers {
                builder = builder.header(*name, *value);
            }
            let request = match body {
                Some(body) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            let response = app(self.state.clone()).oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, headers, value)
        }

        async fn seed_deposition(&self) -> String {
            let (status, case) = self
                .call(
                    Method::POST,
                    "/api/cases",
                    Some(json!({"name": "Alvarez v. Tern Logistics", "case_number": "22-cv-1187"})),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            let (status, deposition) = self
                .call(
                    Method::POST,
                    "/api/depositions",
                    Some(json!({
                        "case_id": case["id"],
                        "witness_name": "Dana Whitcomb",
                        "witness_email": "dana@example.com",
                        "start_at": "2031-05-06T15:00:00Z",
                        "video_recording": true
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(deposition["status"], "Pending");
            deposition["id"].as_str().unwrap().to_string()
        }
    }

    #[tokio::test]
    async fn recording_lifecycle_over_http() {
        let app = TestApp::new();
        let id = app.seed_deposition().await;

        let (status, body) = app
            .call(Method::POST, &format!("/api/depositions/{id}/start"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "InProgress");

        let (status, _) = app
            .call(Method::POST, &format!("/api/depositions/{id}/on-record"), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, timeline) = app
            .call(Method::GET, &format!("/api/depositions/{id}/timeline"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let kinds: Vec<_> = timeline
            .as_array()
            .unwrap()
            .iter()
            .map(|event| event["kind"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(kinds, vec!["StartDeposition", "OnTheRecord"]);

        let (status, intervals) = app
            .call(
                Method::GET,
                &format!("/api/depositions/{id}/intervals?now=2099-01-01T00:00:00Z"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(intervals.as_array().unwrap().len(), 1);

        let (status, body) = app
            .call(Method::POST, &format!("/api/depositions/{id}/end"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Completed");

        let (status, composition) = app
            .call(
                Method::POST,
                &format!("/api/depositions/{id}/compositions"),
                Some(json!({})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(composition["status"], "Queued");
        assert_eq!(composition["intervals"].as_array().unwrap().len(), 1);

        let composition_id = composition["id"].as_str().unwrap();
        let (status, updated) = app
            .call(
                Method::POST,
                &format!("/api/compositions/{composition_id}/status"),
                Some(json!({"status": "Available", "media_uri": "s3://depo/trimmed.mp4"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["media_uri"], "s3://depo/trimmed.mp4");

        let (status, events) = app.call(Method::GET, "/api/events", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(events.as_array().unwrap().len() >= 8);
    }

    #[tokio::test]
    async fn errors_use_the_envelope_and_echo_correlation() {
        let app = TestApp::new();
        let id = app.seed_deposition().await;

        let (status, headers, body) = app
            .call_with(
                Method::POST,
                &format!("/api/depositions/{id}/off-record"),
                None,
                &[("x-correlation-id", "corr_fixed")],
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "invalid_state");
        assert_eq!(body["correlation_id"], "corr_fixed");
        assert_eq!(headers["x-correlation-id"], "corr_fixed");

        let (status, body) = app
            .call(Method::GET, "/api/depositions/not-an-id", None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_input");

        let (status, body) = app
            .call(
                Method::GET,
                &format!("/api/depositions/{}", depo_core::types::DepositionId::generate()),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn double_booking_a_witness_conflicts() {
        let app = TestApp::new();
        let id = app.seed_deposition().await;
        let (_, existing) = app
            .call(Method::GET, &format!("/api/depositions/{id}"), None)
            .await;

        let (status, body) = app
            .call(
                Method::POST,
                "/api/depositions",
                Some(json!({
                    "case_id": existing["case_id"],
                    "witness_name": "Dana Whitcomb",
                    "witness_email": "Dana@Example.com",
                    "start_at": "2031-05-06T16:00:00Z"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");
    }

    #[tokio::test]
    async fn presence_requires_actor_header() {
        let app = TestApp::new();
        let id = app.seed_deposition().await;
        app.call(Method::POST, &format!("/api/depositions/{id}/start"), None)
            .await;

        let (status, _) = app
            .call(Method::POST, &format!("/api/depositions/{id}/join"), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, event) = app
            .call_with(
                Method::POST,
                &format!("/api/depositions/{id}/join"),
                None,
                &[("x-actor-email", "Reporter@Example.com")],
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(event["kind"], "ParticipantJoined");
        assert_eq!(event["actor_email"], "reporter@example.com");
    }
}
