use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use ulid::Ulid;

#[derive(Clone, Debug)]
pub struct CorrelationId(pub String);

/// Email of the caller, taken from `x-actor-email` when present.
#[derive(Clone, Debug, Default)]
pub struct Actor(pub Option<String>);

const CORRELATION_HEADER: &str = "x-correlation-id";
const ACTOR_HEADER: &str = "x-actor-email";

fn header_text(request: &Request<Body>, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

pub async fn correlation_middleware(mut request: Request<Body>, next: Next) -> Response {
    let id = header_text(&request, CORRELATION_HEADER)
        .unwrap_or_else(|| format!("corr_{}", Ulid::new()));
    let actor = header_text(&request, ACTOR_HEADER).map(|email| email.to_lowercase());

    request.extensions_mut().insert(CorrelationId(id.clone()));
    request.extensions_mut().insert(Actor(actor));
    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(CORRELATION_HEADER), value);
    }
    response
}
