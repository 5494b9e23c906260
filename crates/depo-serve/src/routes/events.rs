use crate::routes::error::map_error;
use crate::{build_depo, AppState};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use depo_events::types::EventRecord;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct EventsQuery {
    after: Option<i64>,
    limit: Option<u32>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/stream", get(stream))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventsQuery),
    responses((status = 200, body = Vec<EventRecord>))
)]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Response {
    let depo = match build_depo(&state) {
        Ok(depo) => depo,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match depo.events().list(query.after, query.limit) {
        Ok(events) => Json(events).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events/stream",
    responses((status = 101, description = "WebSocket of live activity events"))
)]
pub(crate) async fn stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_stream(socket, state))
}

async fn handle_stream(socket: WebSocket, state: AppState) {
    let (sink, incoming) = socket.split();
    forward_events(state.event_bus.subscribe(), sink, incoming).await;
}

/// Pushes each bus event to `sink` as JSON text until the client closes or
/// the bus shuts down.
async fn forward_events<Tx, Rx, E>(
    mut receiver: broadcast::Receiver<EventRecord>,
    mut sink: Tx,
    mut incoming: Rx,
) where
    Tx: Sink<Message> + Unpin,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
{
    loop {
        tokio::select! {
            event = receiver.recv() => match event {
                Ok(event) => {
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(err) => {
                            tracing::warn!(%err, seq = event.seq, "failed to serialize activity event");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            message = incoming.next() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use depo_events::bus::EventBus;
    use depo_events::types::EventSource;
    use futures::channel::mpsc;

    fn record(seq: i64) -> EventRecord {
        EventRecord {
            id: format!("evt_{seq}"),
            seq,
            at: Utc::now(),
            correlation_id: Some("corr_stream".to_string()),
            source: EventSource::Api,
            body: serde_json::json!({ "type": "DepositionStarted" }),
        }
    }

    #[tokio::test]
    async fn published_events_reach_the_socket_until_close() {
        let bus = EventBus::new(8);
        let (sink, mut sent) = mpsc::unbounded::<Message>();
        let (client, incoming) = mpsc::unbounded::<Result<Message, axum::Error>>();
        let task = tokio::spawn(forward_events(bus.subscribe(), sink, incoming));

        bus.publish(record(7)).unwrap();
        let Some(Message::Text(text)) = sent.next().await else {
            panic!("expected a text frame");
        };
        let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(value["seq"], 7);
        assert_eq!(value["correlation_id"], "corr_stream");
        assert_eq!(value["body"]["type"], "DepositionStarted");

        client.unbounded_send(Ok(Message::Close(None))).unwrap();
        task.await.unwrap();
        assert!(sent.next().await.is_none());
    }

    #[tokio::test]
    async fn stream_ends_when_the_bus_is_dropped() {
        let bus = EventBus::new(8);
        let receiver = bus.subscribe();
        drop(bus);
        let (sink, _sent) = mpsc::unbounded::<Message>();
        let (_client, incoming) = mpsc::unbounded::<Result<Message, axum::Error>>();
        forward_events(receiver, sink, incoming).await;
    }
}
