use crate::types::EventRecord;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventRecord>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    /// Fails only when nobody is subscribed.
    pub fn publish(
        &self,
        event: EventRecord,
    ) -> Result<usize, broadcast::error::SendError<EventRecord>> {
        self.sender.send(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventSource;
    use chrono::Utc;

    fn record(seq: i64) -> EventRecord {
        EventRecord {
            id: format!("evt_{seq}"),
            seq,
            at: Utc::now(),
            correlation_id: None,
            source: EventSource::Api,
            body: serde_json::json!({ "type": "Test" }),
        }
    }

    #[test]
    fn publish_without_subscribers_is_an_error() {
        let bus = EventBus::new(4);
        assert!(bus.publish(record(1)).is_err());
    }

    #[test]
    fn subscribers_receive_in_publish_order() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        bus.publish(record(1)).unwrap();
        bus.publish(record(2)).unwrap();
        assert_eq!(rx.try_recv().unwrap().seq, 1);
        assert_eq!(rx.try_recv().unwrap().seq, 2);
    }
}
