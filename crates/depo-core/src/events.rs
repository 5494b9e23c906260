use crate::error::DepoError;
use depo_events::types::EventRecord;

pub trait EventRepository {
    fn append(&self, event: EventRecord) -> Result<EventRecord, DepoError>;
    fn list(&self, after: Option<i64>, limit: Option<u32>) -> Result<Vec<EventRecord>, DepoError>;
}
