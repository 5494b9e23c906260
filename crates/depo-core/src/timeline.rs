use crate::error::DepositionError;
use crate::types::{DepositionEvent, DepositionEventKind, DepositionId};
use chrono::{DateTime, Utc};

pub trait TimelineRepository {
    fn append(
        &self,
        deposition_id: &DepositionId,
        kind: DepositionEventKind,
        at: DateTime<Utc>,
        actor_email: Option<String>,
    ) -> Result<DepositionEvent, DepositionError>;
    /// Ordered by `at`, ties broken by insertion order.
    fn list(&self, deposition_id: &DepositionId) -> Result<Vec<DepositionEvent>, DepositionError>;
}
