use crate::types::enums::CompositionStatus;
use crate::types::ids::{CompositionId, DepositionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A closed on-the-record span, in whole seconds from the recording anchor.
///
/// `stop < start` is possible when the caller's reference instant predates
/// the last `OnTheRecord` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecordingInterval {
    pub start: i64,
    pub stop: i64,
}

impl RecordingInterval {
    pub fn duration_secs(&self) -> i64 {
        self.stop - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Composition {
    pub id: CompositionId,
    pub deposition_id: DepositionId,
    pub status: CompositionStatus,
    pub recording_anchor: Option<DateTime<Utc>>,
    pub intervals: Vec<RecordingInterval>,
    pub media_uri: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
