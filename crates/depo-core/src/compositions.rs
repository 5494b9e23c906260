use crate::error::CompositionError;
use crate::types::{
    Composition, CompositionId, CompositionStatus, DepositionId, RecordingInterval,
};
use chrono::{DateTime, Utc};

pub trait CompositionRepository {
    fn create(
        &self,
        deposition_id: &DepositionId,
        recording_anchor: Option<DateTime<Utc>>,
        intervals: Vec<RecordingInterval>,
    ) -> Result<Composition, CompositionError>;
    fn get(&self, id: &CompositionId) -> Result<Option<Composition>, CompositionError>;
    fn latest_for_deposition(
        &self,
        deposition_id: &DepositionId,
    ) -> Result<Option<Composition>, CompositionError>;
    fn update_status(
        &self,
        id: &CompositionId,
        status: CompositionStatus,
        media_uri: Option<String>,
    ) -> Result<Composition, CompositionError>;
}
