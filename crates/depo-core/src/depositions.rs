use crate::error::DepositionError;
use crate::types::io::{AddParticipantInput, DepositionFilter, ScheduleDepositionInput};
use crate::types::{Deposition, DepositionId, DepositionStatus, Participant, ParticipantId};
use chrono::{DateTime, Utc};

pub trait DepositionRepository {
    fn create(&self, input: ScheduleDepositionInput) -> Result<Deposition, DepositionError>;
    fn get(&self, id: &DepositionId) -> Result<Option<Deposition>, DepositionError>;
    fn list(&self, filter: DepositionFilter) -> Result<Vec<Deposition>, DepositionError>;
    /// Every deposition whose witness email matches, case-insensitively.
    fn list_for_witness(&self, witness_email: &str) -> Result<Vec<Deposition>, DepositionError>;
    fn reschedule(
        &self,
        id: &DepositionId,
        start_at: DateTime<Utc>,
        end_at: Option<DateTime<Utc>>,
    ) -> Result<Deposition, DepositionError>;
    fn set_status(
        &self,
        id: &DepositionId,
        status: DepositionStatus,
    ) -> Result<Deposition, DepositionError>;
}

pub trait ParticipantRepository {
    fn add(
        &self,
        deposition_id: &DepositionId,
        input: AddParticipantInput,
    ) -> Result<Participant, DepositionError>;
    fn remove(
        &self,
        deposition_id: &DepositionId,
        participant_id: &ParticipantId,
    ) -> Result<(), DepositionError>;
    fn list(&self, deposition_id: &DepositionId) -> Result<Vec<Participant>, DepositionError>;
}
