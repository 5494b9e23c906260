use crate::types::enums::{DepositionStatus, ParticipantRole};
use crate::types::ids::{CaseId, DepositionId, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Deposition {
    pub id: DepositionId,
    pub case_id: CaseId,
    pub witness_name: String,
    pub witness_email: String,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub status: DepositionStatus,
    pub video_recording: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Participant {
    pub id: ParticipantId,
    pub deposition_id: DepositionId,
    pub name: String,
    pub email: String,
    pub role: ParticipantRole,
    pub created_at: DateTime<Utc>,
}
