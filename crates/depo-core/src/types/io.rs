use crate::types::enums::{CompositionStatus, DepositionStatus, ParticipantRole};
use crate::types::ids::{CaseId, DepositionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateCaseInput {
    pub name: String,
    pub case_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleDepositionInput {
    pub case_id: CaseId,
    pub witness_name: String,
    pub witness_email: String,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub video_recording: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RescheduleInput {
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct DepositionFilter {
    pub case_id: Option<CaseId>,
    pub status: Option<DepositionStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddParticipantInput {
    pub name: String,
    pub email: String,
    pub role: ParticipantRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddTranscriptionInput {
    pub deposition_id: DepositionId,
    pub speaker_email: Option<String>,
    pub text: String,
    pub at: DateTime<Utc>,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateCompositionInput {
    pub status: CompositionStatus,
    pub media_uri: Option<String>,
}
