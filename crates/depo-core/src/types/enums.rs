use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum DepositionStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Canceled,
}

impl DepositionStatus {
    /// Statuses that still hold a slot on the calendar.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Completed | Self::Canceled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ParticipantRole {
    Witness,
    Attorney,
    CourtReporter,
    TechExpert,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum DepositionEventKind {
    StartDeposition,
    OnTheRecord,
    OffTheRecord,
    EndDeposition,
    ParticipantJoined,
    ParticipantLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum CompositionStatus {
    Queued,
    Available,
    Completed,
    Failed,
}
