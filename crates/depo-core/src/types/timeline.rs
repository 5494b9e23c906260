use crate::types::enums::DepositionEventKind;
use crate::types::ids::{DepositionEventId, DepositionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An immutable entry in a deposition's recording lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DepositionEvent {
    pub id: DepositionEventId,
    pub deposition_id: DepositionId,
    pub kind: DepositionEventKind,
    pub at: DateTime<Utc>,
    pub actor_email: Option<String>,
}
