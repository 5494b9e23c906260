use crate::types::ids::{DepositionId, TranscriptionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transcription {
    pub id: TranscriptionId,
    pub deposition_id: DepositionId,
    pub speaker_email: Option<String>,
    pub text: String,
    pub at: DateTime<Utc>,
    pub duration_ms: u32,
    pub created_at: DateTime<Utc>,
}

/// A transcription placed on the trimmed video's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimedTranscription {
    pub transcription: Transcription,
    pub offset_secs: i64,
}
