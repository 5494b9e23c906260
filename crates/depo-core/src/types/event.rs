use crate::types::{
    Case, Composition, CompositionStatus, Deposition, DepositionEvent, DepositionId,
    DepositionStatus, Participant, ParticipantId, Transcription,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Payload stored in the activity log and pushed on the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload")]
pub enum EventBody {
    CaseCreated {
        case: Case,
    },

    DepositionScheduled {
        deposition: Deposition,
    },
    DepositionRescheduled {
        deposition: Deposition,
    },
    DepositionStatusChanged {
        deposition: Deposition,
        from: DepositionStatus,
        to: DepositionStatus,
    },

    ParticipantAdded {
        participant: Participant,
    },
    ParticipantRemoved {
        deposition_id: DepositionId,
        participant_id: ParticipantId,
    },

    TimelineAppended {
        event: DepositionEvent,
    },

    CompositionCreated {
        composition: Composition,
    },
    CompositionStatusChanged {
        composition: Composition,
        from: CompositionStatus,
        to: CompositionStatus,
    },

    TranscriptionAdded {
        transcription: Transcription,
    },
}
