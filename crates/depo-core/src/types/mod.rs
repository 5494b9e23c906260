pub mod case;
pub mod composition;
pub mod deposition;
pub mod enums;
pub mod event;
pub mod ids;
pub mod io;
pub mod timeline;
pub mod transcription;

pub use case::Case;
pub use composition::{Composition, RecordingInterval};
pub use deposition::{Deposition, Participant};
pub use enums::{CompositionStatus, DepositionEventKind, DepositionStatus, ParticipantRole};
pub use event::EventBody;
pub use ids::{
    CaseId, CompositionId, DepositionEventId, DepositionId, IdError, ParticipantId,
    TranscriptionId,
};
pub use timeline::DepositionEvent;
pub use transcription::{TimedTranscription, Transcription};
