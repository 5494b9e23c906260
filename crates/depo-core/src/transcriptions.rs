use crate::error::TranscriptionError;
use crate::types::io::AddTranscriptionInput;
use crate::types::{DepositionId, Transcription};

pub trait TranscriptionRepository {
    fn add(&self, input: AddTranscriptionInput) -> Result<Transcription, TranscriptionError>;
    fn list(&self, deposition_id: &DepositionId)
        -> Result<Vec<Transcription>, TranscriptionError>;
}
