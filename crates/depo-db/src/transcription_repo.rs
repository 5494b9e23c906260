use crate::util::{from_rfc3339, now, to_rfc3339, truncate};
use depo_core::error::TranscriptionError;
use depo_core::transcriptions::TranscriptionRepository;
use depo_core::types::io::AddTranscriptionInput;
use depo_core::types::{DepositionId, Transcription, TranscriptionId};
use rusqlite::Connection;

pub struct TranscriptionRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> TranscriptionRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn invalid(err: impl ToString) -> TranscriptionError {
    TranscriptionError::InvalidInput {
        message: err.to_string(),
    }
}

impl<'a> TranscriptionRepository for TranscriptionRepo<'a> {
    fn add(&self, input: AddTranscriptionInput) -> Result<Transcription, TranscriptionError> {
        let transcription = Transcription {
            id: TranscriptionId::generate(),
            deposition_id: input.deposition_id,
            speaker_email: input.speaker_email,
            text: input.text,
            at: truncate(input.at),
            duration_ms: input.duration_ms,
            created_at: now(),
        };
        let sql = "INSERT INTO transcriptions (id, deposition_id, speaker_email, text, at, duration_ms, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
        let params = (
            transcription.id.as_str(),
            transcription.deposition_id.as_str(),
            transcription.speaker_email.as_deref(),
            &transcription.text,
            to_rfc3339(&transcription.at),
            transcription.duration_ms,
            to_rfc3339(&transcription.created_at),
        );
        self.conn.execute(sql, params).map_err(invalid)?;
        Ok(transcription)
    }

    fn list(
        &self,
        deposition_id: &DepositionId,
    ) -> Result<Vec<Transcription>, TranscriptionError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, deposition_id, speaker_email, text, at, duration_ms, created_at FROM transcriptions WHERE deposition_id = ?1 ORDER BY at ASC, rowid ASC")
            .map_err(invalid)?;
        let mut rows = stmt.query([deposition_id.as_str()]).map_err(invalid)?;
        let mut transcriptions = Vec::new();
        while let Some(row) = rows.next().map_err(invalid)? {
            transcriptions.push(map_transcription_row(row)?);
        }
        Ok(transcriptions)
    }
}

fn map_transcription_row(row: &rusqlite::Row<'_>) -> Result<Transcription, TranscriptionError> {
    let id: String = row.get(0).map_err(invalid)?;
    let deposition_id: String = row.get(1).map_err(invalid)?;
    let speaker_email: Option<String> = row.get(2).map_err(invalid)?;
    let text: String = row.get(3).map_err(invalid)?;
    let at: String = row.get(4).map_err(invalid)?;
    let duration_ms: u32 = row.get(5).map_err(invalid)?;
    let created_at: String = row.get(6).map_err(invalid)?;

    Ok(Transcription {
        id: TranscriptionId::new(id).map_err(invalid)?,
        deposition_id: DepositionId::new(deposition_id).map_err(invalid)?,
        speaker_email,
        text,
        at: from_rfc3339(&at).map_err(invalid)?,
        duration_ms,
        created_at: from_rfc3339(&created_at).map_err(invalid)?,
    })
}
