use crate::util::{decode_enum, encode_enum, from_rfc3339, now, to_rfc3339};
use depo_core::depositions::ParticipantRepository;
use depo_core::error::DepositionError;
use depo_core::types::io::AddParticipantInput;
use depo_core::types::{DepositionId, Participant, ParticipantId};
use rusqlite::Connection;

pub struct ParticipantRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> ParticipantRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn invalid(err: impl ToString) -> DepositionError {
    DepositionError::InvalidInput {
        message: err.to_string(),
    }
}

impl<'a> ParticipantRepository for ParticipantRepo<'a> {
    fn add(
        &self,
        deposition_id: &DepositionId,
        input: AddParticipantInput,
    ) -> Result<Participant, DepositionError> {
        let participant = Participant {
            id: ParticipantId::generate(),
            deposition_id: deposition_id.clone(),
            name: input.name,
            email: input.email,
            role: input.role,
            created_at: now(),
        };
        let sql = "INSERT INTO participants (id, deposition_id, name, email, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
        let params = (
            participant.id.as_str(),
            participant.deposition_id.as_str(),
            &participant.name,
            &participant.email,
            encode_enum(&participant.role).map_err(invalid)?,
            to_rfc3339(&participant.created_at),
        );
        self.conn.execute(sql, params).map_err(|err| match err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DepositionError::Conflict {
                    message: format!("{} already participates", participant.email),
                }
            }
            other => invalid(other),
        })?;
        Ok(participant)
    }

    fn remove(
        &self,
        deposition_id: &DepositionId,
        participant_id: &ParticipantId,
    ) -> Result<(), DepositionError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM participants WHERE id = ?1 AND deposition_id = ?2",
                (participant_id.as_str(), deposition_id.as_str()),
            )
            .map_err(invalid)?;
        if removed == 0 {
            return Err(DepositionError::ParticipantNotFound);
        }
        Ok(())
    }

    fn list(&self, deposition_id: &DepositionId) -> Result<Vec<Participant>, DepositionError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, deposition_id, name, email, role, created_at FROM participants WHERE deposition_id = ?1 ORDER BY created_at ASC, rowid ASC")
            .map_err(invalid)?;
        let mut rows = stmt.query([deposition_id.as_str()]).map_err(invalid)?;
        let mut participants = Vec::new();
        while let Some(row) = rows.next().map_err(invalid)? {
            participants.push(map_participant_row(row)?);
        }
        Ok(participants)
    }
}

fn map_participant_row(row: &rusqlite::Row<'_>) -> Result<Participant, DepositionError> {
    let id: String = row.get(0).map_err(invalid)?;
    let deposition_id: String = row.get(1).map_err(invalid)?;
    let name: String = row.get(2).map_err(invalid)?;
    let email: String = row.get(3).map_err(invalid)?;
    let role: String = row.get(4).map_err(invalid)?;
    let created_at: String = row.get(5).map_err(invalid)?;

    Ok(Participant {
        id: ParticipantId::new(id).map_err(invalid)?,
        deposition_id: DepositionId::new(deposition_id).map_err(invalid)?,
        name,
        email,
        role: decode_enum(&role).map_err(invalid)?,
        created_at: from_rfc3339(&created_at).map_err(invalid)?,
    })
}
