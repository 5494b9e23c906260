use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339, truncate};
use chrono::{DateTime, Utc};
use depo_core::error::DepositionError;
use depo_core::timeline::TimelineRepository;
use depo_core::types::{DepositionEvent, DepositionEventId, DepositionEventKind, DepositionId};
use rusqlite::Connection;

pub struct TimelineRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> TimelineRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn invalid(err: impl ToString) -> DepositionError {
    DepositionError::InvalidInput {
        message: err.to_string(),
    }
}

impl<'a> TimelineRepository for TimelineRepo<'a> {
    fn append(
        &self,
        deposition_id: &DepositionId,
        kind: DepositionEventKind,
        at: DateTime<Utc>,
        actor_email: Option<String>,
    ) -> Result<DepositionEvent, DepositionError> {
        let event = DepositionEvent {
            id: DepositionEventId::generate(),
            deposition_id: deposition_id.clone(),
            kind,
            at: truncate(at),
            actor_email,
        };
        let sql = "INSERT INTO deposition_events (id, deposition_id, kind, at, actor_email) VALUES (?1, ?2, ?3, ?4, ?5)";
        let params = (
            event.id.as_str(),
            event.deposition_id.as_str(),
            encode_enum(&event.kind).map_err(invalid)?,
            to_rfc3339(&event.at),
            event.actor_email.as_deref(),
        );
        self.conn.execute(sql, params).map_err(invalid)?;
        Ok(event)
    }

    fn list(&self, deposition_id: &DepositionId) -> Result<Vec<DepositionEvent>, DepositionError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, deposition_id, kind, at, actor_email FROM deposition_events WHERE deposition_id = ?1 ORDER BY at ASC, rowid ASC")
            .map_err(invalid)?;
        let mut rows = stmt.query([deposition_id.as_str()]).map_err(invalid)?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().map_err(invalid)? {
            events.push(map_event_row(row)?);
        }
        Ok(events)
    }
}

fn map_event_row(row: &rusqlite::Row<'_>) -> Result<DepositionEvent, DepositionError> {
    let id: String = row.get(0).map_err(invalid)?;
    let deposition_id: String = row.get(1).map_err(invalid)?;
    let kind: String = row.get(2).map_err(invalid)?;
    let at: String = row.get(3).map_err(invalid)?;
    let actor_email: Option<String> = row.get(4).map_err(invalid)?;

    Ok(DepositionEvent {
        id: DepositionEventId::new(id).map_err(invalid)?,
        deposition_id: DepositionId::new(deposition_id).map_err(invalid)?,
        kind: decode_enum(&kind).map_err(invalid)?,
        at: from_rfc3339(&at).map_err(invalid)?,
        actor_email,
    })
}
