use crate::util::{decode_enum, decode_json, encode_enum, encode_json, from_rfc3339, to_rfc3339};
use depo_core::error::DepoError;
use depo_core::events::EventRepository;
use depo_events::types::EventRecord;
use rusqlite::{params_from_iter, Connection};
use ulid::Ulid;

pub struct EventRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> EventRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> EventRepository for EventRepo<'a> {
    fn append(&self, mut event: EventRecord) -> Result<EventRecord, DepoError> {
        event.seq = next_seq(self.conn)?;
        event.id = format!("evt_{}", Ulid::new());
        let sql = "INSERT INTO events (id, seq, at, correlation_id, source, body_json) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
        let params = (
            event.id.clone(),
            event.seq,
            to_rfc3339(&event.at),
            event.correlation_id.clone(),
            encode_enum(&event.source).map_err(DepoError::internal)?,
            encode_json(&event.body).map_err(DepoError::internal)?,
        );
        self.conn
            .execute(sql, params)
            .map_err(DepoError::internal)?;
        Ok(event)
    }

    fn list(&self, after: Option<i64>, limit: Option<u32>) -> Result<Vec<EventRecord>, DepoError> {
        let mut sql =
            String::from("SELECT id, seq, at, correlation_id, source, body_json FROM events");
        let mut params: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(after) = after {
            sql.push_str(" WHERE seq > ?");
            params.push(after.into());
        }
        sql.push_str(" ORDER BY seq ASC");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            params.push(i64::from(limit).into());
        }

        let mut stmt = self.conn.prepare(&sql).map_err(DepoError::internal)?;
        let mut rows = stmt
            .query(params_from_iter(params))
            .map_err(DepoError::internal)?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().map_err(DepoError::internal)? {
            events.push(map_event_row(row)?);
        }
        Ok(events)
    }
}

fn map_event_row(row: &rusqlite::Row<'_>) -> Result<EventRecord, DepoError> {
    let id: String = row.get(0).map_err(DepoError::internal)?;
    let seq: i64 = row.get(1).map_err(DepoError::internal)?;
    let at: String = row.get(2).map_err(DepoError::internal)?;
    let correlation_id: Option<String> = row.get(3).map_err(DepoError::internal)?;
    let source: String = row.get(4).map_err(DepoError::internal)?;
    let body_json: String = row.get(5).map_err(DepoError::internal)?;

    Ok(EventRecord {
        id,
        seq,
        at: from_rfc3339(&at).map_err(DepoError::internal)?,
        correlation_id,
        source: decode_enum(&source).map_err(DepoError::internal)?,
        body: decode_json(&body_json).map_err(DepoError::internal)?,
    })
}

fn next_seq(conn: &Connection) -> Result<i64, DepoError> {
    let seq: i64 = conn
        .query_row("SELECT COALESCE(MAX(seq), 0) FROM events", [], |row| row.get(0))
        .map_err(DepoError::internal)?;
    Ok(seq + 1)
}
