use crate::util::{decode_enum, decode_json, encode_enum, encode_json, from_rfc3339, now, to_rfc3339, truncate};
use chrono::{DateTime, Utc};
use depo_core::compositions::CompositionRepository;
use depo_core::error::CompositionError;
use depo_core::types::{
    Composition, CompositionId, CompositionStatus, DepositionId, RecordingInterval,
};
use rusqlite::{Connection, OptionalExtension};

const COLUMNS: &str =
    "id, deposition_id, status, recording_anchor, intervals_json, media_uri, created_at, updated_at";

pub struct CompositionRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> CompositionRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn query_one(
        &self,
        sql: &str,
        param: &str,
    ) -> Result<Option<Composition>, CompositionError> {
        let row = self
            .conn
            .query_row(sql, [param], read_composition_row)
            .optional()
            .map_err(invalid)?;
        row.map(map_composition_row).transpose()
    }
}

fn invalid(err: impl ToString) -> CompositionError {
    CompositionError::InvalidInput {
        message: err.to_string(),
    }
}

impl<'a> CompositionRepository for CompositionRepo<'a> {
    fn create(
        &self,
        deposition_id: &DepositionId,
        recording_anchor: Option<DateTime<Utc>>,
        intervals: Vec<RecordingInterval>,
    ) -> Result<Composition, CompositionError> {
        let created_at = now();
        let composition = Composition {
            id: CompositionId::generate(),
            deposition_id: deposition_id.clone(),
            status: CompositionStatus::Queued,
            recording_anchor: recording_anchor.map(truncate),
            intervals,
            media_uri: None,
            created_at,
            updated_at: created_at,
        };
        let sql = format!("INSERT INTO compositions ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)");
        let params = (
            composition.id.as_str(),
            composition.deposition_id.as_str(),
            encode_enum(&composition.status).map_err(invalid)?,
            composition.recording_anchor.as_ref().map(to_rfc3339),
            encode_json(&composition.intervals).map_err(invalid)?,
            composition.media_uri.as_deref(),
            to_rfc3339(&composition.created_at),
            to_rfc3339(&composition.updated_at),
        );
        self.conn.execute(&sql, params).map_err(invalid)?;
        Ok(composition)
    }

    fn get(&self, id: &CompositionId) -> Result<Option<Composition>, CompositionError> {
        let sql = format!("SELECT {COLUMNS} FROM compositions WHERE id = ?1");
        self.query_one(&sql, id.as_str())
    }

    fn latest_for_deposition(
        &self,
        deposition_id: &DepositionId,
    ) -> Result<Option<Composition>, CompositionError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM compositions WHERE deposition_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1"
        );
        self.query_one(&sql, deposition_id.as_str())
    }

    fn update_status(
        &self,
        id: &CompositionId,
        status: CompositionStatus,
        media_uri: Option<String>,
    ) -> Result<Composition, CompositionError> {
        let changed = self
            .conn
            .execute(
                "UPDATE compositions SET status = ?1, media_uri = ?2, updated_at = ?3 WHERE id = ?4",
                (
                    encode_enum(&status).map_err(invalid)?,
                    media_uri,
                    to_rfc3339(&now()),
                    id.as_str(),
                ),
            )
            .map_err(invalid)?;
        if changed == 0 {
            return Err(CompositionError::NotFound);
        }
        self.get(id)?.ok_or(CompositionError::NotFound)
    }
}

struct CompositionRow {
    id: String,
    deposition_id: String,
    status: String,
    recording_anchor: Option<String>,
    intervals_json: String,
    media_uri: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_composition_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CompositionRow> {
    Ok(CompositionRow {
        id: row.get(0)?,
        deposition_id: row.get(1)?,
        status: row.get(2)?,
        recording_anchor: row.get(3)?,
        intervals_json: row.get(4)?,
        media_uri: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn map_composition_row(row: CompositionRow) -> Result<Composition, CompositionError> {
    let recording_anchor = match row.recording_anchor {
        Some(value) => Some(from_rfc3339(&value).map_err(invalid)?),
        None => None,
    };
    Ok(Composition {
        id: CompositionId::new(row.id).map_err(invalid)?,
        deposition_id: DepositionId::new(row.deposition_id).map_err(invalid)?,
        status: decode_enum(&row.status).map_err(invalid)?,
        recording_anchor,
        intervals: decode_json(&row.intervals_json).map_err(invalid)?,
        media_uri: row.media_uri,
        created_at: from_rfc3339(&row.created_at).map_err(invalid)?,
        updated_at: from_rfc3339(&row.updated_at).map_err(invalid)?,
    })
}
