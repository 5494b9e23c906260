use crate::util::{decode_enum, encode_enum, from_rfc3339, now, to_rfc3339, truncate};
use depo_core::depositions::DepositionRepository;
use depo_core::error::DepositionError;
use depo_core::types::io::{DepositionFilter, ScheduleDepositionInput};
use depo_core::types::{CaseId, Deposition, DepositionId, DepositionStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params_from_iter, Connection, OptionalExtension};

const COLUMNS: &str = "id, case_id, witness_name, witness_email, start_at, end_at, status, video_recording, created_at, updated_at";

pub struct DepositionRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> DepositionRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn require(&self, id: &DepositionId) -> Result<Deposition, DepositionError> {
        self.get(id)?.ok_or(DepositionError::NotFound)
    }

    fn query(
        &self,
        sql: &str,
        params: Vec<rusqlite::types::Value>,
    ) -> Result<Vec<Deposition>, DepositionError> {
        let mut stmt = self.conn.prepare(sql).map_err(invalid)?;
        let rows = stmt
            .query_map(params_from_iter(params), read_deposition_row)
            .map_err(invalid)?;
        let mut depositions = Vec::new();
        for row in rows {
            depositions.push(map_deposition_row(row.map_err(invalid)?)?);
        }
        Ok(depositions)
    }
}

fn invalid(err: impl ToString) -> DepositionError {
    DepositionError::InvalidInput {
        message: err.to_string(),
    }
}

impl<'a> DepositionRepository for DepositionRepo<'a> {
    fn create(&self, input: ScheduleDepositionInput) -> Result<Deposition, DepositionError> {
        let created_at = now();
        let deposition = Deposition {
            id: DepositionId::generate(),
            case_id: input.case_id,
            witness_name: input.witness_name,
            witness_email: input.witness_email,
            start_at: truncate(input.start_at),
            end_at: input.end_at.map(truncate),
            status: DepositionStatus::Pending,
            video_recording: input.video_recording,
            created_at,
            updated_at: created_at,
        };
        let sql = format!(
            "INSERT INTO depositions ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        );
        let params = (
            deposition.id.as_str(),
            deposition.case_id.as_str(),
            &deposition.witness_name,
            &deposition.witness_email,
            to_rfc3339(&deposition.start_at),
            deposition.end_at.as_ref().map(to_rfc3339),
            encode_enum(&deposition.status).map_err(invalid)?,
            deposition.video_recording,
            to_rfc3339(&deposition.created_at),
            to_rfc3339(&deposition.updated_at),
        );
        self.conn.execute(&sql, params).map_err(invalid)?;
        Ok(deposition)
    }

    fn get(&self, id: &DepositionId) -> Result<Option<Deposition>, DepositionError> {
        let sql = format!("SELECT {COLUMNS} FROM depositions WHERE id = ?1");
        let row = self
            .conn
            .query_row(&sql, [id.as_str()], read_deposition_row)
            .optional()
            .map_err(invalid)?;
        row.map(map_deposition_row).transpose()
    }

    fn list(&self, filter: DepositionFilter) -> Result<Vec<Deposition>, DepositionError> {
        let mut sql = format!("SELECT {COLUMNS} FROM depositions");
        let mut clauses = Vec::new();
        let mut params: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(case_id) = &filter.case_id {
            clauses.push("case_id = ?");
            params.push(case_id.as_str().to_string().into());
        }
        if let Some(status) = &filter.status {
            clauses.push("status = ?");
            params.push(encode_enum(status).map_err(invalid)?.into());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY start_at ASC");
        self.query(&sql, params)
    }

    fn list_for_witness(&self, witness_email: &str) -> Result<Vec<Deposition>, DepositionError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM depositions WHERE lower(witness_email) = lower(?) ORDER BY start_at ASC"
        );
        self.query(&sql, vec![witness_email.trim().to_string().into()])
    }

    fn reschedule(
        &self,
        id: &DepositionId,
        start_at: DateTime<Utc>,
        end_at: Option<DateTime<Utc>>,
    ) -> Result<Deposition, DepositionError> {
        let changed = self
            .conn
            .execute(
                "UPDATE depositions SET start_at = ?1, end_at = ?2, updated_at = ?3 WHERE id = ?4",
                (
                    to_rfc3339(&start_at),
                    end_at.as_ref().map(to_rfc3339),
                    to_rfc3339(&now()),
                    id.as_str(),
                ),
            )
            .map_err(invalid)?;
        if changed == 0 {
            return Err(DepositionError::NotFound);
        }
        self.require(id)
    }

    fn set_status(
        &self,
        id: &DepositionId,
        status: DepositionStatus,
    ) -> Result<Deposition, DepositionError> {
        let changed = self
            .conn
            .execute(
                "UPDATE depositions SET status = ?1, updated_at = ?2 WHERE id = ?3",
                (
                    encode_enum(&status).map_err(invalid)?,
                    to_rfc3339(&now()),
                    id.as_str(),
                ),
            )
            .map_err(invalid)?;
        if changed == 0 {
            return Err(DepositionError::NotFound);
        }
        self.require(id)
    }
}

struct DepositionRow {
    id: String,
    case_id: String,
    witness_name: String,
    witness_email: String,
    start_at: String,
    end_at: Option<String>,
    status: String,
    video_recording: bool,
    created_at: String,
    updated_at: String,
}

fn read_deposition_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DepositionRow> {
    Ok(DepositionRow {
        id: row.get(0)?,
        case_id: row.get(1)?,
        witness_name: row.get(2)?,
        witness_email: row.get(3)?,
        start_at: row.get(4)?,
        end_at: row.get(5)?,
        status: row.get(6)?,
        video_recording: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn map_deposition_row(row: DepositionRow) -> Result<Deposition, DepositionError> {
    let end_at = match row.end_at {
        Some(value) => Some(from_rfc3339(&value).map_err(invalid)?),
        None => None,
    };
    Ok(Deposition {
        id: DepositionId::new(row.id).map_err(invalid)?,
        case_id: CaseId::new(row.case_id).map_err(invalid)?,
        witness_name: row.witness_name,
        witness_email: row.witness_email,
        start_at: from_rfc3339(&row.start_at).map_err(invalid)?,
        end_at,
        status: decode_enum(&row.status).map_err(invalid)?,
        video_recording: row.video_recording,
        created_at: from_rfc3339(&row.created_at).map_err(invalid)?,
        updated_at: from_rfc3339(&row.updated_at).map_err(invalid)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case_repo::CaseRepo;
    use crate::schema::with_test_db;
    use chrono::{Duration, TimeZone};
    use depo_core::cases::CaseRepository;
    use depo_core::types::io::CreateCaseInput;

    fn seed_case(conn: &Connection) -> CaseId {
        CaseRepo::new(conn)
            .create(CreateCaseInput {
                name: "Okafor v. Meridian Health".to_string(),
                case_number: "CV-2024-0311".to_string(),
            })
            .unwrap()
            .id
    }

    fn input(case_id: &CaseId, email: &str, day: u32) -> ScheduleDepositionInput {
        ScheduleDepositionInput {
            case_id: case_id.clone(),
            witness_name: "Priya Raman".to_string(),
            witness_email: email.to_string(),
            start_at: Utc.with_ymd_and_hms(2031, 5, day, 15, 0, 0).unwrap(),
            end_at: None,
            video_recording: true,
        }
    }

    #[test]
    fn create_and_get_round_trip() {
        let conn = with_test_db().unwrap();
        let case_id = seed_case(&conn);
        let repo = DepositionRepo::new(&conn);
        let created = repo.create(input(&case_id, "priya@example.com", 6)).unwrap();
        assert_eq!(created.status, DepositionStatus::Pending);
        assert_eq!(repo.get(&created.id).unwrap(), Some(created));
    }

    #[test]
    fn list_filters_by_case_and_status_in_start_order() {
        let conn = with_test_db().unwrap();
        let case_a = seed_case(&conn);
        let case_b = seed_case(&conn);
        let repo = DepositionRepo::new(&conn);
        let later = repo.create(input(&case_a, "a@example.com", 9)).unwrap();
        let earlier = repo.create(input(&case_a, "b@example.com", 7)).unwrap();
        repo.create(input(&case_b, "c@example.com", 8)).unwrap();
        repo.set_status(&later.id, DepositionStatus::Confirmed).unwrap();

        let in_case = repo
            .list(DepositionFilter {
                case_id: Some(case_a.clone()),
                status: None,
            })
            .unwrap();
        let ids: Vec<_> = in_case.iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids, vec![earlier.id.clone(), later.id.clone()]);

        let confirmed = repo
            .list(DepositionFilter {
                case_id: Some(case_a),
                status: Some(DepositionStatus::Confirmed),
            })
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, later.id);
        assert_eq!(repo.list(DepositionFilter::default()).unwrap().len(), 3);
    }

    #[test]
    fn witness_lookup_ignores_case() {
        let conn = with_test_db().unwrap();
        let case_id = seed_case(&conn);
        let repo = DepositionRepo::new(&conn);
        repo.create(input(&case_id, "priya@example.com", 6)).unwrap();
        repo.create(input(&case_id, "other@example.com", 6)).unwrap();
        assert_eq!(repo.list_for_witness("Priya@Example.com").unwrap().len(), 1);
    }

    #[test]
    fn reschedule_updates_window() {
        let conn = with_test_db().unwrap();
        let case_id = seed_case(&conn);
        let repo = DepositionRepo::new(&conn);
        let created = repo.create(input(&case_id, "priya@example.com", 6)).unwrap();
        let start = created.start_at + Duration::days(1);
        let end = start + Duration::hours(3);
        let updated = repo.reschedule(&created.id, start, Some(end)).unwrap();
        assert_eq!(updated.start_at, start);
        assert_eq!(updated.end_at, Some(end));
        assert!(matches!(
            repo.reschedule(&DepositionId::generate(), start, None),
            Err(DepositionError::NotFound)
        ));
    }
}
