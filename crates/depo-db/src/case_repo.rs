use crate::util::{from_rfc3339, now, to_rfc3339};
use depo_core::cases::CaseRepository;
use depo_core::error::CaseError;
use depo_core::types::io::CreateCaseInput;
use depo_core::types::{Case, CaseId};
use rusqlite::{Connection, OptionalExtension};

pub struct CaseRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> CaseRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn invalid(err: impl ToString) -> CaseError {
    CaseError::InvalidInput {
        message: err.to_string(),
    }
}

impl<'a> CaseRepository for CaseRepo<'a> {
    fn create(&self, input: CreateCaseInput) -> Result<Case, CaseError> {
        let case = Case {
            id: CaseId::generate(),
            name: input.name,
            case_number: input.case_number,
            created_at: now(),
        };
        self.conn
            .execute(
                "INSERT INTO cases (id, name, case_number, created_at) VALUES (?1, ?2, ?3, ?4)",
                (
                    case.id.as_str(),
                    &case.name,
                    &case.case_number,
                    to_rfc3339(&case.created_at),
                ),
            )
            .map_err(invalid)?;
        Ok(case)
    }

    fn get(&self, id: &CaseId) -> Result<Option<Case>, CaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, case_number, created_at FROM cases WHERE id = ?1",
                [id.as_str()],
                read_case_row,
            )
            .optional()
            .map_err(invalid)?;
        row.map(map_case_row).transpose()
    }

    fn list(&self) -> Result<Vec<Case>, CaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, case_number, created_at FROM cases ORDER BY created_at ASC")
            .map_err(invalid)?;
        let rows = stmt.query_map([], read_case_row).map_err(invalid)?;
        let mut cases = Vec::new();
        for row in rows {
            cases.push(map_case_row(row.map_err(invalid)?)?);
        }
        Ok(cases)
    }
}

type CaseRow = (String, String, String, String);

fn read_case_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CaseRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn map_case_row((id, name, case_number, created_at): CaseRow) -> Result<Case, CaseError> {
    Ok(Case {
        id: CaseId::new(id).map_err(invalid)?,
        name,
        case_number,
        created_at: from_rfc3339(&created_at).map_err(invalid)?,
    })
}
