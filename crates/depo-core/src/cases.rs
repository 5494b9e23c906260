use crate::error::CaseError;
use crate::types::io::CreateCaseInput;
use crate::types::{Case, CaseId};

pub trait CaseRepository {
    fn create(&self, input: CreateCaseInput) -> Result<Case, CaseError>;
    fn get(&self, id: &CaseId) -> Result<Option<Case>, CaseError>;
    fn list(&self) -> Result<Vec<Case>, CaseError>;
}
