pub mod case_repo;
pub mod composition_repo;
pub mod deposition_repo;
pub mod event_repo;
pub mod participant_repo;
pub mod schema;
pub mod store;
pub mod timeline_repo;
pub mod transcription_repo;
pub mod util;
