pub mod cases;
pub mod compositions;
pub mod depo;
pub mod depositions;
pub mod error;
pub mod events;
pub mod recording;
pub mod schedule;
pub mod store;
pub mod timeline;
pub mod timing;
pub mod transcriptions;
pub mod validation;

pub mod types;

pub use crate::depo::{Depo, RequestContext};
pub use crate::error::DepoError;
pub use crate::recording::compute_recording_intervals;
pub use crate::schedule::ScheduleRules;
pub use crate::store::Store;
