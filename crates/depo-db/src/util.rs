use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("json encode failed: {message}")]
    JsonEncode { message: String },
    #[error("json decode failed: {message}")]
    JsonDecode { message: String },
    #[error("invalid enum value: {value}")]
    InvalidEnum { value: String },
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp { value: String },
}

/// Drops precision the text encoding cannot hold, so written and read
/// values compare equal.
pub fn truncate(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(6)
}

pub fn now() -> DateTime<Utc> {
    truncate(Utc::now())
}

/// Fixed-width UTC text so that timestamps sort lexically.
pub fn to_rfc3339(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn from_rfc3339(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DbError::InvalidTimestamp {
            value: value.to_string(),
        })
}

pub fn encode_json<T: Serialize>(value: &T) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|err| DbError::JsonEncode {
        message: err.to_string(),
    })
}

pub fn decode_json<T: DeserializeOwned>(value: &str) -> Result<T, DbError> {
    serde_json::from_str(value).map_err(|err| DbError::JsonDecode {
        message: err.to_string(),
    })
}

pub fn encode_enum<T: Serialize>(value: &T) -> Result<String, DbError> {
    let json = serde_json::to_value(value).map_err(|err| DbError::JsonEncode {
        message: err.to_string(),
    })?;
    match json {
        Value::String(value) => Ok(value),
        other => Err(DbError::InvalidEnum {
            value: other.to_string(),
        }),
    }
}

pub fn decode_enum<T: DeserializeOwned>(value: &str) -> Result<T, DbError> {
    let json = Value::String(value.to_string());
    serde_json::from_value(json).map_err(|_| DbError::InvalidEnum {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use depo_core::types::{DepositionEventKind, DepositionStatus};

    #[test]
    fn timestamps_sort_lexically() {
        let base = Utc.with_ymd_and_hms(2024, 3, 11, 14, 0, 0).unwrap();
        let whole = to_rfc3339(&base);
        let fraction = to_rfc3339(&(base + Duration::milliseconds(500)));
        let next = to_rfc3339(&(base + Duration::seconds(1)));
        assert!(whole < fraction && fraction < next);
        assert_eq!(from_rfc3339(&fraction).unwrap(), base + Duration::milliseconds(500));
    }

    #[test]
    fn enums_round_trip_as_plain_strings() {
        assert_eq!(encode_enum(&DepositionStatus::InProgress).unwrap(), "InProgress");
        let kind: DepositionEventKind = decode_enum("OffTheRecord").unwrap();
        assert_eq!(kind, DepositionEventKind::OffTheRecord);
        assert!(decode_enum::<DepositionStatus>("Paused").is_err());
    }
}
