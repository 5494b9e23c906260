use depo_core::ScheduleRules;
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = ".depo/depo.db";
pub const DEFAULT_PORT: u16 = 4830;
/// One year of working days.
pub const MAX_MIN_NOTICE_WORKING_DAYS: u32 = 260;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be at most {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u32,
        max: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub db_path: String,
    pub port: u16,
    pub rules: ScheduleRules,
}

impl ServeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ScheduleRules::default();
        let min_notice_working_days = number(
            &lookup,
            "DEPO_MIN_NOTICE_WORKING_DAYS",
            defaults.min_notice_working_days,
        )?;
        if min_notice_working_days > MAX_MIN_NOTICE_WORKING_DAYS {
            return Err(ConfigError::OutOfRange {
                name: "DEPO_MIN_NOTICE_WORKING_DAYS",
                value: min_notice_working_days,
                max: MAX_MIN_NOTICE_WORKING_DAYS,
            });
        }
        let db_path = lookup("DEPO_DB_PATH")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        Ok(Self {
            db_path,
            port: number(&lookup, "DEPO_PORT", DEFAULT_PORT)?,
            rules: ScheduleRules {
                min_notice_working_days,
                default_duration_minutes: number(
                    &lookup,
                    "DEPO_DEFAULT_DURATION_MINUTES",
                    defaults.default_duration_minutes,
                )?,
            },
        })
    }
}

fn number<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        _ => Ok(default),
    }
}
