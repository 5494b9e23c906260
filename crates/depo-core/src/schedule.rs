use crate::error::DepositionError;
use crate::types::{Deposition, DepositionId};
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRules {
    pub min_notice_working_days: u32,
    pub default_duration_minutes: u32,
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self {
            min_notice_working_days: 0,
            default_duration_minutes: 120,
        }
    }
}

impl ScheduleRules {
    pub fn default_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.default_duration_minutes))
    }
}

pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Moves `n` working days forward. With `n == 0` a weekend date rolls
/// forward to the following Monday. `None` when the result leaves the
/// calendar range.
pub fn add_working_days(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    let mut current = date;
    if n == 0 {
        while !is_working_day(current) {
            current = current.checked_add_days(Days::new(1))?;
        }
        return Some(current);
    }
    // Any seven consecutive days hold exactly five working days.
    let weeks = (n - 1) / 5;
    current = current.checked_add_days(Days::new(u64::from(weeks) * 7))?;
    let mut remaining = n - weeks * 5;
    while remaining > 0 {
        current = current.checked_add_days(Days::new(1))?;
        if is_working_day(current) {
            remaining -= 1;
        }
    }
    Some(current)
}

/// Working days in `(from, to]`.
pub fn working_days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut count = 0;
    let mut current = from;
    while current < to {
        current = current + Days::new(1);
        if is_working_day(current) {
            count += 1;
        }
    }
    count
}

/// The slot a deposition wants on the calendar.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleWindow<'a> {
    pub id: Option<&'a DepositionId>,
    pub witness_email: &'a str,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
}

impl<'a> ScheduleWindow<'a> {
    pub fn of(deposition: &'a Deposition) -> Self {
        Self {
            id: Some(&deposition.id),
            witness_email: &deposition.witness_email,
            start_at: deposition.start_at,
            end_at: deposition.end_at,
        }
    }

    fn end(&self, rules: &ScheduleRules) -> DateTime<Utc> {
        self.end_at
            .unwrap_or_else(|| self.start_at + rules.default_duration())
    }

    fn overlaps(&self, other: &ScheduleWindow<'_>, rules: &ScheduleRules) -> bool {
        self.start_at < other.end(rules) && other.start_at < self.end(rules)
    }
}

pub fn validate_schedule_window(
    window: &ScheduleWindow<'_>,
    now: DateTime<Utc>,
    rules: &ScheduleRules,
) -> Result<(), DepositionError> {
    if let Some(end_at) = window.end_at {
        if end_at <= window.start_at {
            return Err(DepositionError::InvalidInput {
                message: "end_at must be after start_at".to_string(),
            });
        }
    }

    let earliest = if rules.min_notice_working_days == 0 {
        now
    } else {
        add_working_days(now.date_naive(), rules.min_notice_working_days)
            .ok_or_else(|| DepositionError::InvalidInput {
                message: format!(
                    "minimum notice of {} working days is out of range",
                    rules.min_notice_working_days
                ),
            })?
            .and_time(now.time())
            .and_utc()
    };
    if window.start_at < earliest {
        return Err(DepositionError::InvalidInput {
            message: format!("deposition must start at or after {}", earliest.to_rfc3339()),
        });
    }
    Ok(())
}

pub fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// First active deposition for the same witness whose slot overlaps `window`.
pub fn find_schedule_conflict<'d>(
    window: &ScheduleWindow<'_>,
    existing: &'d [Deposition],
    rules: &ScheduleRules,
) -> Option<&'d Deposition> {
    existing.iter().find(|other| {
        other.status.is_active()
            && window.id != Some(&other.id)
            && same_email(window.witness_email, &other.witness_email)
            && window.overlaps(&ScheduleWindow::of(other), rules)
    })
}

pub fn validate_no_conflict(
    window: &ScheduleWindow<'_>,
    existing: &[Deposition],
    rules: &ScheduleRules,
) -> Result<(), DepositionError> {
    match find_schedule_conflict(window, existing, rules) {
        Some(other) => Err(DepositionError::ScheduleConflict {
            conflicting: other.id.clone(),
        }),
        None => Ok(()),
    }
}
