//! On/off-the-record interval derivation over a deposition's event timeline.
//!
//! Offsets are whole seconds from the anchor, the first entry of the timeline
//! regardless of its kind. Both bounds use `chrono::Duration::num_seconds`,
//! which truncates toward zero.

use crate::types::{DepositionEvent, DepositionEventKind, RecordingInterval};
use chrono::{DateTime, Utc};

/// Anything that can sit on a deposition timeline.
pub trait TimelineEntry {
    /// `None` for kinds outside [`DepositionEventKind`]. Such entries can
    /// anchor the timeline but are otherwise inert.
    fn kind(&self) -> Option<DepositionEventKind>;
    fn at(&self) -> DateTime<Utc>;
}

impl TimelineEntry for DepositionEvent {
    fn kind(&self) -> Option<DepositionEventKind> {
        Some(self.kind)
    }

    fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

impl TimelineEntry for (DepositionEventKind, DateTime<Utc>) {
    fn kind(&self) -> Option<DepositionEventKind> {
        Some(self.0)
    }

    fn at(&self) -> DateTime<Utc> {
        self.1
    }
}

impl TimelineEntry for (Option<DepositionEventKind>, DateTime<Utc>) {
    fn kind(&self) -> Option<DepositionEventKind> {
        self.0
    }

    fn at(&self) -> DateTime<Utc> {
        self.1
    }
}

pub fn recording_anchor<E: TimelineEntry>(events: &[E]) -> Option<DateTime<Utc>> {
    events.first().map(TimelineEntry::at)
}

pub fn offset_secs(anchor: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    (at - anchor).num_seconds()
}

/// Builds the ordered on-the-record intervals of `events`.
///
/// Unpaired `OffTheRecord` entries and repeated `OnTheRecord` entries are
/// ignored. An interval still open after the last entry is closed at
/// `reference_now`, without clamping.
pub fn compute_recording_intervals<E: TimelineEntry>(
    events: &[E],
    reference_now: DateTime<Utc>,
) -> Vec<RecordingInterval> {
    let Some(anchor) = recording_anchor(events) else {
        return Vec::new();
    };

    let mut intervals = Vec::new();
    let mut open: Option<i64> = None;
    for event in events {
        match event.kind() {
            Some(DepositionEventKind::OnTheRecord) => {
                if open.is_none() {
                    open = Some(offset_secs(anchor, event.at()));
                }
            }
            Some(DepositionEventKind::OffTheRecord) => {
                if let Some(start) = open.take() {
                    intervals.push(RecordingInterval {
                        start,
                        stop: offset_secs(anchor, event.at()),
                    });
                }
            }
            _ => {}
        }
    }

    if let Some(start) = open {
        intervals.push(RecordingInterval {
            start,
            stop: offset_secs(anchor, reference_now),
        });
    }

    intervals
}

/// Whether the timeline currently stands on the record.
pub fn is_on_record<E: TimelineEntry>(events: &[E]) -> bool {
    events
        .iter()
        .rev()
        .find_map(|event| match event.kind() {
            Some(DepositionEventKind::OnTheRecord) => Some(true),
            Some(DepositionEventKind::OffTheRecord) => Some(false),
            _ => None,
        })
        .unwrap_or(false)
}
