use crate::recording::offset_secs;
use crate::types::{RecordingInterval, TimedTranscription, Transcription};
use chrono::{DateTime, Utc};

/// Maps a wall-clock instant onto the trimmed timeline, where only the
/// on-the-record intervals survive.
///
/// Instants inside a gap collapse onto the cut point that ends the
/// preceding interval.
pub fn retime_offset(
    anchor: DateTime<Utc>,
    intervals: &[RecordingInterval],
    at: DateTime<Utc>,
) -> i64 {
    let t = offset_secs(anchor, at);
    intervals
        .iter()
        .map(|interval| {
            let length = interval.duration_secs().max(0);
            (t - interval.start).clamp(0, length)
        })
        .sum()
}

pub fn retime_transcriptions(
    anchor: DateTime<Utc>,
    intervals: &[RecordingInterval],
    transcriptions: Vec<Transcription>,
) -> Vec<TimedTranscription> {
    transcriptions
        .into_iter()
        .map(|transcription| TimedTranscription {
            offset_secs: retime_offset(anchor, intervals, transcription.at),
            transcription,
        })
        .collect()
}
