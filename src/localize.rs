//! Wall-clock normalization into the fixed display zone.
//!
//! The upstream feed is inconsistent about the zone it stamps on event
//! times: the same kickoff has shipped as UTC, as floating local time, and
//! with an explicit TZID across feed revisions. The displayed clock digits
//! are the one thing it gets right, so the digits are kept and relabeled as
//! the fixed zone instead of converting the instant. This is a workaround
//! for this particular feed, not a general timezone technique.

use chrono::NaiveDateTime;

use crate::event::EventTime;

/// Extract the displayed clock value of `time`, to be serialized with the
/// fixed zone's TZID. Date-only values have no clock to preserve and are
/// handled separately by the document builder.
pub fn to_local_wall_clock(time: &EventTime) -> Option<NaiveDateTime> {
    match time {
        EventTime::Date(_) => None,
        EventTime::DateTimeUtc(dt) => Some(dt.naive_utc()),
        EventTime::DateTimeFloating(naive) => Some(*naive),
        EventTime::DateTimeZoned { datetime, .. } => Some(*datetime),
    }
}
