//! Event types for the filter pipeline.
//!
//! Upstream events are mapped into these explicit optional-field structs;
//! they live for the duration of one run and are only ever persisted as
//! serialized ICS text.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A start/end time as stated by the upstream feed.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// All-day value (no clock component)
    Date(NaiveDate),
    /// UTC datetime (`...Z` suffix)
    DateTimeUtc(DateTime<Utc>),
    /// Floating datetime (no zone information at all)
    DateTimeFloating(NaiveDateTime),
    /// Datetime with an explicit TZID parameter
    DateTimeZoned {
        datetime: NaiveDateTime,
        tzid: String,
    },
}

/// One event as parsed from the upstream feed.
#[derive(Debug, Clone, Default)]
pub struct FeedEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    /// Record-creation stamp, already normalized to absolute UTC.
    pub created: Option<DateTime<Utc>>,
}

/// Events that matched the team filter, in upstream order.
#[derive(Debug, Default)]
pub struct FilteredCalendar {
    pub events: Vec<FeedEvent>,
}

impl FilteredCalendar {
    /// Number of events that matched.
    pub fn matched(&self) -> usize {
        self.events.len()
    }
}
