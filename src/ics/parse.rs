//! Feed parsing using the icalendar crate's parser.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

use crate::error::{FeedError, FeedResult};
use crate::event::{EventTime, FeedEvent};

/// Parse a full VCALENDAR document into events.
///
/// A well-formed document with no VEVENT components is valid and yields an
/// empty list; a malformed document is a hard error.
pub fn parse_feed(content: &str) -> FeedResult<Vec<FeedEvent>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| FeedError::Parse(e.to_string()))?;

    Ok(calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .map(parse_event)
        .collect())
}

fn parse_event(vevent: &Component) -> FeedEvent {
    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .filter(|v| !v.is_empty());
    let summary = text_prop(vevent, "SUMMARY");
    let description = text_prop(vevent, "DESCRIPTION");
    let location = text_prop(vevent, "LOCATION");

    let start = datetime_prop(vevent, "DTSTART");
    let end = datetime_prop(vevent, "DTEND");

    let created = vevent
        .find_prop("CREATED")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .and_then(created_to_utc);

    FeedEvent {
        uid,
        summary,
        description,
        location,
        start,
        end,
        created,
    }
}

/// TEXT property value with RFC 5545 escapes undone.
fn text_prop(vevent: &Component, name: &str) -> Option<String> {
    vevent
        .find_prop(name)
        .map(|p| unescape_text(p.val.as_ref()))
        .filter(|v| !v.is_empty())
}

fn datetime_prop(vevent: &Component, name: &str) -> Option<EventTime> {
    vevent
        .find_prop(name)
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time)
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving the
/// zone information the source stated.
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            CalendarDateTime::WithTimezone { date_time, tzid } => EventTime::DateTimeZoned {
                datetime: date_time,
                tzid,
            },
        },
    }
}

/// Normalize a CREATED stamp to absolute UTC. Unlike event start/end times,
/// this is a genuine zone conversion: the stamp marks a record-creation
/// instant, not a displayed game time.
fn created_to_utc(dpt: DatePerhapsTime) -> Option<DateTime<Utc>> {
    match dpt {
        DatePerhapsTime::Date(_) => None,
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => Some(dt),
            // The feed has been seen emitting naive CREATED stamps; treat
            // them as UTC.
            CalendarDateTime::Floating(naive) => Some(naive.and_utc()),
            CalendarDateTime::WithTimezone { date_time, tzid } => match tzid.parse::<Tz>() {
                Ok(tz) => date_time
                    .and_local_timezone(tz)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc)),
                Err(_) => Some(date_time.and_utc()),
            },
        },
    }
}

/// Undo RFC 5545 TEXT escaping (inverse of `generate::escape_text`).
pub(crate) fn unescape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
