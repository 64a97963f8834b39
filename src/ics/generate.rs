//! Filtered feed generation.
//!
//! The output document is assembled line by line rather than through the
//! icalendar builder: TEXT escaping order, CRLF termination, and the
//! injected VTIMEZONE block are all part of this feed's contract with its
//! downstream calendar clients.

use chrono::{DateTime, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};

use crate::config::{FeedConfig, ZoneRules};
use crate::event::{EventTime, FeedEvent, FilteredCalendar};
use crate::localize::to_local_wall_clock;

const PRODID: &str = "-//Filtered Calendar//EN";

/// Suffix that keeps generated identifiers out of the upstream feed's
/// UID namespace.
const GENERATED_UID_SUFFIX: &str = "@generated";

const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Serialize the filtered calendar, stamping records with the current time.
pub fn generate_feed(calendar: &FilteredCalendar, config: &FeedConfig) -> String {
    generate_feed_at(calendar, config, Utc::now())
}

/// Serialize the filtered calendar with an explicit generation stamp.
/// DTSTAMP is the only non-deterministic line, so tests pin it here.
pub fn generate_feed_at(
    calendar: &FilteredCalendar,
    config: &FeedConfig,
    now: DateTime<Utc>,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("BEGIN:VCALENDAR".to_string());
    lines.push("VERSION:2.0".to_string());
    lines.push(format!("PRODID:{}", PRODID));

    push_vtimezone(&mut lines, &config.timezone, &config.zone_rules);

    for event in &calendar.events {
        push_event(&mut lines, event, &config.timezone, now);
    }

    lines.push("END:VCALENDAR".to_string());
    lines.join("\r\n") + "\r\n"
}

/// One STANDARD/DAYLIGHT pair, unbounded, valid indefinitely.
fn push_vtimezone(lines: &mut Vec<String>, tzid: &str, rules: &ZoneRules) {
    lines.push("BEGIN:VTIMEZONE".to_string());
    lines.push(format!("TZID:{}", tzid));
    lines.push(format!("X-LIC-LOCATION:{}", tzid));
    lines.push("BEGIN:STANDARD".to_string());
    lines.push(format!("TZOFFSETFROM:{}", rules.standard_offset_from));
    lines.push(format!("TZOFFSETTO:{}", rules.standard_offset_to));
    lines.push(format!("TZNAME:{}", rules.standard_name));
    lines.push(format!("DTSTART:{}", rules.standard_start));
    lines.push("END:STANDARD".to_string());
    lines.push("BEGIN:DAYLIGHT".to_string());
    lines.push(format!("TZOFFSETFROM:{}", rules.daylight_offset_from));
    lines.push(format!("TZOFFSETTO:{}", rules.daylight_offset_to));
    lines.push(format!("TZNAME:{}", rules.daylight_name));
    lines.push(format!("DTSTART:{}", rules.daylight_start));
    lines.push("END:DAYLIGHT".to_string());
    lines.push("END:VTIMEZONE".to_string());
}

fn push_event(lines: &mut Vec<String>, event: &FeedEvent, tzid: &str, now: DateTime<Utc>) {
    lines.push("BEGIN:VEVENT".to_string());

    let summary = event.summary.clone().unwrap_or_default();
    let start_local = event.start.as_ref().and_then(to_local_wall_clock);

    let uid = match &event.uid {
        Some(uid) => uid.clone(),
        None => generated_uid(&summary, start_local.as_ref()),
    };
    lines.push(format!("UID:{}", uid));
    lines.push(format!("SUMMARY:{}", escape_text(&summary)));

    if let Some(description) = &event.description {
        lines.push(format!("DESCRIPTION:{}", escape_text(description)));
    }
    if let Some(location) = &event.location {
        lines.push(format!("LOCATION:{}", escape_text(location)));
    }

    if let Some(start) = &event.start {
        push_time(lines, "DTSTART", start, tzid);
    }
    if let Some(end) = &event.end {
        push_time(lines, "DTEND", end, tzid);
    }

    if let Some(created) = &event.created {
        lines.push(format!("CREATED:{}", created.format(UTC_FORMAT)));
    }
    lines.push(format!("DTSTAMP:{}", now.format(UTC_FORMAT)));

    lines.push("END:VEVENT".to_string());
}

/// Write a start/end value as local wall clock under the fixed zone's TZID.
/// Date-only values carry no clock and are written as VALUE=DATE instead.
fn push_time(lines: &mut Vec<String>, name: &str, time: &EventTime, tzid: &str) {
    match time {
        EventTime::Date(d) => {
            lines.push(format!("{};VALUE=DATE:{}", name, d.format("%Y%m%d")));
        }
        other => {
            if let Some(local) = to_local_wall_clock(other) {
                lines.push(format!("{};TZID={}:{}", name, tzid, local.format(LOCAL_FORMAT)));
            }
        }
    }
}

/// Deterministic UID for events the feed ships without one: hash of the
/// cleaned title plus the formatted local start, so the same game gets the
/// same identifier on every run.
fn generated_uid(summary: &str, start_local: Option<&NaiveDateTime>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(summary.as_bytes());
    if let Some(start) = start_local {
        hasher.update(start.format(LOCAL_FORMAT).to_string().as_bytes());
    }
    let digest = hasher.finalize();

    let mut token = String::with_capacity(40);
    for byte in &digest[..20] {
        token.push_str(&format!("{:02x}", byte));
    }
    format!("{}{}", token, GENERATED_UID_SUFFIX)
}

/// RFC 5545 TEXT escaping. Backslash must run first so the later passes
/// don't double it up.
pub(crate) fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}
