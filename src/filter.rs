//! Team matching and title cleanup.

use crate::config::FeedConfig;
use crate::event::{FeedEvent, FilteredCalendar};

/// Select events that mention the team and tidy their titles. Relative
/// order from the upstream document is preserved; non-matching events are
/// dropped.
pub fn filter_events(events: Vec<FeedEvent>, config: &FeedConfig) -> FilteredCalendar {
    let mut out = FilteredCalendar::default();

    for mut event in events {
        if !matches_team(&event, &config.team_variants) {
            continue;
        }
        event.summary = event
            .summary
            .map(|summary| clean_title(&summary, &config.strip_prefixes));
        out.events.push(event);
    }

    out
}

/// Case-insensitive substring match over the event's combined text fields.
/// No diacritic folding: "Löwen" and "Loewen" are separate variants.
fn matches_team(event: &FeedEvent, variants: &[String]) -> bool {
    let haystack = [
        event.summary.as_deref(),
        event.description.as_deref(),
        event.location.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();

    variants
        .iter()
        .any(|variant| haystack.contains(&variant.to_lowercase()))
}

/// Strip the first configured prefix that case-insensitively starts the
/// title, along with any whitespace after it. At most one prefix is
/// removed; a title matching no prefix comes back unchanged.
fn clean_title(title: &str, prefixes: &[String]) -> String {
    let trimmed = title.trim();
    for prefix in prefixes {
        if let Some(rest) = strip_prefix_ignore_case(trimmed, prefix) {
            return rest.trim_start().to_string();
        }
    }
    trimmed.to_string()
}

/// Case-insensitive prefix strip that walks chars, so multi-byte prefixes
/// can never split a UTF-8 sequence.
fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut s_chars = s.char_indices();
    let mut prefix_chars = prefix.chars();

    loop {
        let Some(p) = prefix_chars.next() else {
            return match s_chars.next() {
                Some((idx, _)) => Some(&s[idx..]),
                None => Some(""),
            };
        };
        let (_, c) = s_chars.next()?;
        if !c.to_lowercase().eq(p.to_lowercase()) {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FeedConfig {
        FeedConfig::default()
    }

    fn event_with_summary(summary: &str) -> FeedEvent {
        FeedEvent {
            summary: Some(summary.to_string()),
            ..FeedEvent::default()
        }
    }

    #[test]
    fn test_prefix_is_stripped_from_matching_title() {
        let events = vec![event_with_summary(
            "easyCredit BBL Spiel Löwen Braunschweig vs. X",
        )];
        let filtered = filter_events(events, &config());

        assert_eq!(filtered.matched(), 1);
        assert_eq!(
            filtered.events[0].summary.as_deref(),
            Some("Löwen Braunschweig vs. X")
        );
    }

    #[test]
    fn test_unrelated_event_is_dropped() {
        let events = vec![event_with_summary("easyCredit BBL Spiel Alba Berlin vs. Bonn")];
        assert_eq!(filter_events(events, &config()).matched(), 0);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let events = vec![event_with_summary("LÖWEN BRAUNSCHWEIG at Bamberg")];
        assert_eq!(filter_events(events, &config()).matched(), 1);
    }

    #[test]
    fn test_location_alone_can_match() {
        let event = FeedEvent {
            summary: Some("Heimspiel".to_string()),
            location: Some("Braunschweig, Volkswagen Halle".to_string()),
            ..FeedEvent::default()
        };
        assert_eq!(filter_events(vec![event], &config()).matched(), 1);
    }

    #[test]
    fn test_order_is_preserved() {
        let events = vec![
            event_with_summary("Braunschweig vs. A"),
            event_with_summary("Alba Berlin vs. Bonn"),
            event_with_summary("B vs. Braunschweig"),
        ];
        let filtered = filter_events(events, &config());
        let titles: Vec<_> = filtered
            .events
            .iter()
            .map(|e| e.summary.as_deref().unwrap())
            .collect();
        assert_eq!(titles, vec!["Braunschweig vs. A", "B vs. Braunschweig"]);
    }

    #[test]
    fn test_absent_title_survives_filtering() {
        let event = FeedEvent {
            description: Some("Löwen Braunschweig Auswärtsspiel".to_string()),
            ..FeedEvent::default()
        };
        let filtered = filter_events(vec![event], &config());
        assert_eq!(filtered.matched(), 1);
        assert_eq!(filtered.events[0].summary, None);
    }

    #[test]
    fn test_at_most_one_prefix_is_removed() {
        let mut config = config();
        config.strip_prefixes = vec!["BBL ".to_string(), "Spiel ".to_string()];

        let cleaned = clean_title("BBL Spiel Braunschweig", &config.strip_prefixes);
        assert_eq!(cleaned, "Spiel Braunschweig");
    }

    #[test]
    fn test_prefix_strip_is_case_insensitive() {
        let cleaned = clean_title(
            "EASYCREDIT bbl SPIEL Braunschweig",
            &["easyCredit BBL Spiel ".to_string()],
        );
        assert_eq!(cleaned, "Braunschweig");
    }

    #[test]
    fn test_multibyte_prefix_cannot_panic() {
        let cleaned = clean_title("Löwen-Festspiel", &["löwen".to_string()]);
        assert_eq!(cleaned, "-Festspiel");
    }
}
