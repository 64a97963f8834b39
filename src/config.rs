//! Runtime configuration for the feed pipeline.
//!
//! Loaded once at startup and passed into the pipeline; defaults match the
//! Löwen Braunschweig deployment so the tool runs without any config file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FeedError, FeedResult};

/// Configuration at ~/.config/teamfeed/config.toml (or `--config PATH`).
///
/// Every field has a default; a missing file is a valid configuration.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct FeedConfig {
    /// Upstream ICS feed URL.
    pub feed_url: String,

    /// Spellings that identify the team in event text. Matched as
    /// case-insensitive substrings; diacritic variants must be listed
    /// separately ("Löwen" does not match "Loewen").
    pub team_variants: Vec<String>,

    /// Title prefixes to strip from matched events. At most one is removed,
    /// first match wins, in list order.
    pub strip_prefixes: Vec<String>,

    /// IANA name of the zone all event times are displayed in.
    pub timezone: String,

    /// Transition rules emitted as the output's VTIMEZONE block.
    pub zone_rules: ZoneRules,

    /// Path the filtered feed is published at. Backup and staging siblings
    /// (`.bak`, `.new`) exist only during the commit window.
    pub output_path: PathBuf,

    /// Path of the conditional-request metadata file.
    pub meta_path: PathBuf,

    /// Network timeout for the feed request, in seconds.
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> FeedConfig {
        FeedConfig {
            feed_url: "http://api.basketball-bundesliga.de/calendar/ical/all-games".to_string(),
            team_variants: vec![
                "Löwen Braunschweig".to_string(),
                "Loewen Braunschweig".to_string(),
                "Braunschweig".to_string(),
                "Basketball Löwen".to_string(),
            ],
            strip_prefixes: vec!["easyCredit BBL Spiel ".to_string()],
            timezone: "Europe/Berlin".to_string(),
            zone_rules: ZoneRules::default(),
            output_path: PathBuf::from("loewen_braunschweig.ics"),
            meta_path: PathBuf::from(".feedmeta"),
            timeout_secs: 30,
        }
    }
}

/// One fixed standard/daylight transition pair for the display zone.
///
/// Emitted verbatim into the VTIMEZONE block. The rules are unbounded
/// (1970-anchored DTSTART, no RDATE/RRULE windows), so they stay valid
/// indefinitely.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ZoneRules {
    pub standard_name: String,
    pub standard_offset_from: String,
    pub standard_offset_to: String,
    pub standard_start: String,
    pub daylight_name: String,
    pub daylight_offset_from: String,
    pub daylight_offset_to: String,
    pub daylight_start: String,
}

impl Default for ZoneRules {
    fn default() -> ZoneRules {
        ZoneRules {
            standard_name: "CET".to_string(),
            standard_offset_from: "+0200".to_string(),
            standard_offset_to: "+0100".to_string(),
            standard_start: "19701025T030000".to_string(),
            daylight_name: "CEST".to_string(),
            daylight_offset_from: "+0100".to_string(),
            daylight_offset_to: "+0200".to_string(),
            daylight_start: "19700329T020000".to_string(),
        }
    }
}

impl FeedConfig {
    pub fn default_path() -> FeedResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FeedError::Config("Could not determine config directory".into()))?
            .join("teamfeed");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from an explicit path, or the platform default. A missing file
    /// yields the built-in defaults; a malformed file is a hard error.
    pub fn load(path: Option<&Path>) -> FeedResult<FeedConfig> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            return Ok(FeedConfig::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)
            .map_err(|e| FeedError::Config(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_the_original_deployment() {
        let config = FeedConfig::default();
        assert!(config.feed_url.contains("basketball-bundesliga"));
        assert_eq!(config.team_variants.len(), 4);
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.zone_rules.standard_name, "CET");
    }

    #[test]
    fn test_partial_toml_keeps_defaults_for_missing_fields() {
        let config: FeedConfig = toml::from_str(
            r#"
            feed_url = "https://example.com/feed.ics"
            team_variants = ["Alba Berlin"]
            "#,
        )
        .unwrap();

        assert_eq!(config.feed_url, "https://example.com/feed.ics");
        assert_eq!(config.team_variants, vec!["Alba Berlin".to_string()]);
        // Untouched fields fall back to defaults
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.output_path, PathBuf::from("loewen_braunschweig.ics"));
    }

    #[test]
    fn test_zone_rules_override() {
        let config: FeedConfig = toml::from_str(
            r#"
            timezone = "Europe/London"

            [zone_rules]
            standard_name = "GMT"
            standard_offset_from = "+0100"
            standard_offset_to = "+0000"
            standard_start = "19701025T020000"
            daylight_name = "BST"
            daylight_offset_from = "+0000"
            daylight_offset_to = "+0100"
            daylight_start = "19700329T010000"
            "#,
        )
        .unwrap();

        assert_eq!(config.zone_rules.standard_name, "GMT");
        assert_eq!(config.zone_rules.daylight_name, "BST");
    }
}
