//! Conditional-request metadata persisted between runs.
//!
//! A small `key:value` text file holding the validators the upstream server
//! handed us. Both load and save fail soft: a broken metadata file costs one
//! unconditional fetch, it never aborts a run, and a failed save never rolls
//! back an already-committed feed document.

use std::path::Path;

const ETAG_KEY: &str = "ETag";
const LAST_MODIFIED_KEY: &str = "Last-Modified";

/// Validator tokens for conditional fetches. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedMetadata {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl FeedMetadata {
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

/// Load metadata from disk. A missing or unreadable file yields empty
/// metadata.
pub fn load(path: &Path) -> FeedMetadata {
    if !path.exists() {
        return FeedMetadata::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => parse(&contents),
        Err(e) => {
            log::warn!("Could not read feed metadata at {}: {}", path.display(), e);
            FeedMetadata::default()
        }
    }
}

fn parse(contents: &str) -> FeedMetadata {
    let mut meta = FeedMetadata::default();

    for line in contents.lines() {
        // Split on the first colon only: Last-Modified values contain colons.
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            ETAG_KEY => meta.etag = Some(value.to_string()),
            LAST_MODIFIED_KEY => meta.last_modified = Some(value.to_string()),
            other => log::warn!("Ignoring unknown metadata key '{}'", other),
        }
    }

    meta
}

/// Save metadata to disk, writing only keys that have a value. Failure is
/// logged and absorbed.
pub fn save(path: &Path, meta: &FeedMetadata) {
    let mut contents = String::new();
    if let Some(etag) = &meta.etag {
        contents.push_str(&format!("{}:{}\n", ETAG_KEY, etag));
    }
    if let Some(last_modified) = &meta.last_modified {
        contents.push_str(&format!("{}:{}\n", LAST_MODIFIED_KEY, last_modified));
    }

    if let Err(e) = std::fs::write(path, contents) {
        log::warn!("Could not write feed metadata at {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_keys() {
        let meta = parse("ETag:\"abc123\"\nLast-Modified:Mon, 02 Jan 2006 15:04:05 GMT\n");
        assert_eq!(meta.etag.as_deref(), Some("\"abc123\""));
        assert_eq!(
            meta.last_modified.as_deref(),
            Some("Mon, 02 Jan 2006 15:04:05 GMT")
        );
    }

    #[test]
    fn test_parse_skips_unknown_keys_and_blank_values() {
        let meta = parse("ETag:\nX-Custom:whatever\nnot a pair\n");
        assert!(meta.is_empty());
    }

    #[test]
    fn test_missing_file_is_empty_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let meta = load(&dir.path().join("does-not-exist"));
        assert!(meta.is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".feedmeta");

        let meta = FeedMetadata {
            etag: Some("\"v7\"".to_string()),
            last_modified: Some("Tue, 03 Jan 2006 10:00:00 GMT".to_string()),
        };
        save(&path, &meta);

        assert_eq!(load(&path), meta);
    }

    #[test]
    fn test_save_omits_absent_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".feedmeta");

        let meta = FeedMetadata {
            etag: Some("\"only-etag\"".to_string()),
            last_modified: None,
        };
        save(&path, &meta);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("ETag:"));
        assert!(!written.contains("Last-Modified"));
    }
}
