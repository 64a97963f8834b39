//! One end-to-end feed update run.
//!
//! Control flow: load metadata -> conditional fetch -> filter -> normalize
//! -> build -> publish -> save metadata. Metadata is saved only after a
//! successful publish, so stored validators never reference a document that
//! was not actually written.

use chrono_tz::Tz;

use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};
use crate::fetch::{FetchOutcome, Fetcher};
use crate::filter::filter_events;
use crate::ics;
use crate::meta::{self, FeedMetadata};
use crate::publish::{self, PublishPaths};

/// What a run did, for callers that want to report it.
#[derive(Debug, PartialEq)]
pub enum RunOutcome {
    /// Upstream unchanged; the published document was left as-is.
    Unchanged,
    /// A new document was committed, containing this many matching events.
    Published { matched: usize },
}

/// Perform one fetch/filter/build/publish cycle. With `force`, stored
/// validators are ignored and the feed is fetched unconditionally.
pub async fn run(config: &FeedConfig, force: bool) -> FeedResult<RunOutcome> {
    // Catch zone typos before anything is fetched or replaced: the TZID we
    // stamp on every event must be resolvable by downstream clients.
    config
        .timezone
        .parse::<Tz>()
        .map_err(|_| FeedError::Timezone(config.timezone.clone()))?;

    let stored = if force {
        log::info!("Forced refresh, ignoring stored validators");
        FeedMetadata::default()
    } else {
        meta::load(&config.meta_path)
    };

    let fetcher = Fetcher::new(config)?;

    let (body, new_meta) = match fetcher.fetch(&stored).await? {
        FetchOutcome::Fetched { body, meta } => (body, meta),
        FetchOutcome::NotModified => {
            if config.output_path.exists() {
                log::info!("Feed not modified, no update needed");
                return Ok(RunOutcome::Unchanged);
            }
            // A 304 with no published document would leave the system with
            // no output at all; refetch without validators.
            log::info!(
                "Feed not modified but {} does not exist, refetching unconditionally",
                config.output_path.display()
            );
            match fetcher.fetch(&FeedMetadata::default()).await? {
                FetchOutcome::Fetched { body, meta } => (body, meta),
                FetchOutcome::NotModified => {
                    return Err(FeedError::Status(reqwest::StatusCode::NOT_MODIFIED));
                }
            }
        }
    };
    log::info!("Fetched feed: {} bytes", body.len());

    let events = ics::parse_feed(&body)?;
    let filtered = filter_events(events, config);
    log::info!("Found {} matching events", filtered.matched());

    let document = ics::generate_feed(&filtered, config);

    let paths = PublishPaths::for_output(&config.output_path);
    publish::publish(&paths, &document)?;

    meta::save(&config.meta_path, &new_meta);
    log::info!(
        "Update successful, wrote {} with {} events",
        config.output_path.display(),
        filtered.matched()
    );

    Ok(RunOutcome::Published {
        matched: filtered.matched(),
    })
}
