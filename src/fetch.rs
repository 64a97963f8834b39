//! Conditional retrieval of the upstream feed.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};

use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};
use crate::meta::FeedMetadata;

/// Result of one fetch attempt.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Upstream reported no change since the recorded validators (HTTP 304).
    NotModified,
    /// Full document body, plus the validators to persist once the new
    /// document has actually been published.
    Fetched { body: String, meta: FeedMetadata },
}

/// HTTP client wrapper for the feed URL.
pub struct Fetcher {
    http: reqwest::Client,
    url: String,
}

impl Fetcher {
    pub fn new(config: &FeedConfig) -> FeedResult<Fetcher> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Fetcher {
            http,
            url: config.feed_url.clone(),
        })
    }

    /// Fetch the feed, sending whichever validators `meta` carries. Pass
    /// empty metadata to force an unconditional fetch.
    ///
    /// Non-304 failure statuses are hard errors; retries belong to the
    /// external scheduler, not this client.
    pub async fn fetch(&self, meta: &FeedMetadata) -> FeedResult<FetchOutcome> {
        let mut request = self.http.get(&self.url);
        if let Some(etag) = &meta.etag {
            request = request.header(IF_NONE_MATCH, etag.as_str());
        }
        if let Some(last_modified) = &meta.last_modified {
            request = request.header(IF_MODIFIED_SINCE, last_modified.as_str());
        }

        log::info!(
            "Requesting feed {} (conditional: {})",
            self.url,
            !meta.is_empty()
        );
        let response = request.send().await?;
        let status = response.status();
        log::info!("HTTP {} received", status);

        if status == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        let new_meta = FeedMetadata {
            etag: header_value(&response, ETAG),
            last_modified: header_value(&response, LAST_MODIFIED),
        };
        let body = response.text().await?;

        Ok(FetchOutcome::Fetched {
            body,
            meta: new_meta,
        })
    }
}

/// Response header as an owned string; empty values count as absent.
fn header_value(response: &reqwest::Response, name: HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}
