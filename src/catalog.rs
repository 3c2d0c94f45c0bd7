//! Product catalog feeds.
//!
//! The catalog arrives as JSON arrays over HTTP (one feed per collection:
//! fragrances, watches). The core's only obligation is defensive parsing:
//! a malformed body, a non-array payload or an exhausted retry budget all
//! degrade to an empty catalog plus a non-blocking notice, never a fault and
//! never a UI stuck in a loading state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::StoreConfig;
use crate::domain::events::{CartEvent, FeedbackSink};
use crate::domain::line_item::LineItem;
use crate::{Result, StorefrontError};

/// Raw catalog entry as published by the feeds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default, alias = "image")]
    pub image_link: Option<String>,
}

impl CatalogEntry {
    /// Discounted price when present and positive, regular price otherwise.
    pub fn effective_price(&self) -> Decimal {
        self.sale_price
            .filter(|p| p.is_sign_positive() && !p.is_zero())
            .or(self.price)
            .unwrap_or(Decimal::ZERO)
    }

    /// Canonical line item at the catalog boundary; `None` without an id.
    pub fn to_line_item(&self, quantity: u32) -> Option<LineItem> {
        if self.id.trim().is_empty() {
            return None;
        }
        let mut item = LineItem::new(self.id.clone(), self.title.clone(), self.effective_price(), quantity);
        if let Some(image) = &self.image_link {
            item = item.with_image(image.clone());
        }
        Some(item)
    }
}

/// Fetches and concatenates the configured feeds.
pub struct CatalogClient {
    http: reqwest::Client,
    feeds: Vec<String>,
    retries: u32,
    backoff: Duration,
}

impl CatalogClient {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            feeds: config.catalog_feeds.clone(),
            retries: config.fetch_retries,
            backoff: Duration::from_millis(config.fetch_backoff_ms),
        }
    }

    /// Fetches every feed and concatenates their entries. Feeds that stay
    /// unreachable after the retry budget contribute nothing; if all of them
    /// fail the sink gets a [`CartEvent::CatalogUnavailable`] and the result
    /// is an empty catalog.
    pub async fn fetch_all(&self, sink: &dyn FeedbackSink) -> Vec<CatalogEntry> {
        let mut entries = Vec::new();
        let mut failures = 0usize;
        for feed in &self.feeds {
            match self.fetch_feed(feed).await {
                Ok(mut feed_entries) => entries.append(&mut feed_entries),
                Err(err) => {
                    tracing::warn!(%feed, %err, "catalog feed unavailable");
                    failures += 1;
                }
            }
        }
        if failures == self.feeds.len() && !self.feeds.is_empty() {
            sink.notify(&CartEvent::CatalogUnavailable {
                detail: "all catalog feeds failed".into(),
            });
        }
        entries
    }

    /// One feed with bounded retries and a fixed backoff between attempts.
    async fn fetch_feed(&self, url: &str) -> Result<Vec<CatalogEntry>> {
        let mut attempt = 0;
        loop {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(parse_feed(&body)),
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(%url, attempt, %err, "retrying catalog fetch");
                    tokio::time::sleep(self.backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| StorefrontError::Catalog(err.to_string()))?;
        let response = response
            .error_for_status()
            .map_err(|err| StorefrontError::Catalog(err.to_string()))?;
        response
            .text()
            .await
            .map_err(|err| StorefrontError::Catalog(err.to_string()))
    }
}

/// Parses a feed body. Anything other than a JSON array of objects is an
/// empty catalog; individually malformed elements are skipped.
pub fn parse_feed(body: &str) -> Vec<CatalogEntry> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%err, "catalog body is not valid JSON");
            return Vec::new();
        }
    };
    let Some(elements) = value.as_array() else {
        tracing::warn!("catalog body is not an array");
        return Vec::new();
    };
    elements
        .iter()
        .filter_map(|element| serde_json::from_value(element.clone()).ok())
        .collect()
}
