use crate::config::Config;
use crate::fetchers::traits::ListingsFetcher;
use crate::filters::{serialize, FilterSet};
use crate::models::ListingsPage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::form_urlencoded;

const DEFAULT_PAGE_SIZE: u32 = 20;

/// REST results API client
pub struct ApiFetcher {
    client: Client,
    base_url: String,
    page_size: u32,
}

impl ApiFetcher {
    /// Create a client for `base_url` with default timeout and page size
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_options(base_url, Duration::from_secs(30), DEFAULT_PAGE_SIZE)
    }

    pub fn from_config(base_url: &str, config: &Config) -> Result<Self> {
        Self::with_options(base_url, config.http_timeout, config.page_size)
    }

    pub fn with_options(
        base_url: impl Into<String>,
        timeout: Duration,
        page_size: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            page_size,
        })
    }

    /// Listing endpoint for a search. Filters go out as serialized, inverted
    /// ranges included; the API decides what they match.
    fn listings_url(&self, filters: &FilterSet, page: u32) -> String {
        let base = self.base_url.trim_end_matches('/');
        let paging = form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &page.to_string())
            .append_pair("pageSize", &self.page_size.to_string())
            .finish();

        let filter_query = serialize(filters);
        if filter_query.is_empty() {
            format!("{base}/listings?{paging}")
        } else {
            format!("{base}/listings?{filter_query}&{paging}")
        }
    }
}

#[async_trait]
impl ListingsFetcher for ApiFetcher {
    async fn fetch_listings(&self, filters: &FilterSet, page: u32) -> Result<ListingsPage> {
        let url = self.listings_url(filters, page);
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch listings")?;

        if !response.status().is_success() {
            warn!("Listings API returned status: {}", response.status());
            anyhow::bail!("Failed to fetch listings: {}", response.status());
        }

        let results: ListingsPage = response
            .json()
            .await
            .context("Failed to decode listings page")?;

        info!(
            "Fetched page {} with {} of {} listings",
            results.page,
            results.listings.len(),
            results.total
        );
        Ok(results)
    }

    fn source_name(&self) -> &'static str {
        "api"
    }
}
