use crate::filters::FilterSet;
use crate::models::ListingsPage;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for everything that can answer a listing search.
/// The filters are handed over exactly as the synchronizer holds them.
#[async_trait]
pub trait ListingsFetcher: Send + Sync {
    /// Fetch one page (1-based) of listings matching `filters`
    async fn fetch_listings(&self, filters: &FilterSet, page: u32) -> Result<ListingsPage>;

    /// Get the name of the results source
    fn source_name(&self) -> &'static str;
}
