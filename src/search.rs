use crate::fetchers::ListingsFetcher;
use crate::filters::{FilterSet, FilterSync, Router, SyncEvent};
use crate::models::ListingsPage;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// One search view: the synchronized filters plus the results page being shown.
pub struct SearchSession<R> {
    sync: FilterSync<R>,
    fetcher: Box<dyn ListingsFetcher>,
    page: u32,
}

impl<R: Router> SearchSession<R> {
    pub fn new(sync: FilterSync<R>, fetcher: Box<dyn ListingsFetcher>) -> Self {
        Self {
            sync,
            fetcher,
            page: 1,
        }
    }

    pub fn filters(&self) -> &FilterSet {
        self.sync.filters()
    }

    pub fn sync(&self) -> &FilterSync<R> {
        &self.sync
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Feed an event to the synchronizer. Any change to the filters sends
    /// the view back to the first page.
    pub fn handle(&mut self, event: SyncEvent) -> bool {
        let changed = self.sync.handle(event);
        if changed {
            self.page = 1;
        }
        changed
    }

    /// Fetch the current page for the current filters
    pub async fn refresh(&self) -> Result<ListingsPage> {
        let filters = self.sync.filters();
        if filters.has_inverted_range() {
            warn!("Searching with a min above its max, passing it through as-is");
        }
        info!(
            source = self.fetcher.source_name(),
            query = %self.sync.normalized_query(),
            page = self.page,
            "Fetching listings"
        );

        self.fetcher
            .fetch_listings(filters, self.page)
            .await
            .with_context(|| format!("Search against {} failed", self.fetcher.source_name()))
    }
}
