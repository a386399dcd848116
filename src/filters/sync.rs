use tracing::{debug, warn};

use super::query::{parse, serialize};
use super::types::{FilterChange, FilterSet};

/// Location provider the synchronizer reads from and navigates through.
pub trait Router {
    /// Query string of the current location, without the leading `?`.
    fn current_query(&self) -> String;

    /// Push a new query string. Fire-and-forget.
    fn navigate(&mut self, query: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// User changes navigate freely.
    Idle,
    /// Replaying a URL change into memory. Left on the next [`SyncEvent::Tick`].
    SyncingFromUrl,
}

/// What happens to a user change that lands while syncing from the URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuardPolicy {
    /// Memory is updated, the navigation is lost.
    #[default]
    Drop,
    /// Memory is updated, one navigation for the final state is sent when
    /// the guard is left.
    Defer,
}

impl GuardPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "drop" => Some(Self::Drop),
            "defer" => Some(Self::Defer),
            _ => None,
        }
    }
}

/// Who caused a URL change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOrigin {
    /// The echo of one of our own navigations.
    Internal,
    /// Back/forward, a sibling component, a pasted link.
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    User(FilterChange),
    Clear,
    UrlChanged {
        query: String,
        origin: NavigationOrigin,
    },
    Tick,
}

/// Keeps one [`FilterSet`] in step with the router's query string.
pub struct FilterSync<R> {
    router: R,
    filters: FilterSet,
    state: SyncState,
    policy: GuardPolicy,
    /// Normalized query the router is known to be showing
    last_query: String,
    pending: bool,
}

impl<R: Router> FilterSync<R> {
    pub fn new(router: R) -> Self {
        Self::with_policy(router, GuardPolicy::default())
    }

    pub fn with_policy(router: R, policy: GuardPolicy) -> Self {
        let filters = parse(&router.current_query());
        let last_query = serialize(&filters);
        Self {
            router,
            filters,
            state: SyncState::Idle,
            policy,
            last_query,
            pending: false,
        }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn policy(&self) -> GuardPolicy {
        self.policy
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut R {
        &mut self.router
    }

    /// Query string for the current filters, as handed to the results fetcher.
    pub fn normalized_query(&self) -> String {
        serialize(&self.filters)
    }

    /// Apply a user change. Navigates unless a URL sync is in progress.
    pub fn apply_change(&mut self, change: FilterChange) -> &FilterSet {
        debug!(?change, "Applying filter change");
        let next = self.filters.apply(change);
        self.commit(next);
        &self.filters
    }

    /// Reset all filters except listing status and purpose.
    pub fn clear(&mut self) -> &FilterSet {
        let next = self.filters.cleared();
        self.commit(next);
        &self.filters
    }

    /// Replace the filters from a URL we did not produce. Never navigates.
    pub fn on_external_url_change(&mut self, query: &str) -> &FilterSet {
        self.state = SyncState::SyncingFromUrl;
        self.filters = parse(query);
        self.last_query = serialize(&self.filters);
        self.pending = false;
        debug!(query = %self.last_query, "Synced filters from URL");
        &self.filters
    }

    /// Next scheduling tick: leave the URL-sync guard.
    pub fn tick(&mut self) {
        if self.state == SyncState::Idle {
            return;
        }
        self.state = SyncState::Idle;

        if std::mem::take(&mut self.pending) {
            let query = serialize(&self.filters);
            debug!(%query, "Sending deferred navigation");
            self.navigate(query);
        }
    }

    /// Dispatch a tagged event. Returns true when the in-memory filters changed.
    pub fn handle(&mut self, event: SyncEvent) -> bool {
        let before = self.filters.clone();
        match event {
            SyncEvent::User(change) => {
                self.apply_change(change);
            }
            SyncEvent::Clear => {
                self.clear();
            }
            SyncEvent::UrlChanged {
                query,
                origin: NavigationOrigin::External,
            } => {
                self.on_external_url_change(&query);
            }
            SyncEvent::UrlChanged {
                query,
                origin: NavigationOrigin::Internal,
            } => {
                if serialize(&parse(&query)) != self.last_query {
                    warn!(
                        %query,
                        expected = %self.last_query,
                        "Router echoed an unexpected query, resyncing"
                    );
                    self.on_external_url_change(&query);
                }
            }
            SyncEvent::Tick => self.tick(),
        }
        self.filters != before
    }

    fn commit(&mut self, next: FilterSet) {
        self.filters = next;
        match (self.state, self.policy) {
            (SyncState::Idle, _) => {
                let query = serialize(&self.filters);
                self.navigate(query);
            }
            (SyncState::SyncingFromUrl, GuardPolicy::Drop) => {
                debug!("Syncing from URL, navigation dropped");
            }
            (SyncState::SyncingFromUrl, GuardPolicy::Defer) => {
                debug!("Syncing from URL, navigation deferred");
                self.pending = true;
            }
        }
    }

    fn navigate(&mut self, query: String) {
        if query == self.last_query {
            return;
        }
        self.router.navigate(&query);
        self.last_query = query;
    }
}

/// Router backed by an in-memory history stack.
#[derive(Debug, Clone)]
pub struct MemoryRouter {
    entries: Vec<String>,
    index: usize,
}

impl MemoryRouter {
    pub fn new(initial: impl Into<String>) -> Self {
        let initial = initial.into();
        let initial = initial.strip_prefix('?').unwrap_or(&initial).to_string();
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn history(&self) -> &[String] {
        &self.entries
    }

    /// Step back in history. Returns the query that is now current.
    pub fn back(&mut self) -> Option<String> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Step forward in history. Returns the query that is now current.
    pub fn forward(&mut self) -> Option<String> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new("")
    }
}

impl Router for MemoryRouter {
    fn current_query(&self) -> String {
        self.entries[self.index].clone()
    }

    fn navigate(&mut self, query: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(query.to_string());
        self.index = self.entries.len() - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{ListingStatus, Purpose, RentalTerm, SortBy};

    fn sync_at(query: &str) -> FilterSync<MemoryRouter> {
        FilterSync::new(MemoryRouter::new(query))
    }

    #[test]
    fn starts_from_the_current_url() {
        let sync = sync_at("?listingStatus=for-sale&bedrooms=2");
        assert_eq!(sync.filters().listing_status, Some(ListingStatus::ForSale));
        assert_eq!(sync.filters().bedrooms, Some(2));
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[test]
    fn user_change_navigates() {
        let mut sync = sync_at("");
        sync.apply_change(FilterChange::Bedrooms(Some(3)));
        assert_eq!(sync.router().current_query(), "bedrooms=3");
        assert_eq!(sync.router().history().len(), 2);
    }

    #[test]
    fn no_op_change_does_not_navigate() {
        let mut sync = sync_at("bedrooms=3");
        sync.apply_change(FilterChange::Bedrooms(Some(3)));
        sync.apply_change(FilterChange::SortBy(SortBy::Newest));
        assert_eq!(sync.router().history().len(), 1);
    }

    #[test]
    fn cascade_is_reflected_in_the_url() {
        let mut sync = sync_at("listingStatus=for-rent&purpose=residential&rentalTerm=short-term");
        assert_eq!(sync.filters().rental_term, Some(RentalTerm::ShortTerm));

        sync.apply_change(FilterChange::ListingStatus(Some(ListingStatus::ForSale)));
        assert_eq!(sync.filters().rental_term, None);
        assert_eq!(
            sync.router().current_query(),
            "listingStatus=for-sale&purpose=residential"
        );
    }

    #[test]
    fn clear_keeps_the_section() {
        let mut sync = sync_at("listingStatus=for-rent&purpose=residential&bedrooms=3");
        sync.clear();
        assert_eq!(
            sync.router().current_query(),
            "listingStatus=for-rent&purpose=residential"
        );
        assert_eq!(sync.filters().purpose, Some(Purpose::Residential));
    }

    #[test]
    fn external_change_never_navigates() {
        let mut sync = sync_at("bedrooms=1");
        let query = "listingStatus=for-sale&bedrooms=4";
        sync.router_mut().navigate(query);
        let entries = sync.router().history().len();

        let changed = sync.handle(SyncEvent::UrlChanged {
            query: query.to_string(),
            origin: NavigationOrigin::External,
        });
        assert!(changed);
        assert_eq!(sync.state(), SyncState::SyncingFromUrl);
        assert_eq!(sync.filters().bedrooms, Some(4));
        assert_eq!(sync.normalized_query(), query);

        sync.handle(SyncEvent::Tick);
        assert_eq!(sync.state(), SyncState::Idle);
        assert_eq!(sync.router().history().len(), entries);
        assert_eq!(sync.router().current_query(), query);
    }

    #[test]
    fn back_button_restores_previous_filters() {
        let mut sync = sync_at("");
        sync.apply_change(FilterChange::Bedrooms(Some(2)));
        sync.apply_change(FilterChange::Bathrooms(Some(1)));

        let previous = sync.router_mut().back().unwrap();
        sync.on_external_url_change(&previous);
        sync.tick();

        assert_eq!(sync.filters().bedrooms, Some(2));
        assert_eq!(sync.filters().bathrooms, None);
        assert_eq!(sync.router().history().len(), 3);
    }

    #[test]
    fn change_during_sync_is_dropped_by_default() {
        let mut sync = sync_at("");
        sync.on_external_url_change("bedrooms=2");
        sync.apply_change(FilterChange::Bathrooms(Some(2)));

        // Memory has the change, the URL does not
        assert_eq!(sync.filters().bathrooms, Some(2));
        assert_eq!(sync.router().history().len(), 1);

        sync.tick();
        assert_eq!(sync.router().history().len(), 1);

        // Once idle, changes navigate again
        sync.apply_change(FilterChange::Bathrooms(Some(3)));
        assert_eq!(sync.router().current_query(), "bedrooms=2&bathrooms=3");
    }

    #[test]
    fn change_during_sync_is_sent_on_tick_when_deferred() {
        let mut sync = FilterSync::with_policy(MemoryRouter::new(""), GuardPolicy::Defer);
        sync.on_external_url_change("bedrooms=2");
        sync.apply_change(FilterChange::Bathrooms(Some(2)));
        sync.apply_change(FilterChange::Bathrooms(Some(3)));
        assert_eq!(sync.router().history().len(), 1);

        sync.tick();
        assert_eq!(sync.router().history().len(), 2);
        assert_eq!(sync.router().current_query(), "bedrooms=2&bathrooms=3");
    }

    #[test]
    fn deferred_change_that_nets_out_sends_nothing() {
        let mut sync = FilterSync::with_policy(MemoryRouter::new(""), GuardPolicy::Defer);
        sync.on_external_url_change("bedrooms=2");
        sync.apply_change(FilterChange::Bedrooms(Some(5)));
        sync.apply_change(FilterChange::Bedrooms(Some(2)));
        sync.tick();
        assert_eq!(sync.router().history().len(), 1);
    }

    #[test]
    fn internal_echo_is_ignored() {
        let mut sync = sync_at("");
        sync.apply_change(FilterChange::Bedrooms(Some(2)));
        let echoed = sync.router().current_query();

        let changed = sync.handle(SyncEvent::UrlChanged {
            query: echoed,
            origin: NavigationOrigin::Internal,
        });
        assert!(!changed);
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[test]
    fn unexpected_internal_echo_resyncs() {
        let mut sync = sync_at("bedrooms=2");
        let changed = sync.handle(SyncEvent::UrlChanged {
            query: "bedrooms=5".to_string(),
            origin: NavigationOrigin::Internal,
        });
        assert!(changed);
        assert_eq!(sync.filters().bedrooms, Some(5));
        assert_eq!(sync.state(), SyncState::SyncingFromUrl);
    }

    #[test]
    fn guard_policy_names() {
        assert_eq!(GuardPolicy::from_name("Drop"), Some(GuardPolicy::Drop));
        assert_eq!(GuardPolicy::from_name(" defer "), Some(GuardPolicy::Defer));
        assert_eq!(GuardPolicy::from_name("queue"), None);
    }

    #[test]
    fn memory_router_history() {
        let mut router = MemoryRouter::new("?a=1");
        router.navigate("a=2");
        router.navigate("a=3");
        assert_eq!(router.back().as_deref(), Some("a=2"));
        assert_eq!(router.back().as_deref(), Some("a=1"));
        assert_eq!(router.back(), None);
        assert_eq!(router.forward().as_deref(), Some("a=2"));

        router.navigate("a=9");
        assert_eq!(router.forward(), None);
        assert_eq!(router.history(), ["a=1", "a=2", "a=9"]);
    }
}
