//! Search state controller.
//!
//! The controller is the single source of truth for one search view. Every
//! mutator is a synchronous state transition (pagination reset, URL rewrite)
//! followed by a fetch spawned on the Tokio runtime.
//!
//! Fetch results are applied only when they belong to the most recently
//! issued request. Each transition bumps a generation counter inside the same
//! critical section that updates the state, and a completing fetch compares
//! its generation against the current one before touching the view. A slow
//! response to an older query can therefore never overwrite a newer one.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::codec;
use crate::error::QueryError;
use crate::location::LocationStore;
use crate::query::{FilterSet, SearchDefaults, SearchQuery, SortSpec, DEFAULT_PAGE_SIZE};
use crate::service::{FilterPayload, Listing, ListingPage, ListingQueryService};

/// Message shown to the user when a fetch fails. The cause is only logged.
pub const SEARCH_ERROR_MESSAGE: &str = "An error occurred while searching for cattle";

/// Snapshot of everything a view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchView {
    /// Reconciled search state.
    pub query: SearchQuery,
    /// Listings from the last applied fetch.
    pub results: Vec<Listing>,
    /// Whether the most recently issued fetch is still in flight.
    pub loading: bool,
    /// User-facing error from the last applied fetch.
    pub error: Option<String>,
    /// Generation of the most recently issued fetch.
    pub generation: u64,
}

impl SearchView {
    fn new(query: SearchQuery) -> Self {
        Self {
            query,
            results: Vec::new(),
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

/// Options fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Listings per page.
    pub page_size: u32,
    /// Fallbacks for parameters missing from the URL.
    pub defaults: SearchDefaults,
}

impl ControllerOptions {
    /// Create options with a page size and empty defaults.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            defaults: SearchDefaults::default(),
        }
    }

    /// Set hydration defaults.
    pub fn with_defaults(mut self, defaults: SearchDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// A request handed to the query service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub payload: FilterPayload,
    pub sort: SortSpec,
    pub page: u32,
    pub page_size: u32,
}

impl FetchRequest {
    fn new(generation: u64, query: &SearchQuery) -> Self {
        Self {
            generation,
            payload: FilterPayload::from_query(query),
            sort: query.sort,
            page: query.page.current_page,
            page_size: query.page.page_size,
        }
    }

    /// Whether two requests ask the service for the same data.
    pub fn same_query(&self, other: &FetchRequest) -> bool {
        self.payload == other.payload
            && self.sort == other.sort
            && self.page == other.page
            && self.page_size == other.page_size
    }
}

/// How a fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Results were applied to the view.
    Applied,
    /// The service failed; the view shows the error message.
    Failed,
    /// A newer fetch was issued; the result was discarded.
    Superseded,
    /// The fetch task was cancelled before completing.
    Cancelled,
}

/// Handle to a spawned fetch.
///
/// Dropping the handle does not cancel the fetch.
#[derive(Debug)]
pub struct PendingFetch {
    request: FetchRequest,
    handle: JoinHandle<FetchStatus>,
}

impl PendingFetch {
    /// Generation of this fetch.
    pub fn generation(&self) -> u64 {
        self.request.generation
    }

    /// The request sent to the service.
    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Wait for the fetch to finish and report what happened to its result.
    pub async fn settled(self) -> FetchStatus {
        match self.handle.await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(generation = self.request.generation, error = %err, "search fetch task did not complete");
                FetchStatus::Cancelled
            }
        }
    }
}

/// Owns the search state of one view.
///
/// Every operation that issues a fetch (`mount`, the mutators, `go_to_page`
/// and `refetch`) spawns onto the current Tokio runtime and panics when
/// called outside one. `new` and the read accessors do not.
pub struct SearchController<S, L> {
    service: Arc<S>,
    location: Arc<L>,
    state: Arc<watch::Sender<SearchView>>,
}

impl<S, L> SearchController<S, L>
where
    S: ListingQueryService + 'static,
    L: LocationStore,
{
    /// Hydrate a controller from the current location. No fetch is issued.
    pub fn new(service: Arc<S>, location: Arc<L>, options: ControllerOptions) -> Self {
        let params = location.read_query_params();
        let query = codec::decode(&params, options.page_size, &options.defaults);
        tracing::debug!(params = %params, "hydrated search state from location");

        let (state, _) = watch::channel(SearchView::new(query));
        Self {
            service,
            location,
            state: Arc::new(state),
        }
    }

    /// Hydrate a controller and issue the initial fetch.
    pub fn mount(
        service: Arc<S>,
        location: Arc<L>,
        options: ControllerOptions,
    ) -> (Self, PendingFetch) {
        let controller = Self::new(service, location, options);
        let initial = controller.refetch();
        (controller, initial)
    }

    /// Subscribe to view snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.state.subscribe()
    }

    /// Current view snapshot.
    pub fn view(&self) -> SearchView {
        self.state.borrow().clone()
    }

    /// Current search state.
    pub fn query(&self) -> SearchQuery {
        self.state.borrow().query.clone()
    }

    /// Shareable query string for the current state, e.g. `?breed=Zebu`.
    pub fn share_query_string(&self) -> String {
        codec::encode(&self.state.borrow().query).to_string()
    }

    /// Replace the free-text term and return to page 1.
    pub fn set_query_text(&self, text: impl Into<String>) -> PendingFetch {
        let text = text.into();
        self.transition("text", true, move |query| {
            query.text = text;
            query.page.current_page = 1;
        })
    }

    /// Replace the whole filter set and return to page 1.
    pub fn set_filters(&self, filters: FilterSet) -> PendingFetch {
        self.transition("filters", true, move |query| {
            query.filters = filters;
            query.page.current_page = 1;
        })
    }

    /// Replace the sort order and return to page 1.
    pub fn set_sort(&self, sort: SortSpec) -> PendingFetch {
        self.transition("sort", true, move |query| {
            query.sort = sort;
            query.page.current_page = 1;
        })
    }

    /// Clear every filter and return to page 1. Text and sort are kept.
    pub fn reset_filters(&self) -> PendingFetch {
        self.transition("reset", true, |query| {
            query.filters = FilterSet::default();
            query.page.current_page = 1;
        })
    }

    /// Submit the search again from page 1, optionally with new text.
    pub fn search(&self, text: Option<String>) -> PendingFetch {
        self.transition("search", true, move |query| {
            if let Some(text) = text {
                query.text = text;
            }
            query.page.current_page = 1;
        })
    }

    /// Move to a page.
    ///
    /// Page 0 is ignored. A page past the last known page is clamped to it.
    pub fn go_to_page(&self, page: u32) -> Option<PendingFetch> {
        if page == 0 {
            tracing::warn!("ignoring request for page 0");
            return None;
        }

        let total_pages = self.state.borrow().query.page.total_pages;
        let target = if total_pages > 0 {
            page.min(total_pages)
        } else {
            page
        };
        if target != page {
            tracing::debug!(requested = page, target, "clamping page to last known page");
        }

        Some(self.transition("page", true, move |query| {
            query.page.current_page = target;
        }))
    }

    /// Re-issue the current request unchanged.
    pub fn refetch(&self) -> PendingFetch {
        self.transition("refetch", false, |_| {})
    }

    fn transition<F>(&self, reason: &'static str, rewrite_location: bool, mutate: F) -> PendingFetch
    where
        F: FnOnce(&mut SearchQuery),
    {
        let mut request = FetchRequest::default();
        let mut params = None;

        self.state.send_modify(|view| {
            mutate(&mut view.query);
            view.generation += 1;
            view.loading = true;
            view.error = None;
            request = FetchRequest::new(view.generation, &view.query);
            if rewrite_location {
                params = Some(codec::encode(&view.query));
            }
        });

        if let Some(params) = params {
            self.location.write_query_params(&params);
        }

        tracing::debug!(
            reason,
            generation = request.generation,
            page = request.page,
            "issuing search fetch"
        );
        self.spawn_fetch(request)
    }

    fn spawn_fetch(&self, request: FetchRequest) -> PendingFetch {
        let service = Arc::clone(&self.service);
        let state = Arc::clone(&self.state);
        let task_request = request.clone();

        let handle = tokio::spawn(async move {
            let call = service.query(
                &task_request.payload,
                task_request.sort,
                task_request.page,
                task_request.page_size,
            );
            let outcome = match AssertUnwindSafe(call).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(panic) => Err(QueryError::Panicked(panic_message(panic.as_ref()))),
            };
            apply_outcome(&state, task_request.generation, outcome)
        });

        PendingFetch { request, handle }
    }
}

fn apply_outcome(
    state: &watch::Sender<SearchView>,
    generation: u64,
    outcome: Result<ListingPage, QueryError>,
) -> FetchStatus {
    let mut status = FetchStatus::Superseded;

    state.send_if_modified(|view| {
        if view.generation != generation {
            return false;
        }

        view.loading = false;
        match outcome {
            Ok(page) => {
                tracing::debug!(
                    generation,
                    items = page.items.len(),
                    total = page.total_count,
                    "applying search results"
                );
                view.results = page.items;
                view.query.page.total_count = page.total_count;
                view.query.page.total_pages = page.total_pages;
                view.error = None;
                status = FetchStatus::Applied;
            }
            Err(err) => {
                tracing::error!(generation, error = %err, "listing search failed");
                view.results.clear();
                view.error = Some(SEARCH_ERROR_MESSAGE.to_string());
                status = FetchStatus::Failed;
            }
        }
        true
    });

    if status == FetchStatus::Superseded {
        tracing::debug!(generation, "discarding superseded search result");
    }
    status
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use super::*;
    use crate::location::MemoryLocation;
    use crate::query::SortField;

    #[derive(Default)]
    struct FakeService {
        calls: Mutex<Vec<FetchRequest>>,
        gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
        fail_regions: Mutex<HashSet<String>>,
    }

    impl FakeService {
        /// Hold back the response for queries in `region` until the sender fires.
        fn gate(&self, region: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(region.to_string(), rx);
            tx
        }

        /// Make queries in `region` fail. The unfiltered query is region `""`.
        fn fail(&self, region: &str, fail: bool) {
            let mut regions = self.fail_regions.lock().unwrap();
            if fail {
                regions.insert(region.to_string());
            } else {
                regions.remove(region);
            }
        }

        fn calls(&self) -> Vec<FetchRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ListingQueryService for FakeService {
        async fn query(
            &self,
            payload: &FilterPayload,
            sort: SortSpec,
            page: u32,
            page_size: u32,
        ) -> Result<ListingPage, QueryError> {
            self.calls.lock().unwrap().push(FetchRequest {
                generation: 0,
                payload: payload.clone(),
                sort,
                page,
                page_size,
            });

            let region = payload.filters.region.clone().unwrap_or_default();
            let gate = { self.gates.lock().unwrap().remove(&region) };
            if let Some(gate) = gate {
                let _ = gate.await;
            }

            if self.fail_regions.lock().unwrap().contains(&region) {
                return Err(QueryError::Status {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }

            Ok(ListingPage {
                items: vec![Listing {
                    id: format!("{}-{}", region, page),
                    region,
                    ..Default::default()
                }],
                total_count: 30,
                total_pages: 3,
            })
        }
    }

    struct PanickingService;

    #[async_trait]
    impl ListingQueryService for PanickingService {
        async fn query(
            &self,
            _payload: &FilterPayload,
            _sort: SortSpec,
            _page: u32,
            _page_size: u32,
        ) -> Result<ListingPage, QueryError> {
            panic!("backend exploded");
        }
    }

    fn controller(
        query_string: &str,
    ) -> (
        SearchController<FakeService, MemoryLocation>,
        Arc<FakeService>,
        Arc<MemoryLocation>,
    ) {
        let service = Arc::new(FakeService::default());
        let location = Arc::new(MemoryLocation::from_query_string(query_string));
        let controller = SearchController::new(
            Arc::clone(&service),
            Arc::clone(&location),
            ControllerOptions::default(),
        );
        (controller, service, location)
    }

    fn region(name: &str) -> FilterSet {
        FilterSet::new().with_region(name)
    }

    #[tokio::test]
    async fn test_hydrates_from_location() {
        let (controller, _, _) =
            controller("?breed=Zebu&minPrice=1000&sort=price&order=asc&page=2");
        let query = controller.query();

        assert_eq!(query.filters.breed, Some(vec!["Zebu".to_string()]));
        assert_eq!(query.filters.min_price, Some(1000));
        assert_eq!(query.sort, SortSpec::ascending(SortField::Price));
        assert_eq!(query.page.current_page, 2);
        assert!(!controller.view().loading);
    }

    #[tokio::test]
    async fn test_hydration_uses_defaults() {
        let service = Arc::new(FakeService::default());
        let location = Arc::new(MemoryLocation::from_query_string("?region=Volta"));
        let options = ControllerOptions::new(20).with_defaults(SearchDefaults {
            text: "bull".to_string(),
            filters: region("Ashanti").with_vaccinated(true),
            sort: SortSpec::ascending(SortField::Age),
        });
        let controller = SearchController::new(service, location, options);
        let query = controller.query();

        assert_eq!(query.text, "bull");
        assert_eq!(query.filters.region.as_deref(), Some("Volta"));
        assert_eq!(query.filters.vaccination_status, Some(true));
        assert_eq!(query.sort, SortSpec::ascending(SortField::Age));
        assert_eq!(query.page.page_size, 20);
    }

    #[tokio::test]
    async fn test_mount_fetches_hydrated_state() {
        let service = Arc::new(FakeService::default());
        let location = Arc::new(MemoryLocation::from_query_string("?q=zebu&page=2"));
        let (controller, initial) = SearchController::mount(
            Arc::clone(&service),
            Arc::clone(&location),
            ControllerOptions::default(),
        );

        assert!(controller.view().loading);
        assert_eq!(initial.settled().await, FetchStatus::Applied);

        let calls = service.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].payload.search.as_deref(), Some("zebu"));
        assert_eq!(calls[0].page, 2);
        assert_eq!(calls[0].page_size, DEFAULT_PAGE_SIZE);

        let view = controller.view();
        assert!(!view.loading);
        assert_eq!(view.results.len(), 1);
        assert_eq!(view.query.page.total_pages, 3);
        assert_eq!(view.query.page.total_count, 30);
        // Mounting does not rewrite the location.
        assert_eq!(location.write_count(), 0);
    }

    #[tokio::test]
    async fn test_mutators_reset_page_before_fetch_resolves() {
        let (controller, _, location) = controller("");
        type Mutator = Box<dyn Fn(&SearchController<FakeService, MemoryLocation>) -> PendingFetch>;
        let mutators: Vec<Mutator> = vec![
            Box::new(|c| c.set_filters(FilterSet::new().with_breeds(["Sanga"]))),
            Box::new(|c| c.set_query_text("heifer")),
            Box::new(|c| c.set_sort(SortSpec::ascending(SortField::Weight))),
            Box::new(|c| c.reset_filters()),
            Box::new(|c| c.search(None)),
        ];

        for mutate in mutators {
            let _page = controller.go_to_page(3);
            assert_eq!(controller.query().page.current_page, 3);

            let _pending = mutate(&controller);
            assert_eq!(controller.query().page.current_page, 1);
            assert!(!location.read_query_params().contains("page"));
        }
    }

    #[tokio::test]
    async fn test_go_to_page_does_not_touch_other_state() {
        let (controller, service, location) = controller("?q=zebu&region=Volta");
        controller.go_to_page(3).unwrap().settled().await;

        let query = controller.query();
        assert_eq!(query.page.current_page, 3);
        assert_eq!(query.text, "zebu");
        assert_eq!(location.query_string(), "?q=zebu&region=Volta&page=3");
        assert_eq!(service.calls()[0].page, 3);
    }

    #[tokio::test]
    async fn test_go_to_page_zero_is_ignored() {
        let (controller, service, location) = controller("?page=2");
        assert!(controller.go_to_page(0).is_none());
        assert_eq!(controller.query().page.current_page, 2);
        assert!(service.calls().is_empty());
        assert_eq!(location.write_count(), 0);
    }

    #[tokio::test]
    async fn test_go_to_page_clamps_to_known_total() {
        let (controller, _, _) = controller("");
        controller.refetch().settled().await;
        assert_eq!(controller.query().page.total_pages, 3);

        controller.go_to_page(9).unwrap().settled().await;
        assert_eq!(controller.query().page.current_page, 3);
    }

    #[tokio::test]
    async fn test_out_of_order_results_keep_latest_query() {
        let (controller, service, _) = controller("");
        let release_a = service.gate("A");
        let release_b = service.gate("B");

        let fetch_a = controller.set_filters(region("A"));
        let fetch_b = controller.set_filters(region("B"));
        assert!(fetch_b.generation() > fetch_a.generation());
        assert!(controller.view().loading);

        release_b.send(()).unwrap();
        assert_eq!(fetch_b.settled().await, FetchStatus::Applied);
        assert_eq!(controller.view().results[0].region, "B");
        assert!(!controller.view().loading);

        release_a.send(()).unwrap();
        assert_eq!(fetch_a.settled().await, FetchStatus::Superseded);

        let view = controller.view();
        assert_eq!(view.results[0].region, "B");
        assert_eq!(view.query.filters.region.as_deref(), Some("B"));
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_stale_result_does_not_end_loading() {
        let (controller, service, _) = controller("");
        let release_a = service.gate("A");
        let _hold_b = service.gate("B");

        let fetch_a = controller.set_filters(region("A"));
        let _fetch_b = controller.set_filters(region("B"));

        release_a.send(()).unwrap();
        assert_eq!(fetch_a.settled().await, FetchStatus::Superseded);

        let view = controller.view();
        assert!(view.loading);
        assert!(view.results.is_empty());
    }

    #[tokio::test]
    async fn test_stale_failure_is_discarded() {
        let (controller, service, _) = controller("");
        service.fail("A", true);
        let release_a = service.gate("A");
        let release_b = service.gate("B");

        let fetch_a = controller.set_filters(region("A"));
        let fetch_b = controller.set_filters(region("B"));

        release_b.send(()).unwrap();
        assert_eq!(fetch_b.settled().await, FetchStatus::Applied);

        release_a.send(()).unwrap();
        assert_eq!(fetch_a.settled().await, FetchStatus::Superseded);

        let view = controller.view();
        assert_eq!(view.error, None);
        assert_eq!(view.results.len(), 1);
        assert_eq!(view.results[0].region, "B");
        assert_eq!(view.query.page.total_count, 30);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_refetch_reissues_same_request() {
        let (controller, service, location) = controller("?breed=Zebu,Sanga&page=2");
        let first = controller.refetch();
        let second = controller.refetch();
        assert!(first.request().same_query(second.request()));

        first.settled().await;
        second.settled().await;

        let calls = service.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
        assert_eq!(location.write_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_pagination_metadata() {
        let (controller, service, _) = controller("");
        assert_eq!(controller.refetch().settled().await, FetchStatus::Applied);
        assert_eq!(controller.view().results.len(), 1);

        service.fail("", true);
        assert_eq!(controller.refetch().settled().await, FetchStatus::Failed);

        let view = controller.view();
        assert!(view.results.is_empty());
        assert_eq!(view.error.as_deref(), Some(SEARCH_ERROR_MESSAGE));
        assert_eq!(view.query.page.total_pages, 3);
        assert_eq!(view.query.page.total_count, 30);
        assert!(!view.loading);

        service.fail("", false);
        let pending = controller.refetch();
        assert_eq!(controller.view().error, None);
        assert_eq!(pending.settled().await, FetchStatus::Applied);
        assert_eq!(controller.view().error, None);
    }

    #[tokio::test]
    async fn test_panicking_service_becomes_error() {
        let location = Arc::new(MemoryLocation::new());
        let (controller, initial) = SearchController::mount(
            Arc::new(PanickingService),
            location,
            ControllerOptions::default(),
        );

        assert_eq!(initial.settled().await, FetchStatus::Failed);
        let view = controller.view();
        assert_eq!(view.error.as_deref(), Some(SEARCH_ERROR_MESSAGE));
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_location_tracks_mutations() {
        let (controller, _, location) = controller("");
        controller.set_query_text("zebu").settled().await;
        controller
            .set_filters(FilterSet::new().with_breeds(["Zebu", "Sanga"]).with_price(Some(1000), None))
            .settled()
            .await;
        controller
            .set_sort(SortSpec::ascending(SortField::Price))
            .settled()
            .await;

        assert_eq!(
            location.query_string(),
            "?q=zebu&breed=Zebu%2CSanga&minPrice=1000&sort=price&order=asc"
        );
        assert_eq!(controller.share_query_string(), location.query_string());

        controller.reset_filters().settled().await;
        assert_eq!(location.query_string(), "?q=zebu&sort=price&order=asc");
        assert_eq!(location.write_count(), 4);
    }

    #[tokio::test]
    async fn test_search_replaces_text_when_given() {
        let (controller, service, _) = controller("?q=old");
        controller.search(None).settled().await;
        controller.search(Some("new".to_string())).settled().await;

        let calls = service.calls();
        assert_eq!(calls[0].payload.search.as_deref(), Some("old"));
        assert_eq!(calls[1].payload.search.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_subscribers_see_settled_view() {
        let (controller, _, _) = controller("");
        let mut rx = controller.subscribe();

        controller.set_query_text("zebu").settled().await;
        rx.changed().await.unwrap();

        let view = rx.borrow_and_update().clone();
        assert_eq!(view.query.text, "zebu");
        assert!(!view.loading);
        assert_eq!(view.results.len(), 1);
    }
}
