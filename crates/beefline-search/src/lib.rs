//! Search state for the Beefline cattle marketplace.
//!
//! This crate keeps the search view of a listing page consistent:
//!
//! - **Query**: free text, filters, sort order and pagination cursor
//! - **Codec**: sparse, shareable URL encoding of a query
//! - **Controller**: state transitions, URL sync and fetch ordering
//! - **History and suggestions**: recent searches and search box hints
//!
//! # Example
//!
//! ```rust,ignore
//! use beefline_search::prelude::*;
//!
//! let location = Arc::new(MemoryLocation::from_query_string("?breed=Zebu&page=2"));
//! let (controller, initial) =
//!     SearchController::mount(service, location, ControllerOptions::default());
//! initial.settled().await;
//!
//! // Changing filters returns to page 1 and rewrites the URL.
//! controller
//!     .set_filters(FilterSet::new().with_region("Ashanti"))
//!     .settled()
//!     .await;
//! println!("share: {}", controller.share_query_string());
//! ```

pub mod codec;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod history;
pub mod location;
pub mod query;
pub mod service;
pub mod storage;
pub mod suggest;

pub use codec::QueryParams;
pub use controller::{
    ControllerOptions, FetchRequest, FetchStatus, PendingFetch, SearchController, SearchView,
    SEARCH_ERROR_MESSAGE,
};
pub use error::{QueryError, StorageError};
pub use query::{
    FilterSet, PageCursor, SearchDefaults, SearchQuery, SortDirection, SortField, SortSpec,
    DEFAULT_PAGE_SIZE,
};
pub use service::{FilterPayload, Listing, ListingPage, ListingQueryService};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::codec::QueryParams;
    pub use crate::controller::{ControllerOptions, FetchStatus, SearchController, SearchView};
    pub use crate::debounce::Debouncer;
    pub use crate::error::{QueryError, StorageError};
    pub use crate::history::{HistoryEntry, SearchHistory};
    pub use crate::location::{LocationStore, MemoryLocation};
    pub use crate::query::{
        FilterSet, PageCursor, SearchDefaults, SearchQuery, SortDirection, SortField, SortSpec,
    };
    pub use crate::service::{FilterPayload, Listing, ListingPage, ListingQueryService};
    pub use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};
    pub use crate::suggest::{suggest, Suggestion, SuggestionKind};
}
