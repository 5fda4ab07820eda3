//! REST transport for Beefline cattle listings.
//!
//! Implements [`beefline_search::ListingQueryService`] over the marketplace
//! HTTP API, with timeouts, retries and bearer authentication.
//!
//! # Example
//!
//! ```rust,ignore
//! use beefline_data::{ApiClient, CattleListings, RetryPolicy, TimeoutConfig};
//!
//! let client = ApiClient::new("http://localhost:8000/api", TimeoutConfig::default())?
//!     .with_retry(RetryPolicy::new(1));
//! let service = Arc::new(CattleListings::new(client));
//! let (controller, initial) = SearchController::mount(service, location, options);
//! ```

mod client;
mod error;
mod listings;
mod request;
mod response;
mod retry;
mod timeout;

pub use client::{ApiClient, AUTH_TOKEN_KEY, DEFAULT_BASE_URL};
pub use error::FetchError;
pub use listings::CattleListings;
pub use request::{listings_url, payload_pairs, sort_param, LISTINGS_PATH};
pub use response::PaginatedResponse;
pub use retry::{BackoffStrategy, RetryCondition, RetryPolicy};
pub use timeout::TimeoutConfig;
