//! Listing query service backed by the REST API.

use async_trait::async_trait;
use beefline_search::{FilterPayload, Listing, ListingPage, ListingQueryService, QueryError, SortSpec};

use crate::client::ApiClient;
use crate::request::listings_url;
use crate::response::PaginatedResponse;

/// Queries `GET /cattle/` on the Beefline API.
#[derive(Clone)]
pub struct CattleListings {
    client: ApiClient,
}

impl CattleListings {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl ListingQueryService for CattleListings {
    async fn query(
        &self,
        payload: &FilterPayload,
        sort: SortSpec,
        page: u32,
        page_size: u32,
    ) -> Result<ListingPage, QueryError> {
        let url = listings_url(self.client.base_url(), payload, sort, page, page_size)?;
        let response: PaginatedResponse<Listing> = self.client.get_json(url).await?;

        tracing::debug!(
            page,
            items = response.data.len(),
            total = response.total,
            "fetched listings"
        );
        Ok(response.into())
    }
}
