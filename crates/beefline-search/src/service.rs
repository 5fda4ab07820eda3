//! Listing query service port and listing models.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::QueryError;
use crate::query::{FilterSet, SearchQuery, SortSpec};

/// One cattle-for-sale record.
///
/// The controller treats listings as opaque; the fields exist for front ends
/// that render them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Listing {
    pub id: String,
    pub breed: String,
    /// Age in months.
    pub age: u32,
    /// Weight in kilograms.
    #[serde(deserialize_with = "number_or_string")]
    pub weight: f64,
    /// Asking price in whole currency units.
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
    pub region: String,
    pub vaccination_status: bool,
    pub health_notes: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Decimal fields may arrive as JSON numbers or as strings ("1500.00").
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// One page of listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub items: Vec<Listing>,
    pub total_count: u64,
    pub total_pages: u32,
}

/// Filter payload sent to the query service: the structured filters plus the
/// free-text term under `search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPayload {
    #[serde(flatten)]
    pub filters: FilterSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl FilterPayload {
    /// Build the payload for a query. Empty text is omitted.
    pub fn from_query(query: &SearchQuery) -> Self {
        Self {
            filters: query.filters.clone(),
            search: if query.text.is_empty() {
                None
            } else {
                Some(query.text.clone())
            },
        }
    }
}

/// Performs the listing search against a backend.
#[async_trait]
pub trait ListingQueryService: Send + Sync {
    /// Fetch one page of listings.
    async fn query(
        &self,
        payload: &FilterPayload,
        sort: SortSpec,
        page: u32,
        page_size: u32,
    ) -> Result<ListingPage, QueryError>;
}
