//! Listing request encoding.

use beefline_search::codec::join_breeds;
use beefline_search::{FilterPayload, SortDirection, SortSpec};
use url::Url;

use crate::error::FetchError;

/// Path of the listing collection, relative to the API base URL.
pub const LISTINGS_PATH: &str = "cattle/";

/// Query pairs for a filter payload. Absent and empty values are skipped.
pub fn payload_pairs(payload: &FilterPayload) -> Vec<(&'static str, String)> {
    let filters = &payload.filters;
    let mut pairs = Vec::new();

    if let Some(breed) = filters.breed.as_deref().and_then(join_breeds) {
        pairs.push(("breed", breed));
    }
    if let Some(region) = filters.region.as_deref().filter(|r| !r.is_empty()) {
        pairs.push(("region", region.to_string()));
    }

    let bounds = [
        ("minPrice", filters.min_price),
        ("maxPrice", filters.max_price),
        ("minAge", filters.min_age),
        ("maxAge", filters.max_age),
        ("minWeight", filters.min_weight),
        ("maxWeight", filters.max_weight),
    ];
    pairs.extend(
        bounds
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v.to_string()))),
    );

    if let Some(vaccinated) = filters.vaccination_status {
        pairs.push(("vaccinationStatus", vaccinated.to_string()));
    }
    if let Some(search) = payload.search.as_deref().filter(|s| !s.is_empty()) {
        pairs.push(("search", search.to_string()));
    }

    pairs
}

/// Sort parameter: the field name, prefixed with `-` when descending.
pub fn sort_param(sort: SortSpec) -> String {
    match sort.direction {
        SortDirection::Descending => format!("-{}", sort.field.as_str()),
        SortDirection::Ascending => sort.field.as_str().to_string(),
    }
}

/// Full URL for one page of listings.
pub fn listings_url(
    base_url: &str,
    payload: &FilterPayload,
    sort: SortSpec,
    page: u32,
    page_size: u32,
) -> Result<Url, FetchError> {
    let mut url = Url::parse(&format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        LISTINGS_PATH
    ))?;

    url.query_pairs_mut()
        .extend_pairs(payload_pairs(payload))
        .append_pair("sort", &sort_param(sort))
        .append_pair("page", &page.to_string())
        .append_pair("limit", &page_size.to_string());

    Ok(url)
}

#[cfg(test)]
mod tests {
    use beefline_search::{FilterSet, SortField};

    use super::*;

    #[test]
    fn test_sort_param() {
        assert_eq!(sort_param(SortSpec::default()), "-createdAt");
        assert_eq!(sort_param(SortSpec::ascending(SortField::Price)), "price");
        assert_eq!(sort_param(SortSpec::descending(SortField::Weight)), "-weight");
    }

    #[test]
    fn test_empty_payload_url() {
        let url = listings_url(
            "http://localhost:8000/api/",
            &FilterPayload::default(),
            SortSpec::default(),
            1,
            12,
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/cattle/?sort=-createdAt&page=1&limit=12"
        );
    }

    #[test]
    fn test_full_payload_url() {
        let payload = FilterPayload {
            filters: FilterSet::new()
                .with_breeds(["Zebu", "Sanga"])
                .with_region("Upper East")
                .with_price(Some(1000), Some(5000))
                .with_weight(None, Some(400))
                .with_vaccinated(false),
            search: Some("heifer".to_string()),
        };
        let url = listings_url(
            "https://api.beefline.test/api",
            &payload,
            SortSpec::ascending(SortField::Age),
            3,
            24,
        )
        .unwrap();

        assert_eq!(url.path(), "/api/cattle/");
        assert_eq!(
            url.query(),
            Some(
                "breed=Zebu%2CSanga&region=Upper+East&minPrice=1000&maxPrice=5000&maxWeight=400\
                 &vaccinationStatus=false&search=heifer&sort=age&page=3&limit=24"
            )
        );
    }

    #[test]
    fn test_empty_values_skipped() {
        let payload = FilterPayload {
            filters: FilterSet {
                breed: Some(vec![String::new()]),
                region: Some(String::new()),
                ..FilterSet::default()
            },
            search: Some(String::new()),
        };
        assert!(payload_pairs(&payload).is_empty());
    }

    #[test]
    fn test_invalid_base_url() {
        let result = listings_url(
            "not a url",
            &FilterPayload::default(),
            SortSpec::default(),
            1,
            12,
        );
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
