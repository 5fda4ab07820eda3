//! Shareable URL codec for search state.
//!
//! Encoding is sparse and canonical: a field equal to its default is never
//! written, and parameters are always emitted in the same order, so two equal
//! states produce byte-identical query strings.
//!
//! Decoding is lossy by policy. A malformed value never fails the decode; it
//! is normalized to "absent" instead.

use url::form_urlencoded;

use crate::query::{
    FilterSet, PageCursor, SearchDefaults, SearchQuery, SortDirection, SortField, SortSpec,
};

pub const PARAM_TEXT: &str = "q";
pub const PARAM_BREED: &str = "breed";
pub const PARAM_REGION: &str = "region";
pub const PARAM_MIN_PRICE: &str = "minPrice";
pub const PARAM_MAX_PRICE: &str = "maxPrice";
pub const PARAM_MIN_AGE: &str = "minAge";
pub const PARAM_MAX_AGE: &str = "maxAge";
pub const PARAM_MIN_WEIGHT: &str = "minWeight";
pub const PARAM_MAX_WEIGHT: &str = "maxWeight";
pub const PARAM_VACCINATED: &str = "vaccinated";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_ORDER: &str = "order";
pub const PARAM_PAGE: &str = "page";

/// Ordered query-string parameters.
///
/// Keys are unique; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Create an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`.
    ///
    /// When a key repeats, the first occurrence wins.
    pub fn parse(query_string: &str) -> Self {
        let trimmed = query_string.strip_prefix('?').unwrap_or(query_string);
        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(trimmed.as_bytes()) {
            if params.get(&key).is_none() {
                params.0.push((key.into_owned(), value.into_owned()));
            }
        }
        params
    }

    /// Set a parameter, replacing any existing value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Get a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get a parameter value, treating an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parameter keys in order.
    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize as `application/x-www-form-urlencoded`, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl std::fmt::Display for QueryParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "?{}", self.to_query_string())
    }
}

/// Encode a query into sparse, canonical URL parameters.
///
/// Totals and page size are session data and never appear in the URL.
pub fn encode(query: &SearchQuery) -> QueryParams {
    let mut params = QueryParams::new();

    if !query.text.is_empty() {
        params.insert(PARAM_TEXT, query.text.as_str());
    }
    encode_filters(&query.filters, &mut params);

    if query.sort.field != SortField::default() {
        params.insert(PARAM_SORT, query.sort.field.as_str());
    }
    if query.sort.direction != SortDirection::default() {
        params.insert(PARAM_ORDER, query.sort.direction.as_str());
    }
    if query.page.current_page > 1 {
        params.insert(PARAM_PAGE, query.page.current_page.to_string());
    }

    params
}

fn encode_filters(filters: &FilterSet, params: &mut QueryParams) {
    if let Some(breed) = filters.breed.as_deref().and_then(join_breeds) {
        params.insert(PARAM_BREED, breed);
    }
    if let Some(region) = filters.region.as_deref().filter(|r| !r.is_empty()) {
        params.insert(PARAM_REGION, region);
    }

    let bounds = [
        (PARAM_MIN_PRICE, filters.min_price),
        (PARAM_MAX_PRICE, filters.max_price),
        (PARAM_MIN_AGE, filters.min_age),
        (PARAM_MAX_AGE, filters.max_age),
        (PARAM_MIN_WEIGHT, filters.min_weight),
        (PARAM_MAX_WEIGHT, filters.max_weight),
    ];
    for (key, value) in bounds {
        if let Some(value) = value {
            params.insert(key, value.to_string());
        }
    }

    if let Some(vaccinated) = filters.vaccination_status {
        params.insert(PARAM_VACCINATED, if vaccinated { "true" } else { "false" });
    }
}

/// Join breeds with commas, skipping blank names. `None` when nothing remains.
pub fn join_breeds(breeds: &[String]) -> Option<String> {
    let names: Vec<&str> = breeds
        .iter()
        .map(String::as_str)
        .filter(|b| !b.is_empty())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(","))
    }
}

/// Split a comma-joined breed list, preserving order and dropping blanks.
pub fn split_breeds(value: &str) -> Option<Vec<String>> {
    let breeds: Vec<String> = value
        .split(',')
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect();
    if breeds.is_empty() {
        None
    } else {
        Some(breeds)
    }
}

/// Decode URL parameters into a query.
///
/// Parameters missing from the URL (or present but empty) take their value
/// from `defaults`. Present but malformed numeric and boolean values decode
/// to absent.
pub fn decode(params: &QueryParams, page_size: u32, defaults: &SearchDefaults) -> SearchQuery {
    let text = params
        .get_non_empty(PARAM_TEXT)
        .map(str::to_string)
        .unwrap_or_else(|| defaults.text.clone());

    let mut filters = defaults.filters.clone();
    if let Some(breed) = params.get_non_empty(PARAM_BREED) {
        filters.breed = split_breeds(breed);
    }
    if let Some(region) = params.get_non_empty(PARAM_REGION) {
        filters.region = Some(region.to_string());
    }

    let bounds: [(&str, &mut Option<u64>); 6] = [
        (PARAM_MIN_PRICE, &mut filters.min_price),
        (PARAM_MAX_PRICE, &mut filters.max_price),
        (PARAM_MIN_AGE, &mut filters.min_age),
        (PARAM_MAX_AGE, &mut filters.max_age),
        (PARAM_MIN_WEIGHT, &mut filters.min_weight),
        (PARAM_MAX_WEIGHT, &mut filters.max_weight),
    ];
    for (key, slot) in bounds {
        if let Some(raw) = params.get_non_empty(key) {
            *slot = parse_int(raw);
            if slot.is_none() {
                tracing::debug!(param = key, value = raw, "dropping malformed numeric parameter");
            }
        }
    }

    if let Some(raw) = params.get_non_empty(PARAM_VACCINATED) {
        filters.vaccination_status = match raw {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        };
    }

    let field = params
        .get_non_empty(PARAM_SORT)
        .and_then(SortField::parse)
        .unwrap_or(defaults.sort.field);
    let direction = params
        .get_non_empty(PARAM_ORDER)
        .and_then(SortDirection::parse)
        .unwrap_or(defaults.sort.direction);

    let mut page = PageCursor::new(page_size);
    page.current_page = params
        .get_non_empty(PARAM_PAGE)
        .and_then(parse_int)
        .and_then(|p| u32::try_from(p).ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);

    SearchQuery {
        text,
        filters,
        sort: SortSpec::new(field, direction),
        page,
    }
}

/// Parse a non-negative integer with `parseInt` semantics.
///
/// Leading whitespace and a sign are accepted, parsing stops at the first
/// non-digit. Values without leading digits, negative values and values that
/// overflow yield `None`.
pub fn parse_int(raw: &str) -> Option<u64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }
    let value: u64 = digits.parse().ok()?;
    if negative && value != 0 {
        return None;
    }
    Some(value)
}
