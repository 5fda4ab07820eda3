//! Structured listing filters.

use serde::{Deserialize, Serialize};

/// Structured (non-text) predicates of a search.
///
/// Ranges are opaque: `min_price > max_price` is a valid value and is passed
/// to the query service unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    /// Breeds to match, in the order the filter UI supplied them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<Vec<String>>,
    /// Region name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Minimum price in whole currency units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    /// Maximum price in whole currency units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    /// Minimum age in months.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u64>,
    /// Maximum age in months.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    /// Minimum weight in kilograms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_weight: Option<u64>,
    /// Maximum weight in kilograms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<u64>,
    /// Vaccination status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccination_status: Option<bool>,
}

impl FilterSet {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by one or more breeds.
    pub fn with_breeds<I, S>(mut self, breeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let breeds: Vec<String> = breeds.into_iter().map(Into::into).collect();
        self.breed = if breeds.is_empty() { None } else { Some(breeds) };
        self
    }

    /// Filter by region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Filter by price range.
    pub fn with_price(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Filter by age range (months).
    pub fn with_age(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_age = min;
        self.max_age = max;
        self
    }

    /// Filter by weight range (kilograms).
    pub fn with_weight(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_weight = min;
        self.max_weight = max;
        self
    }

    /// Filter by vaccination status.
    pub fn with_vaccinated(mut self, vaccinated: bool) -> Self {
        self.vaccination_status = Some(vaccinated);
        self
    }

    /// Whether no predicate is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Number of active predicates, counting a range bound individually.
    pub fn active_count(&self) -> usize {
        [
            self.breed.is_some(),
            self.region.is_some(),
            self.min_price.is_some(),
            self.max_price.is_some(),
            self.min_age.is_some(),
            self.max_age.is_some(),
            self.min_weight.is_some(),
            self.max_weight.is_some(),
            self.vaccination_status.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_set() {
        let filters = FilterSet::new();
        assert!(filters.is_empty());
        assert_eq!(filters.active_count(), 0);
    }

    #[test]
    fn test_builder_counts_bounds() {
        let filters = FilterSet::new()
            .with_breeds(["Zebu"])
            .with_price(Some(1000), None)
            .with_vaccinated(false);

        assert!(!filters.is_empty());
        assert_eq!(filters.active_count(), 3);
    }

    #[test]
    fn test_empty_breed_list_is_absent() {
        let filters = FilterSet::new().with_breeds(Vec::<String>::new());
        assert_eq!(filters.breed, None);
    }

    #[test]
    fn test_inverted_range_kept() {
        let filters = FilterSet::new().with_age(Some(36), Some(12));
        assert_eq!(filters.min_age, Some(36));
        assert_eq!(filters.max_age, Some(12));
    }
}
