//! Sort order for listing results.

use serde::{Deserialize, Serialize};

/// Field to sort listings by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Date the listing was published.
    #[default]
    ListedDate,
    /// Asking price.
    Price,
    /// Age in months.
    Age,
    /// Weight in kilograms.
    Weight,
}

impl SortField {
    /// All fields, in display order.
    pub const ALL: [SortField; 4] = [Self::ListedDate, Self::Price, Self::Age, Self::Weight];

    /// Name used in shareable URLs and by the listings API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListedDate => "createdAt",
            Self::Price => "price",
            Self::Age => "age",
            Self::Weight => "weight",
        }
    }

    /// Parse a URL value. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "createdAt" | "listedDate" => Some(Self::ListedDate),
            "price" => Some(Self::Price),
            "age" => Some(Self::Age),
            "weight" => Some(Self::Weight),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ListedDate => "Date Listed",
            Self::Price => "Price",
            Self::Age => "Age",
            Self::Weight => "Weight",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// Name used in shareable URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    /// Parse a URL value. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }

    /// The opposite direction.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Sort field plus direction. Defaults to newest listings first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create a sort spec.
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Sort ascending by a field.
    pub fn ascending(field: SortField) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    /// Sort descending by a field.
    pub fn descending(field: SortField) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// Whether this is the default (listed date, descending).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort() {
        let sort = SortSpec::default();
        assert_eq!(sort.field, SortField::ListedDate);
        assert_eq!(sort.direction, SortDirection::Descending);
        assert!(sort.is_default());
    }

    #[test]
    fn test_field_names() {
        for field in SortField::ALL {
            assert_eq!(SortField::parse(field.as_str()), Some(field));
        }
        assert_eq!(SortField::parse("listedDate"), Some(SortField::ListedDate));
        assert_eq!(SortField::parse("rating"), None);
    }

    #[test]
    fn test_direction_toggle() {
        assert_eq!(SortDirection::Ascending.toggled(), SortDirection::Descending);
        assert_eq!(SortDirection::parse("ASC"), None);
    }
}
