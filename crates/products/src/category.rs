//! Product classification.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use catalog_core::DomainError;

/// Enumerated product category.
///
/// Serialized by its upper-case name (`"CLOTHS"`); parsing is case-insensitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Category {
    #[default]
    Unknown,
    Cloths,
    Food,
    Housewares,
    Automotive,
    Tools,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Unknown,
        Category::Cloths,
        Category::Food,
        Category::Housewares,
        Category::Automotive,
        Category::Tools,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Unknown => "UNKNOWN",
            Category::Cloths => "CLOTHS",
            Category::Food => "FOOD",
            Category::Housewares => "HOUSEWARES",
            Category::Automotive => "AUTOMOTIVE",
            Category::Tools => "TOOLS",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "unknown category '{wanted}' (expected one of: UNKNOWN, CLOTHS, FOOD, HOUSEWARES, AUTOMOTIVE, TOOLS)"
                ))
            })
    }
}

impl TryFrom<String> for Category {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for &'static str {
    fn from(value: Category) -> Self {
        value.as_str()
    }
}
