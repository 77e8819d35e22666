// 🔎 Catalog View - filter + sort for the list and the map
//
// Pure: takes the catalog's slice, returns a new ordered Vec of references.

use crate::entities::PointOfInterest;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CRITERIA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Exact, case-sensitive label
    Only(String),
}

impl CategoryFilter {
    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(label) => label,
        }
    }

    /// Next entry when cycling through All → each category → All
    pub fn cycle(&self, categories: &[String]) -> CategoryFilter {
        let next = match self {
            CategoryFilter::All => categories.first(),
            CategoryFilter::Only(current) => categories
                .iter()
                .position(|c| c == current)
                .and_then(|i| categories.get(i + 1)),
        };
        next.map(|c| CategoryFilter::Only(c.clone()))
            .unwrap_or(CategoryFilter::All)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Import order
    #[default]
    Import,
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn next(&self) -> Self {
        match self {
            SortOrder::Import => SortOrder::Ascending,
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Import,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SortOrder::Import => "Import order",
            SortOrder::Ascending => "Name A→Z",
            SortOrder::Descending => "Name Z→A",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "import" => Ok(SortOrder::Import),
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(format!("unknown sort order '{}' (asc, desc, none)", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The three independent list controls
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewCriteria {
    pub category: CategoryFilter,
    /// Free text, matched case-insensitively against name, city, address
    pub text: String,
    pub order: SortOrder,
}

impl ViewCriteria {
    pub fn new(category: CategoryFilter, text: &str, order: SortOrder) -> Self {
        ViewCriteria {
            category,
            text: text.to_string(),
            order,
        }
    }

    /// Clear category and text, keep the sort order
    pub fn reset_filters(&mut self) {
        self.category = CategoryFilter::All;
        self.text.clear();
    }

    pub fn is_filtering(&self) -> bool {
        self.category != CategoryFilter::All || !self.text.trim().is_empty()
    }

    pub fn matches(&self, point: &PointOfInterest) -> bool {
        if let CategoryFilter::Only(label) = &self.category {
            if &point.base.category != label {
                return false;
            }
        }

        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [&point.base.name, &point.base.city, &point.base.address]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Filter then sort; never mutates `points`
    pub fn apply<'a>(&self, points: &'a [PointOfInterest]) -> Vec<&'a PointOfInterest> {
        let mut visible: Vec<&PointOfInterest> = points.iter().filter(|p| self.matches(p)).collect();

        // stable: equal names keep import order
        match self.order {
            SortOrder::Import => {}
            SortOrder::Ascending => visible.sort_by(|a, b| compare_names(&a.base.name, &b.base.name)),
            SortOrder::Descending => visible.sort_by(|a, b| compare_names(&b.base.name, &a.base.name)),
        }

        visible
    }
}

// ============================================================================
// NAME COLLATION
// ============================================================================

/// Locale-style name comparison
///
/// Accents and case only break ties: "Àvila" sorts with "Avila", before "Bilbao".
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .filter(|c| !matches!(c, '·' | '\'' | '’'))
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'ö' | 'õ' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
