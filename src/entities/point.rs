// 📍 Point of Interest Entity
//
// One shared base record, three variants:
// - Generic: a plain place (square, viewpoint, ...)
// - Attraction: has opening hours and an admission price
// - Museum: like Attraction plus a description
//
// The identifier is assigned once at construction and has no setter.

use super::pricing::{coerce_price, TaxTable, TaxedPrice};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// IDENTITY
// ============================================================================

/// Session-unique identifier (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoiId(Uuid);

impl PoiId {
    pub fn new() -> Self {
        PoiId(Uuid::new_v4())
    }
}

impl Default for PoiId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PoiId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(PoiId)
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// Latitude / longitude in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Rating as found in the file: a score, or free text ("★★★★", "n/a")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Score(f64),
    Label(String),
}

impl Rating {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<f64>() {
            Ok(score) if score.is_finite() => Rating::Score(score),
            _ => Rating::Label(raw.to_string()),
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Rating::Score(s) => Some(*s),
            Rating::Label(_) => None,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Score(s) => write!(f, "{}", s),
            Rating::Label(l) => f.write_str(l),
        }
    }
}

/// Fields every variant carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiBase {
    /// ISO alpha-2 country code (e.g., "ES")
    pub country: String,
    pub city: String,
    pub name: String,
    pub address: String,
    /// Category label as written in the file
    pub category: String,
    pub location: GeoPoint,
    pub rating: Rating,
}

/// Opening hours + price shared by the priced variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admission {
    pub opening_hours: String,
    pub price: f64,
    pub currency: String,
}

impl Admission {
    /// Price text is coerced: anything non-numeric becomes 0
    pub fn new(opening_hours: &str, raw_price: &str, currency: &str) -> Self {
        Admission {
            opening_hours: opening_hours.to_string(),
            price: coerce_price(raw_price),
            currency: currency.to_string(),
        }
    }

    pub fn with_price(opening_hours: &str, price: f64, currency: &str) -> Self {
        Admission {
            opening_hours: opening_hours.to_string(),
            price,
            currency: currency.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoiKind {
    Generic,
    Attraction(Admission),
    Museum {
        admission: Admission,
        description: String,
    },
}

impl PoiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoiKind::Generic => "Generic",
            PoiKind::Attraction(_) => "Attraction",
            PoiKind::Museum { .. } => "Museum",
        }
    }
}

// ============================================================================
// POINT OF INTEREST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    id: PoiId,
    pub base: PoiBase,
    pub kind: PoiKind,
    /// Added by hand rather than imported from a file
    manual: bool,
    created_at: DateTime<Utc>,
}

impl PointOfInterest {
    fn with_kind(base: PoiBase, kind: PoiKind) -> Self {
        PointOfInterest {
            id: PoiId::new(),
            base,
            kind,
            manual: false,
            created_at: Utc::now(),
        }
    }

    pub fn generic(base: PoiBase) -> Self {
        Self::with_kind(base, PoiKind::Generic)
    }

    pub fn attraction(base: PoiBase, admission: Admission) -> Self {
        Self::with_kind(base, PoiKind::Attraction(admission))
    }

    pub fn museum(base: PoiBase, admission: Admission, description: &str) -> Self {
        Self::with_kind(
            base,
            PoiKind::Museum {
                admission,
                description: description.to_string(),
            },
        )
    }

    pub fn id(&self) -> PoiId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    pub(crate) fn mark_manual(&mut self) {
        self.manual = true;
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    pub fn location(&self) -> GeoPoint {
        self.base.location
    }

    // ========================================================================
    // PRICED CAPABILITY (Attraction, Museum)
    // ========================================================================

    pub fn admission(&self) -> Option<&Admission> {
        match &self.kind {
            PoiKind::Generic => None,
            PoiKind::Attraction(admission) => Some(admission),
            PoiKind::Museum { admission, .. } => Some(admission),
        }
    }

    pub fn admission_mut(&mut self) -> Option<&mut Admission> {
        match &mut self.kind {
            PoiKind::Generic => None,
            PoiKind::Attraction(admission) => Some(admission),
            PoiKind::Museum { admission, .. } => Some(admission),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match &self.kind {
            PoiKind::Museum { description, .. } => Some(description),
            _ => None,
        }
    }

    /// Price with the country's tax applied, None for generic points
    ///
    /// Recomputed on every call from the current price, country and table.
    pub fn taxed_price(&self, taxes: &TaxTable) -> Option<TaxedPrice> {
        self.admission()
            .map(|a| taxes.taxed_price(a.price, &self.base.country, &a.currency))
    }

    /// One-line summary (museums add the description on a second line)
    pub fn summary(&self, taxes: &TaxTable) -> String {
        let mut text = format!(
            "{} | {} | Type: {}",
            self.base.name, self.base.city, self.base.category
        );

        if let (Some(admission), Some(price)) = (self.admission(), self.taxed_price(taxes)) {
            text.push_str(&format!(" | Hours: {} | {}", admission.opening_hours, price));
        }

        if let Some(description) = self.description() {
            text.push_str(&format!("\nDescription: {}", description));
        }

        text
    }
}
