// 🧱 Catalog Builder - parsed rows → typed entities → catalog
//
// Column names are never guessed: HeaderMap states which CSV header feeds
// which entity field. The default spelling for the address column carries an
// accent ("direcció"); a file that spells it without one still imports, but
// every address comes out empty and a warning names the missing column.

use crate::catalog::{Catalog, CatalogStats};
use crate::entities::{parse_price, Admission, GeoPoint, PoiBase, PointOfInterest, PriceParse, Rating};
use crate::error::{AtlasError, AtlasResult, FormatError};
use crate::parser::CsvRow;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Country code looked up when the file gives none
pub const DEFAULT_LOOKUP_CODE: &str = "ESP";

// ============================================================================
// HEADER MAPPING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoiField {
    Country,
    City,
    Name,
    Address,
    Category,
    Latitude,
    Longitude,
    Rating,
    OpeningHours,
    Price,
    Currency,
    Description,
    LookupCode,
}

impl PoiField {
    pub const ALL: [PoiField; 13] = [
        PoiField::Country,
        PoiField::City,
        PoiField::Name,
        PoiField::Address,
        PoiField::Category,
        PoiField::Latitude,
        PoiField::Longitude,
        PoiField::Rating,
        PoiField::OpeningHours,
        PoiField::Price,
        PoiField::Currency,
        PoiField::Description,
        PoiField::LookupCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PoiField::Country => "country",
            PoiField::City => "city",
            PoiField::Name => "name",
            PoiField::Address => "address",
            PoiField::Category => "category",
            PoiField::Latitude => "latitude",
            PoiField::Longitude => "longitude",
            PoiField::Rating => "rating",
            PoiField::OpeningHours => "opening_hours",
            PoiField::Price => "price",
            PoiField::Currency => "currency",
            PoiField::Description => "description",
            PoiField::LookupCode => "lookup_code",
        }
    }
}

/// Entity field → CSV header spelling
///
/// Defaults follow the Catalan headers the files are exported with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderMap {
    pub country: String,
    pub city: String,
    pub name: String,
    pub address: String,
    pub category: String,
    pub latitude: String,
    pub longitude: String,
    pub rating: String,
    pub opening_hours: String,
    pub price: String,
    pub currency: String,
    pub description: String,
    /// Country code sent to the lookup (may differ from `country`)
    pub lookup_code: String,
}

impl Default for HeaderMap {
    fn default() -> Self {
        HeaderMap {
            country: "pais".to_string(),
            city: "ciutat".to_string(),
            name: "nom".to_string(),
            address: "direcció".to_string(),
            category: "tipus".to_string(),
            latitude: "latitud".to_string(),
            longitude: "longitud".to_string(),
            rating: "puntuacio".to_string(),
            opening_hours: "horaris".to_string(),
            price: "preu".to_string(),
            currency: "moneda".to_string(),
            description: "descripcio".to_string(),
            lookup_code: "codi".to_string(),
        }
    }
}

impl HeaderMap {
    /// Header spelling for a field
    pub fn column(&self, field: PoiField) -> &str {
        match field {
            PoiField::Country => &self.country,
            PoiField::City => &self.city,
            PoiField::Name => &self.name,
            PoiField::Address => &self.address,
            PoiField::Category => &self.category,
            PoiField::Latitude => &self.latitude,
            PoiField::Longitude => &self.longitude,
            PoiField::Rating => &self.rating,
            PoiField::OpeningHours => &self.opening_hours,
            PoiField::Price => &self.price,
            PoiField::Currency => &self.currency,
            PoiField::Description => &self.description,
            PoiField::LookupCode => &self.lookup_code,
        }
    }

    /// Builder pattern: respell one column
    pub fn with_column(mut self, field: PoiField, header: &str) -> Self {
        let slot = match field {
            PoiField::Country => &mut self.country,
            PoiField::City => &mut self.city,
            PoiField::Name => &mut self.name,
            PoiField::Address => &mut self.address,
            PoiField::Category => &mut self.category,
            PoiField::Latitude => &mut self.latitude,
            PoiField::Longitude => &mut self.longitude,
            PoiField::Rating => &mut self.rating,
            PoiField::OpeningHours => &mut self.opening_hours,
            PoiField::Price => &mut self.price,
            PoiField::Currency => &mut self.currency,
            PoiField::Description => &mut self.description,
            PoiField::LookupCode => &mut self.lookup_code,
        };
        *slot = header.to_string();
        self
    }

    /// Fields whose header is absent from `row`
    pub fn missing_in(&self, row: &CsvRow) -> Vec<PoiField> {
        PoiField::ALL
            .iter()
            .copied()
            .filter(|f| row.get(self.column(*f)).is_none())
            .collect()
    }

    fn text(&self, row: &CsvRow, field: PoiField) -> String {
        row.value(self.column(field)).to_string()
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoiClass {
    Generic,
    Attraction,
    Museum,
}

const ATTRACTION_LABELS: [&str; 3] = ["atraccio", "atracció", "attraction"];
const MUSEUM_LABELS: [&str; 2] = ["museu", "museum"];

/// Case-insensitive category → variant; unknown labels are Generic
pub fn classify(category: &str) -> PoiClass {
    let label = category.trim().to_lowercase();
    if ATTRACTION_LABELS.contains(&label.as_str()) {
        PoiClass::Attraction
    } else if MUSEUM_LABELS.contains(&label.as_str()) {
        PoiClass::Museum
    } else {
        PoiClass::Generic
    }
}

// ============================================================================
// IMPORT RESULT
// ============================================================================

/// Input that was normalized instead of rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValidationIssue {
    /// Price text had no leading number, stored as 0
    PriceDefaulted { line: usize, raw: String },
    /// Only the start of the price text was numeric
    PriceTruncated { line: usize, raw: String, value: f64 },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub stats: CatalogStats,
    /// Code to resolve country info with (first row decides)
    pub lookup_code: String,
    pub issues: Vec<ValidationIssue>,
    /// Mapped fields whose header was not in the file
    pub missing_columns: Vec<String>,
}

// ============================================================================
// BUILDER
// ============================================================================

pub struct CatalogBuilder {
    columns: HeaderMap,
    default_lookup_code: String,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new(HeaderMap::default())
    }
}

impl CatalogBuilder {
    pub fn new(columns: HeaderMap) -> Self {
        CatalogBuilder {
            columns,
            default_lookup_code: DEFAULT_LOOKUP_CODE.to_string(),
        }
    }

    /// Builder pattern: code used when the first row names no country
    pub fn with_default_lookup_code(mut self, code: &str) -> Self {
        self.default_lookup_code = code.to_string();
        self
    }

    pub fn columns(&self) -> &HeaderMap {
        &self.columns
    }

    /// Lookup code for a row: its lookup column, else its country, else default
    pub fn lookup_code(&self, row: &CsvRow) -> String {
        [PoiField::LookupCode, PoiField::Country]
            .iter()
            .map(|f| row.value(self.columns.column(*f)).trim())
            .find(|code| !code.is_empty())
            .unwrap_or(&self.default_lookup_code)
            .to_string()
    }

    /// Build one entity from a row
    ///
    /// # Returns
    /// * `Err(FormatError::MissingColumn)` - no category column
    /// * `Err(FormatError::InvalidCoordinate)` - latitude/longitude unusable
    /// * `Ok((point, issues))` - issues list silently normalized input
    pub fn build_point(
        &self,
        row: &CsvRow,
    ) -> Result<(PointOfInterest, Vec<ValidationIssue>), FormatError> {
        let columns = &self.columns;
        let category = row
            .get(&columns.category)
            .ok_or_else(|| FormatError::MissingColumn {
                line: row.line_number,
                column: columns.category.clone(),
            })?
            .to_string();

        let latitude = coordinate(row, &columns.latitude, "latitude", 90.0)?;
        let longitude = coordinate(row, &columns.longitude, "longitude", 180.0)?;

        let base = PoiBase {
            country: columns.text(row, PoiField::Country),
            city: columns.text(row, PoiField::City),
            name: columns.text(row, PoiField::Name),
            address: columns.text(row, PoiField::Address),
            category: category.clone(),
            location: GeoPoint::new(latitude, longitude),
            rating: Rating::parse(row.value(&columns.rating)),
        };

        let mut issues = Vec::new();
        let point = match classify(&category) {
            PoiClass::Generic => PointOfInterest::generic(base),
            PoiClass::Attraction => {
                let admission = self.admission(row, &mut issues);
                PointOfInterest::attraction(base, admission)
            }
            PoiClass::Museum => {
                let admission = self.admission(row, &mut issues);
                let description = columns.text(row, PoiField::Description);
                PointOfInterest::museum(base, admission, &description)
            }
        };

        Ok((point, issues))
    }

    /// Classify every row and append it to the catalog
    ///
    /// An empty row list changes nothing and returns `AtlasError::NoRows`.
    /// A bad row stops the import; rows before it stay in the catalog.
    pub fn import_rows(&self, catalog: &mut Catalog, rows: &[CsvRow]) -> AtlasResult<ImportSummary> {
        let Some(first) = rows.first() else {
            warn!("no rows to import");
            return Err(AtlasError::NoRows);
        };

        let mut summary = ImportSummary {
            lookup_code: self.lookup_code(first),
            ..ImportSummary::default()
        };

        for field in self.columns.missing_in(first) {
            if field == PoiField::Category {
                continue;
            }
            let column = self.columns.column(field);
            warn!(field = field.as_str(), column, "CSV has no such column, values will be empty");
            summary.missing_columns.push(column.to_string());
        }

        for row in rows {
            let (point, issues) = match self.build_point(row) {
                Ok(built) => built,
                Err(source) => {
                    warn!(line = row.line_number, error = %source, imported = summary.imported, "import stopped");
                    return Err(AtlasError::PartialImport {
                        imported: summary.imported,
                        source,
                    });
                }
            };

            match classify(&point.base.category) {
                PoiClass::Generic => summary.stats.generic += 1,
                PoiClass::Attraction => summary.stats.attractions += 1,
                PoiClass::Museum => summary.stats.museums += 1,
            }

            catalog.record_category(&point.base.category);
            catalog.insert(point);
            summary.imported += 1;
            summary.issues.extend(issues);
        }

        info!(
            imported = summary.imported,
            attractions = summary.stats.attractions,
            museums = summary.stats.museums,
            generic = summary.stats.generic,
            "rows imported"
        );

        Ok(summary)
    }

    fn admission(&self, row: &CsvRow, issues: &mut Vec<ValidationIssue>) -> Admission {
        let raw_price = row.value(&self.columns.price).trim();
        let price = parse_price(raw_price);

        match price {
            PriceParse::Defaulted if !raw_price.is_empty() => {
                debug!(line = row.line_number, raw = raw_price, "price coerced to 0");
                issues.push(ValidationIssue::PriceDefaulted {
                    line: row.line_number,
                    raw: raw_price.to_string(),
                });
            }
            PriceParse::Prefix(value) => {
                debug!(line = row.line_number, raw = raw_price, value, "price truncated");
                issues.push(ValidationIssue::PriceTruncated {
                    line: row.line_number,
                    raw: raw_price.to_string(),
                    value,
                });
            }
            _ => {}
        }

        Admission::with_price(
            row.value(&self.columns.opening_hours),
            price.value(),
            row.value(&self.columns.currency),
        )
    }
}

fn coordinate(
    row: &CsvRow,
    header: &str,
    field: &'static str,
    limit: f64,
) -> Result<f64, FormatError> {
    let raw = row.value(header).trim();
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() <= limit => Ok(v),
        _ => Err(FormatError::InvalidCoordinate {
            line: row.line_number,
            field,
            value: raw.to_string(),
        }),
    }
}
