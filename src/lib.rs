// POI Atlas - Core Library
// Exposes all modules for use in the CLI, the terminal UI, and tests

pub mod error;
pub mod parser;
pub mod entities;
pub mod catalog;
pub mod builder;
pub mod country;
pub mod view;
pub mod map;
pub mod session;
pub mod config;

// Re-export commonly used types
pub use error::{AtlasError, AtlasResult, FormatError, GeolocationError, LookupError};
pub use parser::{parse_csv, read_csv, CsvDocument, CsvRow};
pub use entities::{
    Admission, GeoPoint, PoiBase, PoiId, PoiKind, PointOfInterest, Rating,
    TaxTable, TaxedPrice,
};
pub use catalog::{Catalog, CatalogStats};
pub use builder::{classify, CatalogBuilder, HeaderMap, ImportSummary, PoiClass, PoiField, ValidationIssue};
pub use country::{CountryInfo, CountryLookup, CountryRecord, CountryResolver, RestCountriesClient};
pub use view::{compare_names, CategoryFilter, SortOrder, ViewCriteria};
pub use map::{
    initial_position, marker_label, render_markers,
    FixedPosition, Geolocator, MapSurface, Marker, MarkerId, MarkerLayer,
};
pub use session::{Action, Confirm, Outcome, Session};
pub use config::AtlasConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
