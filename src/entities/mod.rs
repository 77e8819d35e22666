// Entity Models
//
// A point of interest is one shared base record plus a variant tag:
// - Generic: no price
// - Attraction / Museum: priced, taxed per country
//
// The tax table lives next to the entities because taxed prices are derived
// from it on every read.

pub mod point;
pub mod pricing;

pub use point::{Admission, GeoPoint, PoiBase, PoiId, PoiKind, PointOfInterest, Rating};
pub use pricing::{coerce_price, parse_price, PriceParse, TaxTable, TaxedPrice};
