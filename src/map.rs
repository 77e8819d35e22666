// 🗺️ Map collaborator
//
// The map widget itself lives outside the core. Anything that can center a
// view and hold labelled markers implements MapSurface; MarkerLayer is the
// in-memory one the terminal shell and the tests draw from.

use crate::entities::{GeoPoint, PointOfInterest, TaxTable};
use crate::error::GeolocationError;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Barcelona, used when no position fix is available
pub const DEFAULT_POSITION: GeoPoint = GeoPoint::new(41.3874, 2.1686);
pub const DEFAULT_ZOOM: u8 = 13;
/// Zoom of a fresh map before any position is known
pub const WORLD_ZOOM: u8 = 2;
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);
pub const POSITION_LABEL: &str = "You are here";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MarkerId(u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: MarkerId,
    pub at: GeoPoint,
    pub label: String,
}

// ============================================================================
// SURFACE
// ============================================================================

pub trait MapSurface {
    fn set_view(&mut self, center: GeoPoint, zoom: u8);

    fn add_marker(&mut self, at: GeoPoint, label: &str) -> MarkerId;

    /// False when no such marker is on the map
    fn remove_marker(&mut self, id: MarkerId) -> bool;

    /// Removes point markers; the current-position marker stays
    fn clear_markers(&mut self);

    /// Place (or move) the current-position marker and center on it
    fn show_position(&mut self, at: GeoPoint);
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerLayer {
    center: GeoPoint,
    zoom: u8,
    markers: Vec<Marker>,
    position: Option<GeoPoint>,
    next_id: u64,
}

impl Default for MarkerLayer {
    fn default() -> Self {
        MarkerLayer {
            center: GeoPoint::new(0.0, 0.0),
            zoom: WORLD_ZOOM,
            markers: Vec::new(),
            position: None,
            next_id: 1,
        }
    }
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn position(&self) -> Option<GeoPoint> {
        self.position
    }
}

impl MapSurface for MarkerLayer {
    fn set_view(&mut self, center: GeoPoint, zoom: u8) {
        debug!(%center, zoom, "map view");
        self.center = center;
        self.zoom = zoom;
    }

    fn add_marker(&mut self, at: GeoPoint, label: &str) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.push(Marker {
            id,
            at,
            label: label.to_string(),
        });
        id
    }

    fn remove_marker(&mut self, id: MarkerId) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.id != id);
        self.markers.len() != before
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn show_position(&mut self, at: GeoPoint) {
        self.position = Some(at);
        self.set_view(at, DEFAULT_ZOOM);
    }
}

// ============================================================================
// MARKERS FOR POINTS
// ============================================================================

/// Popup text for one point
///
/// ```text
/// Museu Picasso
/// Barcelona, ES, Carrer Montcada, 15-23
/// Rating: 4.6
/// 18.15€ (tax included)
///
/// Obres de joventut de Picasso
/// ```
pub fn marker_label(point: &PointOfInterest, taxes: &TaxTable) -> String {
    let base = &point.base;
    let mut label = format!(
        "{}\n{}, {}, {}\nRating: {}",
        base.name, base.city, base.country, base.address, base.rating
    );

    if let Some(price) = point.taxed_price(taxes) {
        label.push_str(&format!("\n{}", price));
    }

    if let Some(description) = point.description() {
        label.push_str(&format!("\n\n{}", description));
    }

    label
}

/// Replace every point marker with one per visible point
pub fn render_markers<M: MapSurface + ?Sized>(
    map: &mut M,
    points: &[&PointOfInterest],
    taxes: &TaxTable,
) -> Vec<MarkerId> {
    map.clear_markers();
    points
        .iter()
        .map(|p| map.add_marker(p.location(), &marker_label(p, taxes)))
        .collect()
}

// ============================================================================
// GEOLOCATION
// ============================================================================

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> Result<GeoPoint, GeolocationError>;
}

/// Always answers with the same position (configured home, tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub GeoPoint);

#[async_trait]
impl Geolocator for FixedPosition {
    async fn locate(&self) -> Result<GeoPoint, GeolocationError> {
        Ok(self.0)
    }
}

/// Starting position: a fix within `timeout`, else `fallback`
pub async fn initial_position(
    locator: Option<&dyn Geolocator>,
    timeout: Duration,
    fallback: GeoPoint,
) -> GeoPoint {
    let Some(locator) = locator else {
        warn!(%fallback, "{}, using fallback position", GeolocationError::Unsupported);
        return fallback;
    };

    match tokio::time::timeout(timeout, locator.locate()).await {
        Ok(Ok(position)) => position,
        Ok(Err(err)) => {
            warn!(error = %err, %fallback, "using fallback position");
            fallback
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs_f64(), %fallback, "geolocation timed out, using fallback position");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Admission, PoiBase, Rating};

    fn base(name: &str, category: &str) -> PoiBase {
        PoiBase {
            country: "ES".to_string(),
            city: "Barcelona".to_string(),
            name: name.to_string(),
            address: "Carrer Montcada, 15-23".to_string(),
            category: category.to_string(),
            location: GeoPoint::new(41.3851, 2.1809),
            rating: Rating::Score(4.6),
        }
    }

    struct SlowLocator;

    #[async_trait]
    impl Geolocator for SlowLocator {
        async fn locate(&self) -> Result<GeoPoint, GeolocationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(GeoPoint::new(1.0, 1.0))
        }
    }

    struct DeniedLocator;

    #[async_trait]
    impl Geolocator for DeniedLocator {
        async fn locate(&self) -> Result<GeoPoint, GeolocationError> {
            Err(GeolocationError::Failed("permission denied".to_string()))
        }
    }

    #[test]
    fn test_marker_layer_add_remove_clear() {
        let mut layer = MarkerLayer::new();
        let a = layer.add_marker(GeoPoint::new(1.0, 1.0), "a");
        let b = layer.add_marker(GeoPoint::new(2.0, 2.0), "b");
        assert_ne!(a, b);

        assert!(layer.remove_marker(a));
        assert!(!layer.remove_marker(a));
        assert_eq!(layer.markers().len(), 1);

        layer.show_position(DEFAULT_POSITION);
        layer.clear_markers();
        assert!(layer.markers().is_empty());
        assert_eq!(layer.position(), Some(DEFAULT_POSITION));
        assert_eq!(layer.zoom(), DEFAULT_ZOOM);
    }

    #[test]
    fn test_marker_label_per_variant() {
        let taxes = TaxTable::default();

        let plaza = PointOfInterest::generic(base("Plaça Reial", "Plaça"));
        assert_eq!(
            marker_label(&plaza, &taxes),
            "Plaça Reial\nBarcelona, ES, Carrer Montcada, 15-23\nRating: 4.6"
        );

        let museum = PointOfInterest::museum(
            base("Museu Picasso", "Museu"),
            Admission::new("10:00-19:00", "15", "€"),
            "Obres de joventut de Picasso",
        );
        let label = marker_label(&museum, &taxes);
        assert!(label.contains("\n18.15€ (tax included)"));
        assert!(label.ends_with("\n\nObres de joventut de Picasso"));
    }

    #[test]
    fn test_render_markers_replaces_previous() {
        let taxes = TaxTable::default();
        let points = vec![
            PointOfInterest::generic(base("A", "Plaça")),
            PointOfInterest::generic(base("B", "Plaça")),
        ];
        let refs: Vec<&PointOfInterest> = points.iter().collect();

        let mut layer = MarkerLayer::new();
        layer.add_marker(GeoPoint::new(0.5, 0.5), "stale");

        let ids = render_markers(&mut layer, &refs, &taxes);
        assert_eq!(ids.len(), 2);
        assert_eq!(layer.markers().len(), 2);
        assert!(layer.markers()[0].label.starts_with("A\n"));

        render_markers(&mut layer, &refs[1..], &taxes);
        assert_eq!(layer.markers().len(), 1);
    }

    #[tokio::test]
    async fn test_initial_position_uses_fix() {
        let home = FixedPosition(GeoPoint::new(41.98, 2.82));
        let at = initial_position(Some(&home), GEOLOCATION_TIMEOUT, DEFAULT_POSITION).await;
        assert_eq!(at, GeoPoint::new(41.98, 2.82));
    }

    #[tokio::test]
    async fn test_initial_position_falls_back() {
        let at = initial_position(None, GEOLOCATION_TIMEOUT, DEFAULT_POSITION).await;
        assert_eq!(at, DEFAULT_POSITION);

        let at = initial_position(Some(&DeniedLocator), GEOLOCATION_TIMEOUT, DEFAULT_POSITION).await;
        assert_eq!(at, DEFAULT_POSITION);
    }

    #[tokio::test]
    async fn test_initial_position_times_out() {
        let at = initial_position(Some(&SlowLocator), Duration::from_millis(20), DEFAULT_POSITION).await;
        assert_eq!(at, DEFAULT_POSITION);
    }
}
