// 📚 Catalog - the live collection of points of interest
//
// Owns every entity in import order, the distinct category labels seen so
// far, and the live-entity count. Only insert/delete/clear mutate it.

use crate::entities::{PoiId, PoiKind, PointOfInterest, TaxTable};
use serde::Serialize;
use tracing::{debug, info};

/// Per-variant counts for headers and summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub generic: usize,
    pub attractions: usize,
    pub museums: usize,
}

impl CatalogStats {
    pub fn total(&self) -> usize {
        self.generic + self.attractions + self.museums
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    points: Vec<PointOfInterest>,
    /// Distinct raw category labels, first-seen order
    categories: Vec<String>,
    live_count: usize,
    taxes: TaxTable,
}

impl Catalog {
    /// Create new empty catalog with the default tax table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tax_table(taxes: TaxTable) -> Self {
        Catalog {
            taxes,
            ..Self::default()
        }
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Append an imported entity
    pub fn insert(&mut self, point: PointOfInterest) -> PoiId {
        let id = point.id();
        debug!(%id, name = %point.base.name, kind = point.kind.as_str(), "catalog insert");
        self.points.push(point);
        self.live_count += 1;
        id
    }

    /// Append an entity added by hand (flagged as manual)
    pub fn add_manual(&mut self, mut point: PointOfInterest) -> PoiId {
        point.mark_manual();
        self.record_category(&point.base.category);
        self.insert(point)
    }

    /// Remember a category label (exact, case-sensitive)
    pub fn record_category(&mut self, label: &str) {
        if !self.categories.iter().any(|c| c == label) {
            self.categories.push(label.to_string());
        }
    }

    /// Remove one entity by id; unknown ids are a no-op
    pub fn delete(&mut self, id: PoiId) -> Option<PointOfInterest> {
        let index = self.points.iter().position(|p| p.id() == id)?;
        let removed = self.points.remove(index);
        self.live_count = self.live_count.saturating_sub(1);
        info!(%id, name = %removed.base.name, remaining = self.live_count, "point deleted");
        Some(removed)
    }

    /// Drop everything: entities, categories, count
    pub fn clear(&mut self) -> usize {
        let removed = self.points.len();
        self.points.clear();
        self.categories.clear();
        self.live_count = 0;
        info!(removed, "catalog cleared");
        removed
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn points(&self) -> &[PointOfInterest] {
        &self.points
    }

    pub fn get(&self, id: PoiId) -> Option<&PointOfInterest> {
        self.points.iter().find(|p| p.id() == id)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of live entities (kept by insert/delete/clear)
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn taxes(&self) -> &TaxTable {
        &self.taxes
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats::default();
        for point in &self.points {
            match point.kind {
                PoiKind::Generic => stats.generic += 1,
                PoiKind::Attraction(_) => stats.attractions += 1,
                PoiKind::Museum { .. } => stats.museums += 1,
            }
        }
        stats
    }
}
