// 🎛️ Session - what the shell talks to
//
// Every user trigger becomes an Action. The session owns the catalog, the
// view criteria, the country panel and the map, and keeps them consistent:
// after each action the map shows exactly the visible points.

use crate::builder::{CatalogBuilder, ImportSummary};
use crate::catalog::Catalog;
use crate::country::{CountryInfo, CountryLookup, CountryResolver};
use crate::entities::{GeoPoint, PoiId, PointOfInterest};
use crate::error::AtlasError;
use crate::map::{initial_position, render_markers, Geolocator, MapSurface, DEFAULT_ZOOM};
use crate::parser::{parse_csv, read_csv, CsvDocument};
use crate::view::{CategoryFilter, SortOrder, ViewCriteria};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

pub const DELETE_QUESTION: &str = "Delete this point of interest?";
pub const CLEAR_QUESTION: &str = "Clear the whole list?";

#[derive(Debug, Clone)]
pub enum Action {
    /// Read and import a file from disk
    Import(PathBuf),
    /// Import content already in memory (dropped file, pasted text)
    ImportText { file_name: String, content: String },
    /// Add a point by hand
    AddPoint(Box<PointOfInterest>),
    SetCategory(CategoryFilter),
    CycleCategory,
    SetSearch(String),
    SetOrder(SortOrder),
    CycleOrder,
    ResetFilters,
    Delete(PoiId),
    Clear,
}

/// Asks the user a yes/no question
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Answer decided up front (a y/n key already pressed, `--yes`, tests)
impl Confirm for bool {
    fn confirm(&mut self, _question: &str) -> bool {
        *self
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum Outcome {
    Imported(ImportSummary),
    Added(PoiId),
    ViewChanged { visible: usize },
    Deleted(PoiId),
    Cleared { removed: usize },
    /// The user said no; nothing changed
    Declined,
    /// Nothing to do (unknown id, empty catalog)
    Ignored,
    /// Shown to the user; the session keeps running
    Failed { notice: String },
}

pub struct Session<L: CountryLookup, M: MapSurface> {
    catalog: Catalog,
    criteria: ViewCriteria,
    builder: CatalogBuilder,
    resolver: CountryResolver<L>,
    map: M,
    country: Option<CountryInfo>,
    zoom: u8,
}

impl<L: CountryLookup, M: MapSurface> Session<L, M> {
    pub fn new(catalog: Catalog, builder: CatalogBuilder, lookup: L, map: M) -> Self {
        Session {
            catalog,
            criteria: ViewCriteria::default(),
            builder,
            resolver: CountryResolver::new(lookup),
            map,
            country: None,
            zoom: DEFAULT_ZOOM,
        }
    }

    /// Builder pattern: zoom used when recentering on a country
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    /// Center the map on the device position (or the fallback) and mark it
    pub async fn start(
        &mut self,
        locator: Option<&dyn Geolocator>,
        timeout: Duration,
        fallback: GeoPoint,
    ) -> GeoPoint {
        let position = initial_position(locator, timeout, fallback).await;
        self.map.show_position(position);
        position
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn criteria(&self) -> &ViewCriteria {
        &self.criteria
    }

    /// Country panel, None until a file has been imported
    pub fn country(&self) -> Option<&CountryInfo> {
        self.country.as_ref()
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn visible(&self) -> Vec<&PointOfInterest> {
        self.criteria.apply(self.catalog.points())
    }

    // ========================================================================
    // DISPATCH
    // ========================================================================

    pub async fn dispatch(&mut self, action: Action, confirm: &mut dyn Confirm) -> Outcome {
        match action {
            Action::Import(path) => match read_csv(&path).await {
                Ok(document) => self.import_document(document).await,
                Err(err) => self.failed(AtlasError::from(err)),
            },
            Action::ImportText { file_name, content } => match parse_csv(&file_name, &content) {
                Ok(document) => self.import_document(document).await,
                Err(err) => self.failed(AtlasError::from(err)),
            },
            Action::AddPoint(point) => {
                let id = self.catalog.add_manual(*point);
                self.refresh_markers();
                Outcome::Added(id)
            }
            Action::SetCategory(category) => {
                self.criteria.category = category;
                self.view_changed()
            }
            Action::CycleCategory => {
                self.criteria.category = self.criteria.category.cycle(self.catalog.categories());
                self.view_changed()
            }
            Action::SetSearch(text) => {
                self.criteria.text = text;
                self.view_changed()
            }
            Action::SetOrder(order) => {
                self.criteria.order = order;
                self.view_changed()
            }
            Action::CycleOrder => {
                self.criteria.order = self.criteria.order.next();
                self.view_changed()
            }
            Action::ResetFilters => {
                self.criteria.reset_filters();
                self.view_changed()
            }
            Action::Delete(id) => self.delete(id, confirm),
            Action::Clear => self.clear(confirm),
        }
    }

    async fn import_document(&mut self, document: CsvDocument) -> Outcome {
        info!(file = %document.file_name, rows = document.rows.len(), "importing");

        let summary = match self.builder.import_rows(&mut self.catalog, &document.rows) {
            Ok(summary) => summary,
            Err(err) => {
                // rows before the failing one are already in the catalog
                if let (AtlasError::PartialImport { imported, .. }, Some(first)) =
                    (&err, document.rows.first())
                {
                    if *imported > 0 {
                        let code = self.builder.lookup_code(first);
                        self.show_country(&code).await;
                    }
                }
                self.refresh_markers();
                return self.failed(err);
            }
        };

        self.show_country(&summary.lookup_code).await;
        self.refresh_markers();
        Outcome::Imported(summary)
    }

    async fn show_country(&mut self, code: &str) {
        let info = self.resolver.resolve(code).await;
        if let Some(center) = info.map_center() {
            self.map.set_view(center, self.zoom);
        }
        self.country = Some(info);
    }

    fn delete(&mut self, id: PoiId, confirm: &mut dyn Confirm) -> Outcome {
        if self.catalog.get(id).is_none() {
            return Outcome::Ignored;
        }
        if !confirm.confirm(DELETE_QUESTION) {
            return Outcome::Declined;
        }

        self.catalog.delete(id);
        self.refresh_markers();
        Outcome::Deleted(id)
    }

    fn clear(&mut self, confirm: &mut dyn Confirm) -> Outcome {
        if self.catalog.is_empty() {
            return Outcome::Ignored;
        }
        if !confirm.confirm(CLEAR_QUESTION) {
            return Outcome::Declined;
        }

        let removed = self.catalog.clear();
        self.criteria.category = CategoryFilter::All;
        self.country = None;
        self.map.clear_markers();
        Outcome::Cleared { removed }
    }

    fn view_changed(&mut self) -> Outcome {
        let visible = self.refresh_markers();
        Outcome::ViewChanged { visible }
    }

    fn failed(&self, err: AtlasError) -> Outcome {
        error!(error = %err, "import failed");
        Outcome::Failed {
            notice: format!("Error processing the file: {}", err),
        }
    }

    fn refresh_markers(&mut self) -> usize {
        let visible = self.criteria.apply(self.catalog.points());
        render_markers(&mut self.map, &visible, self.catalog.taxes()).len()
    }
}
