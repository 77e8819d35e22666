// End-to-end: file on disk → session → list, country panel and markers

use async_trait::async_trait;
use poi_atlas::country::CountryRecord;
use poi_atlas::map::DEFAULT_POSITION;
use poi_atlas::{
    Action, Catalog, CatalogBuilder, CategoryFilter, CountryLookup, GeoPoint, LookupError,
    MarkerLayer, Outcome, Session, SortOrder, TaxTable, TaxedPrice,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct RecordingLookup {
    calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl CountryLookup for RecordingLookup {
    async fn lookup(&self, code: &str) -> Result<CountryRecord, LookupError> {
        self.calls.lock().unwrap().push(code.to_string());
        match code {
            "ES" => Ok(CountryRecord {
                capital: Some("Madrid".to_string()),
                flag: Some("https://flagcdn.com/w320/es.png".to_string()),
                latitude: Some(40.4),
                longitude: Some(-3.68),
            }),
            _ => Err(LookupError::Status(404)),
        }
    }
}

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/barcelona.csv")
}

fn new_session(lookup: RecordingLookup) -> Session<RecordingLookup, MarkerLayer> {
    Session::new(Catalog::new(), CatalogBuilder::default(), lookup, MarkerLayer::new())
}

#[tokio::test]
async fn test_fixture_import_end_to_end() {
    let lookup = RecordingLookup::default();
    let mut session = new_session(lookup.clone());

    session.start(None, Duration::from_millis(10), DEFAULT_POSITION).await;
    assert_eq!(session.map().position(), Some(DEFAULT_POSITION));

    let outcome = session.dispatch(Action::Import(fixture()), &mut true).await;
    let Outcome::Imported(summary) = outcome else {
        panic!("import failed: {:?}", outcome);
    };

    // blank line skipped, three rows in file order
    assert_eq!(summary.imported, 3);
    assert_eq!(summary.stats.attractions, 1);
    assert_eq!(summary.stats.museums, 1);
    assert_eq!(summary.stats.generic, 1);
    assert!(summary.issues.is_empty());
    assert!(summary.missing_columns.is_empty());

    let names: Vec<&str> = session.catalog().points().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["Sagrada Família", "Museu Picasso", "Plaça de Catalunya"]);
    assert_eq!(session.catalog().categories(), &["Atraccio", "Museu", "Plaça"]);

    // ESP is looked up once as ES, and the map recenters on the capital
    assert_eq!(*lookup.calls.lock().unwrap(), vec!["ES"]);
    assert_eq!(session.country().unwrap().city, "Madrid");
    assert_eq!(session.map().center(), GeoPoint::new(40.4, -3.68));

    let museum = &session.catalog().points()[1];
    assert_eq!(
        museum.taxed_price(session.catalog().taxes()),
        Some(TaxedPrice::Taxed {
            amount: 18.15,
            currency: "€".to_string(),
            rate: 0.21,
        })
    );
    let marker = &session.map().markers()[1];
    assert!(marker.label.contains("18.15€ (tax included)"));
    assert!(marker.label.ends_with("Obres de joventut de Picasso"));
}

#[tokio::test]
async fn test_filter_sort_delete_clear() {
    let mut session = new_session(RecordingLookup::default());
    session.dispatch(Action::Import(fixture()), &mut true).await;

    session
        .dispatch(Action::SetCategory(CategoryFilter::Only("Museu".to_string())), &mut true)
        .await;
    assert_eq!(session.visible().len(), 1);
    assert_eq!(session.map().markers().len(), 1);

    session.dispatch(Action::ResetFilters, &mut true).await;
    session.dispatch(Action::SetOrder(SortOrder::Ascending), &mut true).await;
    let names: Vec<&str> = session.visible().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["Museu Picasso", "Plaça de Catalunya", "Sagrada Família"]);

    let id = session.visible()[0].id();
    assert!(matches!(session.dispatch(Action::Delete(id), &mut false).await, Outcome::Declined));
    assert!(matches!(session.dispatch(Action::Delete(id), &mut true).await, Outcome::Deleted(_)));
    assert_eq!(session.catalog().live_count(), 2);
    assert_eq!(session.map().markers().len(), 2);

    assert!(matches!(
        session.dispatch(Action::Clear, &mut true).await,
        Outcome::Cleared { removed: 2 }
    ));
    assert_eq!(session.catalog().live_count(), 0);
    assert!(session.catalog().categories().is_empty());
    assert!(session.map().markers().is_empty());
}

#[tokio::test]
async fn test_bad_coordinate_keeps_earlier_rows() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(
        file,
        "pais;codi;ciutat;nom;direcció;tipus;latitud;longitud;puntuacio;horaris;preu;moneda;descripcio\n\
         FR;FRA;Paris;Louvre;Rue de Rivoli;Museu;48.8606;2.3376;4.7;09:00-18:00;22;€;Mona Lisa\n\
         FR;FRA;Paris;Tour Eiffel;Champ de Mars;Atraccio;north;2.2945;4.6;09:00-23:00;29.40;€;\n"
    )
    .unwrap();

    let lookup = RecordingLookup::default();
    let mut session = new_session(lookup.clone());
    let outcome = session.dispatch(Action::Import(file.path().to_path_buf()), &mut true).await;

    match outcome {
        Outcome::Failed { notice } => {
            assert!(notice.contains("import stopped after 1 row(s)"));
            assert!(notice.contains("invalid latitude 'north'"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(session.catalog().live_count(), 1);
    assert_eq!(session.map().markers().len(), 1);
    // the rows that made it in still get their country panel
    assert_eq!(session.country().unwrap().city, "Unknown");
    assert_eq!(*lookup.calls.lock().unwrap(), vec!["FR"]);
}

#[tokio::test]
async fn test_unknown_country_uses_default_panel_and_untaxed_price() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(
        file,
        "pais;codi;ciutat;nom;direcció;tipus;latitud;longitud;puntuacio;horaris;preu;moneda;descripcio\n\
         PT;PRT;Lisboa;Torre de Belém;Av. Brasília;Atraccio;38.6916;-9.2160;4.5;10:00-17:30;100;€;\n"
    )
    .unwrap();

    let mut session = new_session(RecordingLookup::default());
    let outcome = session.dispatch(Action::Import(file.path().to_path_buf()), &mut true).await;
    assert!(matches!(outcome, Outcome::Imported(_)));

    let country = session.country().unwrap();
    assert_eq!(country.city, "Unknown");
    assert!(country.map_center().is_none());

    let point = &session.catalog().points()[0];
    assert_eq!(
        point.taxed_price(&TaxTable::default()).unwrap().to_string(),
        "100.00€ (no tax)"
    );
}
