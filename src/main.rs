// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use poi_atlas::config::DEFAULT_CONFIG_FILE;
use poi_atlas::{
    Action, AtlasConfig, Catalog, CategoryFilter, CountryInfo, CountryResolver, ImportSummary,
    MarkerLayer, Outcome, PointOfInterest, Session, SortOrder, ValidationIssue,
};

const USAGE: &str = "\
Usage:
  poi-atlas import <file.csv> [--type <category>] [--search <text>] [--order asc|desc|none] [--json]
  poi-atlas country <code> [--json]
  poi-atlas [ui] [file.csv]

Options:
  --config <path>   configuration file (default: poi-atlas.toml)";

#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    json: bool,
    category: Option<String>,
    search: Option<String>,
    order: Option<SortOrder>,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("{} needs a value\n\n{}", flag, USAGE))
        };

        match arg.as_str() {
            "--config" => options.config = Some(PathBuf::from(value("--config")?)),
            "--type" => options.category = Some(value("--type")?),
            "--search" => options.search = Some(value("--search")?),
            "--order" => {
                let raw = value("--order")?;
                let order = raw.parse::<SortOrder>().map_err(anyhow::Error::msg)?;
                options.order = Some(order);
            }
            "--json" => options.json = true,
            flag if flag.starts_with("--") => bail!("unknown option {}\n\n{}", flag, USAGE),
            _ => options.positional.push(arg.clone()),
        }
    }

    Ok(options)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h" || a == "help") {
        println!("{}", USAGE);
        return Ok(());
    }

    let options = parse_options(&args)?;
    let config_path = options
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = AtlasConfig::load_from(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let command = options.positional.first().map(String::as_str);
    let interactive = !matches!(command, Some("import") | Some("country"));
    init_logging(&config, interactive)?;

    match command {
        Some("import") => {
            let file = options
                .positional
                .get(1)
                .with_context(|| format!("import needs a CSV file\n\n{}", USAGE))?;
            run_import(&config, Path::new(file), &options).await?;
        }
        Some("country") => {
            let code = options
                .positional
                .get(1)
                .with_context(|| format!("country needs a code\n\n{}", USAGE))?;
            run_country(&config, code, options.json).await?;
        }
        Some("ui") => run_ui_mode(&config, options.positional.get(1).map(PathBuf::from)).await?,
        Some(file) => run_ui_mode(&config, Some(PathBuf::from(file))).await?,
        None => run_ui_mode(&config, None).await?,
    }

    Ok(())
}

/// RUST_LOG wins over the configured filter; the UI never logs to the terminal
fn init_logging(config: &AtlasConfig, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .with_context(|| format!("Invalid log filter '{}'", config.log_filter))?;

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match (&config.log_file, interactive) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            subscriber.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        (None, true) => subscriber.with_writer(std::io::sink).init(),
        (None, false) => subscriber.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

fn new_session(config: &AtlasConfig) -> Result<Session<poi_atlas::RestCountriesClient, MarkerLayer>> {
    let lookup = config
        .lookup_client()
        .context("Failed to build the country lookup client")?;

    Ok(Session::new(
        Catalog::with_tax_table(config.tax_table()),
        config.catalog_builder(),
        lookup,
        MarkerLayer::new(),
    )
    .with_zoom(config.map.zoom))
}

#[derive(Serialize)]
struct ImportReport<'a> {
    summary: &'a ImportSummary,
    country: Option<&'a CountryInfo>,
    visible: Vec<&'a PointOfInterest>,
    markers: usize,
}

async fn run_import(config: &AtlasConfig, path: &Path, options: &Options) -> Result<()> {
    let mut session = new_session(config)?;

    if !options.json {
        println!("📂 Importing {}", path.display());
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let summary = match session.dispatch(Action::Import(path.to_path_buf()), &mut false).await {
        Outcome::Imported(summary) => summary,
        Outcome::Failed { notice } => bail!(notice),
        other => bail!("Unexpected import outcome: {:?}", other),
    };

    if let Some(category) = &options.category {
        session
            .dispatch(Action::SetCategory(CategoryFilter::Only(category.clone())), &mut false)
            .await;
    }
    if let Some(text) = &options.search {
        session.dispatch(Action::SetSearch(text.clone()), &mut false).await;
    }
    if let Some(order) = options.order {
        session.dispatch(Action::SetOrder(order), &mut false).await;
    }

    let visible = session.visible();
    let taxes = session.catalog().taxes();

    if options.json {
        let report = ImportReport {
            summary: &summary,
            country: session.country(),
            markers: session.map().markers().len(),
            visible,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize import report")?;
        println!("{}", json);
        return Ok(());
    }

    if let Some(country) = session.country() {
        print_country(country);
    }

    println!(
        "\n✓ Imported {} points ({} attractions, {} museums, {} generic)",
        summary.imported, summary.stats.attractions, summary.stats.museums, summary.stats.generic
    );
    for column in &summary.missing_columns {
        println!("⚠️  Column '{}' not found, values left empty", column);
    }
    for issue in &summary.issues {
        match issue {
            ValidationIssue::PriceDefaulted { line, raw } => {
                println!("⚠️  Line {}: price '{}' read as 0", line, raw)
            }
            ValidationIssue::PriceTruncated { line, raw, value } => {
                println!("⚠️  Line {}: price '{}' read as {}", line, raw, value)
            }
        }
    }

    let criteria = session.criteria();
    println!(
        "\n📋 Showing {} of {} | Type: {} | Search: \"{}\" | Order: {}",
        visible.len(),
        session.catalog().live_count(),
        criteria.category.label(),
        criteria.text,
        criteria.order
    );
    if visible.is_empty() {
        println!("   No results match the filters");
    }
    for (i, point) in visible.iter().enumerate() {
        let line = point.summary(taxes).replace('\n', "\n      ");
        println!("  {:>2}. {}", i + 1, line);
    }

    let map = session.map();
    println!(
        "\n🗺️  Markers: {} | Map center: {} (zoom {})",
        map.markers().len(),
        map.center(),
        map.zoom()
    );

    Ok(())
}

async fn run_country(config: &AtlasConfig, code: &str, json: bool) -> Result<()> {
    let lookup = config
        .lookup_client()
        .context("Failed to build the country lookup client")?;
    let info = CountryResolver::new(lookup).resolve(code).await;

    if json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize country info")?;
        println!("{}", json);
    } else {
        print_country(&info);
    }

    Ok(())
}

fn print_country(info: &CountryInfo) {
    println!("🌍 Capital: {}", info.city);
    if info.has_flag() {
        println!("   Flag: {}", info.flag);
    }
    match info.map_center() {
        Some(center) => println!("   Coordinates: {}", center),
        None => println!("   Coordinates: unknown"),
    }
}

#[cfg(feature = "tui")]
async fn run_ui_mode(config: &AtlasConfig, file: Option<PathBuf>) -> Result<()> {
    use poi_atlas::map::Geolocator;

    println!("🖥️  Loading POI Atlas UI...\n");

    let mut session = new_session(config)?;

    let home = config.geolocator();
    let locator = home.as_ref().map(|g| g as &dyn Geolocator);
    session
        .start(locator, config.geolocation_timeout(), config.map.fallback)
        .await;

    let mut app = ui::App::new(session);
    if let Some(path) = file {
        app.dispatch(Action::Import(path), &mut false).await;
    }

    ui::run_ui(&mut app).await?;

    println!("\n✅ UI closed ({} points in session)", app.session.catalog().live_count());

    Ok(())
}

#[cfg(not(feature = "tui"))]
async fn run_ui_mode(_config: &AtlasConfig, _file: Option<PathBuf>) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: poi-atlas import <file.csv>");
    std::process::exit(1);
}
