// ⚙️ Configuration
//
// Layers, last wins:
//   1. built-in defaults
//   2. poi-atlas.toml (or the file given with --config)
//   3. POI_ATLAS_* environment variables, `__` between nested keys
//      (POI_ATLAS_LOOKUP__TIMEOUT_SECS=3, POI_ATLAS_TAX_RATES__PT=0.23)

use crate::builder::{CatalogBuilder, HeaderMap, DEFAULT_LOOKUP_CODE};
use crate::country::{RestCountriesClient, DEFAULT_BASE_URL};
use crate::entities::pricing::DEFAULT_TAX_RATES;
use crate::entities::{GeoPoint, TaxTable};
use crate::error::LookupError;
use crate::map::{FixedPosition, DEFAULT_POSITION, DEFAULT_ZOOM, GEOLOCATION_TIMEOUT};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "poi-atlas.toml";
pub const ENV_PREFIX: &str = "POI_ATLAS_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Used when the file names no country
    pub default_code: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            default_code: DEFAULT_LOOKUP_CODE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub fallback: GeoPoint,
    pub zoom: u8,
    pub geolocation_timeout_secs: u64,
    /// Fixed position standing in for device geolocation
    pub home: Option<GeoPoint>,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            fallback: DEFAULT_POSITION,
            zoom: DEFAULT_ZOOM,
            geolocation_timeout_secs: GEOLOCATION_TIMEOUT.as_secs(),
            home: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub lookup: LookupConfig,
    pub map: MapConfig,
    pub columns: HeaderMap,
    /// Country → rate, merged over the built-in table
    pub tax_rates: BTreeMap<String, f64>,
    /// EnvFilter directive when RUST_LOG is unset
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        AtlasConfig {
            lookup: LookupConfig::default(),
            map: MapConfig::default(),
            columns: HeaderMap::default(),
            tax_rates: DEFAULT_TAX_RATES
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
            log_filter: "info".to_string(),
            log_file: None,
        }
    }
}

impl AtlasConfig {
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AtlasConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load defaults + `path` (if it exists) + environment
    pub fn load_from(path: &Path) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn tax_table(&self) -> TaxTable {
        let mut table = TaxTable::default();
        for (country, rate) in &self.tax_rates {
            table.set_rate(country, *rate);
        }
        table
    }

    pub fn catalog_builder(&self) -> CatalogBuilder {
        CatalogBuilder::new(self.columns.clone()).with_default_lookup_code(&self.lookup.default_code)
    }

    pub fn lookup_client(&self) -> Result<RestCountriesClient, LookupError> {
        RestCountriesClient::new(&self.lookup.base_url, Duration::from_secs(self.lookup.timeout_secs))
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.map.geolocation_timeout_secs)
    }

    pub fn geolocator(&self) -> Option<FixedPosition> {
        self.map.home.map(FixedPosition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PoiField;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let config = AtlasConfig::load()?;
            assert_eq!(config, AtlasConfig::default());
            assert_eq!(config.lookup.default_code, "ESP");
            assert_eq!(config.columns.column(PoiField::Address), "direcció");
            assert_eq!(config.geolocation_timeout(), Duration::from_secs(10));
            assert!(config.geolocator().is_none());
            Ok(())
        });
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "atlas.toml",
                r#"
                log_filter = "debug"

                [lookup]
                base_url = "http://localhost:8080"

                [columns]
                address = "direccio"

                [tax_rates]
                PT = 0.23

                [map.home]
                latitude = 41.98
                longitude = 2.82
                "#,
            )?;

            let config = AtlasConfig::load_from(Path::new("atlas.toml"))?;
            assert_eq!(config.log_filter, "debug");
            assert_eq!(config.lookup.base_url, "http://localhost:8080");
            assert_eq!(config.lookup.timeout_secs, 10);
            assert_eq!(config.columns.address, "direccio");
            assert_eq!(config.columns.name, "nom");
            assert_eq!(config.map.home, Some(GeoPoint::new(41.98, 2.82)));

            let taxes = config.tax_table();
            assert_eq!(taxes.rate_for("PT"), 0.23);
            assert_eq!(taxes.rate_for("ES"), 0.21);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "[lookup]\ntimeout_secs = 5\n")?;
            jail.set_env("POI_ATLAS_LOOKUP__TIMEOUT_SECS", "3");
            jail.set_env("POI_ATLAS_LOOKUP__DEFAULT_CODE", "GBR");
            jail.set_env("POI_ATLAS_TAX_RATES__ES", "0.1");

            let config = AtlasConfig::load()?;
            assert_eq!(config.lookup.timeout_secs, 3);
            assert_eq!(config.lookup.default_code, "GBR");
            assert_eq!(config.tax_table().rate_for("ES"), 0.1);
            Ok(())
        });
    }

    #[test]
    fn test_bad_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "[map]\nzoom = \"close\"\n")?;
            assert!(AtlasConfig::load().is_err());
            Ok(())
        });
    }
}
