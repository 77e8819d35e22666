// 🌍 Country Info Resolver
//
// Code in, country info out. Never fails: bad codes and every lookup error
// fall back to CountryInfo::default().

use crate::entities::GeoPoint;
use crate::error::LookupError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";
pub const UNKNOWN_CITY: &str = "Unknown";

static COUNTRY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,3}$").expect("valid country code regex"));

/// Known alpha-3 → alpha-2 codes
const ALPHA3_TO_ALPHA2: [(&str, &str); 5] = [
    ("ESP", "ES"), // Spain
    ("GBR", "GB"), // United Kingdom
    ("FRA", "FR"), // France
    ("ITA", "IT"), // Italy
    ("DEU", "DE"), // Germany
];

// ============================================================================
// CORE TYPES
// ============================================================================

/// What the country panel shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryInfo {
    /// Capital city
    pub city: String,
    /// Flag image URL, empty when unknown
    pub flag: String,
    /// Capital coordinates, 0/0 when unknown
    pub capital: GeoPoint,
}

impl Default for CountryInfo {
    fn default() -> Self {
        CountryInfo {
            city: UNKNOWN_CITY.to_string(),
            flag: String::new(),
            capital: GeoPoint::new(0.0, 0.0),
        }
    }
}

impl CountryInfo {
    pub fn has_flag(&self) -> bool {
        !self.flag.is_empty()
    }

    /// Capital position worth recentering the map on
    pub fn map_center(&self) -> Option<GeoPoint> {
        if self.capital.latitude != 0.0 && self.capital.longitude != 0.0 {
            Some(self.capital)
        } else {
            None
        }
    }
}

/// Raw lookup answer, any part may be missing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryRecord {
    pub capital: Option<String>,
    pub flag: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// REST Countries payload: [{ "capital": [..], "flags": {"png": ..}, "capitalInfo": {"latlng": [..]} }]
#[derive(Debug, Deserialize)]
struct RestCountry {
    #[serde(default)]
    capital: Option<Vec<String>>,
    #[serde(default)]
    flags: Option<RestFlags>,
    #[serde(default, rename = "capitalInfo")]
    capital_info: Option<RestCapitalInfo>,
}

#[derive(Debug, Deserialize)]
struct RestFlags {
    #[serde(default)]
    png: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestCapitalInfo {
    #[serde(default)]
    latlng: Option<Vec<f64>>,
}

impl CountryRecord {
    /// Parse a REST Countries JSON body (first array element wins)
    pub fn from_payload(body: &str) -> Result<Self, LookupError> {
        let countries: Vec<RestCountry> =
            serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

        let country = countries
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::Malformed("empty country list".to_string()))?;

        let latlng = country.capital_info.and_then(|c| c.latlng).unwrap_or_default();

        Ok(CountryRecord {
            capital: country.capital.and_then(|c| c.into_iter().next()),
            flag: country.flags.and_then(|f| f.png),
            latitude: latlng.first().copied(),
            longitude: latlng.get(1).copied(),
        })
    }

    /// Fill in defaults for whatever is missing
    pub fn into_info(self) -> CountryInfo {
        CountryInfo {
            city: self
                .capital
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNKNOWN_CITY.to_string()),
            flag: self.flag.unwrap_or_default(),
            capital: GeoPoint::new(
                self.latitude.unwrap_or(0.0),
                self.longitude.unwrap_or(0.0),
            ),
        }
    }
}

// ============================================================================
// LOOKUP COLLABORATOR
// ============================================================================

/// CountryLookup - the remote country service
///
/// Receives an already normalized code.
#[async_trait]
pub trait CountryLookup: Send + Sync {
    async fn lookup(&self, code: &str) -> Result<CountryRecord, LookupError>;
}

/// REST Countries over HTTP
pub struct RestCountriesClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestCountriesClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        Ok(RestCountriesClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, code: &str) -> String {
        format!("{}/alpha/{}", self.base_url, code)
    }
}

#[async_trait]
impl CountryLookup for RestCountriesClient {
    async fn lookup(&self, code: &str) -> Result<CountryRecord, LookupError> {
        let url = self.endpoint(code);
        debug!(%url, "country lookup");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        CountryRecord::from_payload(&body)
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Trim, upper-case and map known alpha-3 codes to alpha-2
pub fn normalize_code(raw: &str) -> String {
    let code = raw.trim().to_uppercase();
    ALPHA3_TO_ALPHA2
        .iter()
        .find(|(alpha3, _)| *alpha3 == code)
        .map(|(_, alpha2)| alpha2.to_string())
        .unwrap_or(code)
}

pub fn is_valid_code(code: &str) -> bool {
    COUNTRY_CODE.is_match(code)
}

pub struct CountryResolver<L: CountryLookup> {
    lookup: L,
}

impl<L: CountryLookup> CountryResolver<L> {
    pub fn new(lookup: L) -> Self {
        CountryResolver { lookup }
    }

    /// Resolve a 2- or 3-letter code; any failure yields the default info
    pub async fn resolve(&self, raw_code: &str) -> CountryInfo {
        match self.try_resolve(raw_code).await {
            Ok(info) => info,
            Err(err) => {
                warn!(code = raw_code, error = %err, "country info unavailable, using default");
                CountryInfo::default()
            }
        }
    }

    async fn try_resolve(&self, raw_code: &str) -> Result<CountryInfo, LookupError> {
        let code = normalize_code(raw_code);
        if !is_valid_code(&code) {
            return Err(LookupError::InvalidCode(code));
        }

        let record = self.lookup.lookup(&code).await?;
        Ok(record.into_info())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every code it is asked for
    #[derive(Clone, Default)]
    struct FakeLookup {
        calls: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl CountryLookup for FakeLookup {
        async fn lookup(&self, code: &str) -> Result<CountryRecord, LookupError> {
            self.calls.lock().unwrap().push(code.to_string());
            if self.fail {
                return Err(LookupError::Status(503));
            }
            Ok(CountryRecord {
                capital: Some(format!("Capital of {}", code)),
                flag: Some(format!("https://flags.example/{}.png", code.to_lowercase())),
                latitude: Some(40.4),
                longitude: Some(-3.68),
            })
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" esp "), "ES");
        assert_eq!(normalize_code("GBR"), "GB");
        assert_eq!(normalize_code("fr"), "FR");
        assert_eq!(normalize_code("usa"), "USA");
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("ES"));
        assert!(is_valid_code("USA"));
        assert!(!is_valid_code("XXZZQ"));
        assert!(!is_valid_code("E"));
        assert!(!is_valid_code("e1"));
        assert!(!is_valid_code(""));
    }

    #[tokio::test]
    async fn test_alpha3_and_alpha2_resolve_the_same() {
        let fake = FakeLookup::default();
        let resolver = CountryResolver::new(fake.clone());

        let from_alpha3 = resolver.resolve("ESP").await;
        let from_alpha2 = resolver.resolve("ES").await;

        assert_eq!(from_alpha3, from_alpha2);
        assert_eq!(from_alpha3.city, "Capital of ES");
        assert_eq!(*fake.calls.lock().unwrap(), vec!["ES", "ES"]);
    }

    #[tokio::test]
    async fn test_malformed_code_skips_lookup() {
        let fake = FakeLookup::default();
        let resolver = CountryResolver::new(fake.clone());

        let info = resolver.resolve("XXZZQ").await;

        assert_eq!(info, CountryInfo::default());
        assert!(fake.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_yields_default() {
        let fake = FakeLookup {
            fail: true,
            ..FakeLookup::default()
        };
        let resolver = CountryResolver::new(fake.clone());

        let info = resolver.resolve("it").await;

        assert_eq!(info, CountryInfo::default());
        assert_eq!(*fake.calls.lock().unwrap(), vec!["IT"]);
    }

    #[test]
    fn test_payload_parsing() {
        let body = r#"[{
            "capital": ["Madrid"],
            "flags": {"png": "https://flagcdn.com/w320/es.png", "svg": "x"},
            "capitalInfo": {"latlng": [40.4, -3.68]}
        }]"#;

        let info = CountryRecord::from_payload(body).unwrap().into_info();
        assert_eq!(info.city, "Madrid");
        assert_eq!(info.flag, "https://flagcdn.com/w320/es.png");
        assert_eq!(info.capital, GeoPoint::new(40.4, -3.68));
        assert!(info.has_flag());
        assert_eq!(info.map_center(), Some(GeoPoint::new(40.4, -3.68)));
    }

    #[test]
    fn test_payload_missing_parts_get_defaults() {
        let info = CountryRecord::from_payload(r#"[{"capital": []}]"#)
            .unwrap()
            .into_info();

        assert_eq!(info.city, UNKNOWN_CITY);
        assert!(!info.has_flag());
        assert_eq!(info.map_center(), None);
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            CountryRecord::from_payload("[]"),
            Err(LookupError::Malformed(_))
        ));
        assert!(matches!(
            CountryRecord::from_payload("{\"status\": 404}"),
            Err(LookupError::Malformed(_))
        ));
        assert!(matches!(
            CountryRecord::from_payload("not json"),
            Err(LookupError::Malformed(_))
        ));
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let client =
            RestCountriesClient::new("https://restcountries.com/v3.1/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.endpoint("ES"), "https://restcountries.com/v3.1/alpha/ES");
    }
}
