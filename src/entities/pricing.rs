// 💶 Pricing - price coercion, country tax table, taxed price
//
// Prices arrive as free text from the CSV. Whatever does not look like a
// number becomes 0 (free admission). Negative prices pass through untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Leading decimal number: sign, digits, fraction, exponent
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid price regex")
});

/// Rates applied when nothing else is configured
pub const DEFAULT_TAX_RATES: [(&str, f64); 5] = [
    ("ES", 0.21), // Spain
    ("GB", 0.20), // United Kingdom
    ("FR", 0.20), // France
    ("IT", 0.22), // Italy
    ("DE", 0.19), // Germany
];

// ============================================================================
// PRICE COERCION
// ============================================================================

/// Outcome of reading a price out of free text
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceParse {
    /// Whole text was a number
    Exact(f64),
    /// Only a leading part was numeric ("12€" → 12)
    Prefix(f64),
    /// Nothing usable, coerced to zero
    Defaulted,
}

impl PriceParse {
    pub fn value(&self) -> f64 {
        match self {
            PriceParse::Exact(v) | PriceParse::Prefix(v) => *v,
            PriceParse::Defaulted => 0.0,
        }
    }
}

/// Read the longest leading number of `raw`, ignoring leading whitespace
pub fn parse_price(raw: &str) -> PriceParse {
    let text = raw.trim_start();

    let Some(found) = LEADING_NUMBER.find(text) else {
        return PriceParse::Defaulted;
    };

    match found.as_str().parse::<f64>() {
        Ok(v) if v.is_finite() => {
            if found.end() == text.trim_end().len() {
                PriceParse::Exact(v)
            } else {
                PriceParse::Prefix(v)
            }
        }
        _ => PriceParse::Defaulted,
    }
}

/// Price coercion: invalid or missing input becomes 0
pub fn coerce_price(raw: &str) -> f64 {
    parse_price(raw).value()
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// TAX TABLE
// ============================================================================

/// Country (ISO alpha-2) → tax rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTable {
    rates: BTreeMap<String, f64>,
}

impl Default for TaxTable {
    fn default() -> Self {
        TaxTable {
            rates: DEFAULT_TAX_RATES
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        }
    }
}

impl TaxTable {
    pub fn set_rate(&mut self, country: &str, rate: f64) {
        self.rates.insert(country.trim().to_uppercase(), rate);
    }

    /// Rate for a country, 0 when unknown
    pub fn rate_for(&self, country: &str) -> f64 {
        self.rates
            .get(&country.trim().to_uppercase())
            .copied()
            .unwrap_or(0.0)
    }

    /// Derive the displayed price for `price` charged in `country`
    pub fn taxed_price(&self, price: f64, country: &str, currency: &str) -> TaxedPrice {
        if price == 0.0 {
            return TaxedPrice::Free;
        }

        let rate = self.rate_for(country);
        if rate == 0.0 {
            TaxedPrice::Untaxed {
                amount: round2(price),
                currency: currency.to_string(),
            }
        } else {
            TaxedPrice::Taxed {
                amount: round2(price * (1.0 + rate)),
                currency: currency.to_string(),
                rate,
            }
        }
    }
}

// ============================================================================
// TAXED PRICE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaxedPrice {
    Free,
    Untaxed { amount: f64, currency: String },
    Taxed { amount: f64, currency: String, rate: f64 },
}

impl TaxedPrice {
    pub fn is_free(&self) -> bool {
        matches!(self, TaxedPrice::Free)
    }

    /// Amount actually charged (0 for free admission)
    pub fn amount(&self) -> f64 {
        match self {
            TaxedPrice::Free => 0.0,
            TaxedPrice::Untaxed { amount, .. } | TaxedPrice::Taxed { amount, .. } => *amount,
        }
    }
}

impl fmt::Display for TaxedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxedPrice::Free => write!(f, "Free admission"),
            TaxedPrice::Untaxed { amount, currency } => {
                write!(f, "{:.2}{} (no tax)", amount, currency)
            }
            TaxedPrice::Taxed {
                amount, currency, ..
            } => write!(f, "{:.2}{} (tax included)", amount, currency),
        }
    }
}
