// ⚠️ Error types
// Format problems abort an import, lookup problems never leave the resolver.

use thiserror::Error;

/// Problems with the shape of an input file or one of its rows
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("'{0}' is not a .csv file")]
    NotCsv(String),

    #[error("CSV file is empty")]
    Empty,

    #[error("line {line}: missing required column '{column}'")]
    MissingColumn { line: usize, column: String },

    #[error("line {line}: invalid {field} '{value}'")]
    InvalidCoordinate {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("could not read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the country lookup collaborator
///
/// The resolver maps every one of these to the default country info.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid country code '{0}'")]
    InvalidCode(String),

    #[error("lookup answered with HTTP {0}")]
    Status(u16),

    #[error("lookup request failed: {0}")]
    Transport(String),

    #[error("malformed lookup payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => LookupError::Status(status.as_u16()),
            None => LookupError::Transport(err.to_string()),
        }
    }
}

/// Why no position fix came back
#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("geolocation not supported")]
    Unsupported,

    #[error("geolocation failed: {0}")]
    Failed(String),
}

/// Top-level error for catalog operations
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("nothing to import: no data rows")]
    NoRows,

    /// Rows appended before the failing one stay in the catalog.
    #[error("import stopped after {imported} row(s): {source}")]
    PartialImport {
        imported: usize,
        #[source]
        source: FormatError,
    },

    #[error(transparent)]
    Network(#[from] LookupError),
}

pub type AtlasResult<T> = std::result::Result<T, AtlasError>;
