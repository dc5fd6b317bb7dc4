//! Error type shared by the library modules.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AusrainError {
    /// Year grouping mode was neither "calendar" nor "financial"
    #[error("invalid year type `{0}` (expected `calendar` or `financial`)")]
    InvalidYearType(String),

    /// A date sequence was required but none were supplied
    #[error("no dates supplied")]
    EmptyInput,

    /// End clipping was requested but the series has no observed rows
    #[error("no observed rainfall rows (every row is interpolated)")]
    NoObservedData,

    /// A baseline boundary did not match any row in the series
    #[error("period `{0}` not found in series")]
    PeriodNotFound(String),

    /// Payload matched neither the SILO nor the BoM daily row shape
    #[error("rows match neither the SILO alldata nor the BoM daily CSV schema")]
    UnrecognizedSourceSchema,

    /// Date field failed to parse
    #[error("failed to parse date: {0}")]
    DateParse(String),

    /// A source row was structurally broken
    #[error("malformed row: {0}")]
    MalformedRow(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with something unusable
    #[error("unexpected response from upstream: {0}")]
    Upstream(String),

    /// Failed to parse CSV data
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Station cache database failure
    #[error("station cache error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to extract the zipped data file
    #[error("failed to extract archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Chart rendering failure
    #[error("failed to render chart: {0}")]
    Chart(String),
}

pub type Result<T> = std::result::Result<T, AusrainError>;
