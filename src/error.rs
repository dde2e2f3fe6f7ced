use chrono::NaiveDate;
use thiserror::Error;

/// Application-level error carrying the process exit code.
///
/// Exit codes:
/// - `2`: bad input or configuration
/// - `3`: no usable data after normalization
/// - `4`: store or computation failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let code = match err {
            StoreError::NotFound(_) | StoreError::Schema { .. } => 3,
            StoreError::Io(_) | StoreError::Csv(_) => 4,
        };
        AppError::new(code, format!("Table store error: {err}"))
    }
}

impl From<MetricError> for AppError {
    fn from(err: MetricError) -> Self {
        AppError::new(4, err.to_string())
    }
}

/// A metric that cannot be computed for one symbol.
///
/// These are "not computable" outcomes, distinct from a numeric zero. The
/// pipeline records them per symbol and keeps going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("{symbol}: insufficient data (need {needed} rows, got {got})")]
    InsufficientData {
        symbol: String,
        needed: usize,
        got: usize,
    },
    #[error("{symbol}: zero base price on {date}, return is undefined")]
    ZeroBasePrice { symbol: String, date: NaiveDate },
}

/// Failures of a `TableStore` implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("table `{0}` not found")]
    NotFound(String),
    #[error("table `{table}`: {message}")]
    Schema { table: String, message: String },
}

impl StoreError {
    pub fn schema(table: &str, message: impl Into<String>) -> Self {
        StoreError::Schema {
            table: table.to_string(),
            message: message.into(),
        }
    }
}
