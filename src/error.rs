use thiserror::Error as ThisError;

/// Failure of a single (symbol, config) segmentation.
///
/// These are terminal for the pair that raised them only. The batch driver
/// records them and moves on to the next pair.
#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum SegmentError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Empty series: no price points to segment")]
    EmptySeries,

    #[error("Non-monotonic input at index {index}: {current} does not follow {previous}")]
    NonMonotonicInput {
        index: usize,
        previous: String,
        current: String,
    },

    #[error("Mixed symbols in one series: expected {expected}, found {found}")]
    MixedSymbols { expected: String, found: String },

    #[error("Invalid price {price} at index {index}")]
    InvalidPrice { index: usize, price: f64 },
}

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Segmentation error: {0}")]
    Segment(#[from] SegmentError),

    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Io(format!("CSV error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// Alias for convenience
pub type Error = AppError;
