use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `EpigridError` and maps other errors to
/// convert to an `EpigridError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpigridError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    ThreadPoolError(rayon::ThreadPoolBuildError),
    /// A console or file value could not be parsed.
    InvalidInput(String),
    /// A parsed value is outside the range the simulation accepts.
    InvalidParameter(String),
    InvalidDimensions {
        height: usize,
        width: usize,
    },
    ReportError(String),
}

impl From<io::Error> for EpigridError {
    fn from(error: io::Error) -> Self {
        EpigridError::IoError(error)
    }
}

impl From<serde_json::Error> for EpigridError {
    fn from(error: serde_json::Error) -> Self {
        EpigridError::JsonError(error)
    }
}

impl From<csv::Error> for EpigridError {
    fn from(error: csv::Error) -> Self {
        EpigridError::CsvError(error)
    }
}

impl From<rayon::ThreadPoolBuildError> for EpigridError {
    fn from(error: rayon::ThreadPoolBuildError) -> Self {
        EpigridError::ThreadPoolError(error)
    }
}

impl std::error::Error for EpigridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpigridError::IoError(error) => Some(error),
            EpigridError::JsonError(error) => Some(error),
            EpigridError::CsvError(error) => Some(error),
            EpigridError::ThreadPoolError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for EpigridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpigridError::IoError(error) => write!(f, "I/O error: {error}"),
            EpigridError::JsonError(error) => write!(f, "invalid config file: {error}"),
            EpigridError::CsvError(error) => write!(f, "CSV error: {error}"),
            EpigridError::ThreadPoolError(error) => {
                write!(f, "could not build worker pool: {error}")
            }
            EpigridError::InvalidInput(message) => write!(f, "invalid input: {message}"),
            EpigridError::InvalidParameter(message) => write!(f, "invalid parameter: {message}"),
            EpigridError::InvalidDimensions { height, width } => {
                write!(
                    f,
                    "invalid grid dimensions {height}x{width}: the grid must be non-empty and \
                     addressable"
                )
            }
            EpigridError::ReportError(message) => write!(f, "report error: {message}"),
        }
    }
}
