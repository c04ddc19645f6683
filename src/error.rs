#[cfg(feature = "python")]
use pyo3::exceptions::{PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FootprintError {
    #[error(
        "CSV must contain 'Activity', 'Quantity', and 'Unit' columns (missing: {})",
        missing.join(", ")
    )]
    MissingColumns { missing: Vec<String> },

    #[error("No data to process. Please upload a valid CSV.")]
    NoData,

    #[error("No valid emission activities found in the CSV data.")]
    NoValidActivities,

    #[error("Error parsing CSV file: {0}")]
    Parse(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid emission factor table: {0}")]
    InvalidFactorTable(String),

    #[error("Report export failed: {0}")]
    Export(String),

    #[error("An upload is already being processed")]
    Busy,

    #[error("No footprint has been computed yet")]
    NoResult,
}

impl FootprintError {
    /// Errors caused by the uploaded data itself rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingColumns { .. } | Self::NoData | Self::NoValidActivities | Self::Parse(_)
        )
    }
}

impl From<std::fmt::Error> for FootprintError {
    fn from(err: std::fmt::Error) -> Self {
        FootprintError::Export(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<FootprintError> for PyErr {
    fn from(err: FootprintError) -> PyErr {
        if err.is_input_error() || matches!(err, FootprintError::InvalidFactorTable(_)) {
            PyValueError::new_err(err.to_string())
        } else {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}
