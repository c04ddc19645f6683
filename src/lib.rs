//! Carbon-footprint snapshot from organizational activity data.
//!
//! Upload rows of `Activity, Quantity, Unit` are matched against an emission
//! factor table and summed into totals by scope and category. The result can
//! be exported as polars frames, JSON or a standalone HTML report.

pub mod aggregation;
pub mod calculator;
pub mod error;
pub mod factors;
pub mod ingest;
pub mod report;
pub mod resolver;
pub mod sample;
pub mod schema;
pub mod session;

#[cfg(feature = "python")]
mod python;

pub use aggregation::SummaryItem;
pub use calculator::{EmissionRecord, FootprintCalculator, FootprintResult};
pub use error::FootprintError;
pub use factors::{EmissionFactor, EmissionFactorTable, Scope};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
#[pyo3(name = "_core")]
fn carbon_snapshot_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python::register(m)
}
