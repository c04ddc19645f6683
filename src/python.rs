use chrono::{Local, NaiveDate};
use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::calculator::{FootprintCalculator, FootprintResult};
use crate::factors::{EmissionFactorTable, Scope};
use crate::ingest;
use crate::report::{self, ReportConfig, ReportMeta};
use crate::sample;
use crate::schema;

#[pyclass(name = "FootprintCalculator")]
pub struct PyFootprintCalculator {
    inner: FootprintCalculator,
}

#[pymethods]
impl PyFootprintCalculator {
    /// Use the built-in factor table, or load one from a JSON file.
    #[new]
    #[pyo3(signature = (factors_path=None))]
    fn new(factors_path: Option<&str>) -> PyResult<Self> {
        let table = match factors_path {
            Some(path) => EmissionFactorTable::from_path(path)?,
            None => EmissionFactorTable::builtin(),
        };
        Ok(Self {
            inner: FootprintCalculator::new(table),
        })
    }

    /// Compute the footprint of a CSV file on disk.
    fn compute_csv(&self, path: &str) -> PyResult<PyFootprintResult> {
        let table = ingest::read_csv_path(path)?;
        Ok(self.inner.compute_table(&table)?.into())
    }

    /// Compute the footprint of CSV text.
    fn compute_csv_text(&self, text: &str) -> PyResult<PyFootprintResult> {
        let table = ingest::read_csv_bytes(text)?;
        Ok(self.inner.compute_table(&table)?.into())
    }
}

#[pyclass(name = "FootprintResult")]
pub struct PyFootprintResult {
    inner: FootprintResult,
}

#[pymethods]
impl PyFootprintResult {
    #[getter]
    fn total_co2e(&self) -> f64 {
        self.inner.total_co2e
    }

    #[getter]
    fn metric_tons(&self) -> f64 {
        self.inner.metric_tons()
    }

    #[getter]
    fn detailed(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.detailed_frame()?))
    }

    #[getter]
    fn by_scope(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.by_scope_frame()?))
    }

    #[getter]
    fn by_category(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.by_category_frame()?))
    }

    fn to_json(&self) -> PyResult<String> {
        Ok(self.inner.to_json()?)
    }

    /// Render the HTML report.
    ///
    /// Args:
    ///     company_name: shown in the header and title (default: none)
    ///     generated_on: `datetime.date` stamped on the report (default: today)
    ///     top_sources: number of categories listed as top sources (default: 5)
    #[pyo3(signature = (company_name=None, generated_on=None, top_sources=5))]
    fn render_report(
        &self,
        company_name: Option<&str>,
        generated_on: Option<NaiveDate>,
        top_sources: usize,
    ) -> PyResult<String> {
        let meta = ReportMeta {
            generated_on: generated_on.unwrap_or_else(|| Local::now().date_naive()),
            ..ReportMeta::now(company_name)
        };
        let config = ReportConfig {
            top_sources,
            ..ReportConfig::default()
        };
        Ok(report::render_html(&self.inner, &meta, &config)?)
    }

    /// Suggested file name for the exported report.
    #[staticmethod]
    #[pyo3(signature = (company_name=None))]
    fn report_file_name(company_name: Option<&str>) -> String {
        report::report_file_name(company_name)
    }

    fn __repr__(&self) -> String {
        format!(
            "FootprintResult(total_co2e={}, records={})",
            self.inner.total_co2e,
            self.inner.detailed.len()
        )
    }
}

/// The canonical sample upload, byte-identical on every call.
#[pyfunction]
fn sample_csv() -> &'static str {
    sample::sample_csv()
}

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Input columns
    let columns = PyModule::new(m.py(), "columns")?;
    columns.add("ACTIVITY", schema::activity::ACTIVITY)?;
    columns.add("QUANTITY", schema::activity::QUANTITY)?;
    columns.add("UNIT", schema::activity::UNIT)?;
    columns.add("DATE", schema::activity::DATE)?;
    columns.add("CO2E", schema::detailed::CO2E)?;
    columns.add("CATEGORY", schema::detailed::CATEGORY)?;
    columns.add("SCOPE", schema::detailed::SCOPE)?;
    m.add_submodule(&columns)?;

    // Scope labels
    let scopes = PyModule::new(m.py(), "scopes")?;
    scopes.add("SCOPE_1", Scope::Direct.label())?;
    scopes.add("SCOPE_2", Scope::PurchasedEnergy.label())?;
    scopes.add("SCOPE_3", Scope::ValueChain.label())?;
    m.add_submodule(&scopes)?;

    Ok(())
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyFootprintCalculator>()?;
    m.add_class::<PyFootprintResult>()?;
    m.add_function(wrap_pyfunction!(sample_csv, m)?)?;
    m.add("SAMPLE_FILE_NAME", sample::SAMPLE_FILE_NAME)?;
    add_schema_exports(m)?;
    Ok(())
}

impl From<FootprintResult> for PyFootprintResult {
    fn from(inner: FootprintResult) -> Self {
        Self { inner }
    }
}
