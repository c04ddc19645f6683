//! Client-side view state.
//!
//! The dashboard is only reachable once a computation has succeeded, and a
//! failed upload or export never disturbs the last good result.

use tracing::{info, warn};

use crate::calculator::{FootprintCalculator, FootprintResult};
use crate::error::FootprintError;
use crate::ingest;
use crate::report::{self, ReportConfig, ReportMeta};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Upload,
    Dashboard,
}

#[derive(Debug)]
pub struct Session {
    view: View,
    company_name: String,
    result: Option<FootprintResult>,
    busy: bool,
    error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            view: View::Home,
            company_name: String::new(),
            result: None,
            busy: false,
            error: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn result(&self) -> Option<&FootprintResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn set_company_name(&mut self, name: impl Into<String>) {
        self.company_name = name.into();
    }

    /// Views the navigation may offer right now.
    pub fn available_views(&self) -> Vec<View> {
        let mut views = vec![View::Home, View::Upload];
        if self.result.is_some() {
            views.push(View::Dashboard);
        }
        views
    }

    pub fn navigate(&mut self, to: View) -> Result<(), FootprintError> {
        if to == View::Dashboard && self.result.is_none() {
            return Err(FootprintError::NoResult);
        }
        self.view = to;
        Ok(())
    }

    /// Mark an upload as in flight. Rejected while another one is.
    pub fn begin_upload(&mut self) -> Result<(), FootprintError> {
        if self.busy {
            return Err(FootprintError::Busy);
        }
        self.busy = true;
        self.error = None;
        Ok(())
    }

    /// Settle the in-flight upload. A failure is recorded as the session
    /// error and handed back; the previous result stays in place.
    pub fn finish_upload(
        &mut self,
        outcome: Result<FootprintResult, FootprintError>,
    ) -> Result<(), FootprintError> {
        self.busy = false;
        match outcome {
            Ok(result) => {
                info!(records = result.detailed.len(), "upload processed");
                self.result = Some(result);
                self.view = View::Dashboard;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "upload failed");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Parse and compute an upload in one step.
    pub fn upload_csv(
        &mut self,
        calculator: &FootprintCalculator,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<&FootprintResult, FootprintError> {
        self.begin_upload()?;
        let outcome = ingest::read_csv_bytes(bytes).and_then(|t| calculator.compute_table(&t));
        self.finish_upload(outcome)?;
        self.result.as_ref().ok_or(FootprintError::NoResult)
    }

    /// Render the report for the current result. Failures are recorded as the
    /// session error and leave the result untouched.
    pub fn export_report(&mut self, config: &ReportConfig) -> Result<String, FootprintError> {
        let Some(result) = &self.result else {
            return Err(FootprintError::NoResult);
        };
        let company = Some(self.company_name.as_str());
        match report::render_html(result, &ReportMeta::now(company), config) {
            Ok(html) => Ok(html),
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
