//! Report output port.

use std::path::Path;

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::PricecastError;

/// Port for writing analysis reports.
pub trait ReportPort {
    /// Write to `output`, or to stdout when `None`.
    fn write(&self, report: &AnalysisReport, output: Option<&Path>) -> Result<(), PricecastError>;
}
