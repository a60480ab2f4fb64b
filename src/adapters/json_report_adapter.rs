//! JSON report adapter implementing ReportPort.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::PricecastError;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportAdapter {
    pub compact: bool,
}

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, report: &AnalysisReport) -> Result<String, PricecastError> {
        let rendered = if self.compact {
            serde_json::to_string(report)
        } else {
            serde_json::to_string_pretty(report)
        };
        rendered.map_err(|e| PricecastError::Serialize {
            reason: e.to_string(),
        })
    }

    fn write_to<W: Write>(
        &self,
        report: &AnalysisReport,
        mut out: W,
    ) -> Result<(), PricecastError> {
        let text = self.render(report)?;
        out.write_all(text.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, report: &AnalysisReport, output: Option<&Path>) -> Result<(), PricecastError> {
        match output {
            Some(path) => self.write_to(report, BufWriter::new(File::create(path)?)),
            None => self.write_to(report, io::stdout().lock()),
        }
    }
}
