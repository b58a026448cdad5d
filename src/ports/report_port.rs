//! Dashboard report port.

use crate::domain::dashboard::DashboardReport;
use crate::domain::error::MacroError;

/// Port for writing a rendered dashboard.
pub trait ReportPort {
    fn write(&self, report: &DashboardReport, output_path: &str) -> Result<(), MacroError>;
}
