//! HTML dashboard report adapter implementing [`ReportPort`].
//!
//! Renders an Askama template with inline SVG charts.

pub mod chart_svg;

use std::fs;
use std::path::Path;

use askama::Template;

use crate::domain::dashboard::{AssetPanel, DashboardReport};
use crate::domain::error::MacroError;
use crate::domain::forecast::AssetClass;
use crate::ports::report_port::ReportPort;

const LIQUIDITY_COLOR: &str = "#16a34a";
const CONDITIONS_COLOR: &str = "#dc2626";

fn asset_color(asset: AssetClass) -> &'static str {
    match asset {
        AssetClass::Equity => "#2563eb",
        AssetClass::RiskAsset => "#f59e0b",
        AssetClass::StoreOfValue => "#ca8a04",
        AssetClass::ReserveCurrency => "#059669",
    }
}

pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => {
            let whole = format!("{:.2}", p.abs());
            let (int_part, frac) = whole.split_at(whole.len() - 3);
            let mut grouped = String::new();
            for (i, c) in int_part.chars().enumerate() {
                if i > 0 && (int_part.len() - i) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(c);
            }
            let sign = if p < 0.0 { "-" } else { "" };
            format!("{}${}{}", sign, grouped, frac)
        }
        None => "unavailable".to_string(),
    }
}

struct PanelView {
    name: &'static str,
    symbol: String,
    price: String,
    forecast: String,
    history_svg: String,
    correlation_svg: String,
    rows: usize,
}

impl PanelView {
    fn from_panel(panel: &AssetPanel) -> Self {
        let color = asset_color(panel.asset);
        Self {
            name: panel.asset.display_name(),
            symbol: panel.symbol.clone(),
            price: format_price(panel.latest_price),
            forecast: panel.forecast.to_string(),
            history_svg: chart_svg::generate_line_svg(&panel.history, color),
            correlation_svg: chart_svg::generate_dual_axis_svg(&panel.aligned, color, LIQUIDITY_COLOR),
            rows: panel.aligned.len(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    generated_on: String,
    data_source: &'static str,
    liquidity_series: String,
    conditions_series: String,
    trend: String,
    liquidity_signal: String,
    conditions_value: String,
    conditions_state: String,
    manufacturing_index: String,
    manufacturing_note: &'static str,
    liquidity_svg: String,
    conditions_svg: String,
    panels: Vec<PanelView>,
    warnings: Vec<String>,
}

pub struct HtmlReportAdapter {
    liquidity_series: String,
    conditions_series: String,
}

impl HtmlReportAdapter {
    pub fn new(liquidity_series: &str, conditions_series: &str) -> Self {
        Self {
            liquidity_series: liquidity_series.to_string(),
            conditions_series: conditions_series.to_string(),
        }
    }

    pub fn render(&self, report: &DashboardReport) -> Result<String, MacroError> {
        let contraction = report.forecasts.get(AssetClass::Equity).risk.is_some();
        let template = DashboardTemplate {
            generated_on: report.generated_on.to_string(),
            data_source: if report.snapshot.series_available {
                "live"
            } else {
                "synthetic"
            },
            liquidity_series: self.liquidity_series.clone(),
            conditions_series: self.conditions_series.clone(),
            trend: report.signal.trend.to_string(),
            liquidity_signal: report.signal.liquidity_signal.to_string(),
            conditions_value: format!("{:.2}", report.snapshot.latest_financial_conditions),
            conditions_state: report.signal.conditions_state.to_string(),
            manufacturing_index: format!("{:.1}", report.manufacturing_index),
            manufacturing_note: if contraction { "contraction" } else { "expansion" },
            liquidity_svg: chart_svg::generate_line_svg(&report.liquidity, LIQUIDITY_COLOR),
            conditions_svg: chart_svg::generate_line_svg(&report.conditions, CONDITIONS_COLOR),
            panels: report.panels.iter().map(PanelView::from_panel).collect(),
            warnings: report.warnings.clone(),
        };

        template.render().map_err(|e| MacroError::Report {
            reason: e.to_string(),
        })
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new("M2SL", "NFCI")
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, report: &DashboardReport, output_path: &str) -> Result<(), MacroError> {
        let html = self.render(report)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)?;

        Ok(())
    }
}
