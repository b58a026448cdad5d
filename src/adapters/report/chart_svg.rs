//! Inline SVG charts for the dashboard report.

use crate::domain::aligner::AlignedTable;
use crate::domain::series::TimeSeries;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 260.0;
const PADDING: f64 = 52.0;

pub const EMPTY_SERIES: &str = r#"<p class="empty">No data available.</p>"#;
pub const EMPTY_CORRELATION: &str = r#"<p class="empty">No correlation data available.</p>"#;

/// Min and max of the finite values, widened when flat.
fn bounds(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().filter(|v| v.is_finite()).fold(f64::INFINITY, f64::min);
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max - min > 0.0 {
        (min, max)
    } else {
        (min - 1.0, max + 1.0)
    }
}

fn polyline(values: &[f64], color: &str) -> String {
    let (min, max) = bounds(values);
    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let scale_y = plot_height / (max - min);
    let scale_x = if values.len() > 1 {
        plot_width / (values.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, v)| {
            let x = PADDING + i as f64 * scale_x;
            let y = HEIGHT - PADDING - (v - min) * scale_y;
            format!("{:.1},{:.1}", x, y)
        })
        .collect();

    format!(
        r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
        color,
        points.join(" ")
    )
}

fn frame() -> String {
    format!(
        r##"<rect x="{p}" y="{p}" width="{w:.0}" height="{h:.0}" fill="none" stroke="#d1d5db"/>"##,
        p = PADDING,
        w = WIDTH - 2.0 * PADDING,
        h = HEIGHT - 2.0 * PADDING,
    )
}

fn axis_label(x: f64, y: f64, anchor: &str, color: &str, text: &str) -> String {
    format!(
        r#"<text x="{:.1}" y="{:.1}" text-anchor="{}" font-size="11" fill="{}">{}</text>"#,
        x, y, anchor, color, text
    )
}

fn fmt_value(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Single-axis line chart of a series in chronological order.
pub fn generate_line_svg(series: &TimeSeries, color: &str) -> String {
    let sorted = series.sorted();
    if sorted.is_empty() {
        return EMPTY_SERIES.to_string();
    }
    let values: Vec<f64> = sorted.iter().map(|o| o.value).collect();
    let (min, max) = bounds(&values);
    let first = sorted[0].date.to_string();
    let last = sorted[sorted.len() - 1].date.to_string();

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" class="chart">{frame}{line}{ymax}{ymin}{x0}{x1}</svg>"#,
        w = WIDTH,
        h = HEIGHT,
        frame = frame(),
        line = polyline(&values, color),
        ymax = axis_label(PADDING - 6.0, PADDING + 4.0, "end", "#374151", &fmt_value(max)),
        ymin = axis_label(PADDING - 6.0, HEIGHT - PADDING, "end", "#374151", &fmt_value(min)),
        x0 = axis_label(PADDING, HEIGHT - PADDING + 16.0, "start", "#374151", &first),
        x1 = axis_label(WIDTH - PADDING, HEIGHT - PADDING + 16.0, "end", "#374151", &last),
    )
}

/// Dual-axis chart of an aligned table: asset on the left axis, liquidity
/// on the right, one point per month.
pub fn generate_dual_axis_svg(table: &AlignedTable, asset_color: &str, liquidity_color: &str) -> String {
    if table.is_empty() {
        return EMPTY_CORRELATION.to_string();
    }

    let asset: Vec<f64> = table.rows.iter().map(|r| r.asset_value).collect();
    let liquidity: Vec<f64> = table.rows.iter().map(|r| r.liquidity_value).collect();
    let (a_min, a_max) = bounds(&asset);
    let (l_min, l_max) = bounds(&liquidity);
    let first = table.rows[0].period.to_string();
    let last = table.rows[table.rows.len() - 1].period.to_string();
    let right = WIDTH - PADDING + 6.0;
    let bottom = HEIGHT - PADDING;

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" class="chart dual">{frame}{a_line}{l_line}{a_hi}{a_lo}{l_hi}{l_lo}{x0}{x1}</svg>"#,
        w = WIDTH,
        h = HEIGHT,
        frame = frame(),
        a_line = polyline(&asset, asset_color),
        l_line = polyline(&liquidity, liquidity_color),
        a_hi = axis_label(PADDING - 6.0, PADDING + 4.0, "end", asset_color, &fmt_value(a_max)),
        a_lo = axis_label(PADDING - 6.0, bottom, "end", asset_color, &fmt_value(a_min)),
        l_hi = axis_label(right, PADDING + 4.0, "start", liquidity_color, &fmt_value(l_max)),
        l_lo = axis_label(right, bottom, "start", liquidity_color, &fmt_value(l_min)),
        x0 = axis_label(PADDING, bottom + 16.0, "start", "#374151", &first),
        x1 = axis_label(WIDTH - PADDING, bottom + 16.0, "end", "#374151", &last),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aligner::AlignedRow;
    use crate::domain::series::PeriodKey;
    use chrono::NaiveDate;

    fn table(rows: &[(u32, f64, f64)]) -> AlignedTable {
        AlignedTable {
            asset_label: "BTC-USD".into(),
            rows: rows
                .iter()
                .map(|&(m, a, l)| AlignedRow {
                    period: PeriodKey::new(2024, m),
                    asset_value: a,
                    liquidity_value: l,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_table_renders_no_correlation_notice() {
        let svg = generate_dual_axis_svg(&table(&[]), "#2563eb", "#16a34a");
        assert_eq!(svg, EMPTY_CORRELATION);
    }

    #[test]
    fn dual_axis_has_two_lines_and_period_labels() {
        let svg = generate_dual_axis_svg(
            &table(&[(1, 42_000.0, 20_800.0), (2, 51_000.0, 20_850.0), (3, 60_000.0, 20_900.0)]),
            "#2563eb",
            "#16a34a",
        );
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("stroke=\"#2563eb\""));
        assert!(svg.contains("stroke=\"#16a34a\""));
        assert!(svg.contains("2024-01"));
        assert!(svg.contains("2024-03"));
        assert!(svg.contains(">60000<"));
        assert!(svg.contains(">20800<"));
    }

    #[test]
    fn single_row_does_not_divide_by_zero() {
        let svg = generate_dual_axis_svg(&table(&[(5, 1.0, 1.0)]), "#000", "#111");
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
    }

    #[test]
    fn line_chart_empty_and_filled() {
        assert_eq!(generate_line_svg(&TimeSeries::empty(), "#000"), EMPTY_SERIES);

        let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        let series = TimeSeries::from_pairs(vec![(d(2), -0.4), (d(1), -0.5)]);
        let svg = generate_line_svg(&series, "#dc2626");
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("2024-01-01"));
        assert!(svg.contains("2024-02-01"));
        assert!(svg.contains(">-0.40<"));
    }
}
