//! Report module: self-contained HTML carbon-footprint report.
//!
//! Produces a single HTML document with inline CSS and SVG:
//! - Headline total in kg and metric tons, plus a driving-distance equivalent
//! - Top emission sources by category with their share of the total
//! - Emissions by scope, as a list and a pie chart
//! - Emissions by category as a bar chart
//! - The detailed per-activity table
//!
//! No script is emitted, so the file prints and archives as-is.
use std::f64::consts::PI;
use std::fmt::Write as FmtWrite;

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::aggregation::{self, Share, SummaryItem};
use crate::calculator::FootprintResult;
use crate::error::FootprintError;

pub const APP_NAME: &str = "CarbonSnapshot";

// ── Config ──────────────────────────────────────────────────────────────────

/// Layout options for the report.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Number of categories listed under "Top Emission Sources"
    pub top_sources: usize,
    /// Fill colors, cycled over pie slices
    pub palette: Vec<String>,
    /// Bar fill color
    pub bar_color: String,
    /// Pie chart radius in pixels
    pub pie_radius_px: u32,
    /// Bar chart drawing area
    pub bar_chart_width_px: u32,
    pub bar_chart_height_px: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_sources: 5,
            palette: ["#14b8a6", "#10b981", "#0d9488", "#059669", "#0f766e", "#047857"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            bar_color: "#14b8a6".to_string(),
            pie_radius_px: 80,
            bar_chart_width_px: 360,
            bar_chart_height_px: 180,
        }
    }
}

/// Who the report is for and when it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMeta {
    pub company_name: Option<String>,
    pub generated_on: NaiveDate,
    pub report_id: Uuid,
}

impl ReportMeta {
    /// Stamp today's local date and a fresh report id.
    pub fn now(company_name: Option<&str>) -> Self {
        Self {
            company_name: normalize_company(company_name),
            generated_on: Local::now().date_naive(),
            report_id: Uuid::new_v4(),
        }
    }
}

fn normalize_company(company_name: Option<&str>) -> Option<String> {
    company_name
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// `<company>_Carbon_Footprint_Report.html`, "Company" when unnamed.
pub fn report_file_name(company_name: Option<&str>) -> String {
    let company = normalize_company(company_name).unwrap_or_else(|| "Company".to_string());
    let safe: String = company
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect();
    format!("{safe}_Carbon_Footprint_Report.html")
}

// ── Charts ──────────────────────────────────────────────────────────────────

fn slice_color(config: &ReportConfig, index: usize) -> &str {
    &config.palette[index % config.palette.len()]
}

/// SVG shapes for the pie; a single full slice is drawn as a circle.
fn pie_slices(shares: &[Share], config: &ReportConfig) -> Vec<String> {
    let r = config.pie_radius_px as f64;
    let (cx, cy) = (r + 10.0, r + 10.0);
    let mut angle = -PI / 2.0;
    let mut slices = Vec::new();

    for (i, share) in shares.iter().enumerate() {
        let fraction = share.percent / 100.0;
        if fraction <= 0.0 {
            continue;
        }
        let color = slice_color(config, i);

        let shape = if fraction >= 0.9999 {
            format!(r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}" fill="{color}" />"#)
        } else {
            let end = angle + fraction * 2.0 * PI;
            let (x0, y0) = (cx + r * angle.cos(), cy + r * angle.sin());
            let (x1, y1) = (cx + r * end.cos(), cy + r * end.sin());
            let large_arc = u8::from(fraction > 0.5);
            angle = end;
            format!(
                r#"<path d="M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {r:.2} {r:.2} 0 {large_arc} 1 {x1:.2} {y1:.2} Z" fill="{color}" />"#
            )
        };
        slices.push(shape);
    }
    slices
}

fn pie_svg(shares: &[Share], config: &ReportConfig) -> String {
    let size = config.pie_radius_px * 2 + 20;
    let body = pie_slices(shares, config).join("\n      ");
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">
      {body}
    </svg>"#
    )
}

fn bar_svg(items: &[SummaryItem], config: &ReportConfig) -> Result<String, FootprintError> {
    let width = config.bar_chart_width_px as f64;
    let height = config.bar_chart_height_px as f64;
    let label_band = 20.0;
    let max = items.iter().map(|i| i.value).fold(0.0_f64, f64::max);

    let slot = if items.is_empty() { width } else { width / items.len() as f64 };
    let bar_w = slot * 0.6;

    let mut body = String::new();
    for (i, item) in items.iter().enumerate() {
        let h = if max > 0.0 { item.value.max(0.0) / max * height } else { 0.0 };
        let x = i as f64 * slot + (slot - bar_w) / 2.0;
        let y = height - h;
        write!(
            body,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{bar_w:.2}" height="{h:.2}" fill="{color}"><title>{name}: {value} kg CO2e</title></rect>
      <text class="bar-label" x="{lx:.2}" y="{ly:.2}">{name}</text>
      "#,
            color = config.bar_color,
            name = escape_html(&item.name),
            value = format_number(item.value),
            lx = i as f64 * slot + slot / 2.0,
            ly = height + label_band - 6.0,
        )?;
    }

    Ok(format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
      <line x1="0" y1="{height}" x2="{width}" y2="{height}" stroke="#cbd5e1" />
      {body}</svg>"##,
        w = width,
        h = height + label_band,
    ))
}

// ── HTML generation ─────────────────────────────────────────────────────────

/// Main entry point: renders the whole report document.
pub fn render_html(
    result: &FootprintResult,
    meta: &ReportMeta,
    config: &ReportConfig,
) -> Result<String, FootprintError> {
    if config.palette.is_empty() {
        return Err(FootprintError::Export("report palette is empty".into()));
    }

    let total = result.total_co2e;
    let date = meta.generated_on.format("%Y-%m-%d").to_string();
    let scope_shares = aggregation::with_shares(&result.by_scope, total);
    let top_categories = aggregation::with_shares(
        &aggregation::top_n(&result.by_category, config.top_sources),
        total,
    );

    let bars = bar_svg(&result.by_category, config)?;

    let mut company = String::new();
    if let Some(name) = &meta.company_name {
        write!(company, r#"<p class="company">Company: {}</p>"#, escape_html(name))?;
    }

    let mut top_list = String::new();
    for (i, share) in top_categories.iter().enumerate() {
        write!(
            top_list,
            "\n      <li>{}. {}: {} kg CO2e ({:.1}%)</li>",
            i + 1,
            escape_html(&share.name),
            format_number(share.value),
            share.percent
        )?;
    }

    let mut scope_list = String::new();
    for (i, share) in scope_shares.iter().enumerate() {
        let color = slice_color(config, i);
        write!(
            scope_list,
            "\n      <li><span class=\"swatch\" style=\"background:{color}\"></span>{}: {} kg CO2e ({:.1}%)</li>",
            escape_html(&share.name),
            format_number(share.value),
            share.percent
        )?;
    }

    let mut rows = String::new();
    for r in &result.detailed {
        write!(
            rows,
            "\n        <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{}</td></tr>",
            escape_html(&r.activity),
            format_number(r.quantity),
            escape_html(&r.unit),
            escape_html(&r.category),
            escape_html(r.scope.label()),
            format_number(r.co2e),
        )?;
    }

    let html = format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{app} | Carbon Footprint Report</title>
  <style>
    body {{ font-family: sans-serif; color: #0f172a; margin: 32px; }}
    h1 {{ color: #14b8a6; margin-bottom: 0; }}
    h2 {{ color: #14b8a6; font-size: 18px; margin-top: 28px; }}
    .subtitle {{ color: #64748b; margin-top: 4px; }}
    .total {{ font-size: 28px; font-weight: 700; }}
    .muted {{ color: #64748b; font-size: 13px; }}
    .swatch {{ display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 6px; }}
    .bar-label {{ font-size: 10px; fill: #475569; text-anchor: middle; }}
    .charts {{ display: flex; gap: 48px; align-items: flex-end; }}
    table {{ border-collapse: collapse; width: 100%; font-size: 13px; }}
    th {{ text-align: left; color: #64748b; border-bottom: 1px solid #cbd5e1; padding: 6px; }}
    td {{ border-bottom: 1px solid #e2e8f0; padding: 6px; }}
    td.num {{ font-weight: 600; }}
    footer {{ margin-top: 32px; color: #64748b; font-size: 11px; text-align: center; }}
  </style>
</head>
<body>
  <h1>{app}</h1>
  <p class="subtitle">Carbon Footprint Report</p>
  {company}
  <p class="muted">Report Generated: {date}</p>

  <h2>Total Estimated Emissions</h2>
  <p class="total">{total_fmt} kg CO2e</p>
  <p class="muted">({tons:.2} metric tons CO2e) &middot; equivalent to driving approximately {miles} miles</p>

  <h2>Top Emission Sources</h2>
  <ol style="list-style:none; padding-left:0;">{top_list}
  </ol>

  <h2>Emissions by Scope</h2>
  <ul style="list-style:none; padding-left:0;">{scope_list}
  </ul>

  <div class="charts">
    {pie}
    {bars}
  </div>

  <h2>Detailed Emissions</h2>
  <table>
    <thead>
      <tr><th>Activity</th><th>Quantity</th><th>Unit</th><th>Category</th><th>Scope</th><th>CO2e (kg)</th></tr>
    </thead>
    <tbody>{rows}
    </tbody>
  </table>

  <footer>Generated by {app} | {date} | report {report_id}</footer>
</body>
</html>
"##,
        app = APP_NAME,
        company = company,
        date = date,
        total_fmt = format_number(total),
        tons = result.metric_tons(),
        miles = format_number(result.driving_miles_equivalent()),
        top_list = top_list,
        scope_list = scope_list,
        pie = pie_svg(&scope_shares, config),
        bars = bars,
        rows = rows,
        report_id = meta.report_id,
    );

    Ok(html)
}

/// Render and write the report into `dir`, named by [`report_file_name`].
pub fn write_html(
    result: &FootprintResult,
    meta: &ReportMeta,
    config: &ReportConfig,
    dir: impl AsRef<std::path::Path>,
) -> Result<std::path::PathBuf, FootprintError> {
    let html = render_html(result, meta, config)?;
    let path = dir
        .as_ref()
        .join(report_file_name(meta.company_name.as_deref()));
    std::fs::write(&path, html)?;
    Ok(path)
}

// ── Formatting helpers ──────────────────────────────────────────────────────

/// Thousands separators, at most two decimals, trailing zeros dropped.
pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if value < 0.0 && fixed != "0.00" {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
