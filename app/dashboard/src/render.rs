//! FILENAME: app/dashboard/src/render.rs
//! PURPOSE: Plain-text and JSON output of widget views.

use serde::Serialize;

use crate::dashboard::DataCount;
use crate::error::DashboardError;
use crate::widgets::{ViewBody, WidgetView};

#[derive(Debug, Serialize)]
struct Report<'a> {
    data_count: DataCount,
    widgets: &'a [WidgetView],
}

pub fn render_json(count: DataCount, views: &[WidgetView]) -> Result<String, DashboardError> {
    Ok(serde_json::to_string_pretty(&Report {
        data_count: count,
        widgets: views,
    })?)
}

pub fn render_text(count: DataCount, views: &[WidgetView]) -> String {
    let mut out = format!("{} selected out of {} records\n", count.selected, count.total);
    for view in views {
        out.push('\n');
        out.push_str(&render_view(view));
    }
    out
}

fn render_view(view: &WidgetView) -> String {
    let mut out = format!("== {} [{}] ==\n", view.title, view.widget.name());
    if !view.selected.is_empty() {
        out.push_str(&format!("selected: {}\n", view.selected.join(", ")));
    }

    match &view.body {
        ViewBody::Options { options } => {
            let width = label_width(options.iter().map(|o| o.label.as_str()));
            for option in options {
                out.push_str(&format!("  {:<width$}  {:>7}\n", option.label, option.count, width = width));
            }
        }
        ViewBody::Bars { axis, bars } => {
            out.push_str(&format!("  ({})\n", axis));
            let width = label_width(bars.iter().map(|b| b.label.as_str()));
            for bar in bars {
                out.push_str(&format!("  {:<width$}  {:>7}\n", bar.label, bar.value, width = width));
            }
        }
        ViewBody::Pie { slices } => {
            let width = label_width(slices.iter().map(|s| s.label.as_str()));
            for slice in slices {
                out.push_str(&format!(
                    "  {:<width$}  {:>7}  {:>5.1}%\n",
                    slice.label,
                    slice.count,
                    slice.share,
                    width = width
                ));
            }
        }
        ViewBody::Stacked { series, rows } => {
            let width = label_width(rows.iter().map(|r| r.label.as_str()));
            for row in rows {
                let parts: Vec<String> = series
                    .iter()
                    .zip(&row.percents)
                    .filter(|(_, percent)| **percent > 0.0)
                    .map(|(name, percent)| format!("{} {:.1}%", name, percent))
                    .collect();
                let shown = if parts.is_empty() { "-".to_string() } else { parts.join(", ") };
                out.push_str(&format!("  {:<width$}  {}\n", row.label, shown, width = width));
            }
        }
        ViewBody::Scatter { x_domain, points } => {
            if let Some((lo, hi)) = x_domain {
                out.push_str(&format!("  price axis: ${} to ${}\n", lo, hi));
            }
            for point in points {
                out.push_str(&format!("  {}  x{}\n", point.title, point.count));
            }
        }
    }
    out
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}
