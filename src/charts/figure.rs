//! Plotly figures as JSON, written out as standalone HTML pages

use crate::error::{OutlookError, OutlookResult};
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::debug;

/// plotly.js build loaded by every chart page
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// One chart: a list of traces plus a layout
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    traces: Vec<Value>,
    layout: Map<String, Value>,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let mut layout = Map::new();
        layout.insert("title".into(), json!({ "text": title, "x": 0.5 }));
        layout.insert("template".into(), json!("plotly_white"));
        layout.insert("hovermode".into(), json!("x unified"));
        layout.insert("height".into(), json!(500));
        Self {
            title,
            traces: Vec::new(),
            layout,
        }
    }

    pub fn add_trace(&mut self, trace: Value) -> &mut Self {
        self.traces.push(trace);
        self
    }

    /// Set a top-level layout key (`xaxis`, `barmode`, `grid`, ...)
    pub fn set_layout(&mut self, key: &str, value: Value) -> &mut Self {
        self.layout.insert(key.to_string(), value);
        self
    }

    pub fn traces(&self) -> &[Value] {
        &self.traces
    }

    pub fn layout(&self, key: &str) -> Option<&Value> {
        self.layout.get(key)
    }

    /// Axis titles for the first subplot
    pub fn axis_titles(&mut self, x: &str, y: &str) -> &mut Self {
        self.set_layout("xaxis", json!({ "title": { "text": x } }));
        self.set_layout("yaxis", json!({ "title": { "text": y } }));
        self
    }

    /// Lay subplots out side by side; trace `i` must use axes `x{i}`/`y{i}`
    pub fn side_by_side(
        &mut self,
        titles: &[&str],
        y_range: Option<(f64, f64)>,
        y_title: &str,
    ) -> &mut Self {
        let n = titles.len().max(1);
        self.set_layout("grid", json!({ "rows": 1, "columns": n, "pattern": "independent" }));
        let mut annotations = Vec::new();
        for (i, title) in titles.iter().enumerate() {
            let suffix = if i == 0 { String::new() } else { (i + 1).to_string() };
            let label = if i == 0 { y_title } else { "" };
            let mut yaxis = json!({ "title": { "text": label } });
            if let Some((lo, hi)) = y_range {
                yaxis["range"] = json!([lo, hi]);
            }
            self.set_layout(&format!("yaxis{}", suffix), yaxis);
            self.set_layout(&format!("xaxis{}", suffix), json!({ "title": { "text": "Year" } }));
            annotations.push(json!({
                "text": title,
                "showarrow": false,
                "xref": "paper",
                "yref": "paper",
                "x": (i as f64 + 0.5) / n as f64,
                "y": 1.06,
                "xanchor": "center",
            }));
        }
        self.set_layout("annotations", Value::Array(annotations));
        self
    }

    /// `{"data": [...], "layout": {...}}`
    pub fn to_json(&self) -> OutlookResult<String> {
        let figure = json!({
            "data": self.traces,
            "layout": self.layout,
        });
        Ok(serde_json::to_string(&figure)?)
    }

    /// Standalone page that renders the figure with plotly.js
    pub fn to_html(&self) -> OutlookResult<String> {
        // Keep the JSON from closing the surrounding script tag
        let json = self.to_json()?.replace("</", "<\\/");
        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<script src="{cdn}"></script>
<style>html, body {{ margin: 0; height: 100%; }} #chart {{ width: 100%; height: 100%; }}</style>
</head>
<body>
<div id="chart"></div>
<script>
var figure = {json};
Plotly.newPlot("chart", figure.data, figure.layout, {{ responsive: true, displaylogo: false }});
</script>
</body>
</html>
"#,
            title = escape_html(&self.title),
            cdn = PLOTLY_CDN,
            json = json,
        ))
    }

    /// Write the HTML page, creating parent directories
    pub fn write(&self, path: &Path) -> OutlookResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_html()?).map_err(|e| {
            OutlookError::Chart(format!("Failed to write {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "wrote chart");
        Ok(())
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Axis suffix of the i-th subplot ("" for the first, then "2", "3")
pub fn subplot_axes(i: usize) -> (String, String) {
    if i == 0 {
        ("x".into(), "y".into())
    } else {
        (format!("x{}", i + 1), format!("y{}", i + 1))
    }
}

//==============================================================================
// Trace builders
//==============================================================================

/// Line with markers over years
pub fn line_trace(name: &str, points: &[(u16, f64)], color: Option<&str>) -> Value {
    let x: Vec<u16> = points.iter().map(|(year, _)| *year).collect();
    let y: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    let mut trace = json!({
        "type": "scatter",
        "mode": "lines+markers",
        "name": name,
        "x": x,
        "y": y,
    });
    if let Some(color) = color {
        trace["line"] = json!({ "color": color, "width": 2 });
        trace["marker"] = json!({ "color": color });
    }
    trace
}

pub fn bar_trace(name: &str, x: &[String], y: &[f64], color: Option<&str>) -> Value {
    let mut trace = json!({
        "type": "bar",
        "name": name,
        "x": x,
        "y": y,
    });
    if let Some(color) = color {
        trace["marker"] = json!({ "color": color });
    }
    trace
}

/// Horizontal bar with value labels, used for rankings
pub fn hbar_trace(name: &str, labels: &[String], values: &[f64], color: &str) -> Value {
    let text: Vec<String> = values.iter().map(|v| format!("{:.1}%", v)).collect();
    json!({
        "type": "bar",
        "orientation": "h",
        "name": name,
        "x": values,
        "y": labels,
        "text": text,
        "textposition": "auto",
        "marker": { "color": color },
    })
}

pub fn pie_trace(labels: &[String], values: &[f64]) -> Value {
    json!({
        "type": "pie",
        "labels": labels,
        "values": values,
        "textinfo": "label+percent",
        "hole": 0.3,
    })
}

pub fn heatmap_trace(x: &[String], y: &[String], z: &[Vec<Option<f64>>]) -> Value {
    json!({
        "type": "heatmap",
        "x": x,
        "y": y,
        "z": z,
        "colorscale": "Viridis",
        "texttemplate": "%{z:.1f}",
        "hoverongaps": false,
    })
}

/// Plotly table; `rows` are rendered cells
pub fn table_trace(headers: &[String], rows: &[Vec<String>]) -> Value {
    let columns: Vec<Vec<&str>> = (0..headers.len())
        .map(|c| {
            rows.iter()
                .map(|r| r.get(c).map(String::as_str).unwrap_or(""))
                .collect()
        })
        .collect();
    json!({
        "type": "table",
        "header": {
            "values": headers,
            "fill": { "color": "#1f77b4" },
            "font": { "color": "white", "size": 12 },
            "align": "left",
        },
        "cells": {
            "values": columns,
            "align": "left",
        },
    })
}

/// Format an optional number for a table cell
pub fn fmt_value(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => "n/a".to_string(),
    }
}
