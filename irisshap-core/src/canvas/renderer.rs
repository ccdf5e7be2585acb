//! Canvas server-side renderer.
//!
//! Converts a [`ChartSpec`] into a Plotly figure (`{"data": [...], "layout": {...}}`)
//! that the dashboard page passes straight to `Plotly.react`.

use super::components::{ChartSpec, Grid, TraceSpec};
use serde_json::{json, Map, Value};

/// Transparent paper background shared by every panel.
const PAPER_BACKGROUND: &str = "rgba(233,233,233,0)";
/// Transparent plot background shared by every panel.
const PLOT_BACKGROUND: &str = "rgba(255,233,0,0)";
/// Fraction of a grid cell left empty on each side.
const CELL_GAP: f64 = 0.02;
/// Colour of increasing deltas on gauges.
const DELTA_COLOR: &str = "RebeccaPurple";

/// Domain `(x, y)` of a 1-based grid cell in paper coordinates.
pub fn cell_domain(grid: Grid, row: usize, col: usize) -> ([f64; 2], [f64; 2]) {
    let rows = grid.rows.max(1) as f64;
    let cols = grid.cols.max(1) as f64;
    let (row, col) = (row.max(1) as f64, col.max(1) as f64);
    let x = [(col - 1.0) / cols + CELL_GAP, col / cols - CELL_GAP];
    let y = [1.0 - row / rows + CELL_GAP, 1.0 - (row - 1.0) / rows - CELL_GAP];
    (x, y)
}

fn polar_key(subplot: usize) -> String {
    if subplot <= 1 {
        "polar".to_string()
    } else {
        format!("polar{subplot}")
    }
}

fn render_trace(trace: &TraceSpec, grid: Grid) -> Value {
    match trace {
        TraceSpec::Box(b) => {
            let mut obj = json!({
                "type": "box",
                "name": b.name,
                "y": b.values,
            });
            if b.show_points {
                obj["boxpoints"] = json!("all");
            }
            obj
        }
        TraceSpec::Scatter(s) => {
            let mut obj = json!({
                "type": "scatter",
                "mode": "markers",
                "name": s.name,
                "x": s.x,
                "y": s.y,
            });
            if let Some(sizes) = &s.sizes {
                obj["marker"] = json!({ "size": sizes });
            }
            if let Some(opacity) = s.opacity {
                obj["opacity"] = json!(opacity);
            }
            if let Some(text) = &s.hover_text {
                obj["text"] = json!([text]);
            }
            obj
        }
        TraceSpec::BarPolar(b) => {
            let mut obj = json!({
                "type": "barpolar",
                "r": b.r,
                "theta": b.theta,
                "marker": {
                    "color": b.colors,
                    "line": { "color": "black", "width": 2 },
                },
                "text": b.labels,
                "hoverinfo": "text",
                "subplot": polar_key(b.subplot),
            });
            if let Some(opacity) = b.opacity {
                obj["opacity"] = json!(opacity);
            }
            obj
        }
        TraceSpec::Indicator(i) => {
            let (x, y) = cell_domain(grid, i.row, i.col);
            let mut obj = json!({
                "type": "indicator",
                "mode": i.mode.as_str(),
                "value": i.value,
                "domain": { "x": x, "y": y },
                "gauge": {
                    "bar": { "color": i.color },
                    "axis": { "range": i.range },
                },
            });
            if let Some(reference) = i.reference {
                obj["delta"] = json!({
                    "reference": reference,
                    "increasing": { "color": DELTA_COLOR },
                });
            }
            obj
        }
        TraceSpec::Splom(s) => {
            let dimensions: Vec<Value> = s
                .dimensions
                .iter()
                .map(|d| json!({ "label": d.label, "values": d.values }))
                .collect();
            let labels: Vec<&str> = s.dimensions.iter().map(|d| d.label.as_str()).collect();
            json!({
                "type": "splom",
                "dimensions": dimensions,
                "showupperhalf": s.show_upper_half,
                "text": labels,
                "marker": {
                    "color": s.colors,
                    "showscale": true,
                    "line": { "color": "grey", "width": 0.5 },
                },
            })
        }
    }
}

fn subplot_annotations(spec: &ChartSpec, grid: Grid) -> Vec<Value> {
    spec.subplot_titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let row = i / grid.cols.max(1) + 1;
            let col = i % grid.cols.max(1) + 1;
            let (x, y) = cell_domain(grid, row, col);
            json!({
                "text": title,
                "x": (x[0] + x[1]) / 2.0,
                "y": y[1],
                "xref": "paper",
                "yref": "paper",
                "xanchor": "center",
                "yanchor": "bottom",
                "showarrow": false,
                "font": { "size": 12 },
            })
        })
        .collect()
}

/// Render a chart spec to a Plotly figure value.
pub fn render_figure(spec: &ChartSpec) -> Value {
    let grid = spec.grid.unwrap_or(Grid { rows: 1, cols: 1 });
    let data: Vec<Value> = spec.traces.iter().map(|t| render_trace(t, grid)).collect();

    let mut layout = Map::new();
    if let Some(title) = &spec.title {
        layout.insert("title".into(), json!({ "text": title }));
    }
    if let Some(label) = &spec.x_axis {
        layout.insert("xaxis".into(), json!({ "title": { "text": label } }));
    }
    if let Some(label) = &spec.y_axis {
        layout.insert("yaxis".into(), json!({ "title": { "text": label } }));
    }
    layout.insert("hovermode".into(), json!("closest"));
    layout.insert("paper_bgcolor".into(), json!(PAPER_BACKGROUND));
    layout.insert("plot_bgcolor".into(), json!(PLOT_BACKGROUND));
    layout.insert("showlegend".into(), json!(spec.show_legend));
    if let Some(width) = spec.width {
        layout.insert("width".into(), json!(width));
    }
    if let Some(height) = spec.height {
        layout.insert("height".into(), json!(height));
    }

    // One polar axis per distinct subplot index, laid out left to right.
    let mut polar_subplots: Vec<usize> = spec
        .traces
        .iter()
        .filter_map(|t| match t {
            TraceSpec::BarPolar(b) => Some(b.subplot),
            _ => None,
        })
        .collect();
    polar_subplots.sort_unstable();
    polar_subplots.dedup();
    for subplot in polar_subplots {
        let index = subplot.max(1) - 1;
        let row = index / grid.cols.max(1) + 1;
        let col = index % grid.cols.max(1) + 1;
        let (x, y) = cell_domain(grid, row, col);
        let mut radial = json!({ "showticklabels": false, "ticks": "" });
        if let Some(range) = spec.radial_range {
            radial["range"] = json!(range);
        }
        layout.insert(
            polar_key(subplot),
            json!({
                "domain": { "x": x, "y": y },
                "radialaxis": radial,
                "angularaxis": { "showticklabels": true, "ticks": "" },
            }),
        );
    }

    let annotations = subplot_annotations(spec, grid);
    if !annotations.is_empty() {
        layout.insert("annotations".into(), Value::Array(annotations));
    }

    json!({ "data": data, "layout": Value::Object(layout) })
}

/// Validate a chart spec and render it to a pretty-printed Plotly figure
/// JSON string.
pub fn render_figure_json(spec: &ChartSpec) -> crate::Result<String> {
    spec.validate()?;
    Ok(serde_json::to_string_pretty(&render_figure(spec))?)
}
