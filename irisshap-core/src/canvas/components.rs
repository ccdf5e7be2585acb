//! Chart specifications.
//!
//! Plain data describing what a chart shows. Nothing here knows about a
//! particular plotting library; the renderer translates specs into the
//! browser-side figure format.

use serde::{Deserialize, Serialize};

/// Box plot of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxTrace {
    pub name: String,
    pub values: Vec<f64>,
    /// Overlay every observation next to the box.
    #[serde(default)]
    pub show_points: bool,
}

/// Scatter series, optionally with per-point marker sizes (bubble chart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub sizes: Option<Vec<f64>>,
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub hover_text: Option<String>,
}

/// Bars on a polar axis. `subplot` is the 1-based polar subplot index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPolarTrace {
    pub r: Vec<f64>,
    pub theta: Vec<f64>,
    pub colors: Vec<String>,
    pub labels: Vec<String>,
    #[serde(default)]
    pub opacity: Option<f64>,
    pub subplot: usize,
}

/// What an indicator displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorMode {
    GaugeNumber,
    GaugeNumberDelta,
}

impl IndicatorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            IndicatorMode::GaugeNumber => "gauge+number",
            IndicatorMode::GaugeNumberDelta => "gauge+number+delta",
        }
    }
}

/// A single gauge placed in a grid cell (1-based row and column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorTrace {
    pub mode: IndicatorMode,
    pub value: f64,
    /// Reference for the delta readout.
    #[serde(default)]
    pub reference: Option<f64>,
    pub color: String,
    pub range: [f64; 2],
    pub row: usize,
    pub col: usize,
}

/// One axis of a scatter-plot matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplomDimension {
    pub label: String,
    pub values: Vec<f64>,
}

/// Scatter-plot matrix coloured by a numeric value per observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplomTrace {
    pub dimensions: Vec<SplomDimension>,
    pub colors: Vec<f64>,
    #[serde(default)]
    pub show_upper_half: bool,
}

/// A single series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceSpec {
    Box(BoxTrace),
    Scatter(ScatterTrace),
    BarPolar(BarPolarTrace),
    Indicator(IndicatorTrace),
    Splom(SplomTrace),
}

impl TraceSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            TraceSpec::Box(_) => "box",
            TraceSpec::Scatter(_) => "scatter",
            TraceSpec::BarPolar(_) => "barpolar",
            TraceSpec::Indicator(_) => "indicator",
            TraceSpec::Splom(_) => "splom",
        }
    }
}

/// Subplot grid, 1-based cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
}

/// Complete chart specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_axis: Option<String>,
    #[serde(default)]
    pub y_axis: Option<String>,
    #[serde(default)]
    pub grid: Option<Grid>,
    #[serde(default)]
    pub subplot_titles: Vec<String>,
    /// Fixed radial range for polar subplots.
    #[serde(default)]
    pub radial_range: Option<[f64; 2]>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default = "default_true")]
    pub show_legend: bool,
    pub traces: Vec<TraceSpec>,
}

fn default_true() -> bool {
    true
}

impl ChartSpec {
    pub fn new() -> Self {
        Self {
            show_legend: true,
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn x_axis(mut self, label: impl Into<String>) -> Self {
        self.x_axis = Some(label.into());
        self
    }

    pub fn y_axis(mut self, label: impl Into<String>) -> Self {
        self.y_axis = Some(label.into());
        self
    }

    pub fn grid(mut self, rows: usize, cols: usize) -> Self {
        self.grid = Some(Grid { rows, cols });
        self
    }

    pub fn subplot_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subplot_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn radial_range(mut self, min: f64, max: f64) -> Self {
        self.radial_range = Some([min, max]);
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn hide_legend(mut self) -> Self {
        self.show_legend = false;
        self
    }

    pub fn trace(mut self, trace: TraceSpec) -> Self {
        self.traces.push(trace);
        self
    }

    pub fn traces(mut self, traces: impl IntoIterator<Item = TraceSpec>) -> Self {
        self.traces.extend(traces);
        self
    }

    /// Check internal consistency: series lengths line up and every trace
    /// placed on a grid cell fits inside the grid.
    pub fn validate(&self) -> Result<(), ChartError> {
        for (index, trace) in self.traces.iter().enumerate() {
            match trace {
                TraceSpec::Box(_) => {}
                TraceSpec::Scatter(s) => {
                    if s.x.len() != s.y.len() {
                        return Err(ChartError::LengthMismatch {
                            index,
                            field: "y",
                            expected: s.x.len(),
                            found: s.y.len(),
                        });
                    }
                    if let Some(sizes) = &s.sizes {
                        if sizes.len() != s.x.len() {
                            return Err(ChartError::LengthMismatch {
                                index,
                                field: "sizes",
                                expected: s.x.len(),
                                found: sizes.len(),
                            });
                        }
                    }
                }
                TraceSpec::BarPolar(b) => {
                    if b.theta.len() != b.r.len() {
                        return Err(ChartError::LengthMismatch {
                            index,
                            field: "theta",
                            expected: b.r.len(),
                            found: b.theta.len(),
                        });
                    }
                    if b.subplot == 0 {
                        return Err(ChartError::OutsideGrid { index });
                    }
                }
                TraceSpec::Indicator(i) => {
                    let grid = self.grid.unwrap_or(Grid { rows: 1, cols: 1 });
                    if i.row == 0 || i.col == 0 || i.row > grid.rows || i.col > grid.cols {
                        return Err(ChartError::OutsideGrid { index });
                    }
                }
                TraceSpec::Splom(s) => {
                    for dim in &s.dimensions {
                        if dim.values.len() != s.colors.len() {
                            return Err(ChartError::LengthMismatch {
                                index,
                                field: "colors",
                                expected: dim.values.len(),
                                found: s.colors.len(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Inconsistent chart specification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    #[error("Trace {index}: '{field}' has {found} values, expected {expected}")]
    LengthMismatch {
        index: usize,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Trace {index} is placed outside the subplot grid")]
    OutsideGrid { index: usize },
}
