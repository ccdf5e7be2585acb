//! # Canvas
//!
//! Declarative chart specifications for the dashboard panels. Query results
//! are mapped into [`ChartSpec`] values by [`charts`]; the [`renderer`]
//! turns a spec into a Plotly figure the browser can draw as-is.

pub mod charts;
pub mod components;
pub mod renderer;

pub use charts::{
    box_plot, bubble_chart, class_display, gauge_comparison, pairwise_matrix, polar_comparison,
};
pub use components::{
    BarPolarTrace, BoxTrace, ChartError, ChartSpec, Grid, IndicatorMode, IndicatorTrace,
    ScatterTrace, SplomDimension, SplomTrace, TraceSpec,
};
pub use renderer::{render_figure, render_figure_json};
