//! Bundled dashboard page.

/// Single-page dashboard: class dropdown, record input and the chart panels.
/// Charts are fetched from the JSON API and drawn with Plotly.
pub const INDEX_HTML: &str = include_str!("../../assets/index.html");
