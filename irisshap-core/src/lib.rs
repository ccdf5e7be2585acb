//! # irisshap Core
//!
//! Presentation side of the irisshap dashboard.
//! Loads the attribution table written by the pipeline, derives the
//! normalized view, answers the dashboard queries, maps results into chart
//! specifications and serves them over HTTP.

pub mod canvas;
pub mod config;
pub mod error;
pub mod gateway;
pub mod normalize;
pub mod query;
pub mod schema;
pub mod snapshot;
pub mod table;

// Re-export commonly used types at the crate root.
pub use config::{load_config, AppConfig, ConfigOverrides, DashboardConfig, PipelineConfig};
pub use error::{ConfigError, DashboardError, LoadError, QueryError, Result};
pub use normalize::{Normalization, NormalizationMode, NormalizedRecord, NormalizedTable};
pub use query::{
    class_distribution, class_mean, pairwise_dimensions, record_comparison, ClassAggregate,
    ClassDistribution, RecordComparison, View,
};
pub use schema::{ClassLabel, Feature, FEATURE_COUNT};
pub use snapshot::{DashboardSnapshot, SharedSnapshot};
pub use table::{AttributionRecord, AttributionTable};
