//! # irisshap ML
//!
//! Offline half of irisshap: the bundled Iris dataset, a perpetual
//! gradient-booster classifier, its Shapley attributions and the pipeline
//! that writes the attribution table read by the dashboard.

pub mod dataset;
pub mod error;
pub mod explainer;
pub mod model;
pub mod pipeline;

pub use dataset::{load_iris, train_test_split, Dataset, Split};
pub use error::MlError;
pub use explainer::{Explanation, ShapleyExplainer};
pub use model::{BoosterParams, VersicolorClassifier};
pub use pipeline::{explain, run, PipelineOutput, ADDITIVITY_TOLERANCE};
