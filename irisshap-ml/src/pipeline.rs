//! The offline attribution pipeline.
//!
//! Split the bundled Iris data, train the booster on the training part,
//! attribute every test record with Shapley contributions and emit one
//! [`AttributionRecord`] per test record.

use crate::dataset::{load_iris, train_test_split};
use crate::error::MlError;
use crate::explainer::ShapleyExplainer;
use crate::model::{BoosterParams, VersicolorClassifier};
use irisshap_core::config::PipelineConfig;
use irisshap_core::table::{AttributionRecord, AttributionTable};
use std::path::Path;

/// Largest tolerated gap between the attribution sum and the shift.
pub const ADDITIVITY_TOLERANCE: f64 = 1e-6;

/// Table produced by a run, with the numbers worth reporting.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: AttributionTable,
    pub train_size: usize,
    pub expected_value: f64,
    /// Test-set accuracy of the classifier.
    pub accuracy: f64,
    /// Worst additivity residual over all records.
    pub max_residual: f64,
}

/// Train, explain and assemble the attribution table in memory.
pub fn explain(config: &PipelineConfig) -> Result<PipelineOutput, MlError> {
    let data = load_iris()?;
    let split = train_test_split(&data, config.test_fraction, config.seed)?;
    tracing::info!(
        seed = config.seed,
        train = split.train.len(),
        test = split.test.len(),
        "Split Iris dataset"
    );

    let model = VersicolorClassifier::fit(
        &split.train.rows,
        &split.train.targets,
        BoosterParams::from(config),
    )?;
    let accuracy = model.accuracy(&split.test.rows, &split.test.targets);

    let explanations = ShapleyExplainer::new(&model).explain_all(&split.test.rows)?;
    let probabilities = model.predict_proba(&split.test.rows);
    let expected_value = if explanations.is_empty() {
        0.0
    } else {
        explanations.iter().map(|e| e.expected_value).sum::<f64>() / explanations.len() as f64
    };

    let mut max_residual = 0.0f64;
    let mut records = Vec::with_capacity(split.test.len());
    for (((row, target), exp), probability) in split
        .test
        .rows
        .iter()
        .zip(&split.test.targets)
        .zip(&explanations)
        .zip(probabilities)
    {
        max_residual = max_residual.max(exp.residual());
        records.push(AttributionRecord {
            features: *row,
            attributions: exp.values,
            margin: exp.margin,
            shift: exp.shift(),
            probability,
            target: *target,
        });
    }

    tracing::info!(
        accuracy,
        trees = model.n_trees(),
        expected_value,
        max_residual,
        "Explained test records"
    );
    if max_residual > ADDITIVITY_TOLERANCE {
        return Err(MlError::Additivity {
            residual: max_residual,
            tolerance: ADDITIVITY_TOLERANCE,
        });
    }

    Ok(PipelineOutput {
        table: AttributionTable::new(records),
        train_size: split.train.len(),
        expected_value,
        accuracy,
        max_residual,
    })
}

/// Run the pipeline and write the table to `output` as TSV.
pub fn run(config: &PipelineConfig, output: &Path) -> Result<PipelineOutput, MlError> {
    let result = explain(config)?;
    result.table.write_path(output)?;
    tracing::info!(
        path = %output.display(),
        records = result.table.len(),
        "Wrote attribution table"
    );
    Ok(result)
}
