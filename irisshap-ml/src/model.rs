//! Versicolor classifier backed by a perpetual gradient booster.
//!
//! The booster is trained on the log loss, so its raw predictions are
//! log-odds of versicolor. Feature rows are handed over as a column-major
//! [`Matrix`].

use crate::error::MlError;
use irisshap_core::config::PipelineConfig;
use irisshap_core::schema::{ClassLabel, FEATURE_COUNT};
use perpetual::booster::config::ContributionsMethod;
use perpetual::objective::Objective;
use perpetual::{Matrix, PerpetualBooster};

/// Booster settings taken from the pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BoosterParams {
    /// Fitting budget; larger values grow more trees.
    pub budget: f32,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for BoosterParams {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            budget: config.budget,
        }
    }
}

/// Flatten rows into the column-major layout [`Matrix`] expects.
fn column_major(rows: &[[f64; FEATURE_COUNT]]) -> Vec<f64> {
    (0..FEATURE_COUNT)
        .flat_map(|col| rows.iter().map(move |row| row[col]))
        .collect()
}

fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

pub struct VersicolorClassifier {
    booster: PerpetualBooster,
    params: BoosterParams,
}

impl VersicolorClassifier {
    pub fn fit(
        rows: &[[f64; FEATURE_COUNT]],
        targets: &[ClassLabel],
        params: BoosterParams,
    ) -> Result<Self, MlError> {
        if rows.is_empty() {
            return Err(MlError::training("no training rows"));
        }
        if rows.len() != targets.len() {
            return Err(MlError::training(format!(
                "{} rows but {} targets",
                rows.len(),
                targets.len()
            )));
        }
        if params.budget.is_nan() || params.budget <= 0.0 {
            return Err(MlError::training(format!(
                "budget must be positive, got {}",
                params.budget
            )));
        }

        let data = column_major(rows);
        let matrix = Matrix::new(&data, rows.len(), FEATURE_COUNT);
        let labels: Vec<f64> = targets.iter().map(|t| t.value() as f64).collect();

        let mut booster = PerpetualBooster::default()
            .set_objective(Objective::LogLoss)
            .set_budget(params.budget);
        booster
            .fit(&matrix, &labels, None, None)
            .map_err(|e| MlError::training(e.to_string()))?;

        tracing::debug!(
            trees = booster.get_prediction_trees().len(),
            rows = rows.len(),
            budget = params.budget,
            "Trained versicolor booster"
        );
        Ok(Self { booster, params })
    }

    pub fn params(&self) -> &BoosterParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.booster.get_prediction_trees().len()
    }

    /// Raw additive scores (log-odds of versicolor), one per row.
    pub fn predict_margin(&self, rows: &[[f64; FEATURE_COUNT]]) -> Vec<f64> {
        let data = column_major(rows);
        self.booster
            .predict(&Matrix::new(&data, rows.len(), FEATURE_COUNT), true)
    }

    /// Probability of versicolor, one per row.
    pub fn predict_proba(&self, rows: &[[f64; FEATURE_COUNT]]) -> Vec<f64> {
        self.predict_margin(rows).into_iter().map(sigmoid).collect()
    }

    pub fn predict(&self, rows: &[[f64; FEATURE_COUNT]]) -> Vec<ClassLabel> {
        self.predict_margin(rows)
            .into_iter()
            .map(|m| {
                if m > 0.0 {
                    ClassLabel::Versicolor
                } else {
                    ClassLabel::NotVersicolor
                }
            })
            .collect()
    }

    /// Fraction of rows whose predicted class equals the target.
    pub fn accuracy(&self, rows: &[[f64; FEATURE_COUNT]], targets: &[ClassLabel]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }
        let correct = self
            .predict(rows)
            .iter()
            .zip(targets)
            .filter(|(p, t)| p == t)
            .count();
        correct as f64 / rows.len() as f64
    }

    /// Shapley contributions, `FEATURE_COUNT + 1` values per row with the
    /// bias last.
    pub fn shapley_contributions(&self, rows: &[[f64; FEATURE_COUNT]]) -> Vec<f64> {
        let data = column_major(rows);
        self.booster.predict_contributions(
            &Matrix::new(&data, rows.len(), FEATURE_COUNT),
            ContributionsMethod::Shapley,
            true,
        )
    }
}
