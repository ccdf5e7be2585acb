//! Per-record Shapley attributions from the trained booster.
//!
//! The booster reports one contribution per feature plus a bias term. The
//! bias is the expected margin over the training data, so the feature
//! contributions of a record sum to `margin - expected_value`.

use crate::error::MlError;
use crate::model::VersicolorClassifier;
use irisshap_core::schema::FEATURE_COUNT;

/// Attributions of a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub values: [f64; FEATURE_COUNT],
    pub margin: f64,
    pub expected_value: f64,
}

impl Explanation {
    /// `margin - expected_value`, what the attributions divide up.
    pub fn shift(&self) -> f64 {
        self.margin - self.expected_value
    }

    /// Absolute difference between the attribution sum and the shift.
    pub fn residual(&self) -> f64 {
        (self.values.iter().sum::<f64>() - self.shift()).abs()
    }
}

/// Split a flat contribution buffer into explanations.
fn explanations_from(contribs: &[f64], margins: &[f64]) -> Result<Vec<Explanation>, MlError> {
    let stride = FEATURE_COUNT + 1;
    if contribs.len() != margins.len() * stride {
        return Err(MlError::explainer(format!(
            "expected {} contributions for {} records, got {}",
            margins.len() * stride,
            margins.len(),
            contribs.len()
        )));
    }
    Ok(contribs
        .chunks(stride)
        .zip(margins)
        .map(|(chunk, &margin)| {
            let mut values = [0.0; FEATURE_COUNT];
            values.copy_from_slice(&chunk[..FEATURE_COUNT]);
            Explanation {
                values,
                margin,
                expected_value: chunk[FEATURE_COUNT],
            }
        })
        .collect())
}

pub struct ShapleyExplainer<'a> {
    model: &'a VersicolorClassifier,
}

impl<'a> ShapleyExplainer<'a> {
    pub fn new(model: &'a VersicolorClassifier) -> Self {
        Self { model }
    }

    pub fn explain_all(&self, rows: &[[f64; FEATURE_COUNT]]) -> Result<Vec<Explanation>, MlError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let margins = self.model.predict_margin(rows);
        let contribs = self.model.shapley_contributions(rows);
        explanations_from(&contribs, &margins)
    }
}
