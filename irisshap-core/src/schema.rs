//! Fixed column schema of the attribution table.
//!
//! The four Iris features always appear in the same order, both in the
//! training data and in the intermediate TSV. Class labels are a closed
//! binary set with literal display names.

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of features in every record.
pub const FEATURE_COUNT: usize = 4;

/// One of the four Iris measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    SepalLength,
    SepalWidth,
    PetalLength,
    PetalWidth,
}

impl Feature {
    /// All features in column order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::SepalLength,
        Feature::SepalWidth,
        Feature::PetalLength,
        Feature::PetalWidth,
    ];

    /// Position of this feature within a record.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header of the raw measurement column.
    pub fn raw_column(self) -> &'static str {
        match self {
            Feature::SepalLength => "sepal length (cm)",
            Feature::SepalWidth => "sepal width (cm)",
            Feature::PetalLength => "petal length (cm)",
            Feature::PetalWidth => "petal width (cm)",
        }
    }

    /// Header of the attribution column.
    pub fn attribution_column(self) -> &'static str {
        match self {
            Feature::SepalLength => "sepal length (cm)_shap",
            Feature::SepalWidth => "sepal width (cm)_shap",
            Feature::PetalLength => "petal length (cm)_shap",
            Feature::PetalWidth => "petal width (cm)_shap",
        }
    }

    /// Short display name used by every chart.
    pub fn short_name(self) -> &'static str {
        match self {
            Feature::SepalLength => "sepal length",
            Feature::SepalWidth => "sepal width",
            Feature::PetalLength => "petal length",
            Feature::PetalWidth => "petal width",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Header of the margin column.
pub const MARGIN_COLUMN: &str = "versicolor_margin";
/// Header of the shift column (margin minus expected value).
pub const SHIFT_COLUMN: &str = "shift";
/// Header of the predicted probability column.
pub const PROBABILITY_COLUMN: &str = "versicolor_prob";
/// Header of the true class column.
pub const TARGET_COLUMN: &str = "target";

/// Full TSV header in file order: features interleaved with their
/// attributions, then margin, shift, probability and target.
pub fn table_header() -> Vec<&'static str> {
    let mut header = Vec::with_capacity(2 * FEATURE_COUNT + 4);
    for feature in Feature::ALL {
        header.push(feature.raw_column());
        header.push(feature.attribution_column());
    }
    header.extend([MARGIN_COLUMN, SHIFT_COLUMN, PROBABILITY_COLUMN, TARGET_COLUMN]);
    header
}

/// Binary class label: is the flower a versicolor?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ClassLabel {
    NotVersicolor = 0,
    Versicolor = 1,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 2] = [ClassLabel::NotVersicolor, ClassLabel::Versicolor];

    /// Human-readable name shown in the dashboard.
    pub fn name(self) -> &'static str {
        match self {
            ClassLabel::NotVersicolor => "Class Not Versicolor",
            ClassLabel::Versicolor => "Class Versicolor",
        }
    }

    pub fn value(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for ClassLabel {
    type Error = QueryError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ClassLabel::NotVersicolor),
            1 => Ok(ClassLabel::Versicolor),
            other => Err(QueryError::UnknownClass { value: other }),
        }
    }
}

impl From<ClassLabel> for i64 {
    fn from(label: ClassLabel) -> Self {
        label.value()
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A selectable class option as shown in the class dropdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassOption {
    pub label: String,
    pub value: i64,
}

/// Dropdown options for both classes, in label order.
pub fn class_options() -> Vec<ClassOption> {
    ClassLabel::ALL
        .iter()
        .map(|c| ClassOption {
            label: c.name().to_string(),
            value: c.value(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_order() {
        let header = table_header();
        assert_eq!(header.len(), 12);
        assert_eq!(header[0], "sepal length (cm)");
        assert_eq!(header[1], "sepal length (cm)_shap");
        assert_eq!(header[6], "petal width (cm)");
        assert_eq!(header[7], "petal width (cm)_shap");
        assert_eq!(&header[8..], &["versicolor_margin", "shift", "versicolor_prob", "target"]);
    }

    #[test]
    fn test_feature_index_matches_order() {
        for (i, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
    }

    #[test]
    fn test_class_names() {
        assert_eq!(ClassLabel::NotVersicolor.name(), "Class Not Versicolor");
        assert_eq!(ClassLabel::Versicolor.name(), "Class Versicolor");
    }

    #[test]
    fn test_class_try_from() {
        assert_eq!(ClassLabel::try_from(0).unwrap(), ClassLabel::NotVersicolor);
        assert_eq!(ClassLabel::try_from(1).unwrap(), ClassLabel::Versicolor);
        assert_eq!(
            ClassLabel::try_from(2),
            Err(QueryError::UnknownClass { value: 2 })
        );
        assert!(ClassLabel::try_from(-1).is_err());
    }

    #[test]
    fn test_class_serializes_as_integer() {
        let json = serde_json::to_string(&ClassLabel::Versicolor).unwrap();
        assert_eq!(json, "1");
        let restored: ClassLabel = serde_json::from_str("0").unwrap();
        assert_eq!(restored, ClassLabel::NotVersicolor);
        assert!(serde_json::from_str::<ClassLabel>("5").is_err());
    }

    #[test]
    fn test_class_options() {
        let options = class_options();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "Class Not Versicolor");
        assert_eq!(options[0].value, 0);
        assert_eq!(options[1].value, 1);
    }
}
