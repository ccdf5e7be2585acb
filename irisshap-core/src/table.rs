//! The attribution table and its tab-separated file format.
//!
//! One [`AttributionRecord`] per test-set row. The offline pipeline writes
//! the table at full precision; the dashboard reads it back and rounds every
//! numeric value to two decimals before deriving any view.

use crate::error::LoadError;
use crate::schema::{ClassLabel, Feature, FEATURE_COUNT, table_header};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Decimal places kept by the presentation layer.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Round half to even at the given number of decimals.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round_ties_even() / scale
}

/// One explained record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionRecord {
    /// Raw measurements in [`Feature::ALL`] order.
    pub features: [f64; FEATURE_COUNT],
    /// Shapley values in [`Feature::ALL`] order.
    pub attributions: [f64; FEATURE_COUNT],
    /// Raw additive model score.
    pub margin: f64,
    /// `margin - expected_value`; the attributions sum to this.
    pub shift: f64,
    /// Predicted probability of the versicolor class.
    pub probability: f64,
    pub target: ClassLabel,
}

impl AttributionRecord {
    pub fn feature(&self, feature: Feature) -> f64 {
        self.features[feature.index()]
    }

    pub fn attribution(&self, feature: Feature) -> f64 {
        self.attributions[feature.index()]
    }

    pub fn attribution_sum(&self) -> f64 {
        self.attributions.iter().sum()
    }

    /// Copy of this record with every numeric field rounded.
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            features: self.features.map(|v| round_to(v, decimals)),
            attributions: self.attributions.map(|v| round_to(v, decimals)),
            margin: round_to(self.margin, decimals),
            shift: round_to(self.shift, decimals),
            probability: round_to(self.probability, decimals),
            target: self.target,
        }
    }

    fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(2 * FEATURE_COUNT + 4);
        for feature in Feature::ALL {
            row.push(self.feature(feature).to_string());
            row.push(self.attribution(feature).to_string());
        }
        row.push(self.margin.to_string());
        row.push(self.shift.to_string());
        row.push(self.probability.to_string());
        row.push(self.target.value().to_string());
        row
    }
}

/// Ordered, immutable collection of attribution records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributionTable {
    records: Vec<AttributionRecord>,
}

impl AttributionTable {
    pub fn new(records: Vec<AttributionRecord>) -> Self {
        Self { records }
    }

    /// Read a TSV file written by the attribution pipeline.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a TSV stream. The header must match [`table_header`] exactly.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let expected = table_header();
        let headers = rdr.headers()?.clone();
        for (index, name) in expected.iter().enumerate() {
            let found = headers.get(index).unwrap_or("");
            if found != *name {
                return Err(LoadError::HeaderMismatch {
                    index,
                    expected: (*name).to_string(),
                    found: found.to_string(),
                });
            }
        }
        if headers.len() != expected.len() {
            return Err(LoadError::FieldCount {
                line: 1,
                expected: expected.len(),
                found: headers.len(),
            });
        }

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            if row.len() != expected.len() {
                return Err(LoadError::FieldCount {
                    line,
                    expected: expected.len(),
                    found: row.len(),
                });
            }

            // NaN and infinities parse as f64 but are rejected.
            let number = |index: usize| -> Result<f64, LoadError> {
                let raw = row.get(index).unwrap_or("").trim();
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| LoadError::InvalidNumber {
                        line,
                        column: expected[index].to_string(),
                        value: raw.to_string(),
                    })
            };

            let mut features = [0.0; FEATURE_COUNT];
            let mut attributions = [0.0; FEATURE_COUNT];
            for i in 0..FEATURE_COUNT {
                features[i] = number(2 * i)?;
                attributions[i] = number(2 * i + 1)?;
            }
            let base = 2 * FEATURE_COUNT;
            let target_raw = row.get(base + 3).unwrap_or("").trim();

            records.push(AttributionRecord {
                features,
                attributions,
                margin: number(base)?,
                shift: number(base + 1)?,
                probability: number(base + 2)?,
                target: parse_target(target_raw, line)?,
            });
        }

        if records.is_empty() {
            return Err(LoadError::Empty);
        }
        tracing::debug!(records = records.len(), "Parsed attribution table");
        Ok(Self { records })
    }

    /// Write the table as TSV at full precision.
    pub fn write_path(&self, path: &Path) -> Result<(), LoadError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        self.write_to(file)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), LoadError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        wtr.write_record(table_header())?;
        for record in &self.records {
            wtr.write_record(record.to_row())?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Copy of the table with every numeric value rounded.
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            records: self.records.iter().map(|r| r.rounded(decimals)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AttributionRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&AttributionRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributionRecord> {
        self.records.iter()
    }

    /// Every attribution value of one feature, in row order.
    pub fn attribution_column(&self, feature: Feature) -> Vec<f64> {
        self.records.iter().map(|r| r.attribution(feature)).collect()
    }

    /// Per-feature minimum attribution value. `None` for an empty table.
    pub fn attribution_minima(&self) -> Option<[f64; FEATURE_COUNT]> {
        let first = self.records.first()?;
        let mut minima = first.attributions;
        for record in &self.records[1..] {
            for (min, value) in minima.iter_mut().zip(record.attributions) {
                *min = min.min(value);
            }
        }
        Some(minima)
    }
}

fn parse_target(raw: &str, line: u64) -> Result<ClassLabel, LoadError> {
    let invalid = || LoadError::InvalidClass {
        line,
        value: raw.to_string(),
    };
    let value = match raw.parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            let float: f64 = raw.parse().map_err(|_| invalid())?;
            if float.fract() != 0.0 {
                return Err(invalid());
            }
            float as i64
        }
    };
    ClassLabel::try_from(value).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "sepal length (cm)\tsepal length (cm)_shap\tsepal width (cm)\tsepal width (cm)_shap\tpetal length (cm)\tpetal length (cm)_shap\tpetal width (cm)\tpetal width (cm)_shap\tversicolor_margin\tshift\tversicolor_prob\ttarget";

    fn sample_tsv() -> String {
        format!(
            "{HEADER}\n\
             5.1\t-0.123\t3.5\t0.456\t1.4\t-2.346\t0.2\t-1.111\t-4.5\t-3.123\t0.011\t0\n\
             6.4\t0.2\t3.2\t0.1\t4.5\t1.7\t1.5\t1.3\t4.1\t3.3\t0.98\t1\n"
        )
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.234, 2), 1.23);
        assert_eq!(round_to(-2.345678, 2), -2.35);
        assert_eq!(round_to(0.0, 2), 0.0);
        assert_eq!(round_to(7.0, 2), 7.0);
    }

    #[test]
    fn test_parse_table() {
        let table = AttributionTable::from_reader(sample_tsv().as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        let first = table.get(0).unwrap();
        assert_eq!(first.features, [5.1, 3.5, 1.4, 0.2]);
        assert_eq!(first.attributions, [-0.123, 0.456, -2.346, -1.111]);
        assert_eq!(first.margin, -4.5);
        assert_eq!(first.shift, -3.123);
        assert_eq!(first.target, ClassLabel::NotVersicolor);
        assert_eq!(table.get(1).unwrap().target, ClassLabel::Versicolor);
    }

    #[test]
    fn test_rounding_on_load() {
        let table = AttributionTable::from_reader(sample_tsv().as_bytes())
            .unwrap()
            .rounded(DISPLAY_DECIMALS);
        let first = table.get(0).unwrap();
        assert_eq!(first.attributions, [-0.12, 0.46, -2.35, -1.11]);
        assert_eq!(first.shift, -3.12);
        assert_eq!(first.probability, 0.01);
    }

    #[test]
    fn test_write_then_read_preserves_precision() {
        let table = AttributionTable::new(vec![AttributionRecord {
            features: [5.8, 2.7, 4.1, 1.0],
            attributions: [0.012345678, -0.5, 1.25, 2.000001],
            margin: 1.5,
            shift: 2.757346678,
            probability: 0.8175744761936437,
            target: ClassLabel::Versicolor,
        }]);
        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with(HEADER));

        let restored = AttributionTable::from_reader(buf.as_slice()).unwrap();
        assert_eq!(restored, table);
    }

    #[test]
    fn test_header_mismatch() {
        let bad = sample_tsv().replace("sepal width (cm)_shap", "sw_shap");
        let err = AttributionTable::from_reader(bad.as_bytes()).unwrap_err();
        match err {
            LoadError::HeaderMismatch { index, found, .. } => {
                assert_eq!(index, 3);
                assert_eq!(found, "sw_shap");
            }
            other => panic!("Expected HeaderMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_number() {
        let bad = format!("{HEADER}\n5.1\tabc\t3.5\t0.4\t1.4\t-2.3\t0.2\t-1.1\t-4.5\t-3.1\t0.01\t0\n");
        let err = AttributionTable::from_reader(bad.as_bytes()).unwrap_err();
        match err {
            LoadError::InvalidNumber { column, value, line } => {
                assert_eq!(column, "sepal length (cm)_shap");
                assert_eq!(value, "abc");
                assert_eq!(line, 2);
            }
            other => panic!("Expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_is_invalid_number() {
        let bad = format!("{HEADER}\n5.1\tNaN\t3.5\t0.4\t1.4\t-2.3\t0.2\t-1.1\t-4.5\t-3.1\t0.01\t0\n");
        let err = AttributionTable::from_reader(bad.as_bytes()).unwrap_err();
        match err {
            LoadError::InvalidNumber { column, value, line } => {
                assert_eq!(column, "sepal length (cm)_shap");
                assert_eq!(value, "NaN");
                assert_eq!(line, 2);
            }
            other => panic!("Expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_infinity_is_invalid_number() {
        for token in ["inf", "-inf", "infinity"] {
            let bad = format!(
                "{HEADER}\n5.1\t0.1\t3.5\t0.4\t1.4\t-2.3\t0.2\t{token}\t-4.5\t-3.1\t0.01\t0\n"
            );
            let err = AttributionTable::from_reader(bad.as_bytes()).unwrap_err();
            match err {
                LoadError::InvalidNumber { column, value, .. } => {
                    assert_eq!(column, "petal width (cm)_shap");
                    assert_eq!(value, token);
                }
                other => panic!("Expected InvalidNumber for {token}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_field_count() {
        let bad = format!("{HEADER}\n5.1\t0.1\t3.5\n");
        let err = AttributionTable::from_reader(bad.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::FieldCount {
                expected: 12,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_target() {
        let bad = format!("{HEADER}\n5.1\t0.1\t3.5\t0.4\t1.4\t-2.3\t0.2\t-1.1\t-4.5\t-3.1\t0.01\t2\n");
        let err = AttributionTable::from_reader(bad.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidClass { .. }));
    }

    #[test]
    fn test_float_target_accepted() {
        let text = format!("{HEADER}\n5.1\t0.1\t3.5\t0.4\t1.4\t-2.3\t0.2\t-1.1\t-4.5\t-3.1\t0.01\t1.0\n");
        let table = AttributionTable::from_reader(text.as_bytes()).unwrap();
        assert_eq!(table.get(0).unwrap().target, ClassLabel::Versicolor);
    }

    #[test]
    fn test_empty_table() {
        let err = AttributionTable::from_reader(format!("{HEADER}\n").as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn test_missing_file() {
        let err = AttributionTable::from_path(Path::new("/nonexistent/shap.tsv")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_attribution_minima() {
        let table = AttributionTable::from_reader(sample_tsv().as_bytes()).unwrap();
        assert_eq!(
            table.attribution_minima().unwrap(),
            [-0.123, 0.1, -2.346, -1.111]
        );
        assert!(AttributionTable::default().attribution_minima().is_none());
    }

    #[test]
    fn test_attribution_column() {
        let table = AttributionTable::from_reader(sample_tsv().as_bytes()).unwrap();
        assert_eq!(table.attribution_column(Feature::PetalLength), vec![-2.346, 1.7]);
    }
}
