//! Query operations over a [`DashboardSnapshot`].
//!
//! Every query is a pure function of the snapshot and its arguments and
//! produces a freshly allocated result. Nothing is cached; the table is small
//! and aggregates are recomputed per call.

use crate::error::QueryError;
use crate::schema::{ClassLabel, Feature, FEATURE_COUNT};
use crate::snapshot::DashboardSnapshot;
use serde::{Deserialize, Serialize};

/// Which set of attribution values a computation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Raw,
    Normalized,
}

/// Per-class mean of each attribution column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAggregate {
    pub class: ClassLabel,
    pub view: View,
    /// Number of records in the class. Means are zero when this is zero.
    pub count: usize,
    pub means: [f64; FEATURE_COUNT],
}

impl ClassAggregate {
    pub fn mean(&self, feature: Feature) -> f64 {
        self.means[feature.index()]
    }
}

/// Column-wise mean of one view restricted to records of `class`.
pub fn class_mean(snapshot: &DashboardSnapshot, view: View, class: ClassLabel) -> ClassAggregate {
    let mut sums = [0.0; FEATURE_COUNT];
    let mut count = 0usize;

    match view {
        View::Raw => {
            for record in snapshot.table().iter().filter(|r| r.target == class) {
                for (sum, v) in sums.iter_mut().zip(record.attributions) {
                    *sum += v;
                }
                count += 1;
            }
        }
        View::Normalized => {
            for record in snapshot.normalized().iter().filter(|r| r.target == class) {
                for (sum, v) in sums.iter_mut().zip(record.attributions) {
                    *sum += v;
                }
                count += 1;
            }
        }
    }

    let means = if count == 0 {
        [0.0; FEATURE_COUNT]
    } else {
        sums.map(|s| s / count as f64)
    };
    ClassAggregate {
        class,
        view,
        count,
        means,
    }
}

/// Raw and normalized values of one feature across a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDistribution {
    pub feature: Feature,
    pub name: String,
    pub raw: Vec<f64>,
    pub normalized: Vec<f64>,
}

/// Every record of one class, column by column. No aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDistribution {
    pub class: ClassLabel,
    pub class_name: String,
    /// Row indices of the selected records, ascending.
    pub rows: Vec<usize>,
    /// `shift` of each selected record, aligned with `rows`.
    pub shift: Vec<f64>,
    /// One entry per feature in [`Feature::ALL`] order.
    pub features: Vec<FeatureDistribution>,
}

impl ClassDistribution {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn feature(&self, feature: Feature) -> &FeatureDistribution {
        &self.features[feature.index()]
    }
}

/// All raw and normalized attribution values for records whose target is
/// `class`.
pub fn class_distribution(snapshot: &DashboardSnapshot, class: ClassLabel) -> ClassDistribution {
    let rows: Vec<usize> = snapshot
        .table()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.target == class)
        .map(|(i, _)| i)
        .collect();

    let table = snapshot.table().records();
    let normalized = snapshot.normalized().records();

    let features = Feature::ALL
        .iter()
        .map(|&feature| FeatureDistribution {
            feature,
            name: feature.short_name().to_string(),
            raw: rows.iter().map(|&i| table[i].attribution(feature)).collect(),
            normalized: rows
                .iter()
                .map(|&i| normalized[i].attribution(feature))
                .collect(),
        })
        .collect();

    ClassDistribution {
        class,
        class_name: class.name().to_string(),
        shift: rows.iter().map(|&i| table[i].shift).collect(),
        rows,
        features,
    }
}

/// A single record next to the average of its class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordComparison {
    pub row: usize,
    pub class: ClassLabel,
    pub class_name: String,
    /// Number of records sharing the class (the record included).
    pub class_size: usize,
    pub record_normalized: [f64; FEATURE_COUNT],
    pub class_mean_normalized: [f64; FEATURE_COUNT],
    pub record_raw: [f64; FEATURE_COUNT],
    pub class_mean_raw: [f64; FEATURE_COUNT],
}

/// Compare record `row_index` against the mean of its own class.
///
/// The index is signed so callers can pass untrusted input straight
/// through; anything outside `0..N` is rejected.
pub fn record_comparison(
    snapshot: &DashboardSnapshot,
    row_index: i64,
) -> Result<RecordComparison, QueryError> {
    let len = snapshot.len();
    let out_of_range = QueryError::RowOutOfRange {
        index: row_index,
        len,
    };
    let row = usize::try_from(row_index).map_err(|_| out_of_range.clone())?;
    let (Some(raw), Some(normalized)) = (snapshot.table().get(row), snapshot.normalized().get(row))
    else {
        return Err(out_of_range);
    };

    let class = raw.target;
    let raw_mean = class_mean(snapshot, View::Raw, class);
    let normalized_mean = class_mean(snapshot, View::Normalized, class);

    Ok(RecordComparison {
        row,
        class,
        class_name: class.name().to_string(),
        class_size: raw_mean.count,
        record_normalized: normalized.attributions,
        class_mean_normalized: normalized_mean.means,
        record_raw: raw.attributions,
        class_mean_raw: raw_mean.means,
    })
}

/// One axis of the scatter-plot matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseDimension {
    pub feature: Feature,
    pub label: String,
    pub values: Vec<f64>,
}

/// Raw attribution columns of every record plus their class labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseData {
    pub dimensions: Vec<PairwiseDimension>,
    pub targets: Vec<ClassLabel>,
}

pub fn pairwise_dimensions(snapshot: &DashboardSnapshot) -> PairwiseData {
    let table = snapshot.table();
    PairwiseData {
        dimensions: Feature::ALL
            .iter()
            .map(|&feature| PairwiseDimension {
                feature,
                label: feature.short_name().to_string(),
                values: table.attribution_column(feature),
            })
            .collect(),
        targets: table.iter().map(|r| r.target).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizationMode;
    use crate::table::{AttributionRecord, AttributionTable};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn record(attributions: [f64; FEATURE_COUNT], target: ClassLabel) -> AttributionRecord {
        AttributionRecord {
            features: [5.0, 3.0, 4.0, 1.0],
            attributions,
            margin: 0.0,
            shift: attributions.iter().sum(),
            probability: 0.5,
            target,
        }
    }

    fn snapshot() -> DashboardSnapshot {
        let table = AttributionTable::new(vec![
            record([-1.0, 2.0, 0.5, -0.5], ClassLabel::NotVersicolor),
            record([3.0, -4.0, 1.0, 1.5], ClassLabel::Versicolor),
            record([0.0, 0.0, -2.0, 0.25], ClassLabel::NotVersicolor),
            record([5.0, 5.0, 2.0, 0.75], ClassLabel::Versicolor),
        ]);
        DashboardSnapshot::from_table(&table, NormalizationMode::Shared)
    }

    #[test]
    fn test_class_distribution_selects_class() {
        let snap = snapshot();
        let dist = class_distribution(&snap, ClassLabel::Versicolor);
        assert_eq!(dist.rows, vec![1, 3]);
        assert_eq!(dist.class_name, "Class Versicolor");
        assert_eq!(dist.shift, vec![1.5, 12.75]);
        assert_eq!(dist.features.len(), 4);
        let sepal = dist.feature(Feature::SepalLength);
        assert_eq!(sepal.name, "sepal length");
        assert_eq!(sepal.raw, vec![3.0, 5.0]);
        assert_eq!(sepal.normalized, vec![7.0, 9.0]);
    }

    #[test]
    fn test_class_distribution_partitions_dataset() {
        let snap = snapshot();
        let mut rows = class_distribution(&snap, ClassLabel::NotVersicolor).rows;
        rows.extend(class_distribution(&snap, ClassLabel::Versicolor).rows);
        rows.sort_unstable();
        assert_eq!(rows, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_class_mean_raw() {
        let snap = snapshot();
        let agg = class_mean(&snap, View::Raw, ClassLabel::NotVersicolor);
        assert_eq!(agg.count, 2);
        assert_eq!(agg.means, [-0.5, 1.0, -0.75, -0.125]);
        assert_eq!(agg.mean(Feature::SepalWidth), 1.0);
    }

    #[test]
    fn test_class_mean_empty_class() {
        let table = AttributionTable::new(vec![record([1.0; 4], ClassLabel::Versicolor)]);
        let snap = DashboardSnapshot::from_table(&table, NormalizationMode::Shared);
        let agg = class_mean(&snap, View::Normalized, ClassLabel::NotVersicolor);
        assert_eq!(agg.count, 0);
        assert_eq!(agg.means, [0.0; 4]);
    }

    #[test]
    fn test_record_comparison() {
        let snap = snapshot();
        let cmp = record_comparison(&snap, 2).unwrap();
        assert_eq!(cmp.row, 2);
        assert_eq!(cmp.class, ClassLabel::NotVersicolor);
        assert_eq!(cmp.class_name, "Class Not Versicolor");
        assert_eq!(cmp.class_size, 2);
        assert_eq!(cmp.record_raw, [0.0, 0.0, -2.0, 0.25]);
        assert_eq!(cmp.record_normalized, [4.0, 4.0, 2.0, 4.25]);
        assert_eq!(cmp.class_mean_raw, [-0.5, 1.0, -0.75, -0.125]);
        assert_eq!(cmp.class_mean_normalized, [3.5, 5.0, 3.25, 3.875]);
    }

    #[test]
    fn test_record_comparison_out_of_range() {
        let snap = snapshot();
        assert_eq!(
            record_comparison(&snap, -1),
            Err(QueryError::RowOutOfRange { index: -1, len: 4 })
        );
        assert_eq!(
            record_comparison(&snap, 4),
            Err(QueryError::RowOutOfRange { index: 4, len: 4 })
        );
        assert!(record_comparison(&snap, i64::MAX).is_err());
        assert!(record_comparison(&snap, 3).is_ok());
    }

    #[test]
    fn test_pairwise_dimensions() {
        let snap = snapshot();
        let data = pairwise_dimensions(&snap);
        assert_eq!(data.dimensions.len(), 4);
        assert_eq!(data.dimensions[3].label, "petal width");
        assert_eq!(data.dimensions[0].values, vec![-1.0, 3.0, 0.0, 5.0]);
        assert_eq!(data.targets.len(), 4);
        assert_eq!(data.targets[1], ClassLabel::Versicolor);
    }

    fn arb_snapshot() -> impl Strategy<Value = DashboardSnapshot> {
        let row = (prop::array::uniform4(-5.0f64..5.0), prop::bool::ANY);
        prop::collection::vec(row, 1..50).prop_map(|rows| {
            let table = AttributionTable::new(
                rows.into_iter()
                    .map(|(a, v)| {
                        let target = if v {
                            ClassLabel::Versicolor
                        } else {
                            ClassLabel::NotVersicolor
                        };
                        record(a, target)
                    })
                    .collect(),
            );
            DashboardSnapshot::from_table(&table, NormalizationMode::Shared)
        })
    }

    proptest! {
        #[test]
        fn prop_distributions_cover_every_record_once(snap in arb_snapshot()) {
            let zero = class_distribution(&snap, ClassLabel::NotVersicolor);
            let one = class_distribution(&snap, ClassLabel::Versicolor);
            prop_assert_eq!(zero.len() + one.len(), snap.len());
            let mut seen = vec![0usize; snap.len()];
            for &i in zero.rows.iter().chain(one.rows.iter()) {
                seen[i] += 1;
            }
            prop_assert!(seen.iter().all(|&c| c == 1));
            for &i in &zero.rows {
                prop_assert_eq!(snap.table().get(i).unwrap().target, ClassLabel::NotVersicolor);
            }
        }

        #[test]
        fn prop_class_mean_matches_recomputation(snap in arb_snapshot(), pick in any::<prop::sample::Index>()) {
            let row = pick.index(snap.len());
            let cmp = record_comparison(&snap, row as i64).unwrap();
            let members: Vec<_> = snap
                .normalized()
                .iter()
                .filter(|r| r.target == cmp.class)
                .collect();
            for i in 0..FEATURE_COUNT {
                let expected = members.iter().map(|r| r.attributions[i]).sum::<f64>()
                    / members.len() as f64;
                prop_assert!((cmp.class_mean_normalized[i] - expected).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_out_of_range_rows_rejected(snap in arb_snapshot(), extra in 0i64..100) {
            let len = snap.len() as i64;
            prop_assert!(record_comparison(&snap, len + extra).is_err());
            prop_assert!(record_comparison(&snap, -1 - extra).is_err());
        }
    }
}
