//! Positive shifting of attribution values for marker sizing.
//!
//! Bubble sizes and polar radii must be non-negative, so the dashboard
//! derives a second view of the table in which a constant offset has been
//! added to the attribution values. The offset is computed once from the
//! whole table and reused for every record.

use crate::schema::{ClassLabel, Feature, FEATURE_COUNT};
use crate::table::AttributionTable;
use serde::{Deserialize, Serialize};

/// How the offset is derived from the column minima.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// One scalar for every column: the largest magnitude among the
    /// per-column minima. Only the column with the most negative minimum is
    /// guaranteed to bottom out at zero.
    #[default]
    Shared,
    /// Each column is shifted by its own minimum so every column bottoms out
    /// at exactly zero.
    PerColumn,
}

/// Offsets derived from a table. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub mode: NormalizationMode,
    /// Column minima the offsets were derived from.
    pub minima: [f64; FEATURE_COUNT],
    /// Amount added to each attribution column.
    pub offsets: [f64; FEATURE_COUNT],
}

impl Normalization {
    /// Derive offsets from explicit column minima.
    pub fn from_minima(mode: NormalizationMode, minima: [f64; FEATURE_COUNT]) -> Self {
        let offsets = match mode {
            NormalizationMode::Shared => {
                let shared = minima.iter().map(|m| m.abs()).fold(0.0_f64, f64::max);
                [shared; FEATURE_COUNT]
            }
            NormalizationMode::PerColumn => minima.map(|m| -m),
        };
        Self {
            mode,
            minima,
            offsets,
        }
    }

    /// Derive offsets from a table. An empty table yields zero offsets.
    pub fn fit(table: &AttributionTable, mode: NormalizationMode) -> Self {
        let minima = table.attribution_minima().unwrap_or([0.0; FEATURE_COUNT]);
        Self::from_minima(mode, minima)
    }

    pub fn offset(&self, feature: Feature) -> f64 {
        self.offsets[feature.index()]
    }

    /// Shift one attribution vector.
    pub fn shift(&self, attributions: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = *attributions;
        for (value, offset) in out.iter_mut().zip(self.offsets) {
            *value += offset;
        }
        out
    }

    /// Build the normalized view of a table.
    pub fn apply(&self, table: &AttributionTable) -> NormalizedTable {
        let records = table
            .iter()
            .map(|r| NormalizedRecord {
                attributions: self.shift(&r.attributions),
                shift: r.shift,
                target: r.target,
            })
            .collect();
        NormalizedTable { records }
    }
}

/// Shifted attribution values plus the unchanged `shift` and `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub attributions: [f64; FEATURE_COUNT],
    pub shift: f64,
    pub target: ClassLabel,
}

impl NormalizedRecord {
    pub fn attribution(&self, feature: Feature) -> f64 {
        self.attributions[feature.index()]
    }
}

/// Normalized view, row-aligned with the source table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    records: Vec<NormalizedRecord>,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&NormalizedRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.records.iter()
    }

    pub fn attribution_column(&self, feature: Feature) -> Vec<f64> {
        self.records.iter().map(|r| r.attribution(feature)).collect()
    }
}
