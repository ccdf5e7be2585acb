//! Immutable, process-lifetime snapshot of the attribution data.

use crate::error::LoadError;
use crate::normalize::{Normalization, NormalizationMode, NormalizedTable};
use crate::table::{AttributionTable, DISPLAY_DECIMALS};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared snapshot reference handed to every query and HTTP handler.
pub type SharedSnapshot = Arc<DashboardSnapshot>;

/// The rounded attribution table and its normalized view.
///
/// Built once at startup; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    table: AttributionTable,
    normalization: Normalization,
    normalized: NormalizedTable,
    source: Option<PathBuf>,
    loaded_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// Read the pipeline output and derive both views.
    pub fn load(path: &Path, mode: NormalizationMode) -> Result<Self, LoadError> {
        let table = AttributionTable::from_path(path)?;
        let mut snapshot = Self::from_table(&table, mode);
        snapshot.source = Some(path.to_path_buf());
        tracing::info!(
            path = %path.display(),
            records = snapshot.len(),
            mode = ?mode,
            offset = snapshot.normalization.offsets[0],
            "Loaded attribution snapshot"
        );
        Ok(snapshot)
    }

    /// Build a snapshot from an in-memory table. Values are rounded to the
    /// display precision before normalization, as on load.
    pub fn from_table(table: &AttributionTable, mode: NormalizationMode) -> Self {
        let table = table.rounded(DISPLAY_DECIMALS);
        let normalization = Normalization::fit(&table, mode);
        let normalized = normalization.apply(&table);
        Self {
            table,
            normalization,
            normalized,
            source: None,
            loaded_at: Utc::now(),
        }
    }

    pub fn into_shared(self) -> SharedSnapshot {
        Arc::new(self)
    }

    pub fn table(&self) -> &AttributionTable {
        &self.table
    }

    pub fn normalized(&self) -> &NormalizedTable {
        &self.normalized
    }

    pub fn normalization(&self) -> &Normalization {
        &self.normalization
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Number of records (N). Valid row indices are `0..N`.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ClassLabel;
    use crate::table::AttributionRecord;

    fn table() -> AttributionTable {
        AttributionTable::new(vec![
            AttributionRecord {
                features: [5.1, 3.5, 1.4, 0.2],
                attributions: [-0.1234, 0.2, -2.5, -0.4],
                margin: -4.0,
                shift: -2.8234,
                probability: 0.018,
                target: ClassLabel::NotVersicolor,
            },
            AttributionRecord {
                features: [6.0, 2.2, 4.0, 1.0],
                attributions: [0.1, 0.3, 1.9, 1.2],
                margin: 2.3,
                shift: 3.5,
                probability: 0.909,
                target: ClassLabel::Versicolor,
            },
        ])
    }

    #[test]
    fn test_from_table_rounds_then_normalizes() {
        let snap = DashboardSnapshot::from_table(&table(), NormalizationMode::Shared);
        assert_eq!(snap.len(), 2);
        let first = snap.table().get(0).unwrap();
        assert_eq!(first.attributions[0], -0.12);
        assert_eq!(first.shift, -2.82);
        assert_eq!(snap.normalization().offsets, [2.5; 4]);
        assert_eq!(snap.normalized().get(0).unwrap().attributions[2], 0.0);
        assert!(snap.source().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shap.tsv");
        table().write_path(&path).unwrap();

        let snap = DashboardSnapshot::load(&path, NormalizationMode::PerColumn).unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.source(), Some(path.as_path()));
        assert_eq!(snap.normalization().mode, NormalizationMode::PerColumn);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let err = DashboardSnapshot::load(Path::new("/no/such/file.tsv"), NormalizationMode::Shared)
            .unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }
}
