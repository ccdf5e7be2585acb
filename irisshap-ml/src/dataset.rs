//! The bundled Iris dataset and the seeded train/test split.

use crate::error::MlError;
use irisshap_core::schema::{ClassLabel, FEATURE_COUNT};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;

const IRIS_CSV: &str = include_str!("../data/iris.csv");

/// Species index of versicolor in the bundled data.
pub const VERSICOLOR_SPECIES: u8 = 1;

#[derive(Debug, Deserialize)]
struct IrisRow {
    sepal_length: f64,
    sepal_width: f64,
    petal_length: f64,
    petal_width: f64,
    species: u8,
}

/// Feature rows with binary versicolor labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub rows: Vec<[f64; FEATURE_COUNT]>,
    pub targets: Vec<ClassLabel>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count(&self, class: ClassLabel) -> usize {
        self.targets.iter().filter(|&&t| t == class).count()
    }

    fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            rows: indices.iter().map(|&i| self.rows[i]).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }
}

/// Load the 150 Iris flowers. Versicolor maps to 1, both other species to 0.
pub fn load_iris() -> Result<Dataset, MlError> {
    let mut reader = csv::Reader::from_reader(IRIS_CSV.as_bytes());
    let mut rows = Vec::new();
    let mut targets = Vec::new();
    for (line, result) in reader.deserialize::<IrisRow>().enumerate() {
        let row = result?;
        if row.species > 2 {
            return Err(MlError::dataset(format!(
                "line {}: unknown species {}",
                line + 2,
                row.species
            )));
        }
        rows.push([
            row.sepal_length,
            row.sepal_width,
            row.petal_length,
            row.petal_width,
        ]);
        targets.push(if row.species == VERSICOLOR_SPECIES {
            ClassLabel::Versicolor
        } else {
            ClassLabel::NotVersicolor
        });
    }
    tracing::debug!(records = rows.len(), "Loaded bundled Iris dataset");
    Ok(Dataset { rows, targets })
}

/// Disjoint training and test partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

/// Shuffle with a seeded generator and hold out `ceil(len * test_fraction)`
/// records for testing.
pub fn train_test_split(data: &Dataset, test_fraction: f64, seed: u64) -> Result<Split, MlError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(MlError::config(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    let n_test = (data.len() as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= data.len() {
        return Err(MlError::dataset(format!(
            "cannot hold out {n_test} of {} records",
            data.len()
        )));
    }

    let mut order: Vec<usize> = (0..data.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let (test, train) = order.split_at(n_test);
    Ok(Split {
        train: data.select(train),
        test: data.select(test),
    })
}
