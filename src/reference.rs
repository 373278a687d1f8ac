use std::{fs::File, io::Read, path::Path};

use csv::Reader;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{PreprocessError, Result};
use crate::feature::Feature;
use crate::scalers::reference_stats::ReferenceStatistics;

/// One subject from the reference population. Blank or non-numeric cells
/// deserialize as missing; unrelated columns are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ReferenceRow {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub weight: Option<f64>,
}

impl ReferenceRow {
    pub fn new(age: f64, height: f64, weight: f64) -> Self {
        ReferenceRow {
            age: Some(age),
            height: Some(height),
            weight: Some(weight),
        }
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::Age => self.age,
            Feature::Height => self.height,
            Feature::Weight => self.weight,
        }
    }
}

fn read_csv(path: &Path) -> Result<Reader<File>> {
    csv::Reader::from_path(path).map_err(|source| PreprocessError::ReferenceRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses rows, skipping (and logging) records that don't fit the header.
pub fn parse_rows<R: Read>(reader: Reader<R>) -> Vec<ReferenceRow> {
    reader
        .into_deserialize::<ReferenceRow>()
        .enumerate()
        .filter_map(|(i, record)| match record {
            Ok(row) => Some(row),
            Err(e) => {
                warn!(row = i + 1, error = %e, "skipping malformed reference row");
                None
            }
        })
        .collect()
}

/// Reads the reference dataset and derives its fences.
pub fn load_reference_statistics(path: &Path) -> Result<ReferenceStatistics> {
    info!(path = %path.display(), "loading reference data");
    let rows = parse_rows(read_csv(path)?);
    if rows.is_empty() {
        return Err(PreprocessError::EmptyReference);
    }
    let stats = ReferenceStatistics::build(&rows);
    info!(rows = rows.len(), "reference statistics ready");
    Ok(stats)
}
