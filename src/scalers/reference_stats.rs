use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::feature::Feature;
use crate::reference::ReferenceRow;
use crate::scalers::quartiles;

/// Tukey fence multiplier.
pub const FENCE_K: f64 = 1.5;

/// Quartile summary of one feature in the reference population.
///
/// `lower_fence = q1 - 1.5 * iqr` and `upper_fence = q3 + 1.5 * iqr`. A
/// feature with no spread (`iqr == 0`) collapses both fences onto `q1`, so
/// every value different from it is an outlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuartileBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
}

impl QuartileBounds {
    pub fn from_sample(data: &[f64]) -> Option<Self> {
        let (q1, q3) = quartiles::quartiles(data)?;
        let iqr = q3 - q1;
        Some(QuartileBounds {
            q1,
            q3,
            iqr,
            lower_fence: q1 - FENCE_K * iqr,
            upper_fence: q3 + FENCE_K * iqr,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        !(value < self.lower_fence || value > self.upper_fence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutlierStatus {
    Normal,
    Outlier,
    Unknown,
}

impl fmt::Display for OutlierStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutlierStatus::Normal => "Normal",
            OutlierStatus::Outlier => "Outlier",
            OutlierStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Per-feature fences derived once from a reference population.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceStatistics {
    bounds: [Option<QuartileBounds>; 3],
}

impl ReferenceStatistics {
    /// Imputes missing cells with the feature's median, then takes
    /// quartiles. A feature without a single observed value gets no bounds.
    pub fn build(rows: &[ReferenceRow]) -> Self {
        let computed: Vec<Option<QuartileBounds>> = Feature::ALL
            .par_iter()
            .map(|&feature| {
                let column = impute_median(rows.iter().map(|r| r.get(feature)));
                let bounds = QuartileBounds::from_sample(&column);
                if let Some(b) = &bounds {
                    debug!(
                        %feature,
                        lower = b.lower_fence,
                        upper = b.upper_fence,
                        "IQR bounds computed"
                    );
                }
                bounds
            })
            .collect();

        let mut bounds = [None; 3];
        for (slot, b) in bounds.iter_mut().zip(computed) {
            *slot = b;
        }
        ReferenceStatistics { bounds }
    }

    pub fn bounds(&self, feature: Feature) -> Option<&QuartileBounds> {
        self.bounds[feature.index()].as_ref()
    }

    pub fn classify(&self, feature: Feature, value: f64) -> OutlierStatus {
        match self.bounds(feature) {
            Some(b) if b.contains(value) => OutlierStatus::Normal,
            Some(_) => OutlierStatus::Outlier,
            None => OutlierStatus::Unknown,
        }
    }
}

/// Fills gaps (missing or non-finite cells) with the median of the observed ones.
/// Returns an empty column when nothing was observed.
fn impute_median(column: impl Iterator<Item = Option<f64>>) -> Vec<f64> {
    let cells: Vec<Option<f64>> = column.map(|c| c.filter(|v| v.is_finite())).collect();
    let observed: Vec<f64> = cells.iter().flatten().copied().collect();
    let Some(fill) = quartiles::median(&observed) else {
        return Vec::new();
    };
    cells.into_iter().map(|c| c.unwrap_or(fill)).collect()
}
