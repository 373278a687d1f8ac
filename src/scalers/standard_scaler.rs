use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PreprocessError, Result};
use crate::feature::{Feature, Measurements};

/// Mean and scale of one feature, fitted offline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    mean: f64,
    scale: f64,
}

impl StandardScaler {
    pub fn new(mean: f64, scale: f64) -> Self {
        StandardScaler { mean, scale }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// `(value - mean) / scale`. A zero scale is not guarded against.
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// On-disk layout of the fitted transform: two arrays indexed in
/// age, height, weight order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Per-feature standardization with previously fitted parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureNormalizer {
    scalers: [StandardScaler; 3],
}

impl FeatureNormalizer {
    pub fn new(age: StandardScaler, height: StandardScaler, weight: StandardScaler) -> Self {
        FeatureNormalizer {
            scalers: [age, height, weight],
        }
    }

    pub fn identity() -> Self {
        let unit = StandardScaler::new(0.0, 1.0);
        FeatureNormalizer::new(unit, unit, unit)
    }

    pub fn from_fitted(fitted: &FittedScaler) -> Result<Self> {
        check_field("mean", &fitted.mean)?;
        check_field("scale", &fitted.scale)?;
        let s = |i: usize| StandardScaler::new(fitted.mean[i], fitted.scale[i]);
        Ok(FeatureNormalizer::new(s(0), s(1), s(2)))
    }

    /// Loads a fitted transform. `.json` files are read as JSON, everything
    /// else as a pickle.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| PreprocessError::NormalizerIo {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let decode_err = |reason: String| PreprocessError::NormalizerDecode {
            path: path.to_path_buf(),
            reason,
        };

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let fitted: FittedScaler = if is_json {
            serde_json::from_reader(reader).map_err(|e| decode_err(e.to_string()))?
        } else {
            serde_pickle::from_reader(reader, serde_pickle::DeOptions::new())
                .map_err(|e| decode_err(e.to_string()))?
        };

        let normalizer = FeatureNormalizer::from_fitted(&fitted)?;
        info!(path = %path.display(), "feature scaler loaded");
        debug!(mean = ?fitted.mean, scale = ?fitted.scale, "feature scaler parameters");
        Ok(normalizer)
    }

    pub fn scaler(&self, feature: Feature) -> &StandardScaler {
        &self.scalers[feature.index()]
    }

    pub fn to_fitted(&self) -> FittedScaler {
        FittedScaler {
            mean: self.scalers.iter().map(StandardScaler::mean).collect(),
            scale: self.scalers.iter().map(StandardScaler::scale).collect(),
        }
    }

    pub fn transform(&self, raw: &Measurements) -> [f64; 3] {
        Feature::ALL.map(|feature| self.scaler(feature).transform(raw.get(feature)))
    }
}

fn check_field(field: &'static str, values: &[f64]) -> Result<()> {
    if values.len() != Feature::ALL.len() {
        return Err(PreprocessError::NormalizerShape {
            field,
            found: values.len(),
            expected: Feature::ALL.len(),
        });
    }
    for feature in Feature::ALL {
        let value = values[feature.index()];
        if !value.is_finite() {
            return Err(PreprocessError::NormalizerValue { field, feature, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_values_unchanged() {
        let raw = Measurements::new(30.0, 185.0, 90.0);
        assert_eq!(FeatureNormalizer::identity().transform(&raw), [30.0, 185.0, 90.0]);
    }

    #[test]
    fn transform_is_affine_per_feature() {
        let normalizer = FeatureNormalizer::new(
            StandardScaler::new(28.75, 8.0),
            StandardScaler::new(168.75, 8.0),
            StandardScaler::new(67.5, 15.0),
        );
        let out = normalizer.transform(&Measurements::new(30.0, 185.0, 90.0));
        assert!((out[0] - 0.15625).abs() < 1e-12);
        assert!((out[1] - 2.03125).abs() < 1e-12);
        assert!((out[2] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn zero_input_propagates() {
        let normalizer = FeatureNormalizer::new(
            StandardScaler::new(10.0, 2.0),
            StandardScaler::new(0.0, 1.0),
            StandardScaler::new(0.0, 1.0),
        );
        let out = normalizer.transform(&Measurements::new(0.0, -5.0, 0.0));
        assert_eq!(out, [-5.0, -5.0, 0.0]);
    }

    #[test]
    fn fitted_arrays_must_have_three_entries() {
        let fitted = FittedScaler {
            mean: vec![1.0, 2.0],
            scale: vec![1.0, 1.0, 1.0],
        };
        let err = FeatureNormalizer::from_fitted(&fitted).unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::NormalizerShape { field: "mean", found: 2, expected: 3 }
        ));
    }

    #[test]
    fn fitted_values_must_be_finite() {
        let fitted = FittedScaler {
            mean: vec![1.0, 2.0, 3.0],
            scale: vec![1.0, f64::NAN, 1.0],
        };
        let err = FeatureNormalizer::from_fitted(&fitted).unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::NormalizerValue { field: "scale", feature: Feature::Height, .. }
        ));
    }

    #[test]
    fn fitted_round_trips_through_to_fitted() {
        let fitted = FittedScaler {
            mean: vec![1.0, 2.0, 3.0],
            scale: vec![4.0, 5.0, 6.0],
        };
        let normalizer = FeatureNormalizer::from_fitted(&fitted).unwrap();
        assert_eq!(normalizer.to_fitted(), fitted);
    }
}
