use std::fmt;

use serde::Serialize;

use crate::error::PreprocessError;

/// One of the three anthropometric inputs, in the fixed order every
/// fitted artifact indexes by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Age,
    Height,
    Weight,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Feature::Age, Feature::Height, Feature::Weight];

    pub fn index(self) -> usize {
        match self {
            Feature::Age => 0,
            Feature::Height => 1,
            Feature::Weight => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::Age => "age",
            Feature::Height => "height",
            Feature::Weight => "weight",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw age (years), height (cm) and weight (kg) of a single subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurements {
    pub age: f64,
    pub height: f64,
    pub weight: f64,
}

impl Measurements {
    pub fn new(age: f64, height: f64, weight: f64) -> Self {
        Measurements { age, height, weight }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Age => self.age,
            Feature::Height => self.height,
            Feature::Weight => self.weight,
        }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.age, self.height, self.weight]
    }

    /// Upstream request check: every value must be finite and strictly
    /// positive. The pipeline itself never calls this.
    pub fn validate(&self) -> Result<(), PreprocessError> {
        for feature in Feature::ALL {
            let value = self.get(feature);
            if !value.is_finite() || value <= 0.0 {
                return Err(PreprocessError::InvalidMeasurement { feature, value });
            }
        }
        Ok(())
    }
}
