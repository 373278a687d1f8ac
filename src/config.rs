use std::{env, path::PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::Result;

pub const ENV_REFERENCE: &str = "SIZE_PREPROCESS_REFERENCE";
pub const ENV_NORMALIZER: &str = "SIZE_PREPROCESS_NORMALIZER";
pub const ENV_LOG: &str = "SIZE_PREPROCESS_LOG";

/// Where the fitted artifacts live and how verbose to be.
///
/// A `None` path means the artifact is intentionally not configured; the
/// pipeline then starts with that component absent. An empty string in TOML
/// or the environment means the same.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    #[serde(deserialize_with = "empty_as_none")]
    pub reference_path: Option<PathBuf>,
    #[serde(deserialize_with = "empty_as_none")]
    pub normalizer_path: Option<PathBuf>,
    pub log_filter: String,
}

fn non_empty(path: String) -> Option<PathBuf> {
    (!path.is_empty()).then(|| PathBuf::from(path))
}

fn empty_as_none<'de, D>(de: D) -> std::result::Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.and_then(non_empty))
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            reference_path: Some(PathBuf::from("data/final_test.csv")),
            normalizer_path: Some(PathBuf::from("models/feature_scaler.pkl")),
            log_filter: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Applies `SIZE_PREPROCESS_*` variables. An empty path variable
    /// disables that artifact.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup(ENV_REFERENCE) {
            self.reference_path = non_empty(v);
        }
        if let Some(v) = lookup(ENV_NORMALIZER) {
            self.normalizer_path = non_empty(v);
        }
        if let Some(v) = lookup(ENV_LOG) {
            self.log_filter = v;
        }
        self
    }
}
