use std::path::PathBuf;

use crate::feature::Feature;

/// Failures while loading the fitted artifacts or validating inputs.
///
/// None of these escape `SizePreprocessingPipeline` construction; they are
/// logged and turned into an absent component instead.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("could not read reference dataset {path}: {source}")]
    ReferenceRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("reference dataset has no usable rows")]
    EmptyReference,

    #[error("could not open normalizer artifact {path}: {source}")]
    NormalizerIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode normalizer artifact {path}: {reason}")]
    NormalizerDecode { path: PathBuf, reason: String },

    #[error("normalizer {field} has {found} entries, expected {expected}")]
    NormalizerShape {
        field: &'static str,
        found: usize,
        expected: usize,
    },

    #[error("normalizer {field} for {feature} is not finite: {value}")]
    NormalizerValue {
        field: &'static str,
        feature: Feature,
        value: f64,
    },

    #[error("{feature} must be a positive number, got {value}")]
    InvalidMeasurement { feature: Feature, value: f64 },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PreprocessError>;
