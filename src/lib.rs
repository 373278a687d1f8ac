//! Preprocessing for the garment size classifier.
//!
//! Raw age / height / weight are screened against Tukey fences from a
//! reference population, standardized with a previously fitted transform,
//! and the classifier's integer output is mapped back to a size label.
//! Either fitted artifact may be missing; the pipeline then degrades
//! instead of failing.

pub mod artifact;
pub mod config;
pub mod error;
pub mod feature;
pub mod logging;
pub mod pipeline;
pub mod reference;
pub mod scalers;
pub mod size;

pub use artifact::{Artifact, Severity};
pub use config::PipelineConfig;
pub use error::{PreprocessError, Result};
pub use feature::{Feature, Measurements};
pub use pipeline::{
    FenceRange, OutlierEntry, OutlierReport, PipelineHealth, SizePreprocessingPipeline,
    StandardizedFeatures,
};
pub use reference::ReferenceRow;
pub use scalers::reference_stats::{OutlierStatus, QuartileBounds, ReferenceStatistics};
pub use scalers::standard_scaler::{FeatureNormalizer, FittedScaler, StandardScaler};
pub use size::{code_for, label_for, SizeLabel};
