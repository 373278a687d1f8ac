use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::artifact::{log_not_configured, Artifact, Severity};
use crate::config::PipelineConfig;
use crate::feature::{Feature, Measurements};
use crate::reference::load_reference_statistics;
use crate::scalers::reference_stats::{OutlierStatus, ReferenceStatistics};
use crate::scalers::standard_scaler::FeatureNormalizer;
use crate::size;

const REFERENCE_COMPONENT: &str = "reference statistics";
const NORMALIZER_COMPONENT: &str = "feature scaler";

/// Model-ready feature vector in age, height, weight order.
///
/// `normalized` is false when no fitted transform was available and the
/// values are the raw measurements passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StandardizedFeatures {
    pub values: [f64; 3],
    pub normalized: bool,
}

impl StandardizedFeatures {
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn age(&self) -> f64 {
        self.get(Feature::Age)
    }

    pub fn height(&self) -> f64 {
        self.get(Feature::Height)
    }

    pub fn weight(&self) -> f64 {
        self.get(Feature::Weight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FenceRange {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierEntry {
    pub feature: Feature,
    pub value: f64,
    pub is_outlier: bool,
    pub status: OutlierStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<FenceRange>,
}

/// Advisory per-feature verdict on the raw input. Never blocks prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    entries: [OutlierEntry; 3],
}

impl OutlierReport {
    pub fn get(&self, feature: Feature) -> &OutlierEntry {
        &self.entries[feature.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutlierEntry> {
        self.entries.iter()
    }

    pub fn has_outliers(&self) -> bool {
        self.entries.iter().any(|e| e.is_outlier)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineHealth {
    pub reference_statistics: bool,
    pub normalizer: bool,
}

impl PipelineHealth {
    pub fn is_degraded(&self) -> bool {
        !(self.reference_statistics && self.normalizer)
    }
}

/// Outlier screening, standardization and the size label mapping behind
/// one value. Built once, then shared read-only.
#[derive(Debug, Clone)]
pub struct SizePreprocessingPipeline {
    reference: Artifact<ReferenceStatistics>,
    normalizer: Artifact<FeatureNormalizer>,
}

impl SizePreprocessingPipeline {
    /// Builds from injected components, logging each absent one once.
    pub fn new(
        reference: Artifact<ReferenceStatistics>,
        normalizer: Artifact<FeatureNormalizer>,
    ) -> Self {
        if !reference.is_loaded() {
            log_not_configured(REFERENCE_COMPONENT);
        }
        if !normalizer.is_loaded() {
            log_not_configured(NORMALIZER_COMPONENT);
        }
        SizePreprocessingPipeline {
            reference,
            normalizer,
        }
    }

    /// Does all file I/O the pipeline will ever do. Missing or unreadable
    /// artifacts leave that component absent; this never fails.
    pub fn from_paths(reference_path: Option<&Path>, normalizer_path: Option<&Path>) -> Self {
        SizePreprocessingPipeline {
            reference: Artifact::from_load(
                REFERENCE_COMPONENT,
                Severity::Warn,
                reference_path.map(load_reference_statistics),
            ),
            normalizer: Artifact::from_load(
                NORMALIZER_COMPONENT,
                Severity::Error,
                normalizer_path.map(FeatureNormalizer::load),
            ),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        SizePreprocessingPipeline::from_paths(
            config.reference_path.as_deref(),
            config.normalizer_path.as_deref(),
        )
    }

    pub fn health(&self) -> PipelineHealth {
        PipelineHealth {
            reference_statistics: self.reference.is_loaded(),
            normalizer: self.normalizer.is_loaded(),
        }
    }

    pub fn reference_statistics(&self) -> Option<&ReferenceStatistics> {
        self.reference.as_loaded()
    }

    pub fn normalizer(&self) -> Option<&FeatureNormalizer> {
        self.normalizer.as_loaded()
    }

    /// Screens the raw values for outliers and standardizes them. The two
    /// steps are independent and both always run.
    pub fn prepare(
        &self,
        age: f64,
        height: f64,
        weight: f64,
    ) -> (StandardizedFeatures, OutlierReport) {
        let raw = Measurements::new(age, height, weight);
        debug!(age, height, weight, "raw input");

        let report = self.check_outliers(&raw);
        if report.has_outliers() {
            warn!("input contains outliers, prediction reliability may be affected");
        }

        let features = match self.normalizer() {
            Some(normalizer) => {
                let values = normalizer.transform(&raw);
                debug!(standardized = ?values, "standardized input");
                StandardizedFeatures {
                    values,
                    normalized: true,
                }
            }
            None => {
                warn!("no feature scaler loaded, using raw input");
                StandardizedFeatures {
                    values: raw.to_array(),
                    normalized: false,
                }
            }
        };

        (features, report)
    }

    pub fn check_outliers(&self, raw: &Measurements) -> OutlierReport {
        OutlierReport {
            entries: Feature::ALL.map(|feature| self.outlier_entry(feature, raw.get(feature))),
        }
    }

    fn outlier_entry(&self, feature: Feature, value: f64) -> OutlierEntry {
        let Some(stats) = self.reference_statistics() else {
            return OutlierEntry {
                feature,
                value,
                is_outlier: false,
                status: OutlierStatus::Unknown,
                bounds: None,
            };
        };

        let status = stats.classify(feature, value);
        let bounds = stats.bounds(feature).map(|b| FenceRange {
            lower: b.lower_fence,
            upper: b.upper_fence,
        });
        let is_outlier = status == OutlierStatus::Outlier;
        if let (true, Some(b)) = (is_outlier, bounds) {
            warn!(
                %feature,
                value,
                lower = b.lower,
                upper = b.upper,
                "value outside reference range"
            );
        }

        OutlierEntry {
            feature,
            value,
            is_outlier,
            status,
            bounds,
        }
    }

    pub fn label_for(&self, code: i64) -> String {
        size::label_for(code)
    }

    /// Unknown labels give 3 (M); see [`size::code_for`].
    pub fn code_for(&self, label: &str) -> i64 {
        size::code_for(label)
    }

}

#[cfg(test)]
mod tests {
    use std::{
        io::{self, Write},
        sync::{Arc, Mutex},
    };

    use super::*;
    use crate::reference::ReferenceRow;
    use crate::scalers::standard_scaler::StandardScaler;

    fn reference() -> ReferenceStatistics {
        ReferenceStatistics::build(&[
            ReferenceRow::new(20.0, 160.0, 50.0),
            ReferenceRow::new(40.0, 180.0, 90.0),
            ReferenceRow::new(30.0, 170.0, 70.0),
            ReferenceRow::new(25.0, 165.0, 60.0),
        ])
    }

    fn normalizer() -> FeatureNormalizer {
        FeatureNormalizer::new(
            StandardScaler::new(28.75, 8.0),
            StandardScaler::new(168.75, 8.0),
            StandardScaler::new(67.5, 15.0),
        )
    }

    fn loaded() -> SizePreprocessingPipeline {
        SizePreprocessingPipeline::new(Artifact::Loaded(reference()), Artifact::Loaded(normalizer()))
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn fully_loaded_pipeline() {
        let pipeline = loaded();
        assert!(!pipeline.health().is_degraded());

        let (features, report) = pipeline.prepare(30.0, 185.0, 90.0);
        assert!(features.normalized);
        assert_close(features.age(), 0.15625);
        assert_close(features.height(), 2.03125);
        assert_close(features.weight(), 1.5);

        // height fences [150.625, 185.625], weight fences [31.25, 101.25]
        let height = report.get(Feature::Height);
        assert_eq!(height.status, OutlierStatus::Normal);
        let bounds = height.bounds.unwrap();
        assert_close(bounds.lower, 150.625);
        assert_close(bounds.upper, 185.625);
        assert!(!report.has_outliers());
    }

    #[test]
    fn outliers_do_not_block_standardization() {
        let pipeline = loaded();
        let (features, report) = pipeline.prepare(12.0, 120.0, 75.0);
        assert!(report.get(Feature::Height).is_outlier);
        assert_eq!(report.get(Feature::Age).status, OutlierStatus::Normal);
        assert!(report.has_outliers());
        assert_close(features.height(), (120.0 - 168.75) / 8.0);
    }

    #[test]
    fn missing_normalizer_passes_raw_values() {
        let pipeline =
            SizePreprocessingPipeline::new(Artifact::Loaded(reference()), Artifact::Absent);
        let health = pipeline.health();
        assert!(health.is_degraded());
        assert!(!health.normalizer);

        let (features, report) = pipeline.prepare(25.0, 170.0, 65.0);
        assert!(!features.normalized);
        assert_eq!(features.values, [25.0, 170.0, 65.0]);
        assert_eq!(report.get(Feature::Weight).status, OutlierStatus::Normal);
    }

    #[test]
    fn missing_reference_reports_unknown() {
        let pipeline =
            SizePreprocessingPipeline::new(Artifact::Absent, Artifact::Loaded(normalizer()));
        let (features, report) = pipeline.prepare(500.0, 10.0, 1.0);
        assert!(features.normalized);
        for entry in report.iter() {
            assert_eq!(entry.status, OutlierStatus::Unknown);
            assert!(!entry.is_outlier);
            assert!(entry.bounds.is_none());
        }
    }

    #[test]
    fn zero_input_does_not_panic() {
        let pipeline = loaded();
        let (features, report) = pipeline.prepare(0.0, 0.0, 0.0);
        assert_close(features.age(), -28.75 / 8.0);
        assert!(report.get(Feature::Height).is_outlier);
    }

    #[test]
    fn label_mapping_through_pipeline() {
        let pipeline = SizePreprocessingPipeline::new(Artifact::Absent, Artifact::Absent);
        for code in 1..=7 {
            assert_eq!(pipeline.code_for(&pipeline.label_for(code)), code);
        }
        assert!(pipeline.label_for(99).contains("99"));
        assert_eq!(pipeline.code_for("not-a-size"), 3);
    }

    #[test]
    fn report_serializes_without_unknown_bounds() {
        let pipeline = SizePreprocessingPipeline::new(Artifact::Absent, Artifact::Absent);
        let (_, report) = pipeline.prepare(25.0, 170.0, 65.0);
        let json = serde_json::to_value(&report).unwrap();
        let age = &json["entries"][0];
        assert_eq!(age["feature"], "age");
        assert_eq!(age["status"], "Unknown");
        assert!(age.get("bounds").is_none());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn each_absent_component_is_logged_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing_csv = dir.path().join("nope.csv");
        let missing_pkl = dir.path().join("nope.pkl");
        let logs = captured_logs(|| {
            SizePreprocessingPipeline::from_paths(
                Some(missing_csv.as_path()),
                Some(missing_pkl.as_path()),
            );
        });
        assert_eq!(logs.matches(REFERENCE_COMPONENT).count(), 1, "{logs}");
        assert_eq!(logs.matches(NORMALIZER_COMPONENT).count(), 1, "{logs}");
        assert!(logs.lines().any(|l| l.contains("ERROR") && l.contains(NORMALIZER_COMPONENT)));

        let logs = captured_logs(|| {
            SizePreprocessingPipeline::from_paths(None, None);
        });
        assert_eq!(logs.matches("not configured").count(), 2, "{logs}");

        let logs = captured_logs(|| {
            SizePreprocessingPipeline::new(Artifact::Loaded(reference()), Artifact::Absent);
        });
        assert_eq!(logs.matches(REFERENCE_COMPONENT).count(), 0, "{logs}");
        assert_eq!(logs.matches(NORMALIZER_COMPONENT).count(), 1, "{logs}");
    }

    #[test]
    fn pipeline_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SizePreprocessingPipeline>();
    }
}
