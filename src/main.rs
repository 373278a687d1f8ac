use std::{error::Error, fs, path::Path, time::Instant};

use rayon::prelude::*;
use size_preprocess::{
    logging, Artifact, Feature, Measurements, OutlierReport, PipelineConfig,
    SizePreprocessingPipeline, StandardizedFeatures,
};

const CONFIG_FILE: &str = "size-preprocess.toml";

struct Case {
    name: &'static str,
    input: Measurements,
}

static CASES: [Case; 5] = [
    Case { name: "Small person", input: Measurements { age: 20.0, height: 160.0, weight: 50.0 } },
    Case { name: "Medium person", input: Measurements { age: 25.0, height: 170.0, weight: 65.0 } },
    Case { name: "Large person", input: Measurements { age: 30.0, height: 185.0, weight: 90.0 } },
    Case {
        name: "Potential outlier (heavy child)",
        input: Measurements { age: 12.0, height: 120.0, weight: 75.0 },
    },
    Case {
        name: "Potential outlier (very light)",
        input: Measurements { age: 20.0, height: 180.0, weight: 45.0 },
    },
];

fn load_config() -> Result<PipelineConfig, Box<dyn Error>> {
    let config = if Path::new(CONFIG_FILE).exists() {
        PipelineConfig::from_toml(&fs::read_to_string(CONFIG_FILE)?)?
    } else {
        PipelineConfig::default()
    };
    Ok(config.with_env_overrides())
}

fn print_case(i: usize, case: &Case, features: &StandardizedFeatures, report: &OutlierReport) {
    let rule = "─".repeat(80);
    println!("\n{rule}\nCase {}: {}\n{rule}", i + 1, case.name);
    println!(
        "Input: age={}, height={}, weight={}",
        case.input.age, case.input.height, case.input.weight
    );

    println!("\nOutlier detection (IQR):");
    for entry in report.iter() {
        println!("  {:8} = {:6.2} | {}", entry.feature.name(), entry.value, entry.status);
        if let Some(b) = entry.bounds {
            println!("           valid range: [{:.2}, {:.2}]", b.lower, b.upper);
        }
    }

    println!("\nStandardized values{}:", if features.normalized { "" } else { " (raw, no scaler)" });
    for feature in Feature::ALL {
        println!("  {:8} = {:7.3}", feature.name(), features.get(feature));
    }

    if report.has_outliers() {
        println!("\n  WARNING: this input contains outliers");
    } else {
        println!("\n  all values within normal range");
    }
}

fn main() {
    let config = match load_config() {
        Ok(c) => c,
        Err(e) => return eprintln!("Something went wrong reading config: {e}"),
    };
    logging::init_tracing(&config.log_filter);

    let now = Instant::now();
    let pipeline = SizePreprocessingPipeline::from_config(&config);
    let health = pipeline.health();
    if let Some(normalizer) = pipeline.normalizer() {
        let fitted = normalizer.to_fitted();
        println!("scaler mean: {:?}, scale: {:?}", fitted.mean, fitted.scale);
    }
    println!(
        "reference statistics: {}, scaler: {}",
        if health.reference_statistics { "loaded" } else { "absent" },
        if health.normalizer { "loaded" } else { "absent" },
    );

    let results: Vec<_> = CASES
        .par_iter()
        .map(|case| {
            let m = case.input;
            m.validate().map(|_| pipeline.prepare(m.age, m.height, m.weight))
        })
        .collect();

    for (i, (case, result)) in CASES.iter().zip(&results).enumerate() {
        match result {
            Ok((features, report)) => print_case(i, case, features, report),
            Err(e) => println!("\nCase {} rejected: {e}", i + 1),
        }
    }

    println!("\nWithout scaler (expect a warning):");
    let degraded = SizePreprocessingPipeline::new(
        pipeline.reference_statistics().cloned().into(),
        Artifact::Absent,
    );
    let (features, _) = degraded.prepare(25.0, 170.0, 65.0);
    println!("  standardized = {:?}, normalized = {}", features.values, features.normalized);

    println!("\nSize codes:");
    for code in 1..=7 {
        println!("  {code} -> {}", pipeline.label_for(code));
    }

    let elapsed = now.elapsed();
    println!("Elapsed: {:.2?}", elapsed);
}
