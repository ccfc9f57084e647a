//! Synthetic paired-design dataset generator
//!
//! Each subject gets a random baseline; every condition adds its own shift and
//! independent measurement noise. Output rows use the configured source column
//! names so the file round-trips through the loader unchanged.

use crate::config::ColumnMapping;
use crate::error::{AnalysisError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use statrs::distribution::Normal;
use std::path::Path;

/// True parameters used to generate synthetic data
#[derive(Debug, Clone, PartialEq)]
pub struct TrueParams {
    pub baseline_mean: f64,
    pub subject_sd: f64, // SD of subject baselines
    pub noise_sd: f64,   // Within-subject measurement SD
    /// Condition labels with the mean shift each adds to the baseline
    pub conditions: Vec<(String, f64)>,
}

impl Default for TrueParams {
    fn default() -> Self {
        Self {
            baseline_mean: 100.0,
            subject_sd: 15.0,
            noise_sd: 5.0,
            conditions: vec![("A1".to_string(), 0.0), ("A2".to_string(), 8.0)],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    pub subject: usize,
    pub condition: String,
    pub value: f64,
}

fn normal(mean: f64, sd: f64) -> Result<Normal> {
    Normal::new(mean, sd).map_err(|e| AnalysisError::InvalidInput(e.to_string()))
}

/// Generate one row per subject and condition
pub fn generate_dataset(n_subjects: usize, params: &TrueParams, seed: u64) -> Result<Vec<DataRow>> {
    use rand::distributions::Distribution;

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let baseline = normal(params.baseline_mean, params.subject_sd)?;
    let noise = normal(0.0, params.noise_sd)?;

    let mut rows = Vec::with_capacity(n_subjects * params.conditions.len());
    for subject in 1..=n_subjects {
        let b = baseline.sample(&mut rng);
        for (label, shift) in &params.conditions {
            rows.push(DataRow {
                subject,
                condition: label.clone(),
                value: b + shift + noise.sample(&mut rng),
            });
        }
    }

    Ok(rows)
}

/// Write dataset to CSV file
pub fn write_csv(path: &Path, columns: &ColumnMapping, data: &[DataRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([&columns.subject, &columns.condition, &columns.value])?;
    for row in data {
        writer.write_record([
            row.subject.to_string(),
            row.condition.clone(),
            format!("{:.3}", row.value),
        ])?;
    }
    writer.flush().map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
