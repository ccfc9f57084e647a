//! The analysis pipeline: load, normalize, describe, plot, test, effect size

use crate::config::AnalysisConfig;
use crate::dataload::RawTable;
use crate::effect::{cohens_r, EffectSize};
use crate::error::Result;
use crate::normalize::ObservationTable;
use crate::paired::{paired_test, PairedTable, WilcoxonResult};
use crate::plot::render_boxplot;
use crate::summary::{describe, DescriptiveSummary};
use log::info;
use serde::Serialize;
use std::path::Path;

/// Paired-test outcome together with its effect size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedAnalysis {
    pub conditions: [String; 2],
    pub n_subjects: usize,
    pub wilcoxon: WilcoxonResult,
    pub effect: EffectSize,
}

/// Everything a full run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub n_observations: usize,
    pub summary: DescriptiveSummary,
    pub test: PairedAnalysis,
}

/// Load and normalize an input file
pub fn load_observations(path: &Path, config: &AnalysisConfig) -> Result<ObservationTable> {
    let raw = RawTable::from_csv(path, config.delimiter_byte())?;
    ObservationTable::from_raw(&raw, &config.columns)
}

/// Paired test plus Cohen's r over all observations
pub fn analyze_pairs(table: &ObservationTable) -> Result<PairedAnalysis> {
    let (paired, wilcoxon): (PairedTable, WilcoxonResult) = paired_test(table)?;
    let effect = cohens_r(wilcoxon.p_value, table.len())?;

    Ok(PairedAnalysis {
        conditions: paired.conditions.clone(),
        n_subjects: paired.len(),
        wilcoxon,
        effect,
    })
}

/// Run every step in order, rendering the plot when enabled
pub fn run_analysis(path: &Path, config: &AnalysisConfig) -> Result<AnalysisReport> {
    run_analysis_with(path, config, |_| {})
}

/// Like [`run_analysis`], handing the summary to `on_summary` before the plot
/// and the paired test run, so it is reported even when a later step fails
pub fn run_analysis_with<F>(
    path: &Path,
    config: &AnalysisConfig,
    on_summary: F,
) -> Result<AnalysisReport>
where
    F: FnOnce(&DescriptiveSummary),
{
    info!("loading {}", path.display());
    let table = load_observations(path, config)?;

    let summary = describe(&table);
    info!("summarized {} conditions", summary.groups.len());
    on_summary(&summary);

    if config.plot.enabled {
        render_boxplot(&table, &summary, &config.plot)?;
    }

    let test = analyze_pairs(&table)?;
    info!(
        "wilcoxon {} vs {}: statistic={} p={}",
        test.conditions[0], test.conditions[1], test.wilcoxon.statistic, test.wilcoxon.p_value
    );

    Ok(AnalysisReport {
        n_observations: table.len(),
        summary,
        test,
    })
}
