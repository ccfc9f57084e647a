//! Text and JSON renderings of the two reports

use crate::error::{AnalysisError, Result};
use crate::pipeline::{AnalysisReport, PairedAnalysis};
use crate::summary::DescriptiveSummary;

pub const SUMMARY_HEADING: &str = "▼ 記述統計";
pub const TEST_HEADING: &str = "▼ Wilcoxon 検定結果";
pub const EFFECT_HEADING: &str = "▼ 効果量 Cohen's r";

pub fn format_summary(summary: &DescriptiveSummary) -> String {
    format!("\n{}\n{}", SUMMARY_HEADING, summary)
}

pub fn format_test(analysis: &PairedAnalysis) -> String {
    let w = &analysis.wilcoxon;
    let mut out = format!(
        "\n{}\nstatistic = {}\np-value = {}\n",
        TEST_HEADING, w.statistic, w.p_value
    );

    out.push_str(&format!("\n{}\nr = {}\n", EFFECT_HEADING, analysis.effect.r));
    if analysis.effect.is_unbounded() {
        out.push_str(&format!(
            "(z-score is infinite: p-value {} is below f64 resolution near 0)\n",
            w.p_value
        ));
    }
    out
}

pub fn format_report(report: &AnalysisReport) -> String {
    format!("{}{}", format_summary(&report.summary), format_test(&report.test))
}

/// JSON document of any serializable report part
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AnalysisError::InvalidInput(format!("cannot serialize report: {}", e)))
}
