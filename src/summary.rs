//! Descriptive statistics per condition

use crate::normalize::ObservationTable;
use serde::Serialize;
use std::fmt;

/// Summary statistics for one condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub condition: String,
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation (N-1 denominator); NaN when N = 1
    pub sd: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
    /// Standard error, SD / sqrt(N)
    pub se: f64,
}

/// One row per condition level, in level order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveSummary {
    pub groups: Vec<GroupSummary>,
}

/// Compute the per-condition summary of a normalized table
///
/// Levels with no observations are skipped.
pub fn describe(table: &ObservationTable) -> DescriptiveSummary {
    let groups = (0..table.conditions.len())
        .filter_map(|code| {
            let values = table.values_for(code);
            summarize_group(table.conditions.label(code), &values)
        })
        .collect();

    DescriptiveSummary { groups }
}

fn summarize_group(condition: &str, values: &[f64]) -> Option<GroupSummary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = values.len();
    let mean = mean(values);
    let sd = sample_sd(values, mean);

    Some(GroupSummary {
        condition: condition.to_string(),
        n,
        mean,
        sd,
        min: sorted[0],
        median: quantile(&sorted, 0.5),
        max: sorted[n - 1],
        se: sd / (n as f64).sqrt(),
    })
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_sd(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Quantile of sorted data by linear interpolation between closest ranks
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl fmt::Display for DescriptiveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .groups
            .iter()
            .map(|g| g.condition.chars().count())
            .max()
            .unwrap_or(0)
            .max(1);

        writeln!(
            f,
            "{:<width$}  {:>4}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}",
            "A", "N", "Mean", "SD", "Min", "Median", "Max", "SE"
        )?;
        for g in &self.groups {
            writeln!(
                f,
                "{:<width$}  {:>4}  {:>10.4}  {:>10.4}  {:>10.4}  {:>10.4}  {:>10.4}  {:>10.4}",
                g.condition, g.n, g.mean, g.sd, g.min, g.median, g.max, g.se
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_by_two_example() {
        let table = ObservationTable::from_triples(&[
            ("1", "X", 10.0),
            ("1", "Y", 12.0),
            ("2", "X", 8.0),
            ("2", "Y", 9.0),
        ]);
        let summary = describe(&table);

        assert_eq!(summary.groups.len(), 2);
        assert_eq!(summary.groups[0].condition, "X");
        assert_eq!(summary.groups[0].n, 2);
        assert!((summary.groups[0].mean - 9.0).abs() < 1e-12);
        assert_eq!(summary.groups[1].condition, "Y");
        assert!((summary.groups[1].mean - 10.5).abs() < 1e-12);
    }

    #[test]
    fn test_one_row_per_condition() {
        let table = ObservationTable::from_triples(&[
            ("1", "c", 1.0),
            ("1", "a", 2.0),
            ("1", "b", 3.0),
            ("2", "a", 4.0),
        ]);
        let summary = describe(&table);
        let labels: Vec<&str> = summary.groups.iter().map(|g| g.condition.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_known_statistics() {
        let table = ObservationTable::from_triples(&[
            ("1", "X", 2.0),
            ("2", "X", 4.0),
            ("3", "X", 4.0),
            ("4", "X", 4.0),
            ("5", "X", 5.0),
            ("6", "X", 5.0),
            ("7", "X", 7.0),
            ("8", "X", 9.0),
        ]);
        let g = &describe(&table).groups[0];

        assert_eq!(g.n, 8);
        assert!((g.mean - 5.0).abs() < 1e-12);
        // Sum of squares 32, N-1 = 7
        assert!((g.sd - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(g.min, 2.0);
        assert_eq!(g.max, 9.0);
        assert!((g.median - 4.5).abs() < 1e-12);
        assert!((g.se - g.sd / 8.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_observation_has_undefined_sd() {
        let table = ObservationTable::from_triples(&[("1", "X", 3.0)]);
        let g = &describe(&table).groups[0];
        assert_eq!(g.n, 1);
        assert!(g.sd.is_nan());
        assert!(g.se.is_nan());
        assert_eq!(g.median, 3.0);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.75) - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_display_has_header_and_rows() {
        let table = ObservationTable::from_triples(&[("1", "X", 1.0), ("2", "X", 3.0)]);
        let text = describe(&table).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Median"));
        assert!(lines[1].starts_with('X'));
    }
}
