//! Paired reshaping and the Wilcoxon signed-rank test
//!
//! The observation table is pivoted to one row per subject with one column per
//! condition. Exactly two conditions and complete pairing are required; a
//! subject missing either condition is an error rather than silently dropped.
//!
//! The test is two-sided, drops zero differences before ranking and applies no
//! continuity correction. The exact null distribution is used for up to
//! [`EXACT_MAX_N`] pairs when there are no zero differences and no tied
//! magnitudes; otherwise the tie-corrected normal approximation is used.

use crate::error::{AnalysisError, Result};
use crate::normalize::ObservationTable;
use log::debug;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

/// Largest number of pairs for which the exact distribution is enumerated
pub const EXACT_MAX_N: usize = 50;

/// Subjects as rows, the two conditions as columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedTable {
    pub conditions: [String; 2],
    pub subjects: Vec<String>,
    pub first: Vec<f64>,
    pub second: Vec<f64>,
}

impl PairedTable {
    /// Pivot observations into one row per subject
    pub fn pivot(table: &ObservationTable) -> Result<Self> {
        if table.conditions.len() != 2 {
            return Err(AnalysisError::ConditionCount {
                found: table.conditions.len(),
                levels: table.conditions.levels().to_vec(),
            });
        }

        let mut cells: Vec<[Option<f64>; 2]> = vec![[None, None]; table.subjects.len()];
        for obs in &table.rows {
            let cell = &mut cells[obs.subject][obs.condition];
            if cell.is_some() {
                return Err(AnalysisError::DuplicateObservation {
                    subject: table.subjects.label(obs.subject).to_string(),
                    condition: table.conditions.label(obs.condition).to_string(),
                });
            }
            *cell = Some(obs.value);
        }

        let mut subjects = Vec::with_capacity(cells.len());
        let mut first = Vec::with_capacity(cells.len());
        let mut second = Vec::with_capacity(cells.len());

        for (code, cell) in cells.iter().enumerate() {
            match cell {
                [Some(a), Some(b)] => {
                    subjects.push(table.subjects.label(code).to_string());
                    first.push(*a);
                    second.push(*b);
                }
                [None, _] | [_, None] => {
                    let missing = if cell[0].is_none() { 0 } else { 1 };
                    return Err(AnalysisError::IncompletePair {
                        subject: table.subjects.label(code).to_string(),
                        condition: table.conditions.label(missing).to_string(),
                    });
                }
            }
        }

        Ok(PairedTable {
            conditions: [
                table.conditions.label(0).to_string(),
                table.conditions.label(1).to_string(),
            ],
            subjects,
            first,
            second,
        })
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Signed-rank test between the first and second condition columns
    pub fn wilcoxon(&self) -> Result<WilcoxonResult> {
        wilcoxon_signed_rank(&self.first, &self.second)
    }
}

/// How the p-value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WilcoxonMethod {
    Exact,
    NormalApprox,
}

/// Result of a two-sided Wilcoxon signed-rank test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WilcoxonResult {
    /// min(R+, R-)
    pub statistic: f64,
    pub p_value: f64,
    pub r_plus: f64,
    pub r_minus: f64,
    /// Non-zero differences that entered the ranking
    pub n_used: usize,
    pub n_zero: usize,
    pub method: WilcoxonMethod,
    /// Standardized statistic, only for the normal approximation
    pub z: Option<f64>,
}

/// Two-sided Wilcoxon signed-rank test on paired samples `x - y`
pub fn wilcoxon_signed_rank(x: &[f64], y: &[f64]) -> Result<WilcoxonResult> {
    if x.len() != y.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "paired samples differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(AnalysisError::DegenerateTest("no pairs".into()));
    }

    let diffs: Vec<f64> = x.iter().zip(y).map(|(a, b)| a - b).collect();
    if diffs.iter().any(|d| !d.is_finite()) {
        return Err(AnalysisError::InvalidInput(
            "differences must be finite".into(),
        ));
    }

    let nonzero: Vec<f64> = diffs.iter().copied().filter(|d| *d != 0.0).collect();
    let n_zero = diffs.len() - nonzero.len();
    let n = nonzero.len();
    if n == 0 {
        return Err(AnalysisError::DegenerateTest(
            "all paired differences are zero".into(),
        ));
    }

    let magnitudes: Vec<f64> = nonzero.iter().map(|d| d.abs()).collect();
    let (ranks, tie_sizes) = average_ranks(&magnitudes);

    // fold from +0.0: an empty f64 sum is -0.0 and would print as "-0"
    let rank_sum = |positive: bool| {
        nonzero
            .iter()
            .zip(&ranks)
            .filter(|(d, _)| (**d > 0.0) == positive)
            .fold(0.0, |acc, (_, r)| acc + r)
    };
    let r_plus = rank_sum(true);
    let r_minus = rank_sum(false);
    let statistic = r_plus.min(r_minus);

    let has_ties = tie_sizes.iter().any(|&t| t > 1);
    let result = if diffs.len() <= EXACT_MAX_N && n_zero == 0 && !has_ties {
        WilcoxonResult {
            statistic,
            p_value: exact_two_sided_p(n, r_plus),
            r_plus,
            r_minus,
            n_used: n,
            n_zero,
            method: WilcoxonMethod::Exact,
            z: None,
        }
    } else {
        let (z, p_value) = normal_approx(n, statistic, &tie_sizes)?;
        WilcoxonResult {
            statistic,
            p_value,
            r_plus,
            r_minus,
            n_used: n,
            n_zero,
            method: WilcoxonMethod::NormalApprox,
            z: Some(z),
        }
    };

    debug!(
        "wilcoxon: n={} zeros={} R+={} R-={} method={:?} p={}",
        n, n_zero, r_plus, r_minus, result.method, result.p_value
    );
    Ok(result)
}

/// Average ranks (1-based) of `values`, plus the size of every tie group
fn average_ranks(values: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_sizes = Vec::new();
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // Positions i..j share ranks i+1..=j
        let rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = rank;
        }
        tie_sizes.push(j - i);
        i = j;
    }

    (ranks, tie_sizes)
}

/// Number of sign assignments giving each value of R+ for ranks 1..=n
fn signed_rank_counts(n: usize) -> Vec<f64> {
    let max = n * (n + 1) / 2;
    let mut counts = vec![0.0; max + 1];
    counts[0] = 1.0;
    for rank in 1..=n {
        for total in (rank..=max).rev() {
            counts[total] += counts[total - rank];
        }
    }
    counts
}

fn exact_two_sided_p(n: usize, r_plus: f64) -> f64 {
    let counts = signed_rank_counts(n);
    let total = 2f64.powi(n as i32);
    // No ties, so R+ is an integer
    let r = r_plus.round() as usize;

    let lower: f64 = counts[..=r].iter().sum::<f64>() / total;
    let upper: f64 = counts[r..].iter().sum::<f64>() / total;
    (2.0 * lower.min(upper)).min(1.0)
}

fn normal_approx(n: usize, statistic: f64, tie_sizes: &[usize]) -> Result<(f64, f64)> {
    let n = n as f64;
    let mean = n * (n + 1.0) / 4.0;
    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let variance = n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - tie_term / 48.0;
    if variance <= 0.0 {
        return Err(AnalysisError::DegenerateTest(
            "zero variance under the null".into(),
        ));
    }

    let z = (statistic - mean) / variance.sqrt();
    let p = 2.0 * standard_normal()?.sf(z.abs());
    Ok((z, p.min(1.0)))
}

pub(crate) fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| AnalysisError::InvalidInput(e.to_string()))
}

/// Pivot the table and run the signed-rank test
pub fn paired_test(table: &ObservationTable) -> Result<(PairedTable, WilcoxonResult)> {
    let paired = PairedTable::pivot(table)?;
    let result = paired.wilcoxon()?;
    Ok((paired, result))
}
