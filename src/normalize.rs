//! Normalization of a loaded table into typed observations
//!
//! The three configured source columns become the canonical subject (`s`),
//! condition (`A`) and value (`y`). Subject and condition are categorical:
//! each observation stores a code into a sorted list of levels.

use crate::config::ColumnMapping;
use crate::dataload::RawTable;
use crate::error::{AnalysisError, Result};
use log::debug;
use serde::Serialize;
use std::cmp::Ordering;

/// Canonical column names
pub const SUBJECT: &str = "s";
pub const CONDITION: &str = "A";
pub const VALUE: &str = "y";

/// A finite set of labels with a fixed order
///
/// Levels are ordered numerically when every label parses as a number and
/// lexicographically otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Categorical {
    levels: Vec<String>,
}

impl Categorical {
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut levels: Vec<String> = labels.into_iter().map(String::from).collect();

        let numeric: Option<Vec<f64>> = levels.iter().map(|l| l.parse::<f64>().ok()).collect();
        match numeric {
            Some(_) => levels.sort_by(|a, b| {
                let (x, y) = (a.parse::<f64>().unwrap_or(0.0), b.parse::<f64>().unwrap_or(0.0));
                x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b))
            }),
            None => levels.sort(),
        }
        levels.dedup();

        Categorical { levels }
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn code(&self, label: &str) -> Option<usize> {
        self.levels.iter().position(|l| l == label)
    }

    pub fn label(&self, code: usize) -> &str {
        &self.levels[code]
    }
}

/// One row: subject code, condition code, measured value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub subject: usize,
    pub condition: usize,
    pub value: f64,
}

/// Observations with their categorical dictionaries, sorted by (condition, subject)
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    pub subjects: Categorical,
    pub conditions: Categorical,
    pub rows: Vec<Observation>,
}

impl ObservationTable {
    /// Rename, type and sort a raw table
    pub fn from_raw(table: &RawTable, columns: &ColumnMapping) -> Result<Self> {
        let s_idx = table.column_index(&columns.subject)?;
        let a_idx = table.column_index(&columns.condition)?;
        let y_idx = table.column_index(&columns.value)?;

        let mut parsed = Vec::with_capacity(table.len());
        for record in &table.records {
            let raw_value = &record.fields[y_idx];
            let value: f64 = raw_value.parse().map_err(|_| AnalysisError::InvalidValue {
                column: columns.value.clone(),
                value: raw_value.clone(),
                line: record.line,
            })?;
            parsed.push((
                record.fields[s_idx].as_str(),
                record.fields[a_idx].as_str(),
                value,
            ));
        }

        let table = Self::from_labelled(&parsed);
        debug!(
            "normalized {} observations: {} subjects, conditions {:?}",
            table.rows.len(),
            table.subjects.len(),
            table.conditions.levels()
        );

        Ok(table)
    }

    /// Build a table directly from labelled triples
    pub fn from_triples<S: AsRef<str>, A: AsRef<str>>(triples: &[(S, A, f64)]) -> Self {
        let labelled: Vec<(&str, &str, f64)> = triples
            .iter()
            .map(|(s, a, value)| (s.as_ref(), a.as_ref(), *value))
            .collect();
        Self::from_labelled(&labelled)
    }

    /// Code the labels and order rows by (condition, subject)
    fn from_labelled(labelled: &[(&str, &str, f64)]) -> Self {
        let subjects = Categorical::from_labels(labelled.iter().map(|(s, _, _)| *s));
        let conditions = Categorical::from_labels(labelled.iter().map(|(_, a, _)| *a));

        let mut rows: Vec<Observation> = labelled
            .iter()
            .map(|&(s, a, value)| Observation {
                // Both labels came from the rows, so the lookups cannot miss
                subject: subjects.code(s).unwrap_or_default(),
                condition: conditions.code(a).unwrap_or_default(),
                value,
            })
            .collect();
        rows.sort_by_key(|o| (o.condition, o.subject));

        ObservationTable {
            subjects,
            conditions,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of every observation with the given condition code, in row order
    pub fn values_for(&self, condition: usize) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|o| o.condition == condition)
            .map(|o| o.value)
            .collect()
    }
}
