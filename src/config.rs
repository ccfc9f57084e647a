//! Analysis configuration
//!
//! Column mapping, delimiter and plot settings. Every field has a default so a
//! JSON file only needs to name what it changes:
//!
//! ```json
//! { "columns": { "subject": "participant", "condition": "cond", "value": "rt" } }
//! ```

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source column names mapped onto the canonical `s`, `A`, `y`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub subject: String,
    pub condition: String,
    pub value: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            subject: "参加者ID".to_string(),
            condition: "独立変数".to_string(),
            value: "従属変数".to_string(),
        }
    }
}

/// Output image settings for the boxplot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub enabled: bool,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: PathBuf::from("boxplot.png"),
            width: 800,
            height: 600,
            title: "Boxplot with Mean".to_string(),
            x_label: "Condition (A)".to_string(),
            y_label: "Measurement (y)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub columns: ColumnMapping,
    /// Single-byte field delimiter
    pub delimiter: char,
    pub plot: PlotConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            delimiter: ',',
            plot: PlotConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AnalysisConfig = serde_json::from_slice(&bytes)
            .map_err(|e| AnalysisError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(AnalysisError::Config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }

        let c = &self.columns;
        for (role, name) in [
            ("subject", &c.subject),
            ("condition", &c.condition),
            ("value", &c.value),
        ] {
            if name.trim().is_empty() {
                return Err(AnalysisError::Config(format!(
                    "{} column name is empty",
                    role
                )));
            }
        }
        if c.subject == c.condition || c.subject == c.value || c.condition == c.value {
            return Err(AnalysisError::Config(
                "subject, condition and value must map to distinct columns".into(),
            ));
        }

        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(AnalysisError::Config(
                "plot width and height must be positive".into(),
            ));
        }

        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.columns.subject, "参加者ID");
        assert_eq!(config.delimiter_byte(), b',');
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "columns": {{ "subject": "id" }}, "plot": {{ "enabled": false }} }}"#
        )
        .unwrap();

        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.columns.subject, "id");
        assert_eq!(config.columns.condition, "独立変数");
        assert!(!config.plot.enabled);
        assert_eq!(config.plot.width, 800);
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        let mut config = AnalysisConfig::default();
        config.columns.value = config.columns.subject.clone();
        assert!(matches!(config.validate(), Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let config = AnalysisConfig {
            delimiter: '、',
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            AnalysisConfig::load(file.path()),
            Err(AnalysisError::Config(_))
        ));
    }
}
