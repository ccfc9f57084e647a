//! pairstat library.
//!
//! Paired-sample analysis of a two-condition experiment: descriptive
//! statistics per condition, a boxplot with means, the Wilcoxon signed-rank
//! test and Cohen's r.

pub mod config;
pub mod datagen;
pub mod dataload;
pub mod effect;
pub mod error;
pub mod normalize;
pub mod paired;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod summary;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use pipeline::{
    analyze_pairs, load_observations, run_analysis, run_analysis_with, AnalysisReport,
};
