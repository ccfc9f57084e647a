//! End-to-end runs of the analysis pipeline over CSV files on disk

use pairstat::config::AnalysisConfig;
use pairstat::paired::WilcoxonMethod;
use pairstat::{analyze_pairs, load_observations, run_analysis, AnalysisError};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write csv");
    file
}

fn no_plot() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.plot.enabled = false;
    config
}

#[test]
fn test_two_subject_example() {
    let file = csv_file(
        "参加者ID,独立変数,従属変数\n\
         1,X,10\n\
         1,Y,12\n\
         2,X,8\n\
         2,Y,9\n",
    );

    let report = run_analysis(file.path(), &no_plot()).expect("analysis");

    assert_eq!(report.n_observations, 4);
    assert_eq!(report.summary.groups.len(), 2);
    let x = &report.summary.groups[0];
    let y = &report.summary.groups[1];
    assert_eq!((x.condition.as_str(), x.n), ("X", 2));
    assert!((x.mean - 9.0).abs() < 1e-12);
    assert_eq!((y.condition.as_str(), y.n), ("Y", 2));
    assert!((y.mean - 10.5).abs() < 1e-12);

    assert_eq!(report.test.n_subjects, 2);
    assert_eq!(report.test.wilcoxon.method, WilcoxonMethod::Exact);
    assert!((report.test.wilcoxon.p_value - 0.5).abs() < 1e-12);
}

#[test]
fn test_standard_error_for_every_group() {
    let file = csv_file(
        "参加者ID,独立変数,従属変数\n\
         1,pre,3.2\n1,post,4.1\n\
         2,pre,2.9\n2,post,3.3\n\
         3,pre,4.4\n3,post,5.0\n\
         4,pre,3.8\n4,post,3.6\n\
         5,pre,2.5\n5,post,3.9\n",
    );

    let report = run_analysis(file.path(), &no_plot()).expect("analysis");

    for group in &report.summary.groups {
        let expected = group.sd / (group.n as f64).sqrt();
        assert!((group.se - expected).abs() < 1e-12, "{}", group.condition);
    }
    let p = report.test.wilcoxon.p_value;
    assert!((0.0..=1.0).contains(&p));
    assert!(report.test.wilcoxon.statistic.is_finite());
}

#[test]
fn test_three_conditions_fail_test_step() {
    let file = csv_file(
        "参加者ID,独立変数,従属変数\n\
         1,a,1\n1,b,2\n1,c,3\n\
         2,a,2\n2,b,3\n2,c,4\n",
    );
    let config = no_plot();

    // Summary still works for any number of conditions
    let table = load_observations(file.path(), &config).expect("load");
    assert_eq!(pairstat::summary::describe(&table).groups.len(), 3);

    assert!(matches!(
        analyze_pairs(&table),
        Err(AnalysisError::ConditionCount { found: 3, .. })
    ));
    assert!(run_analysis(file.path(), &config).is_err());
}

#[test]
fn test_incomplete_pairing_fails() {
    let file = csv_file(
        "参加者ID,独立変数,従属変数\n\
         1,X,10\n1,Y,12\n2,X,8\n",
    );
    let err = run_analysis(file.path(), &no_plot()).unwrap_err();
    assert!(matches!(err, AnalysisError::IncompletePair { .. }));
}

#[test]
fn test_missing_file() {
    let err = run_analysis(Path::new("/definitely/not/here.csv"), &no_plot()).unwrap_err();
    assert!(matches!(err, AnalysisError::Io { .. }));
}

#[test]
fn test_custom_columns_and_delimiter() {
    let file = csv_file("id;cond;rt\n1;A1;0.51\n1;A2;0.62\n2;A1;0.48\n2;A2;0.55\n3;A1;0.70\n3;A2;0.66\n");
    let mut config = no_plot();
    config.delimiter = ';';
    config.columns.subject = "id".into();
    config.columns.condition = "cond".into();
    config.columns.value = "rt".into();

    let report = run_analysis(file.path(), &config).expect("analysis");
    assert_eq!(report.test.conditions, ["A1".to_string(), "A2".to_string()]);
    assert_eq!(report.test.effect.n, 6);
}

#[test]
fn test_missing_column_is_reported() {
    let file = csv_file("id,cond,rt\n1,X,1\n");
    let err = run_analysis(file.path(), &no_plot()).unwrap_err();
    assert!(matches!(err, AnalysisError::MissingColumn(c) if c == "参加者ID"));
}

#[test]
fn test_demo_dataset_with_config_file() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let mut config = AnalysisConfig::load(root.join("config.json")).expect("config");
    config.plot.enabled = false;

    let report = run_analysis(&root.join("data.csv"), &config).expect("analysis");

    assert_eq!(report.test.n_subjects, 8);
    assert_eq!(report.test.wilcoxon.method, WilcoxonMethod::Exact);
    // Differences A1 - A2: only subject 3 is positive, with the smallest magnitude
    assert_eq!(report.test.wilcoxon.r_plus, 1.0);
    assert_eq!(report.test.wilcoxon.statistic, 1.0);
    // P(R+ <= 1) = 2/256
    assert!((report.test.wilcoxon.p_value - 4.0 / 256.0).abs() < 1e-12);
    assert!(report.test.effect.r > 0.0);
}
