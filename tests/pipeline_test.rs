//! End-to-end pipeline tests: TSV in, verdict table out.

use std::io::Write;

use lang_vitality::config::Config;
use lang_vitality::consensus::aggregate;
use lang_vitality::ensemble::run_ensemble;
use lang_vitality::export::{export_tsv, SCORE_ROW_LABEL};
use lang_vitality::table::FeatureTable;

/// Build a quota-exact scenario as a TSV: 5 g-seeds, 20 each of t/v/h, 80
/// s-seeds and 10 unlabeled records. The `signal` column separates the
/// 2-class coarsening perfectly; `noise` carries nothing.
fn scenario_tsv() -> String {
    let mut tsv = String::from("code\tsignal\tnoise\tseed_label\n");
    let mut push_rows = |label: &str, count: usize, signal: f64| {
        for i in 0..count {
            tsv.push_str(&format!(
                "{label}{i}\t{}\t0.0\t{label}\n",
                signal + 0.01 * i as f64 * signal.signum()
            ));
        }
    };
    push_rows("g", 5, 2.0);
    push_rows("t", 20, 2.0);
    push_rows("v", 20, 2.0);
    push_rows("h", 20, -2.0);
    push_rows("s", 80, -2.0);
    for i in 0..10 {
        let signal = if i % 2 == 0 { 2.5 } else { -2.5 };
        tsv.push_str(&format!("u{i}\t{signal}\t0.0\t-\n"));
    }
    tsv
}

#[test]
fn test_end_to_end_single_experiment() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("preprocessed.tsv");
    let output = dir.path().join("labelings.tsv");
    std::fs::File::create(&input)
        .unwrap()
        .write_all(scenario_tsv().as_bytes())
        .unwrap();

    let config = Config {
        experiment_count: 1,
        class_counts: 2,
        ..Config::default()
    };
    config.validate().unwrap();

    let table = FeatureTable::load_tsv(&input, config.use_status_features).unwrap();
    assert_eq!(table.num_records(), 155);
    assert_eq!(table.seed_count(), 145);

    let matrix = run_ensemble(&table, &config).unwrap();
    assert_eq!(matrix.len(), 1);

    let report = aggregate(&matrix, config.confidence_threshold);
    export_tsv(&output, &table, &matrix, &report).unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    // header + crossval_res row + one row per record
    assert_eq!(lines.len(), 2 + table.num_records());

    let header: Vec<&str> = lines[0].split('\t').collect();
    // exactly 1 experiment column plus the four summary columns
    assert_eq!(
        header,
        ["", "exp_with_feature_sel_0", "status", "stable", "status_best", "stable_best"]
    );

    let score_row: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(score_row[0], SCORE_ROW_LABEL);
    let score: f64 = score_row[1].parse().unwrap();
    assert!((0.0..=1.0).contains(&score));

    // Verdict columns populated for every record, seeds and unlabeled
    for line in &lines[2..] {
        let cells: Vec<&str> = line.split('\t').collect();
        assert_eq!(cells.len(), header.len());
        for cell in &cells[2..] {
            assert!(!cell.is_empty(), "empty verdict cell in row {}", cells[0]);
        }
    }
}

#[test]
fn test_ensemble_consensus_on_separable_data() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("preprocessed.tsv");
    std::fs::File::create(&input)
        .unwrap()
        .write_all(scenario_tsv().as_bytes())
        .unwrap();

    let config = Config {
        experiment_count: 10,
        ..Config::default()
    };
    let table = FeatureTable::load_tsv(&input, false).unwrap();
    let matrix = run_ensemble(&table, &config).unwrap();
    let report = aggregate(&matrix, config.confidence_threshold);

    // Separable data: every experiment scores 1.0, so filtered and
    // unfiltered verdicts agree, and the unlabeled rows resolve by
    // their signal sign.
    let ids = table.record_ids();
    for (row, verdict) in report.verdicts().iter().enumerate() {
        if ids[row].starts_with('u') {
            let idx: usize = ids[row][1..].parse().unwrap();
            let expected = if idx % 2 == 0 { "living" } else { "still" };
            assert_eq!(verdict.status, expected, "record {}", ids[row]);
            assert_eq!(verdict.status_best, expected);
        }
    }
    // Representative diagnostic score is experiment 0's, by contract
    let first = matrix.results()[0].score();
    assert_eq!(report.representative_score(), Some(first));
}

#[test]
fn test_unreachable_threshold_degrades_to_undetermined() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("preprocessed.tsv");
    std::fs::File::create(&input)
        .unwrap()
        .write_all(scenario_tsv().as_bytes())
        .unwrap();

    let table = FeatureTable::load_tsv(&input, false).unwrap();
    let config = Config {
        experiment_count: 3,
        ..Config::default()
    };
    let matrix = run_ensemble(&table, &config).unwrap();

    // 1.1 filters out every experiment: filtered counters are empty for
    // every record, exercising the pinned total==0 contract.
    let report = aggregate(&matrix, 1.1);
    assert!(report.filtered_experiments().is_empty());
    for verdict in report.verdicts() {
        assert_eq!(verdict.status_best, "undetermined");
        assert_eq!(verdict.stable_best, "-");
        // Unfiltered verdicts are unaffected
        assert_ne!(verdict.status, "undetermined");
    }
}

#[test]
fn test_missing_seed_class_fails_loud() {
    // No 'g' rows at all: the sampler cannot fill its quota
    let mut tsv = String::from("code\tsignal\tseed_label\n");
    for i in 0..100 {
        tsv.push_str(&format!("s{i}\t-2.0\ts\n"));
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.tsv");
    std::fs::File::create(&input)
        .unwrap()
        .write_all(tsv.as_bytes())
        .unwrap();

    let table = FeatureTable::load_tsv(&input, false).unwrap();
    let config = Config {
        experiment_count: 1,
        ..Config::default()
    };
    let err = run_ensemble(&table, &config).unwrap_err();
    assert!(err.to_string().contains("Insufficient seeds"));
}
