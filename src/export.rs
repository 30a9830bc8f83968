//! Result export
//!
//! Serializes the run matrix and consensus verdicts to a tab-separated
//! table: one column per experiment (whose first cell, on the synthetic
//! `crossval_res` row, is that experiment's cross-validation score) and
//! four trailing summary columns. Thin boundary layer; all aggregation
//! happens upstream.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::consensus::ConsensusReport;
use crate::ensemble::RunMatrix;
use crate::table::FeatureTable;
use crate::{Error, Result};

/// Synthetic index label of the score row.
pub const SCORE_ROW_LABEL: &str = "crossval_res";

/// Name of experiment column `i`.
#[must_use]
pub fn experiment_column_name(i: usize) -> String {
    format!("exp_with_feature_sel_{i}")
}

/// Write the run matrix and verdicts to a file.
///
/// # Errors
///
/// Returns [`Error::Storage`] on a record-count mismatch between table,
/// matrix and report, and [`Error::Io`] on write failure.
pub fn export_tsv<P: AsRef<Path>>(
    path: P,
    table: &FeatureTable,
    matrix: &RunMatrix,
    report: &ConsensusReport,
) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_results(BufWriter::new(file), table, matrix, report)?;
    tracing::info!(path = %path.as_ref().display(), "exported labelings");
    Ok(())
}

/// Write the output table to any writer. See [`export_tsv`].
///
/// # Errors
///
/// Same conditions as [`export_tsv`].
pub fn write_results<W: Write>(
    mut out: W,
    table: &FeatureTable,
    matrix: &RunMatrix,
    report: &ConsensusReport,
) -> Result<()> {
    if matrix.num_records() != table.num_records()
        || report.verdicts().len() != table.num_records()
    {
        return Err(Error::Storage(format!(
            "shape mismatch: table has {} records, matrix {}, report {}",
            table.num_records(),
            matrix.num_records(),
            report.verdicts().len()
        )));
    }

    // Header; the index column is unnamed
    for i in 0..matrix.len() {
        write!(out, "\t{}", experiment_column_name(i))?;
    }
    writeln!(out, "\tstatus\tstable\tstatus_best\tstable_best")?;

    // Score row; verdict cells stay empty on the synthetic row
    write!(out, "{SCORE_ROW_LABEL}")?;
    for result in matrix.results() {
        write!(out, "\t{}", result.score())?;
    }
    writeln!(out, "\t\t\t\t")?;

    for (row, record_id) in table.record_ids().iter().enumerate() {
        write!(out, "{record_id}")?;
        for result in matrix.results() {
            write!(out, "\t{}", result.predictions()[row])?;
        }
        let verdict = &report.verdicts()[row];
        writeln!(
            out,
            "\t{}\t{}\t{}\t{}",
            verdict.status, verdict.stable, verdict.status_best, verdict.stable_best
        )?;
    }
    out.flush()?;
    Ok(())
}
