//! Consensus vote aggregation
//!
//! Turns the run matrix's N noisy label columns into one verdict per
//! record. Two pure voting policies over a per-record frequency counter:
//!
//! - **Borderline**: labels bucket into still-ish ({"s","h","sh"}) and
//!   living-ish (everything else); a 95% dominance threshold decides
//!   "living" or "still", anything closer is "borderline".
//! - **Stable**: the single most frequent label wins if it holds more
//!   than 95% of all votes, otherwise "-" (undetermined).
//!
//! Both policies are computed twice per record: over every experiment,
//! and over only the experiments whose cross-validation score exceeds
//! the confidence threshold.

use std::collections::HashMap;

use crate::ensemble::RunMatrix;

/// Dominance fraction a bucket or label must exceed to win a verdict.
pub const DOMINANCE: f64 = 0.95;

/// Pinned contract for an empty counter (no experiment contributed a
/// vote, e.g. an unreachable confidence threshold): the borderline
/// policy returns this value instead of guessing.
pub const UNDETERMINED: &str = "undetermined";

/// Per-record label frequencies over a set of experiment columns.
pub type LabelCounter = HashMap<String, usize>;

/// Four verdicts for one record plus the counter they came from.
#[derive(Debug, Clone)]
pub struct RecordVerdict {
    /// Label frequencies over all experiments
    pub counts: LabelCounter,
    /// Borderline policy over all experiments
    pub status: String,
    /// Stable policy over all experiments
    pub stable: String,
    /// Borderline policy over confidence-filtered experiments
    pub status_best: String,
    /// Stable policy over confidence-filtered experiments
    pub stable_best: String,
}

/// Consensus verdicts for a completed run matrix.
///
/// Derived, recomputable artifact: it may be discarded and rebuilt from
/// the run matrix at any time.
#[derive(Debug, Clone)]
pub struct ConsensusReport {
    verdicts: Vec<RecordVerdict>,
    filtered: Vec<usize>,
    representative_score: Option<f64>,
}

impl ConsensusReport {
    /// Per-record verdicts, in table order.
    #[must_use]
    pub fn verdicts(&self) -> &[RecordVerdict] {
        &self.verdicts
    }

    /// Indices of experiments whose score exceeded the threshold.
    #[must_use]
    pub fn filtered_experiments(&self) -> &[usize] {
        &self.filtered
    }

    /// The diagnostic score surfaced per record.
    ///
    /// This is specifically experiment 0's cross-validation score, a
    /// layout artifact of the original run-matrix export kept for
    /// compatibility. It is one run's score, not the ensemble's
    /// confidence.
    #[must_use]
    pub const fn representative_score(&self) -> Option<f64> {
        self.representative_score
    }
}

/// Borderline policy over a label counter.
///
/// Buckets {"s","h","sh"} as "-" and everything else as "+"; whichever
/// bucket exceeds [`DOMINANCE`] of the total wins ("living" or "still"),
/// otherwise the record is "borderline". An empty counter yields
/// [`UNDETERMINED`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn borderline_verdict(counts: &LabelCounter) -> &'static str {
    let mut living = 0usize;
    let mut still = 0usize;
    for (label, count) in counts {
        if matches!(label.as_str(), "s" | "h" | "sh") {
            still += count;
        } else {
            living += count;
        }
    }
    let total = living + still;
    if total == 0 {
        return UNDETERMINED;
    }
    let bar = DOMINANCE * total as f64;
    if living as f64 > bar {
        "living"
    } else if still as f64 > bar {
        "still"
    } else {
        "borderline"
    }
}

/// Stable policy over a label counter.
///
/// Returns the most frequent label if its count exceeds [`DOMINANCE`] of
/// all votes, else "-". An empty counter yields "-".
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn stable_verdict(counts: &LabelCounter) -> String {
    let total: usize = counts.values().sum();
    if total == 0 {
        return "-".to_string();
    }
    // Count-descending, label-ascending for a deterministic top entry
    let mut sorted: Vec<(&String, &usize)> = counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let (top_label, &top_count) = sorted[0];
    if top_count as f64 > DOMINANCE * total as f64 {
        top_label.clone()
    } else {
        "-".to_string()
    }
}

/// Compute consensus verdicts for every record in the run matrix.
///
/// `threshold` is the cross-validation score cutoff for the filtered
/// policies. Values above 1.0 are accepted here (they make the filter
/// unreachable and exercise the empty-counter contract); configuration
/// validation is the caller's concern.
#[must_use]
pub fn aggregate(matrix: &RunMatrix, threshold: f64) -> ConsensusReport {
    let filtered: Vec<usize> = matrix
        .results()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.score() > threshold)
        .map(|(i, _)| i)
        .collect();
    tracing::debug!(
        all = matrix.len(),
        filtered = filtered.len(),
        threshold,
        "aggregating consensus verdicts"
    );

    let mut verdicts = Vec::with_capacity(matrix.num_records());
    for record in 0..matrix.num_records() {
        let mut counts: LabelCounter = HashMap::new();
        for result in matrix.results() {
            *counts
                .entry(result.predictions()[record].clone())
                .or_default() += 1;
        }
        let mut best_counts: LabelCounter = HashMap::new();
        for &i in &filtered {
            *best_counts
                .entry(matrix.results()[i].predictions()[record].clone())
                .or_default() += 1;
        }

        verdicts.push(RecordVerdict {
            status: borderline_verdict(&counts).to_string(),
            stable: stable_verdict(&counts),
            status_best: borderline_verdict(&best_counts).to_string(),
            stable_best: stable_verdict(&best_counts),
            counts,
        });
    }

    ConsensusReport {
        verdicts,
        filtered,
        representative_score: matrix.results().first().map(|r| r.score()),
    }
}

/// Log end-of-run summary statistics: score distribution over all and
/// filtered experiments, and verdict frequency counts.
pub fn log_summary(matrix: &RunMatrix, report: &ConsensusReport, threshold: f64) {
    let scores: Vec<f64> = matrix.results().iter().map(|r| r.score()).collect();
    tracing::debug!(
        "crossvalidation results (all): {}",
        describe_scores(&scores)
    );
    let best_scores: Vec<f64> = report
        .filtered_experiments()
        .iter()
        .map(|&i| matrix.results()[i].score())
        .collect();
    tracing::info!(
        threshold,
        "crossvalidation results (filtered by limit): {}",
        describe_scores(&best_scores)
    );

    tracing::debug!(
        "statuses based on all labelings: {:?}",
        value_counts(report.verdicts(), |v| &v.status)
    );
    tracing::debug!(
        "stable languages based on all labelings: {:?}",
        value_counts(report.verdicts(), |v| &v.stable)
    );
    tracing::info!(
        "statuses based on labelings (where crossvalidation exceeds limit): {:?}",
        value_counts(report.verdicts(), |v| &v.status_best)
    );
    tracing::info!(
        "stable languages based on labelings (where crossvalidation exceeds limit): {:?}",
        value_counts(report.verdicts(), |v| &v.stable_best)
    );
}

fn describe_scores(scores: &[f64]) -> String {
    if scores.is_empty() {
        return "count=0".to_string();
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    format!(
        "count={} mean={mean:.4} min={min:.4} max={max:.4}",
        scores.len()
    )
}

fn value_counts<'a, F>(verdicts: &'a [RecordVerdict], get: F) -> HashMap<&'a str, usize>
where
    F: Fn(&'a RecordVerdict) -> &'a String,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for verdict in verdicts {
        *counts.entry(get(verdict).as_str()).or_default() += 1;
    }
    counts
}
