//! Feature table storage
//!
//! The table is loaded once at the orchestration boundary, before any
//! experiment runs, and is read-only for the lifetime of a run. Every
//! record carries the same feature dimensionality; this invariant is
//! enforced at ingest so experiments never see ragged data.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::{Array2, ArrayView2};

use crate::label::SeedLabel;
use crate::{Error, Result};

/// Designated status feature columns, dropped unless the run is
/// configured with `use_status_features`.
pub const STATUS_FEATURES: [&str; 2] = ["eth_status", "endangered_aggregated_status"];

/// Column name carrying the raw seed label.
pub const SEED_LABEL_COLUMN: &str = "seed_label";

/// Immutable, record-indexed table of numeric features plus an optional
/// seed label per record.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    record_ids: Vec<String>,
    feature_names: Vec<String>,
    features: Array2<f64>,
    labels: Vec<SeedLabel>,
}

impl FeatureTable {
    /// Build a table from already-parsed parts.
    ///
    /// Useful for tests and synthetic data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if row counts disagree or the feature
    /// matrix width does not match `feature_names`.
    pub fn new(
        record_ids: Vec<String>,
        feature_names: Vec<String>,
        features: Array2<f64>,
        labels: Vec<SeedLabel>,
    ) -> Result<Self> {
        if features.nrows() != record_ids.len() || labels.len() != record_ids.len() {
            return Err(Error::Storage(format!(
                "row count mismatch: {} ids, {} feature rows, {} labels",
                record_ids.len(),
                features.nrows(),
                labels.len()
            )));
        }
        if features.ncols() != feature_names.len() {
            return Err(Error::Storage(format!(
                "feature width mismatch: {} columns, {} names",
                features.ncols(),
                feature_names.len()
            )));
        }
        Ok(Self {
            record_ids,
            feature_names,
            features,
            labels,
        })
    }

    /// Load a table from a tab-separated file.
    ///
    /// First column is the record id, a `seed_label` column carries the
    /// raw label (empty or `-` means unlabeled), every other column is a
    /// numeric feature.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened and
    /// [`Error::Storage`] on malformed content.
    pub fn load_tsv<P: AsRef<Path>>(path: P, use_status_features: bool) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file), use_status_features)
    }

    /// Parse a table from any buffered reader. See [`Self::load_tsv`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] on ragged rows, non-numeric feature
    /// cells, invalid seed labels, or a missing `seed_label` column.
    pub fn from_reader<R: BufRead>(reader: R, use_status_features: bool) -> Result<Self> {
        let mut lines = reader.lines();
        let header = lines
            .next()
            .ok_or_else(|| Error::Storage("empty input table".to_string()))??;
        let columns: Vec<&str> = header.split('\t').collect();
        if columns.len() < 2 {
            return Err(Error::Storage(
                "header needs a record id column and a seed_label column".to_string(),
            ));
        }

        let label_col = columns
            .iter()
            .position(|c| *c == SEED_LABEL_COLUMN)
            .ok_or_else(|| {
                Error::Storage(format!("missing required column '{SEED_LABEL_COLUMN}'"))
            })?;
        if label_col == 0 {
            return Err(Error::Storage(
                "first column must be the record id, not seed_label".to_string(),
            ));
        }

        // Feature columns: everything except the id (0) and the label,
        // minus the status columns when they are configured out.
        let mut feature_cols = Vec::new();
        let mut feature_names = Vec::new();
        for (idx, name) in columns.iter().enumerate().skip(1) {
            if idx == label_col {
                continue;
            }
            if !use_status_features && STATUS_FEATURES.contains(name) {
                continue;
            }
            feature_cols.push(idx);
            feature_names.push((*name).to_string());
        }
        if !use_status_features {
            tracing::info!("dropping status features");
        }

        let mut record_ids = Vec::new();
        let mut labels = Vec::new();
        let mut values: Vec<f64> = Vec::new();
        for (lineno, line) in lines.enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split('\t').collect();
            if cells.len() != columns.len() {
                return Err(Error::Storage(format!(
                    "row {} has {} cells, header has {}",
                    lineno + 2,
                    cells.len(),
                    columns.len()
                )));
            }
            record_ids.push(cells[0].to_string());
            labels.push(SeedLabel::parse(cells[label_col])?);
            for &col in &feature_cols {
                let cell = cells[col].trim();
                let value: f64 = if cell.is_empty() {
                    0.0
                } else {
                    cell.parse().map_err(|_| {
                        Error::Storage(format!(
                            "non-numeric value '{}' in column '{}' at row {}",
                            cell,
                            columns[col],
                            lineno + 2
                        ))
                    })?
                };
                values.push(value);
            }
        }

        let rows = record_ids.len();
        let features = Array2::from_shape_vec((rows, feature_cols.len()), values)
            .map_err(|e| Error::Storage(format!("failed to assemble feature matrix: {e}")))?;
        tracing::debug!(
            records = rows,
            features = feature_names.len(),
            "loaded feature table"
        );
        Self::new(record_ids, feature_names, features, labels)
    }

    /// Number of records.
    #[must_use]
    pub fn num_records(&self) -> usize {
        self.record_ids.len()
    }

    /// Feature dimensionality shared by every record.
    #[must_use]
    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Record ids in table order.
    #[must_use]
    pub fn record_ids(&self) -> &[String] {
        &self.record_ids
    }

    /// Feature column names in matrix order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The full feature matrix, one row per record.
    #[must_use]
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Seed label of a record by row index.
    #[must_use]
    pub fn label(&self, row: usize) -> SeedLabel {
        self.labels[row]
    }

    /// Row indices of records carrying the given seed label.
    #[must_use]
    pub fn rows_with_label(&self, label: SeedLabel) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Count of seed-eligible records.
    #[must_use]
    pub fn seed_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_seed()).count()
    }
}
