use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::{Action, ControlMetric, DecisionRecord, HitRecord, Rail};
use crate::engine::BatchOutput;
use crate::error::TableError;

pub const DECISIONS_FILE: &str = "control_decisions.csv";
pub const HITS_FILE: &str = "control_hits.csv";
pub const METRICS_FILE: &str = "control_metrics.csv";

/// Separator between matched control ids in the decisions table.
pub const MATCHED_SEPARATOR: &str = "|";

const DECISION_COLUMNS: [&str; 5] = ["tx_id", "rail", "final_action", "determined_by", "triggered_controls"];
const HIT_COLUMNS: [&str; 5] = ["tx_id", "control_id", "rail", "action", "is_fraud_pattern"];
const METRIC_COLUMNS: [&str; 4] = ["control_id", "hits", "hit_rate", "precision_proxy"];

#[derive(Serialize)]
struct DecisionRow<'a> {
    tx_id: &'a str,
    rail: Rail,
    final_action: Action,
    determined_by: &'a str,
    triggered_controls: String,
}

#[derive(Serialize)]
struct HitRow<'a> {
    tx_id: &'a str,
    control_id: &'a str,
    rail: Rail,
    action: Action,
    is_fraud_pattern: bool,
}

#[derive(Serialize)]
struct MetricRow<'a> {
    control_id: &'a str,
    hits: u64,
    hit_rate: f64,
    precision_proxy: f64,
}

/// Write the decisions table as CSV.
pub fn write_decisions<W: Write>(writer: W, decisions: &[DecisionRecord]) -> Result<(), TableError> {
    write_table(
        writer,
        &DECISION_COLUMNS,
        decisions.iter().map(|d| DecisionRow {
            tx_id: d.tx_id.as_str(),
            rail: d.rail,
            final_action: d.action,
            determined_by: d.determined_by.as_deref().unwrap_or(""),
            triggered_controls: d.matched.join(MATCHED_SEPARATOR),
        }),
    )
}

/// Write the hits table (long format) as CSV.
pub fn write_hits<W: Write>(writer: W, hits: &[HitRecord]) -> Result<(), TableError> {
    write_table(
        writer,
        &HIT_COLUMNS,
        hits.iter().map(|h| HitRow {
            tx_id: h.tx_id.as_str(),
            control_id: &h.control_id,
            rail: h.rail,
            action: h.action,
            is_fraud_pattern: h.is_fraud,
        }),
    )
}

/// Write the control metrics table as CSV. Rates are rounded to 4 places.
pub fn write_metrics<W: Write>(writer: W, metrics: &[ControlMetric]) -> Result<(), TableError> {
    write_table(
        writer,
        &METRIC_COLUMNS,
        metrics.iter().map(|m| MetricRow {
            control_id: &m.control_id,
            hits: m.hits,
            hit_rate: round4(m.hit_rate),
            precision_proxy: round4(m.precision_proxy),
        }),
    )
}

/// Header is written explicitly so empty tables still carry their columns.
fn write_table<W, T, I>(writer: W, columns: &[&str], rows: I) -> Result<(), TableError>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(columns)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    Ok(())
}

#[inline]
fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Paths of the three output tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub decisions: PathBuf,
    pub hits: PathBuf,
    pub metrics: PathBuf,
}

/// Writes the output tables into a directory.
pub struct TableWriter {
    directory: PathBuf,
}

impl TableWriter {
    /// Create a writer, creating the directory if needed.
    pub fn new(directory: impl AsRef<Path>) -> Result<Self, TableError> {
        let dir = directory.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(TableWriter { directory: dir })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write all three tables.
    ///
    /// Every table goes to a temp file first and the renames only start once
    /// all three are written, so a failure while writing leaves previous
    /// outputs intact. Each rename is atomic but the three are not atomic as
    /// a set: a rename failing part way leaves a mix of new and old tables.
    pub fn write_all(
        &self,
        output: &BatchOutput,
        metrics: &[ControlMetric],
    ) -> Result<OutputPaths, TableError> {
        let decisions = self.stage(DECISIONS_FILE, |w| write_decisions(w, &output.decisions))?;
        let hits = self.stage(HITS_FILE, |w| write_hits(w, &output.hits))?;
        let metrics = self.stage(METRICS_FILE, |w| write_metrics(w, metrics))?;

        Ok(OutputPaths {
            decisions: decisions.commit()?,
            hits: hits.commit()?,
            metrics: metrics.commit()?,
        })
    }

    fn stage<F>(&self, filename: &str, write: F) -> Result<Staged, TableError>
    where
        F: FnOnce(BufWriter<File>) -> Result<(), TableError>,
    {
        let path = self.directory.join(filename);
        let temp_path = self.directory.join(format!(".{}.tmp", filename));

        let file = File::create(&temp_path)?;
        if let Err(e) = write(BufWriter::new(file)) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        Ok(Staged {
            temp_path,
            path,
            committed: false,
        })
    }
}

/// A fully written temp file waiting to be renamed into place.
///
/// Dropped without committing, the temp file is removed.
struct Staged {
    temp_path: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl Staged {
    fn commit(mut self) -> Result<PathBuf, TableError> {
        fs::rename(&self.temp_path, &self.path)?;
        self.committed = true;
        Ok(std::mem::take(&mut self.path))
    }
}

impl Drop for Staged {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}
