use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::domain::{Action, ControlMetric};
use crate::engine::BatchOutput;

/// Summary statistics for one batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Transactions decided
    pub transactions: u64,

    /// Hit rows produced
    pub hits: u64,

    /// Decisions by final action
    pub allow: u64,
    pub review: u64,
    pub block: u64,

    /// Hit count per control, in catalogue order
    pub control_hits: Vec<(String, u64)>,

    /// Wall time of the evaluation, if measured
    pub duration: Option<Duration>,
}

impl RunStats {
    /// Summarise a finished run.
    pub fn from_run(output: &BatchOutput, metrics: &[ControlMetric]) -> Self {
        let mut stats = RunStats {
            transactions: output.decisions.len() as u64,
            hits: output.hits.len() as u64,
            control_hits: metrics
                .iter()
                .map(|m| (m.control_id.clone(), m.hits))
                .collect(),
            ..Default::default()
        };

        for decision in &output.decisions {
            match decision.action {
                Action::Allow => stats.allow += 1,
                Action::Review => stats.review += 1,
                Action::Block => stats.block += 1,
            }
        }

        stats
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Number of decisions with the given final action.
    pub fn count(&self, action: Action) -> u64 {
        match action {
            Action::Allow => self.allow,
            Action::Review => self.review,
            Action::Block => self.block,
        }
    }

    /// Share of transactions that ended as REVIEW or BLOCK.
    pub fn action_rate(&self) -> f64 {
        if self.transactions == 0 {
            return 0.0;
        }
        (self.review + self.block) as f64 / self.transactions as f64
    }

    /// Log the summary at info level.
    pub fn log(&self) {
        info!(
            transactions = self.transactions,
            hits = self.hits,
            allow = self.allow,
            review = self.review,
            block = self.block,
            action_rate = self.action_rate(),
            duration_ms = self.duration.map(|d| d.as_millis() as u64).unwrap_or(0),
            "Controls evaluated"
        );
    }

    /// Export in Prometheus text format.
    pub fn to_prometheus(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# HELP railctl_transactions_total Transactions evaluated in the last run");
        let _ = writeln!(out, "# TYPE railctl_transactions_total gauge");
        let _ = writeln!(out, "railctl_transactions_total {}", self.transactions);
        out.push('\n');

        let _ = writeln!(out, "# HELP railctl_decisions Decisions by final action");
        let _ = writeln!(out, "# TYPE railctl_decisions gauge");
        for action in Action::ALL {
            let _ = writeln!(
                out,
                "railctl_decisions{{action=\"{}\"}} {}",
                action.as_str().to_lowercase(),
                self.count(action)
            );
        }
        out.push('\n');

        let _ = writeln!(out, "# HELP railctl_control_hits Hits per control");
        let _ = writeln!(out, "# TYPE railctl_control_hits gauge");
        for (control_id, hits) in &self.control_hits {
            let _ = writeln!(
                out,
                "railctl_control_hits{{control_id=\"{}\"}} {}",
                escape_label(control_id),
                hits
            );
        }
        out.push('\n');

        let _ = writeln!(out, "# HELP railctl_action_rate Share of transactions reviewed or blocked");
        let _ = writeln!(out, "# TYPE railctl_action_rate gauge");
        let _ = writeln!(out, "railctl_action_rate {}", self.action_rate());

        if let Some(duration) = self.duration {
            out.push('\n');
            let _ = writeln!(out, "# HELP railctl_run_duration_seconds Evaluation wall time");
            let _ = writeln!(out, "# TYPE railctl_run_duration_seconds gauge");
            let _ = writeln!(out, "railctl_run_duration_seconds {}", duration.as_secs_f64());
        }

        out
    }

    /// Write the Prometheus text export to a file (textfile-collector style).
    pub fn write_prometheus(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.to_prometheus())
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
