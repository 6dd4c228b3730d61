use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, info_span};
use uuid::Uuid;

use railctl::config::Config;
use railctl::controls::load_controls;
use railctl::engine;
use railctl::observability::{init_tracing, RunStats};
use railctl::tables::{read_transactions, TableWriter};

fn main() -> anyhow::Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize tracing
    init_tracing(&config.log_level, config.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting railctl controls engine"
    );

    let run_id = Uuid::new_v4();
    let span = info_span!("run", %run_id);
    let _guard = span.enter();

    if let Err(e) = run(&config) {
        error!(error = %format!("{e:#}"), "Run failed, no tables written");
        return Err(e);
    }

    Ok(())
}

fn run(config: &Config) -> anyhow::Result<()> {
    // Load and validate controls before touching any data
    let catalogue = load_controls(&config.controls_path).with_context(|| {
        format!("loading controls from {}", config.controls_path.display())
    })?;

    let transactions = read_transactions(&config.transactions_path).with_context(|| {
        format!(
            "reading transactions from {}",
            config.transactions_path.display()
        )
    })?;
    info!(transactions = transactions.len(), "Transactions loaded");

    // Evaluate
    let start = Instant::now();
    let output = engine::run_with(&transactions, &catalogue, config.missing_attribute)
        .context("evaluating controls")?;
    let metrics = engine::aggregate(&output.hits, &catalogue, transactions.len());
    let stats = RunStats::from_run(&output, &metrics).with_duration(start.elapsed());

    // Write tables
    let writer = TableWriter::new(&config.output_dir).with_context(|| {
        format!("creating output directory {}", config.output_dir.display())
    })?;
    let paths = writer
        .write_all(&output, &metrics)
        .context("writing output tables")?;

    info!(
        decisions = %paths.decisions.display(),
        hits = %paths.hits.display(),
        metrics = %paths.metrics.display(),
        "Tables written"
    );

    if let Some(ref metrics_path) = config.metrics_path {
        stats
            .write_prometheus(metrics_path)
            .with_context(|| format!("writing run metrics to {}", metrics_path.display()))?;
        info!(path = %metrics_path.display(), "Run metrics written");
    }

    stats.log();

    Ok(())
}
