//! pic50: pIC50 prediction for EGFR inhibitors.
//! Entry point: train on the labeled descriptor table, report metrics, and
//! predict an uploaded compound batch.

mod config;
mod render;
mod source;

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pic50_model::{
    check_upload_compatible, InferenceAdapter, LabeledTable, TablePreview, TrainedSession,
    TrainingSession, UploadBatch,
};
use pic50_molecules::FeatureExtractor;

/// Widest preview printed to the terminal.
const PREVIEW_COLUMNS: usize = 8;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pic50=debug,info")),
        )
        .init();

    info!("pic50 starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::load().context("Could not load configuration")?;
    info!(
        "Configuration loaded. Dataset: {}, {} trees (seed {}), split seed {}",
        config.dataset,
        config.model.forest.n_trees,
        config.model.forest.seed,
        config.model.split.seed
    );

    // ── Training data ────────────────────────────────────────────────────
    let dataset_path = config.dataset.resolve(&source::default_cache_dir()).await?;
    let extractor = FeatureExtractor::new()?;
    let (table, unparsed) =
        LabeledTable::load_csv_path(&dataset_path, &config.model.label_column, &extractor)
            .with_context(|| format!("Failed to read training table {:?}", dataset_path))?;
    if !unparsed.is_empty() {
        println!("{}\n", render::failures(&unparsed));
    }
    if config.upload.path.is_some() {
        check_upload_compatible(table.schema(), &extractor).context(
            "Training columns cannot be computed from uploaded SMILES; \
             train on a CSV with a SMILES column to predict uploads",
        )?;
    }
    println!(
        "{}\n",
        render::preview(
            &TablePreview::of_labeled("Data Preview:", &table, config.model.preview_rows),
            PREVIEW_COLUMNS
        )
    );

    // ── Train and evaluate ───────────────────────────────────────────────
    let session = TrainingSession::run(&table, &config.model)?;
    if session.cleaning.dropped() > 0 {
        println!(
            "Dropped {} of {} rows with missing or infinite values\n",
            session.cleaning.dropped(),
            session.cleaning.rows_in
        );
    }
    println!("{}\n", render::metrics(&session.evaluation));
    println!("{}\n", render::importances(&session.top_features(config.output.top_features)));

    std::fs::create_dir_all(&config.output.dir)
        .with_context(|| format!("Failed to create output directory {:?}", config.output.dir))?;
    write_chart(&session, &config.output.chart_path())?;

    // ── Inference ────────────────────────────────────────────────────────
    match &config.upload.path {
        Some(path) => predict_upload(&session, path, &config)?,
        None => info!("No upload configured; skipping prediction"),
    }

    info!("Session {} complete", session.session_id);
    Ok(())
}

fn write_chart(session: &TrainedSession, path: &Path) -> anyhow::Result<()> {
    let chart = session.parity_chart();
    if chart.clipped() > 0 {
        warn!(
            "{} of {} parity points fall outside the axis range {:?}",
            chart.clipped(),
            chart.points.len(),
            chart.axis_range
        );
    }
    std::fs::write(path, chart.to_json()?)
        .with_context(|| format!("Failed to write {:?}", path))?;
    info!("Parity chart data written to {:?}", path);
    Ok(())
}

fn predict_upload(session: &TrainedSession, path: &Path, config: &config::Config) -> anyhow::Result<()> {
    let batch = UploadBatch::from_csv_path(path)
        .with_context(|| format!("Failed to read upload {:?}", path))?;
    println!("{}\n", render::preview(&batch.preview(config.model.preview_rows), PREVIEW_COLUMNS));

    let adapter = InferenceAdapter::new(&session.artifact)?;
    let report = adapter.predict_upload(&batch)?;
    if !report.failures.is_empty() {
        println!("{}\n", render::failures(&report.failures));
    }
    println!("{}\n", render::preview(&report.preview(config.model.preview_rows), PREVIEW_COLUMNS));

    let out = config.output.predictions_path();
    let file = std::fs::File::create(&out).with_context(|| format!("Failed to create {:?}", out))?;
    report.write_csv(file)?;
    info!("Predictions written to {:?}", out);
    Ok(())
}
