//! Batch conversion command.

use anyhow::{Context, Result};
use jquereact_batch::BatchRunner;

use crate::config::{ConfigFile, Overrides};

/// Run the transform command.
pub async fn run(config: &ConfigFile, overrides: Overrides, format: bool, json: bool) -> Result<()> {
    tracing::info!("Converting jQuery sources...");

    let batch = config.batch_config(overrides);
    if batch.dry_run {
        tracing::info!("Dry run: no files will be written");
    } else {
        tracing::info!("Output: {}", batch.output_dir.display());
    }

    let transpiler = super::transpiler(format && config.output.format).await?;
    let runner = BatchRunner::new(batch, transpiler);

    // Conversion is CPU-bound and parallelized by rayon
    let report = tokio::task::spawn_blocking(move || runner.run())
        .await
        .context("Batch conversion panicked")??;

    if json {
        println!("{}", report.to_json()?);
    }

    if report.failed > 0 {
        for file in report.files.iter().filter(|f| !f.succeeded()) {
            tracing::error!(
                "{}: {}",
                file.source.display(),
                file.message.as_deref().unwrap_or("unknown error")
            );
        }
        anyhow::bail!("{}", report.tally());
    }

    tracing::info!("Conversion complete in {}ms", report.duration_ms);
    Ok(())
}
