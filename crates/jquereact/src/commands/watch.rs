//! Watch mode command.

use std::path::PathBuf;

use anyhow::Result;
use jquereact_batch::BatchRunner;
use jquereact_watch::{WatchConfig, WatchSession};

use crate::config::{ConfigFile, Overrides};

/// Run the watch command.
pub async fn run(config: &ConfigFile, overrides: Overrides) -> Result<()> {
    let batch = config.batch_config(overrides);
    let roots: Vec<PathBuf> = batch.inputs.iter().map(PathBuf::from).collect();

    let transpiler = super::transpiler(config.output.format).await?;
    let runner = BatchRunner::new(batch, transpiler);

    let session = WatchSession::new(
        WatchConfig {
            roots,
            include: config.watch.include.clone(),
            exclude: config.watch.exclude.clone(),
        },
        runner,
    )?;

    session.run().await?;
    Ok(())
}
