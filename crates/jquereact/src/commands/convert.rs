//! Convert a single file to stdout.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use jquereact_batch::component_name;
use jquereact_core::{Outcome, TransformOptions, TransformRequest};

use crate::config::ConfigFile;

/// Run the convert command.
pub async fn run(
    config: &ConfigFile,
    file: PathBuf,
    name: Option<String>,
    options: Option<TransformOptions>,
    format: bool,
) -> Result<()> {
    let content = fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let name = name.unwrap_or_else(|| component_name(&file));
    let options = options.unwrap_or_else(|| config.transform.clone());

    let transpiler = super::transpiler(format && config.output.format).await?;
    let path = file.to_string_lossy();
    let output = transpiler.transform(&TransformRequest::new(&content, &path, &name), &options);

    match &output.outcome {
        Outcome::Transformed {
            fragments,
            approximate,
        }
        | Outcome::Markup {
            fragments,
            approximate,
        } => tracing::info!(
            "Converted {} ({} fragments, {} approximate)",
            file.display(),
            fragments,
            approximate
        ),
        Outcome::Fallback(reason) => tracing::warn!("{}: {}", file.display(), reason),
    }
    for diagnostic in &output.diagnostics {
        tracing::debug!("{}", diagnostic);
    }

    print!("{}", output.code);
    Ok(())
}
