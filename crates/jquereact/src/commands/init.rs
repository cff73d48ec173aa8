//! Create a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());
    tracing::info!("Run 'jquereact transform' to convert your sources.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# jquereact configuration

[input]
# Directories, files or glob patterns to convert
include = ["src"]

# Directory names skipped while walking
exclude = ["node_modules", "dist"]

[output]
# Generated components are written here, mirroring the input layout
dir = "src/components"

# Normalize whitespace of generated files
format = true

[transform]
# Translate event bindings into handler props
handleEvents = true

# Remote calls: "axios", "fetch" or "none"
handleAjax = "axios"

# jQuery plugin method -> replacement component
[transform.jqueryPlugins]
# tooltip = "Tooltip"

[watch]
include = ["**/*.jquery.js", "**/*.jquery.html"]
exclude = ["**/node_modules/**", "**/dist/**"]
"#;
