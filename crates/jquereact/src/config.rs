//! Configuration file (`jquereact.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jquereact_batch::BatchConfig;
use jquereact_core::TransformOptions;
use jquereact_watch::WatchConfig;
use serde::Deserialize;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "jquereact.toml";

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Options for every transformation
    #[serde(default)]
    pub transform: TransformOptions,

    #[serde(default)]
    pub watch: WatchSettings,
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    /// Directories, files or glob patterns
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Directory names skipped while walking
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Normalize whitespace of generated files
    #[serde(default = "default_format")]
    pub format: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: default_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WatchSettings {
    #[serde(default = "default_watch_include")]
    pub include: Vec<String>,

    #[serde(default = "default_watch_exclude")]
    pub exclude: Vec<String>,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            include: default_watch_include(),
            exclude: default_watch_exclude(),
        }
    }
}

fn default_include() -> Vec<String> {
    vec!["src".to_string()]
}
fn default_exclude() -> Vec<String> {
    vec!["node_modules".to_string(), "dist".to_string()]
}
fn default_output_dir() -> String {
    "src/components".to_string()
}
fn default_format() -> bool {
    true
}
fn default_watch_include() -> Vec<String> {
    WatchConfig::default().include
}
fn default_watch_exclude() -> Vec<String> {
    WatchConfig::default().exclude
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the config file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Batch configuration, with command-line overrides applied.
    pub fn batch_config(&self, overrides: Overrides) -> BatchConfig {
        BatchConfig {
            inputs: if overrides.inputs.is_empty() {
                self.input.include.clone()
            } else {
                overrides.inputs
            },
            exclude: self.input.exclude.clone(),
            output_dir: overrides
                .output
                .unwrap_or_else(|| PathBuf::from(&self.output.dir)),
            options: overrides.options.unwrap_or_else(|| self.transform.clone()),
            dry_run: overrides.dry_run,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub inputs: Vec<String>,
    pub output: Option<PathBuf>,

    /// Replaces the file's `[transform]` section entirely
    pub options: Option<TransformOptions>,

    pub dry_run: bool,
}

/// Parse `--options` JSON.
pub fn parse_options(json: Option<&str>) -> Result<Option<TransformOptions>> {
    json.map(|json| TransformOptions::from_json(json).context("Invalid --options"))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jquereact_core::AjaxTarget;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = tempdir().unwrap();
        let config = ConfigFile::load(&temp.path().join(CONFIG_FILE)).unwrap();

        assert_eq!(config.input.include, vec!["src"]);
        assert_eq!(config.input.exclude, vec!["node_modules", "dist"]);
        assert_eq!(config.output.dir, "src/components");
        assert!(config.output.format);
        assert!(config.transform.handle_events);
        assert_eq!(config.transform.handle_ajax, AjaxTarget::Axios);
    }

    #[test]
    fn reads_sections() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
[input]
include = ["legacy"]

[output]
dir = "generated"
format = false

[transform]
handleEvents = false
handleAjax = "fetch"
unknownKey = 1

[transform.jqueryPlugins]
tooltip = "Tooltip"
"#,
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap();

        assert_eq!(config.input.include, vec!["legacy"]);
        assert_eq!(config.input.exclude, vec!["node_modules", "dist"]);
        assert_eq!(config.output.dir, "generated");
        assert!(!config.output.format);
        assert!(!config.transform.handle_events);
        assert_eq!(config.transform.handle_ajax, AjaxTarget::Fetch);
        assert_eq!(config.transform.plugin_component("tooltip"), Some("Tooltip"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[transform]\nhandleAjax = \"jquery\"\n").unwrap();

        assert!(ConfigFile::load(&path).is_err());
    }

    #[test]
    fn overrides_take_precedence() {
        let config = ConfigFile::default();
        let options = parse_options(Some(r#"{"handleAjax": true}"#)).unwrap();

        let batch = config.batch_config(Overrides {
            inputs: vec!["app/*.js".to_string()],
            output: Some(PathBuf::from("out")),
            options,
            dry_run: true,
        });

        assert_eq!(batch.inputs, vec!["app/*.js"]);
        assert_eq!(batch.output_dir, PathBuf::from("out"));
        assert_eq!(batch.options.handle_ajax, AjaxTarget::Fetch);
        assert!(batch.dry_run);
    }
}
