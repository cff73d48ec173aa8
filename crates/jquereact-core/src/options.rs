//! Caller-supplied transformation options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which request idiom remote calls are translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "AjaxSetting")]
pub enum AjaxTarget {
    /// Remote calls are left untranslated
    None,

    /// `axios.get(...)` / `axios.post(...)`
    #[default]
    Axios,

    /// `fetch(...)`
    Fetch,
}

/// Raw `handleAjax` value as written in configuration.
#[derive(Deserialize)]
#[serde(untagged)]
enum AjaxSetting {
    Enabled(bool),
    Named(String),
}

impl TryFrom<AjaxSetting> for AjaxTarget {
    type Error = OptionsError;

    fn try_from(setting: AjaxSetting) -> Result<Self, Self::Error> {
        match setting {
            AjaxSetting::Enabled(false) => Ok(Self::None),
            AjaxSetting::Enabled(true) => Ok(Self::Fetch),
            AjaxSetting::Named(name) => name.parse(),
        }
    }
}

impl std::str::FromStr for AjaxTarget {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "false" => Ok(Self::None),
            "axios" => Ok(Self::Axios),
            "fetch" | "true" => Ok(Self::Fetch),
            other => Err(OptionsError::UnknownAjaxTarget(other.to_string())),
        }
    }
}

/// Options for one transformation call.
///
/// Unrecognized keys are ignored when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// Translate event bindings into handler props
    pub handle_events: bool,

    /// Target idiom for remote calls
    pub handle_ajax: AjaxTarget,

    /// jQuery plugin method name -> replacement component name
    pub jquery_plugins: BTreeMap<String, String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            handle_events: true,
            handle_ajax: AjaxTarget::Axios,
            jquery_plugins: BTreeMap::new(),
        }
    }
}

impl TransformOptions {
    /// Parse options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(json).map_err(|e| OptionsError::Json(e.to_string()))
    }

    /// Add a plugin mapping.
    pub fn with_plugin(mut self, method: impl Into<String>, component: impl Into<String>) -> Self {
        self.jquery_plugins.insert(method.into(), component.into());
        self
    }

    pub fn with_events(mut self, enabled: bool) -> Self {
        self.handle_events = enabled;
        self
    }

    pub fn with_ajax(mut self, target: AjaxTarget) -> Self {
        self.handle_ajax = target;
        self
    }

    /// Replacement component for a plugin method, if one is mapped.
    pub fn plugin_component(&self, method: &str) -> Option<&str> {
        self.jquery_plugins.get(method).map(String::as_str)
    }
}

/// Errors that can occur while reading options.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OptionsError {
    #[error("Unknown handleAjax value '{0}' (expected none, axios or fetch)")]
    UnknownAjaxTarget(String),

    #[error("Invalid options: {0}")]
    Json(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = TransformOptions::default();

        assert!(options.handle_events);
        assert_eq!(options.handle_ajax, AjaxTarget::Axios);
        assert!(options.jquery_plugins.is_empty());
    }

    #[test]
    fn parses_camel_case_keys() {
        let options = TransformOptions::from_json(
            r#"{"handleEvents": false, "handleAjax": "fetch", "jqueryPlugins": {"tooltip": "Tooltip"}}"#,
        )
        .unwrap();

        assert!(!options.handle_events);
        assert_eq!(options.handle_ajax, AjaxTarget::Fetch);
        assert_eq!(options.plugin_component("tooltip"), Some("Tooltip"));
    }

    #[test]
    fn ignores_unknown_keys() {
        let options = TransformOptions::from_json(r#"{"outputDir": "out", "handleEvents": true}"#).unwrap();
        assert_eq!(options, TransformOptions::default());
    }

    #[test]
    fn boolean_ajax_setting() {
        let off = TransformOptions::from_json(r#"{"handleAjax": false}"#).unwrap();
        let on = TransformOptions::from_json(r#"{"handleAjax": true}"#).unwrap();

        assert_eq!(off.handle_ajax, AjaxTarget::None);
        assert_eq!(on.handle_ajax, AjaxTarget::Fetch);
    }

    #[test]
    fn rejects_unknown_ajax_target() {
        let err = TransformOptions::from_json(r#"{"handleAjax": "jsonp"}"#).unwrap_err();
        assert!(err.to_string().contains("jsonp"));
    }
}
