//! Diagnostics reported alongside transformation output.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// A note about one transformation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Rule the diagnostic concerns, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    /// Inline script index (markup input only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<usize>,

    pub message: String,
}

impl Diagnostic {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            rule: None,
            script: None,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            rule: None,
            script: None,
            message: message.into(),
        }
    }

    pub fn with_rule(mut self, rule: &str) -> Self {
        self.rule = Some(rule.to_string());
        self
    }

    pub fn with_script(mut self, script: Option<usize>) -> Self {
        self.script = script;
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        write!(f, "{}", level)?;
        if let Some(rule) = &self.rule {
            write!(f, " [{}]", rule)?;
        }
        if let Some(script) = self.script {
            write!(f, " (script #{})", script + 1)?;
        }
        write!(f, ": {}", self.message)
    }
}
