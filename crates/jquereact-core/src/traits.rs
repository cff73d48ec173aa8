//! Trait definitions for pattern rules.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use serde::Serialize;

use crate::chain::{find_chains, find_utility_calls, Chain, UtilityCall};
use crate::naming::NameAllocator;
use crate::options::TransformOptions;
use crate::scan::Scanner;

/// A detected occurrence of an idiom.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Id of the rule that produced the match
    pub rule: String,

    /// Byte range in the source unit
    pub span: Range<usize>,

    /// Source text of the span
    pub text: String,

    /// Captured sub-expressions (selector, events, handler, ...)
    pub captures: BTreeMap<String, String>,
}

impl Match {
    /// Create a match over `span` of `source`.
    pub fn new(rule: &str, source: &str, span: Range<usize>) -> Self {
        Self {
            rule: rule.to_string(),
            text: source[span.clone()].to_string(),
            span,
            captures: BTreeMap::new(),
        }
    }

    pub fn capture(mut self, key: &str, value: impl Into<String>) -> Self {
        self.captures.insert(key.to_string(), value.into());
        self
    }
}

/// How closely a fragment reproduces the original behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Exact,
    Approximate,
}

/// Something a fragment needs imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Requirement {
    UseEffect,
    UseRef,
    UseState,
    Axios,
}

impl Requirement {
    /// Hook name for React hook requirements.
    pub fn hook(self) -> Option<&'static str> {
        match self {
            Self::UseEffect => Some("useEffect"),
            Self::UseRef => Some("useRef"),
            Self::UseState => Some("useState"),
            Self::Axios => None,
        }
    }
}

/// Generated source for one accepted match.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeFragment {
    /// Id of the rule that generated the fragment
    pub rule: String,

    /// Span of the originating match
    pub span: Range<usize>,

    /// Statements placed in the component body, in order
    pub setup: Vec<String>,

    /// JSX rendered by the component
    pub markup: Option<String>,

    pub requires: BTreeSet<Requirement>,
    pub confidence: Confidence,

    /// Index of the inline script the match came from (markup input only)
    pub script: Option<usize>,
}

impl CodeFragment {
    /// Create an empty fragment.
    pub fn new(rule: &str, span: Range<usize>) -> Self {
        Self {
            rule: rule.to_string(),
            span,
            setup: Vec::new(),
            markup: None,
            requires: BTreeSet::new(),
            confidence: Confidence::Exact,
            script: None,
        }
    }

    /// Mark the fragment as approximate.
    pub fn approximate(&mut self) {
        self.confidence = Confidence::Approximate;
    }

    pub fn is_empty(&self) -> bool {
        self.setup.is_empty() && self.markup.is_none()
    }
}

/// Errors raised by a rule's detector or generator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuleError {
    #[error("Match does not have the expected shape: {0}")]
    Malformed(String),

    #[error("Unsupported construct: {0}")]
    Unsupported(String),
}

/// Input to detectors: one source unit plus the active options.
///
/// Chains are parsed once and shared by every rule.
pub struct DetectContext<'a> {
    pub scanner: Scanner<'a>,
    pub options: &'a TransformOptions,
    chains: OnceCell<Vec<Chain>>,
    utilities: OnceCell<Vec<UtilityCall>>,
}

impl<'a> DetectContext<'a> {
    /// Create a new detection context.
    pub fn new(source: &'a str, options: &'a TransformOptions) -> Self {
        Self {
            scanner: Scanner::new(source),
            options,
            chains: OnceCell::new(),
            utilities: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.scanner.source()
    }

    /// Every `$(...)` chain in the unit, in source order.
    pub fn chains(&self) -> &[Chain] {
        self.chains.get_or_init(|| find_chains(&self.scanner))
    }

    /// Every `$.name(...)` call in the unit, in source order.
    pub fn utility_calls(&self) -> &[UtilityCall] {
        self.utilities.get_or_init(|| find_utility_calls(&self.scanner))
    }
}

/// State shared by generators within one transformation call.
pub struct GenerateContext<'a> {
    pub options: &'a TransformOptions,
    pub names: NameAllocator,
}

impl<'a> GenerateContext<'a> {
    pub fn new(options: &'a TransformOptions) -> Self {
        Self {
            options,
            names: NameAllocator::new(),
        }
    }
}

/// A detector/generator pair for one jQuery idiom.
pub trait PatternRule: Send + Sync {
    /// Unique rule identifier (e.g., "event-binding")
    fn id(&self) -> &str;

    /// Ordering key; lower runs first and wins exact ties
    fn priority(&self) -> u32;

    /// Find occurrences of the idiom.
    ///
    /// Must be deterministic and free of side effects.
    fn detect(&self, cx: &DetectContext<'_>) -> Result<Vec<Match>, RuleError>;

    /// Generate the component code for one accepted match.
    fn generate(&self, m: &Match, cx: &mut GenerateContext<'_>) -> Result<CodeFragment, RuleError>;
}
