//! The transformation engine.
//!
//! Runs every rule's detector over a source unit, resolves overlapping
//! matches, and generates one fragment per accepted match. A detector or
//! generator that fails (by error or panic) only loses its own contribution.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::diagnostics::Diagnostic;
use crate::dispatch::SourceUnit;
use crate::options::TransformOptions;
use crate::registry::PatternRegistry;
use crate::traits::{CodeFragment, DetectContext, GenerateContext, Match};

/// Result of one engine pass.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// Fragments in source order
    pub fragments: Vec<CodeFragment>,

    /// Whether any match survived overlap resolution
    pub had_any_match: bool,

    pub diagnostics: Vec<Diagnostic>,
}

/// Runs a registry over source units.
pub struct Engine<'r> {
    registry: &'r PatternRegistry,
}

impl<'r> Engine<'r> {
    /// Create a new engine over a registry.
    pub fn new(registry: &'r PatternRegistry) -> Self {
        Self { registry }
    }

    /// Transform one source unit.
    pub fn run(&self, unit: &SourceUnit, options: &TransformOptions) -> EngineOutput {
        let mut output = EngineOutput::default();
        let accepted = self.detect(unit, options, &mut output.diagnostics);
        output.had_any_match = !accepted.is_empty();

        let mut cx = GenerateContext::new(options);
        for (order, m) in accepted {
            let Some(rule) = self.registry.rules().nth(order) else {
                continue;
            };
            let script = unit.script_at(m.span.start);

            let result = catch_unwind(AssertUnwindSafe(|| rule.generate(&m, &mut cx)));
            match result {
                Ok(Ok(mut fragment)) => {
                    fragment.rule = rule.id().to_string();
                    fragment.span = m.span.clone();
                    fragment.script = script;
                    if let Some(index) = script {
                        tracing::debug!("Fragment from {} traces to inline script #{}", rule.id(), index + 1);
                        output.diagnostics.push(
                            Diagnostic::info(format!(
                                "generated code for bytes {}..{} comes from inline script #{}",
                                m.span.start,
                                m.span.end,
                                index + 1
                            ))
                            .with_rule(rule.id())
                            .with_script(script),
                        );
                    }
                    output.fragments.push(fragment);
                }
                Ok(Err(e)) => {
                    tracing::warn!("Rule {} failed to generate: {}", rule.id(), e);
                    output.diagnostics.push(
                        Diagnostic::warning(format!("generation failed: {}", e))
                            .with_rule(rule.id())
                            .with_script(script),
                    );
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::warn!("Rule {} panicked while generating: {}", rule.id(), message);
                    output.diagnostics.push(
                        Diagnostic::warning(format!("generation panicked: {}", message))
                            .with_rule(rule.id())
                            .with_script(script),
                    );
                }
            }
        }

        output
    }

    /// Collect matches from every rule and keep the non-overlapping ones.
    ///
    /// Returns (rule index, match) pairs in source order.
    fn detect(
        &self,
        unit: &SourceUnit,
        options: &TransformOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<(usize, Match)> {
        let cx = DetectContext::new(&unit.code, options);
        let mut candidates = Vec::new();

        for (order, rule) in self.registry.rules().enumerate() {
            let result = catch_unwind(AssertUnwindSafe(|| rule.detect(&cx)));
            match result {
                Ok(Ok(matches)) => {
                    for m in matches {
                        if m.span.start >= m.span.end || m.span.end > unit.code.len() {
                            tracing::warn!("Rule {} produced an invalid span {:?}", rule.id(), m.span);
                            diagnostics.push(
                                Diagnostic::warning(format!("invalid match span {:?}", m.span))
                                    .with_rule(rule.id()),
                            );
                            continue;
                        }
                        candidates.push((order, m));
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!("Rule {} failed to detect: {}", rule.id(), e);
                    diagnostics.push(
                        Diagnostic::warning(format!("detection failed: {}", e)).with_rule(rule.id()),
                    );
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::warn!("Rule {} panicked while detecting: {}", rule.id(), message);
                    diagnostics.push(
                        Diagnostic::warning(format!("detection panicked: {}", message))
                            .with_rule(rule.id()),
                    );
                }
            }
        }

        // Stable sort: equal starts keep registry order
        candidates.sort_by_key(|(order, m)| (m.span.start, *order));

        let mut accepted = Vec::new();
        let mut accepted_end = 0;
        for (order, m) in candidates {
            if !accepted.is_empty() && m.span.start < accepted_end {
                tracing::debug!(
                    "Discarding {} match at {:?}: overlaps an earlier match",
                    m.rule,
                    m.span
                );
                continue;
            }
            accepted_end = m.span.end;
            accepted.push((order, m));
        }

        accepted
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{PatternRule, RuleError};

    /// Matches every occurrence of a literal needle.
    struct Literal {
        id: &'static str,
        needle: &'static str,
    }

    impl PatternRule for Literal {
        fn id(&self) -> &str {
            self.id
        }

        fn priority(&self) -> u32 {
            10
        }

        fn detect(&self, cx: &DetectContext<'_>) -> Result<Vec<Match>, RuleError> {
            Ok(cx
                .source()
                .match_indices(self.needle)
                .map(|(i, _)| Match::new(self.id, cx.source(), i..i + self.needle.len()))
                .collect())
        }

        fn generate(&self, m: &Match, _cx: &mut GenerateContext<'_>) -> Result<CodeFragment, RuleError> {
            let mut fragment = CodeFragment::new(self.id, m.span.clone());
            fragment.setup.push(format!("// {}", m.text));
            Ok(fragment)
        }
    }

    fn registry(rules: Vec<Box<dyn PatternRule>>) -> PatternRegistry {
        PatternRegistry::new(rules).unwrap()
    }

    #[test]
    fn earlier_match_wins_overlap() {
        let registry = registry(vec![
            Box::new(Literal { id: "long", needle: "bcd" }),
            Box::new(Literal { id: "short", needle: "abc" }),
        ]);
        let unit = SourceUnit::script("abcde", "test.js");

        let output = Engine::new(&registry).run(&unit, &TransformOptions::default());

        assert!(output.had_any_match);
        assert_eq!(output.fragments.len(), 1);
        assert_eq!(output.fragments[0].rule, "short");
    }

    #[test]
    fn registry_order_breaks_ties() {
        let registry = registry(vec![
            Box::new(Literal { id: "first", needle: "abc" }),
            Box::new(Literal { id: "second", needle: "abcd" }),
        ]);
        let unit = SourceUnit::script("abcd", "test.js");

        let output = Engine::new(&registry).run(&unit, &TransformOptions::default());

        assert_eq!(output.fragments.len(), 1);
        assert_eq!(output.fragments[0].rule, "first");
    }

    #[test]
    fn no_match_is_not_an_error() {
        let registry = registry(vec![Box::new(Literal { id: "x", needle: "zzz" })]);
        let unit = SourceUnit::script("abc", "test.js");

        let output = Engine::new(&registry).run(&unit, &TransformOptions::default());

        assert!(!output.had_any_match);
        assert!(output.fragments.is_empty());
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn fragments_follow_source_order() {
        let registry = registry(vec![
            Box::new(Literal { id: "late", needle: "x" }),
            Box::new(Literal { id: "early", needle: "a" }),
        ]);
        let unit = SourceUnit::script("a x a", "test.js");

        let output = Engine::new(&registry).run(&unit, &TransformOptions::default());

        let rules: Vec<&str> = output.fragments.iter().map(|f| f.rule.as_str()).collect();
        assert_eq!(rules, vec!["early", "late", "early"]);
    }
}
