//! Event delegation: `$(container).on('click', 'li', handler)`.

use crate::events::bindings;
use crate::rules::{chain_match, element, has_target, kinds, CallKind};
use crate::traits::{CodeFragment, DetectContext, GenerateContext, Match, PatternRule, RuleError};

/// Chains of event bindings with at least one delegated binding.
///
/// React has no delegation primitive, so the generated handler sits on the
/// container and checks the event target against the child selector itself.
pub struct DelegationRule;

impl PatternRule for DelegationRule {
    fn id(&self) -> &str {
        "event-delegation"
    }

    fn priority(&self) -> u32 {
        20
    }

    fn detect(&self, cx: &DetectContext<'_>) -> Result<Vec<Match>, RuleError> {
        if !cx.options.handle_events {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for chain in cx.chains() {
            let kinds = kinds(chain);
            let only_events = kinds
                .iter()
                .all(|k| matches!(k, CallKind::Event | CallKind::Delegated));
            if !only_events || !kinds.contains(&CallKind::Delegated) || !has_target(chain) {
                continue;
            }

            let mut m = chain_match(self.id(), cx.source(), chain);
            let delegated = chain
                .calls
                .iter()
                .filter_map(bindings)
                .flatten()
                .find(|b| b.delegate.is_some());
            if let Some(binding) = delegated {
                m = m
                    .capture("events", binding.events.join(" "))
                    .capture("delegate", binding.delegate.unwrap_or_default())
                    .capture("handler", binding.handler);
            }
            found.push(m);
        }
        Ok(found)
    }

    fn generate(&self, m: &Match, cx: &mut GenerateContext<'_>) -> Result<CodeFragment, RuleError> {
        element::generate(self.id(), m, cx)
    }
}
