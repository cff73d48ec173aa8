//! Direct event binding: `$(sel).on('click', handler)`.

use crate::events::bindings;
use crate::rules::{chain_match, element, has_target, kinds, CallKind};
use crate::traits::{CodeFragment, DetectContext, GenerateContext, Match, PatternRule, RuleError};

/// Chains made only of direct event bindings.
pub struct EventBindingRule;

impl PatternRule for EventBindingRule {
    fn id(&self) -> &str {
        "event-binding"
    }

    fn priority(&self) -> u32 {
        30
    }

    fn detect(&self, cx: &DetectContext<'_>) -> Result<Vec<Match>, RuleError> {
        if !cx.options.handle_events {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for chain in cx.chains() {
            let kinds = kinds(chain);
            if kinds.is_empty() || !kinds.iter().all(|k| *k == CallKind::Event) || !has_target(chain) {
                continue;
            }

            let mut m = chain_match(self.id(), cx.source(), chain);
            if let Some(first) = chain.calls.first().and_then(bindings).and_then(|b| b.into_iter().next()) {
                m = m
                    .capture("events", first.events.join(" "))
                    .capture("handler", first.handler);
            }
            found.push(m);
        }
        Ok(found)
    }

    fn generate(&self, m: &Match, cx: &mut GenerateContext<'_>) -> Result<CodeFragment, RuleError> {
        element::generate(self.id(), m, cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TransformOptions;

    #[test]
    fn detects_event_only_chains() {
        let options = TransformOptions::default();
        let source = "$('#save').on('click', save);\n$('#x').css('color', 'red').click(go);\n$('#y').on('click', 'li', pick);";
        let cx = DetectContext::new(source, &options);

        let found = EventBindingRule.detect(&cx).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "$('#save').on('click', save);");
        assert_eq!(found[0].captures["events"], "click");
        assert_eq!(found[0].captures["handler"], "save");
    }

    #[test]
    fn disabled_events_detect_nothing() {
        let options = TransformOptions::default().with_events(false);
        let cx = DetectContext::new("$('#save').click(save);", &options);

        assert!(EventBindingRule.detect(&cx).unwrap().is_empty());
    }
}
