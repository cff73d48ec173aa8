//! Selector-chain mutation: `$(sel).css(...).text(...)`.

use crate::rules::{chain_match, element, has_target, kinds, CallKind};
use crate::traits::{CodeFragment, DetectContext, GenerateContext, Match, PatternRule, RuleError};

/// Chains with at least one DOM mutation.
///
/// Direct and delegated bindings and animations in the same chain are folded
/// into the generated element. Any unknown call declines the whole chain.
pub struct SelectorChainRule;

impl PatternRule for SelectorChainRule {
    fn id(&self) -> &str {
        "selector-chain"
    }

    fn priority(&self) -> u32 {
        40
    }

    fn detect(&self, cx: &DetectContext<'_>) -> Result<Vec<Match>, RuleError> {
        Ok(cx
            .chains()
            .iter()
            .filter(|chain| {
                let kinds = kinds(chain);
                kinds.contains(&CallKind::Mutation)
                    && !kinds.contains(&CallKind::Unknown)
                    && has_target(chain)
            })
            .map(|chain| chain_match(self.id(), cx.source(), chain))
            .collect())
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
    fn detects_mutation_chains() {
        let options = TransformOptions::default();
        let source = "$('div.greeting').css('color', 'red').text('Hi');\n$('#a').find('b').hide();\n$('#c').on('click', go);";
        let cx = DetectContext::new(source, &options);

        let found = SelectorChainRule.detect(&cx).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].captures["selector"], "'div.greeting'");
        assert_eq!(found[0].captures["methods"], "css,text");
    }

    #[test]
    fn getters_are_not_mutations() {
        let options = TransformOptions::default();
        let cx = DetectContext::new("var c = $('#a').css('color');", &options);

        assert!(SelectorChainRule.detect(&cx).unwrap().is_empty());
    }

    #[test]
    fn this_roots_are_declined() {
        let options = TransformOptions::default();
        let cx = DetectContext::new("$(this).text('x');", &options);

        assert!(SelectorChainRule.detect(&cx).unwrap().is_empty());
    }
}
