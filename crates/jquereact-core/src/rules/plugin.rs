//! Plugin calls: `$(sel).tooltip(options)` for plugins mapped to components.

use crate::rules::element::attribute_value;
use crate::rules::{chain_match, has_target, reparse_chain};
use crate::traits::{CodeFragment, DetectContext, GenerateContext, Match, PatternRule, RuleError};

/// Chains calling a plugin method that the options map to a component.
///
/// Unmapped plugin methods are not detected here.
pub struct PluginCallRule;

impl PatternRule for PluginCallRule {
    fn id(&self) -> &str {
        "plugin-call"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn detect(&self, cx: &DetectContext<'_>) -> Result<Vec<Match>, RuleError> {
        let mut found = Vec::new();
        for chain in cx.chains() {
            let Some((method, component)) = chain
                .calls
                .iter()
                .find_map(|c| cx.options.plugin_component(&c.method).map(|comp| (&c.method, comp)))
            else {
                continue;
            };
            if !has_target(chain) {
                continue;
            }

            found.push(
                chain_match(self.id(), cx.source(), chain)
                    .capture("plugin", method.as_str())
                    .capture("component", component),
            );
        }
        Ok(found)
    }

    fn generate(&self, m: &Match, cx: &mut GenerateContext<'_>) -> Result<CodeFragment, RuleError> {
        let chain = reparse_chain(m)?;
        let mut fragment = CodeFragment::new(self.id(), m.span.clone());

        let mut usages = Vec::new();
        for call in &chain.calls {
            let Some(component) = cx.options.plugin_component(&call.method) else {
                // Other calls in the chain are not carried over
                fragment.approximate();
                continue;
            };

            let mut attrs = vec![format!("target={}", attribute_value(chain.selector()))];
            match call.args.as_slice() {
                [] => {}
                [options] => attrs.push(format!("options={{{}}}", options)),
                args => attrs.push(format!("args={{[{}]}}", args.join(", "))),
            }
            usages.push(format!("<{} {} />", component, attrs.join(" ")));
        }

        if usages.is_empty() {
            return Err(RuleError::Malformed(format!(
                "no mapped plugin call in '{}'",
                m.text
            )));
        }
        fragment.markup = Some(usages.join("\n"));
        Ok(fragment)
    }
}
