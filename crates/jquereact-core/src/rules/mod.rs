//! The standard pattern rules.
//!
//! | priority | rule | idiom |
//! |---|---|---|
//! | 10 | `plugin-call` | `$(sel).tooltip(...)` for a mapped plugin |
//! | 20 | `event-delegation` | `$(container).on('click', 'li', fn)` |
//! | 30 | `event-binding` | `$(sel).on('click', fn)`, `$(sel).click(fn)` |
//! | 40 | `selector-chain` | `$(sel).css(...).text(...)` |
//! | 50 | `remote-call` | `$.ajax(...)`, `$.get(...)`, `$.post(...)` |

mod delegation;
mod element;
mod event_binding;
mod plugin;
mod remote_call;
mod selector_chain;

pub use delegation::DelegationRule;
pub use event_binding::EventBindingRule;
pub use plugin::PluginCallRule;
pub use remote_call::RemoteCallRule;
pub use selector_chain::SelectorChainRule;

use crate::chain::{parse_chain_at, parse_utility_at, Call, Chain, UtilityCall};
use crate::events::bindings;
use crate::scan::Scanner;
use crate::selector::resolve;
use crate::traits::{Match, RuleError};

/// Animation and effect-queue methods. Their end state is kept, timing is not.
const ANIMATIONS: &[&str] = &[
    "fadeIn", "fadeOut", "fadeTo", "fadeToggle", "slideUp", "slideDown", "slideToggle",
    "animate", "toggle", "stop", "delay", "finish", "queue", "dequeue", "clearQueue",
];

/// What a single chain call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Changes the element (`css`, `text`, `addClass`, ...)
    Mutation,

    /// Binds a handler on the element itself
    Event,

    /// Binds a handler filtered by a child selector
    Delegated,

    /// Animation or effect queue
    Animation,

    /// Anything else: getters, traversal, unmapped plugins
    Unknown,
}

/// Classify a chain call.
pub fn classify(call: &Call) -> CallKind {
    if let Some(found) = bindings(call) {
        return if found.iter().any(|b| b.delegate.is_some()) {
            CallKind::Delegated
        } else {
            CallKind::Event
        };
    }

    if element::is_mutation(call) {
        CallKind::Mutation
    } else if ANIMATIONS.contains(&call.method.as_str()) {
        CallKind::Animation
    } else {
        CallKind::Unknown
    }
}

/// Kinds of every call in a chain.
fn kinds(chain: &Chain) -> Vec<CallKind> {
    chain.calls.iter().map(classify).collect()
}

/// Whether the chain's root is something a rule can translate.
fn has_target(chain: &Chain) -> bool {
    resolve(chain.selector()).is_some()
}

/// A match covering a whole chain.
fn chain_match(rule: &str, source: &str, chain: &Chain) -> Match {
    Match::new(rule, source, chain.span.clone())
        .capture("selector", chain.selector())
        .capture("methods", chain.methods().join(","))
}

/// Parse the chain a match was created from.
fn reparse_chain(m: &Match) -> Result<Chain, RuleError> {
    let scanner = Scanner::new(&m.text);
    parse_chain_at(&scanner, 0)
        .ok_or_else(|| RuleError::Malformed(format!("expected a jQuery chain at '{}'", m.text)))
}

/// Parse the utility call a match was created from.
fn reparse_utility(m: &Match) -> Result<UtilityCall, RuleError> {
    let scanner = Scanner::new(&m.text);
    parse_utility_at(&scanner, 0)
        .ok_or_else(|| RuleError::Malformed(format!("expected a jQuery utility call at '{}'", m.text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(method: &str, args: &[&str]) -> Call {
        Call {
            method: method.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            span: 0..0,
        }
    }

    #[test]
    fn classifies_calls() {
        assert_eq!(classify(&call("css", &["'color'", "'red'"])), CallKind::Mutation);
        assert_eq!(classify(&call("css", &["{ color: 'red' }"])), CallKind::Mutation);
        assert_eq!(classify(&call("css", &["'color'"])), CallKind::Unknown);
        assert_eq!(classify(&call("text", &[])), CallKind::Unknown);
        assert_eq!(classify(&call("on", &["'click'", "fn"])), CallKind::Event);
        assert_eq!(classify(&call("on", &["'click'", "'li'", "fn"])), CallKind::Delegated);
        assert_eq!(classify(&call("fadeIn", &["200"])), CallKind::Animation);
        assert_eq!(classify(&call("datepicker", &[])), CallKind::Unknown);
        assert_eq!(classify(&call("find", &["'li'"])), CallKind::Unknown);
    }
}
