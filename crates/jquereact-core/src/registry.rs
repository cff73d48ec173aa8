//! The ordered catalogue of pattern rules.
//!
//! Rules are ordered by (priority, registration order) when the registry is
//! built. That order decides which rule wins when two matches start at the same
//! offset, and it never changes afterwards.

use std::collections::HashSet;

use crate::rules::{
    DelegationRule, EventBindingRule, PluginCallRule, RemoteCallRule, SelectorChainRule,
};
use crate::traits::PatternRule;

/// An immutable, ordered set of rules.
pub struct PatternRegistry {
    rules: Vec<Box<dyn PatternRule>>,
}

impl std::fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRegistry")
            .field("rules", &self.ids())
            .finish()
    }
}

impl PatternRegistry {
    /// Build a registry from rules in registration order.
    pub fn new(rules: Vec<Box<dyn PatternRule>>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id().to_string()) {
                return Err(RegistryError::DuplicateRule(rule.id().to_string()));
            }
        }
        Ok(Self::ordered(rules))
    }

    /// The standard rule set.
    pub fn standard() -> Self {
        Self::ordered(vec![
            Box::new(PluginCallRule),
            Box::new(DelegationRule),
            Box::new(EventBindingRule),
            Box::new(SelectorChainRule),
            Box::new(RemoteCallRule),
        ])
    }

    /// An empty registry; every input falls back to the scaffold.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    fn ordered(mut rules: Vec<Box<dyn PatternRule>>) -> Self {
        // Stable: equal priorities keep registration order
        rules.sort_by_key(|rule| rule.priority());
        Self { rules }
    }

    /// A copy of this registry without the rule `id`.
    pub fn without(self, id: &str) -> Self {
        Self {
            rules: self.rules.into_iter().filter(|r| r.id() != id).collect(),
        }
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn PatternRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Rule ids in evaluation order.
    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&dyn PatternRule> {
        self.rules().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Errors that can occur when building a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Rule registered twice: {0}")]
    DuplicateRule(String),
}
