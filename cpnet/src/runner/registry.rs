use std::collections::HashMap;

use crate::exec::TransitionRule;

/// Rules keyed by transition name, used to attach guards and actions to a net restored from a
/// [`NetSnapshot`](crate::net::NetSnapshot).
pub struct RuleRegistry<V> {
    rules: HashMap<String, Box<dyn TransitionRule<V>>>,
}

impl<V> Default for RuleRegistry<V> {
    fn default() -> Self {
        RuleRegistry { rules: HashMap::new() }
    }
}

impl<V> RuleRegistry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rule of a transition, replacing an earlier one with the same name.
    pub fn register(
        &mut self,
        transition_name: impl Into<String>,
        rule: impl TransitionRule<V> + 'static,
    ) {
        self.rules.insert(transition_name.into(), Box::new(rule));
    }

    pub fn take(&mut self, transition_name: &str) -> Option<Box<dyn TransitionRule<V>>> {
        self.rules.remove(transition_name)
    }

    pub fn contains(&self, transition_name: &str) -> bool {
        self.rules.contains_key(transition_name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::Passive;

    #[test]
    fn register_and_take() {
        let mut rules = RuleRegistry::<u8>::new();
        rules.register("a", Passive);
        rules.register("b", Passive);
        rules.register("a", Passive);
        assert_eq!(rules.len(), 2);
        assert!(rules.take("a").is_some());
        assert!(rules.take("a").is_none());
        assert!(!rules.contains("a"));
        assert!(rules.contains("b"));
    }
}
