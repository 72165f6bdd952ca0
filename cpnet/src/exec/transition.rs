use tracing::{trace, warn};

use super::{ActionOutcome, Enablement, FiringDelta, FnRule, InputView, Passive, TransitionRule};
use crate::error::RuleError;

/// A named event. The declared input and output places are checked against the net before
/// the transition may fire.
pub struct Transition<V> {
    name: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    rule: Box<dyn TransitionRule<V>>,
}

fn names(names: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    let mut result = Vec::<String>::new();
    for name in names {
        let name = name.into();
        if !result.contains(&name) {
            result.push(name);
        }
    }
    result
}

impl<V: 'static> Transition<V> {
    pub fn new(
        name: impl Into<String>,
        inputs: impl IntoIterator<Item = impl Into<String>>,
        outputs: impl IntoIterator<Item = impl Into<String>>,
        rule: impl TransitionRule<V> + 'static,
    ) -> Self {
        Self::with_boxed_rule(name, inputs, outputs, Box::new(rule))
    }

    pub fn with_boxed_rule(
        name: impl Into<String>,
        inputs: impl IntoIterator<Item = impl Into<String>>,
        outputs: impl IntoIterator<Item = impl Into<String>>,
        rule: Box<dyn TransitionRule<V>>,
    ) -> Self {
        Transition { name: name.into(), inputs: names(inputs), outputs: names(outputs), rule }
    }

    pub fn from_fns<G, A>(
        name: impl Into<String>,
        inputs: impl IntoIterator<Item = impl Into<String>>,
        outputs: impl IntoIterator<Item = impl Into<String>>,
        guard: G,
        action: A,
    ) -> Self
    where
        G: Fn(&InputView<V>) -> Result<bool, RuleError> + Send + Sync + 'static,
        A: Fn(&InputView<V>) -> Result<FiringDelta<V>, RuleError> + Send + Sync + 'static,
    {
        Self::new(name, inputs, outputs, FnRule::new(guard, action))
    }

    /// Always enabled, changes nothing.
    pub fn passive(
        name: impl Into<String>,
        inputs: impl IntoIterator<Item = impl Into<String>>,
        outputs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(name, inputs, outputs, Passive)
    }
}

impl<V> Transition<V> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn is_output(&self, place: &str) -> bool {
        self.outputs.iter().any(|pl| pl == place)
    }

    /// Declare another input place. Returns false if it was already declared.
    pub fn add_input_place(&mut self, place: impl Into<String>) -> bool {
        let place = place.into();
        if self.inputs.contains(&place) {
            return false;
        }
        self.inputs.push(place);
        true
    }

    /// Declare another output place. Returns false if it was already declared.
    pub fn add_output_place(&mut self, place: impl Into<String>) -> bool {
        let place = place.into();
        if self.outputs.contains(&place) {
            return false;
        }
        self.outputs.push(place);
        true
    }

    pub fn check_enabled(&self, view: &InputView<V>) -> Enablement {
        match self.rule.guard(view) {
            Ok(true) => Enablement::Enabled,
            Ok(false) => {
                trace!(transition = self.name, "Guard not satisfied.");
                Enablement::NotEnabled
            }
            Err(err) => {
                warn!(
                    transition = self.name,
                    %err,
                    "Guard failed, treating transition as not enabled."
                );
                Enablement::NotEnabled
            }
        }
    }

    pub fn run_action(&self, view: &InputView<V>) -> ActionOutcome<V> {
        match self.rule.action(view) {
            Ok(delta) => ActionOutcome::Delta(delta),
            Err(err) => {
                warn!(transition = self.name, %err, "Action failed, no tokens will be moved.");
                ActionOutcome::EmptyDelta
            }
        }
    }
}

impl<V> std::fmt::Debug for Transition<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}
