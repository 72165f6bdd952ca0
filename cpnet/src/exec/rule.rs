use super::{FiringDelta, InputView};
use crate::error::RuleError;

/// Guard and action of a transition.
///
/// Both get the same kind of [`InputView`]. Neither can touch the net directly: the guard only
/// answers whether the transition may fire, the action describes the change as a
/// [`FiringDelta`] which the net validates before applying it.
///
/// The defaults describe a transition that is always enabled and changes nothing.
pub trait TransitionRule<V>: Send + Sync {
    fn guard(&self, _view: &InputView<V>) -> Result<bool, RuleError> {
        Ok(true)
    }

    fn action(&self, _view: &InputView<V>) -> Result<FiringDelta<V>, RuleError> {
        Ok(FiringDelta::empty())
    }
}

/// Rule with the default guard and action.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passive;

impl<V> TransitionRule<V> for Passive {}

/// Rule built from a guard closure and an action closure.
pub struct FnRule<G, A> {
    guard: G,
    action: A,
}

impl<G, A> FnRule<G, A> {
    pub fn new(guard: G, action: A) -> Self {
        FnRule { guard, action }
    }
}

impl<V, G, A> TransitionRule<V> for FnRule<G, A>
where
    G: Fn(&InputView<V>) -> Result<bool, RuleError> + Send + Sync,
    A: Fn(&InputView<V>) -> Result<FiringDelta<V>, RuleError> + Send + Sync,
{
    fn guard(&self, view: &InputView<V>) -> Result<bool, RuleError> {
        (self.guard)(view)
    }

    fn action(&self, view: &InputView<V>) -> Result<FiringDelta<V>, RuleError> {
        (self.action)(view)
    }
}

/// Outcome of a guard evaluation. Failing guards count as [`Enablement::NotEnabled`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Enablement {
    Enabled,
    NotEnabled,
}

impl Enablement {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Enablement::Enabled)
    }
}

/// Outcome of an action. A failing action yields [`ActionOutcome::EmptyDelta`].
#[derive(Clone, Debug)]
pub enum ActionOutcome<V> {
    Delta(FiringDelta<V>),
    EmptyDelta,
}
