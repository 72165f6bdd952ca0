use derive_builder::Builder;
use tracing::{debug, error, info, trace};

use super::{SelectionPolicy, Selector};
use crate::{
    error::FireError,
    net::{ColorValue, PetriNet},
};

/// Settings of a run to quiescence.
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct RunConfig {
    /// Upper bound on the number of firings. `None` runs until no transition is enabled.
    ///
    /// The bound is checked before every firing, so `Some(0)` fires nothing and `Some(n)` fires
    /// at most `n` times. This differs from a check after each firing, where a bound of zero
    /// still lets one transition fire.
    #[builder(setter(into, strip_option), default)]
    pub max_steps: Option<usize>,
    #[builder(default)]
    pub policy: SelectionPolicy,
    /// Number of firings between two yields to the async scheduler, see
    /// [`SharedNet::run`](super::SharedNet::run).
    #[builder(default = "1")]
    pub yield_every: usize,
}

impl RunConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.yield_every == Some(0) {
            return Err("yield_every must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig { max_steps: None, policy: SelectionPolicy::default(), yield_every: 1 }
    }
}

/// Why a run stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    /// No transition was enabled anymore.
    Quiescent,
    /// The configured step bound was reached while transitions may still have been enabled.
    StepLimitReached,
    /// An enabled transition failed to fire. The marking is left as it was before that attempt.
    Halted { transition: String, reason: FireError },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Number of successful firings.
    pub steps: usize,
    pub state: RunState,
}

/// Result of a single step of the run loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Fired(String),
    Quiescent,
    Halted { transition: String, reason: FireError },
}

impl<V: ColorValue> PetriNet<V> {
    /// Fire one enabled transition chosen by `selector`.
    pub fn step(&mut self, selector: &mut Selector) -> StepOutcome {
        let enabled = self.enabled_transition_names();
        trace!(net = self.name(), ?enabled, "Enabled transitions.");
        let Some(chosen) = selector.select(&enabled) else {
            return StepOutcome::Quiescent;
        };
        let chosen = chosen.to_string();
        match self.try_fire(&chosen) {
            Ok(_) => StepOutcome::Fired(chosen),
            Err(reason) => StepOutcome::Halted { transition: chosen, reason },
        }
    }

    /// Fire enabled transitions in registration order until none is enabled or `max_steps`
    /// firings happened. Returns the number of firings.
    pub fn run(&mut self, max_steps: Option<usize>) -> usize {
        let config = RunConfig { max_steps, ..Default::default() };
        self.run_with(&config).steps
    }

    #[tracing::instrument(level = "info", skip_all, fields(net = self.name()))]
    pub fn run_with(&mut self, config: &RunConfig) -> RunReport {
        let mut run = RunLoop::new(config);
        let state = loop {
            if run.limit_reached() {
                break RunState::StepLimitReached;
            }
            let outcome = self.step(run.selector());
            if let Some(state) = run.record(outcome) {
                break state;
            }
        };
        run.finish(state, self.revision())
    }
}

/// Bookkeeping of one run: the step bound, the selector and the handling of step outcomes.
/// Shared by the synchronous loop above and [`SharedNet::run`](super::SharedNet::run).
pub(super) struct RunLoop {
    selector: Selector,
    max_steps: Option<usize>,
    steps: usize,
}

impl RunLoop {
    pub(super) fn new(config: &RunConfig) -> Self {
        RunLoop { selector: Selector::new(&config.policy), max_steps: config.max_steps, steps: 0 }
    }

    pub(super) fn steps(&self) -> usize {
        self.steps
    }

    pub(super) fn limit_reached(&self) -> bool {
        self.max_steps.is_some_and(|max| self.steps >= max)
    }

    pub(super) fn selector(&mut self) -> &mut Selector {
        &mut self.selector
    }

    /// Count a firing, or return the state the run ends in.
    pub(super) fn record(&mut self, outcome: StepOutcome) -> Option<RunState> {
        match outcome {
            StepOutcome::Fired(transition) => {
                self.steps += 1;
                debug!(transition = transition.as_str(), steps = self.steps, "Fired.");
                None
            }
            StepOutcome::Quiescent => Some(RunState::Quiescent),
            StepOutcome::Halted { transition, reason } => {
                error!(
                    transition = transition.as_str(),
                    %reason,
                    "Enabled transition failed to fire, halting."
                );
                Some(RunState::Halted { transition, reason })
            }
        }
    }

    pub(super) fn finish(self, state: RunState, revision: u64) -> RunReport {
        info!(steps = self.steps, ?state, revision, "Run finished.");
        RunReport { steps: self.steps, state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::PetriError,
        exec::{FiringDelta, InputView, Transition},
        net::Token,
    };

    #[test]
    fn config_defaults_and_validation() {
        let config = RunConfigBuilder::default().build().unwrap();
        assert_eq!(config.max_steps, None);
        assert_eq!(config.policy, SelectionPolicy::FirstEnabled);
        assert_eq!(config.yield_every, 1);

        let config = RunConfigBuilder::default().max_steps(5usize).build().unwrap();
        assert_eq!(config.max_steps, Some(5));

        let err: PetriError =
            RunConfigBuilder::default().yield_every(0usize).build().unwrap_err().into();
        assert!(matches!(err, PetriError::ConfigError(_)));
    }

    #[test]
    fn step_on_quiescent_net() {
        let mut net = PetriNet::<i32>::new("idle");
        net.add_place("a").unwrap();
        net.add_token("a", Token::new(1)).unwrap();
        net.add_transition(Transition::from_fns(
            "never",
            ["a"],
            ["a"],
            |_: &InputView<i32>| Ok(false),
            |_: &InputView<i32>| Ok(FiringDelta::empty()),
        ))
        .unwrap();
        let marking = net.marking();

        assert_eq!(net.step(&mut Selector::default()), StepOutcome::Quiescent);
        let report = net.run_with(&RunConfig::default());
        assert_eq!(report, RunReport { steps: 0, state: RunState::Quiescent });
        assert_eq!(net.marking(), marking);
        assert_eq!(net.revision(), 1);
    }

    #[test]
    fn zero_step_bound_fires_nothing() {
        let mut net = PetriNet::new("loop");
        net.add_place("a").unwrap();
        net.add_token("a", Token::new(1)).unwrap();
        net.add_transition(Transition::passive("noop", ["a"], Vec::<String>::new())).unwrap();
        let config = RunConfig { max_steps: Some(0), ..Default::default() };
        let report = net.run_with(&config);
        assert_eq!(report, RunReport { steps: 0, state: RunState::StepLimitReached });
        assert_eq!(net.revision(), 1);
    }
}
