mod delta;
mod rule;
mod transition;
mod view;

pub use delta::{FiringDelta, FiringDeltaBuilder};
pub use rule::{ActionOutcome, Enablement, FnRule, Passive, TransitionRule};
pub use transition::Transition;
pub use view::InputView;
