mod main;
mod registry;
mod select;
mod shared;

pub use main::{
    RunConfig, RunConfigBuilder, RunConfigBuilderError, RunReport, RunState, StepOutcome,
};
pub use registry::RuleRegistry;
pub use select::{SelectionPolicy, Selector};
pub use shared::{run_all, SharedNet};
