//! Execution engine for colored petri nets.
//!
//! A [`PetriNet`](net::PetriNet) holds named places with multisets of colored tokens and named
//! transitions. Each transition carries a [`TransitionRule`](exec::TransitionRule): a guard that
//! decides enablement from a read-only view of the input places and an action that describes the
//! tokens to consume and produce. Firing validates the described change and applies it as one
//! step, or not at all.
pub mod error;
pub mod exec;
pub mod net;
pub mod runner;

pub use error::{FireError, PetriError, Result, RuleError};
