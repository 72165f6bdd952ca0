mod builder;
mod change;
mod common;
mod fire;
mod net_state;
mod snapshot;

pub use builder::PetriNetBuilder;
pub use change::{NetChange, NetChangeEvent};
pub use common::{Color, ColorValue, Marking, OpaqueValue, Place, Token};
pub use net_state::PetriNet;
pub use snapshot::{NetSnapshot, TransitionShape};
