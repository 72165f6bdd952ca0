use tracing::debug;

use crate::{
    error::{PetriError, Result},
    exec::Transition,
    runner::RuleRegistry,
};

use super::{ColorValue, NetSnapshot, PetriNet, Token};

/// Collects places, transitions and an initial marking and validates them as a whole.
///
/// Unlike registering directly on a [`PetriNet`], building fails if a transition declares a
/// place that does not exist.
pub struct PetriNetBuilder<V> {
    name: String,
    places: Vec<String>,
    transitions: Vec<Transition<V>>,
    marking: Vec<(String, Token<V>)>,
}

impl<V: ColorValue> PetriNetBuilder<V> {
    pub fn new(name: impl Into<String>) -> Self {
        PetriNetBuilder {
            name: name.into(),
            places: Default::default(),
            transitions: Default::default(),
            marking: Default::default(),
        }
    }

    /// Builder for the structure and marking of a snapshot.
    ///
    /// The rule of every transition is taken out of `rules` by transition name.
    pub fn from_snapshot(snapshot: NetSnapshot<V>, rules: &mut RuleRegistry<V>) -> Result<Self> {
        let mut builder = PetriNetBuilder::new(snapshot.name);
        for pl_name in snapshot.places {
            builder.insert_place(pl_name)?;
        }
        for shape in snapshot.transitions {
            let rule = rules
                .take(&shape.name)
                .ok_or_else(|| PetriError::RuleNotFound(shape.name.clone()))?;
            builder.insert_transition(Transition::with_boxed_rule(
                shape.name,
                shape.inputs,
                shape.outputs,
                rule,
            ))?;
        }
        for (pl_name, values) in snapshot.marking {
            for value in values {
                builder.insert_token(&pl_name, Token::new(value))?;
            }
        }
        Ok(builder)
    }

    pub fn places(&self) -> &[String] {
        &self.places
    }

    pub fn transitions(&self) -> &[Transition<V>] {
        &self.transitions
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty() && self.transitions.is_empty()
    }

    pub fn insert_place(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.places.contains(&name) {
            return Err(PetriError::DuplicatePlace(name));
        }
        self.places.push(name);
        Ok(())
    }

    pub fn insert_transition(&mut self, transition: Transition<V>) -> Result<()> {
        if self.transitions.iter().any(|tr| tr.name() == transition.name()) {
            return Err(PetriError::DuplicateTransition(transition.name().into()));
        }
        self.transitions.push(transition);
        Ok(())
    }

    pub fn insert_token(&mut self, place: &str, token: Token<V>) -> Result<()> {
        if !self.places.iter().any(|pl| pl == place) {
            return Err(PetriError::PlaceNotFound(place.into()));
        }
        self.marking.push((place.into(), token));
        Ok(())
    }

    /// Build the PetriNet
    ///
    /// Fails if any transition declares an input or output place that has not been inserted.
    pub fn build(self) -> Result<PetriNet<V>> {
        for tr in &self.transitions {
            if let Some(pl) =
                tr.inputs().iter().chain(tr.outputs()).find(|pl| !self.places.contains(*pl))
            {
                return Err(PetriError::ValueError(format!(
                    "Transition '{}' declares place '{pl}' which does not exist.",
                    tr.name()
                )));
            }
        }
        let mut net = PetriNet::new(self.name);
        let places = self.places.len();
        let transitions = self.transitions.len();
        let tokens = self.marking.len();
        for pl_name in self.places {
            net.add_place(pl_name)?;
        }
        for tr in self.transitions {
            net.add_transition(tr)?;
        }
        for (pl_name, token) in self.marking {
            net.add_token(&pl_name, token)?;
        }
        debug!(net = net.name(), places, transitions, tokens, "Built petri net.");
        Ok(net)
    }
}
