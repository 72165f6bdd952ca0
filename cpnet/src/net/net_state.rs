use indexmap::IndexMap;
use tracing::{debug, trace};

use super::{ColorValue, Marking, NetChange, NetChangeEvent, Place, Token};
use crate::{
    error::{PetriError, Result},
    exec::{InputView, Transition},
};

/// A colored petri net: places and transitions keyed by name, in registration order.
///
/// The marking is the whole observable state. Places and transitions are registered before
/// execution starts, tokens may be seeded at any time between firings.
pub struct PetriNet<V> {
    name: String,
    pub(super) places: IndexMap<String, Place<V>>,
    pub(super) transitions: IndexMap<String, Transition<V>>,
    pub(super) revision: u64,
}

impl<V: ColorValue> PetriNet<V> {
    pub fn new(name: impl Into<String>) -> Self {
        PetriNet {
            name: name.into(),
            places: Default::default(),
            transitions: Default::default(),
            revision: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn places(&self) -> &IndexMap<String, Place<V>> {
        &self.places
    }

    pub fn transitions(&self) -> &IndexMap<String, Transition<V>> {
        &self.transitions
    }

    pub fn place(&self, name: &str) -> Option<&Place<V>> {
        self.places.get(name)
    }

    pub fn transition(&self, name: &str) -> Option<&Transition<V>> {
        self.transitions.get(name)
    }

    /// Incremented by every successful firing and every seeded token.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register an empty place.
    pub fn add_place(&mut self, name: impl Into<String>) -> Result<()> {
        self.insert_place(Place::new(name))
    }

    /// Register a place, including the tokens it already holds.
    pub fn insert_place(&mut self, place: Place<V>) -> Result<()> {
        if self.places.contains_key(place.name()) {
            return Err(PetriError::DuplicatePlace(place.name().into()));
        }
        debug!(net = self.name, place = place.name(), tokens = place.len(), "Added place.");
        self.places.insert(place.name().to_string(), place);
        Ok(())
    }

    /// Register a transition. Its declared places are checked when it is about to fire.
    pub fn add_transition(&mut self, transition: Transition<V>) -> Result<()> {
        if self.transitions.contains_key(transition.name()) {
            return Err(PetriError::DuplicateTransition(transition.name().into()));
        }
        debug!(
            net = self.name,
            transition = transition.name(),
            inputs = ?transition.inputs(),
            outputs = ?transition.outputs(),
            "Added transition."
        );
        self.transitions.insert(transition.name().to_string(), transition);
        Ok(())
    }

    /// Seed a token into a place from outside the net.
    pub fn add_token(&mut self, place: &str, token: Token<V>) -> Result<NetChangeEvent<V>> {
        let pl = self
            .places
            .get_mut(place)
            .ok_or_else(|| PetriError::PlaceNotFound(place.to_string()))?;
        pl.add_token(token.clone());
        self.revision += 1;
        let mut evt = NetChangeEvent::new(self.revision, None);
        evt.changes.push(NetChange::ExternalPlace(place.to_string(), token));
        trace!(net = self.name, %evt, "Seeded token.");
        Ok(evt)
    }

    pub fn add_tokens(
        &mut self,
        place: &str,
        tokens: impl IntoIterator<Item = Token<V>>,
    ) -> Result<()> {
        for token in tokens {
            self.add_token(place, token)?;
        }
        Ok(())
    }

    /// Snapshot of the current token values of every place.
    pub fn marking(&self) -> Marking<V> {
        self.places.iter().map(|(name, pl)| (name.clone(), pl.colors())).collect()
    }

    pub fn token_count(&self) -> usize {
        self.places.values().map(Place::len).sum()
    }

    /// First declared input or output place of `transition` that is not part of the net.
    pub(super) fn missing_place<'a>(&self, transition: &'a Transition<V>) -> Option<&'a str> {
        transition
            .inputs()
            .iter()
            .chain(transition.outputs())
            .find(|pl| !self.places.contains_key(pl.as_str()))
            .map(String::as_str)
    }

    /// Copy of the current tokens of every declared input place.
    pub(super) fn input_view(&self, transition: &Transition<V>) -> InputView<V> {
        let mut view = InputView::new();
        for pl_name in transition.inputs() {
            let tokens = self.places.get(pl_name).map(|pl| pl.tokens.clone()).unwrap_or_default();
            view.insert(pl_name.clone(), tokens);
        }
        view
    }

    fn inputs_exist(&self, transition: &Transition<V>) -> bool {
        transition.inputs().iter().all(|pl| self.places.contains_key(pl.as_str()))
    }

    /// Whether all input places of the transition exist and its guard holds right now.
    pub fn is_enabled(&self, transition_name: &str) -> bool {
        match self.transitions.get(transition_name) {
            Some(tr) => {
                self.inputs_exist(tr) && tr.check_enabled(&self.input_view(tr)).is_enabled()
            }
            None => false,
        }
    }

    /// Enabled transitions in registration order.
    pub fn enabled_transitions(&self) -> Vec<&Transition<V>> {
        self.transitions
            .values()
            .filter(|tr| {
                if !self.inputs_exist(tr) {
                    trace!(transition = tr.name(), "Not all input places exist.");
                    return false;
                }
                tr.check_enabled(&self.input_view(tr)).is_enabled()
            })
            .collect()
    }

    pub fn enabled_transition_names(&self) -> Vec<String> {
        self.enabled_transitions().into_iter().map(|tr| tr.name().to_string()).collect()
    }
}

impl<V> std::fmt::Debug for PetriNet<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PetriNet")
            .field("name", &self.name)
            .field("places", &self.places.keys().collect::<Vec<_>>())
            .field("transitions", &self.transitions.keys().collect::<Vec<_>>())
            .field("revision", &self.revision)
            .finish()
    }
}
