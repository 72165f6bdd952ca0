use indexmap::IndexMap;
use tracing::{debug, error, warn};

use super::{change::describe, ColorValue, NetChange, NetChangeEvent, PetriNet, Place, Token};
use crate::{
    error::FireError,
    exec::{ActionOutcome, Transition},
};

type TokenMap<V> = IndexMap<String, Vec<Token<V>>>;

macro_rules! inconsistent {
    ($transition:expr, $($arg:tt)*) => {
        FireError::InconsistentState {
            transition: $transition.into(),
            msg: format!("{} ({}:{})", format_args!($($arg)*), file!(), line!()),
        }
    };
}

/// Every listed token has to be present, one occurrence per listing.
fn validate_consumption<V: ColorValue>(
    places: &IndexMap<String, Place<V>>,
    transition: &str,
    consumed: &TokenMap<V>,
) -> Result<(), FireError> {
    for (pl_name, tokens) in consumed {
        let place = places.get(pl_name).ok_or_else(|| FireError::UnknownPlace {
            transition: transition.into(),
            place: pl_name.clone(),
        })?;
        let mut matched = vec![false; place.len()];
        for token in tokens {
            let idx = place
                .tokens()
                .iter()
                .enumerate()
                .position(|(idx, t)| !matched[idx] && t == token)
                .ok_or_else(|| FireError::MissingToken {
                    transition: transition.into(),
                    place: pl_name.clone(),
                    token: describe(token),
                })?;
            matched[idx] = true;
        }
    }
    Ok(())
}

fn validate_production<V: ColorValue>(
    places: &IndexMap<String, Place<V>>,
    transition: &Transition<V>,
    produced: &TokenMap<V>,
) -> Result<(), FireError> {
    for pl_name in produced.keys() {
        if !places.contains_key(pl_name) {
            return Err(FireError::UnknownPlace {
                transition: transition.name().into(),
                place: pl_name.clone(),
            });
        }
        if !transition.is_output(pl_name) {
            return Err(FireError::UndeclaredOutput {
                transition: transition.name().into(),
                place: pl_name.clone(),
            });
        }
    }
    Ok(())
}

impl<V: ColorValue> PetriNet<V> {
    /// Fire a transition, returning whether it committed.
    ///
    /// See [`PetriNet::try_fire`] for the reason of a failure.
    pub fn fire(&mut self, transition_name: &str) -> bool {
        match self.try_fire(transition_name) {
            Ok(_) => true,
            Err(err @ FireError::NotEnabled(_)) => {
                debug!(%err, "Transition did not fire.");
                false
            }
            Err(err) => {
                warn!(%err, "Transition did not fire.");
                false
            }
        }
    }

    /// Fire a transition atomically.
    ///
    /// All checks (declared places, guard, action, consumption and production) run before the
    /// marking is touched, so every error except [`FireError::InconsistentState`] leaves the
    /// net unchanged.
    #[tracing::instrument(level = "debug", skip(self), fields(net = self.name()))]
    pub fn try_fire(&mut self, transition_name: &str) -> Result<NetChangeEvent<V>, FireError> {
        let transition = self
            .transitions
            .get(transition_name)
            .ok_or_else(|| FireError::UnknownTransition(transition_name.into()))?;
        if let Some(place) = self.missing_place(transition) {
            return Err(FireError::MissingPlace {
                transition: transition_name.into(),
                place: place.into(),
            });
        }

        let view = self.input_view(transition);
        if !transition.check_enabled(&view).is_enabled() {
            return Err(FireError::NotEnabled(transition_name.into()));
        }
        let delta = match transition.run_action(&view) {
            ActionOutcome::Delta(delta) => delta,
            ActionOutcome::EmptyDelta => {
                return Err(FireError::ActionFailed(transition_name.into()))
            }
        };
        let (consumed, produced) = delta.into_parts();
        validate_consumption(&self.places, transition_name, &consumed)?;
        validate_production(&self.places, transition, &produced)?;

        // from here on the marking changes
        self.revision += 1;
        let mut evt = NetChangeEvent::new(self.revision, Some(transition_name.to_string()));
        for (pl_name, tokens) in consumed {
            let place = self
                .places
                .get_mut(&pl_name)
                .ok_or_else(|| inconsistent!(transition_name, "place '{pl_name}' vanished"))?;
            for token in tokens {
                if let Err(err) = place.remove_token(&token) {
                    error!(
                        %err,
                        transition = transition_name,
                        "Removing a validated token failed, the net is partially modified."
                    );
                    return Err(inconsistent!(transition_name, "{err}"));
                }
                evt.changes.push(NetChange::Take(pl_name.clone(), token));
            }
        }
        for (pl_name, tokens) in produced {
            let place = self
                .places
                .get_mut(&pl_name)
                .ok_or_else(|| inconsistent!(transition_name, "place '{pl_name}' vanished"))?;
            for token in tokens {
                place.add_token(token.clone());
                evt.changes.push(NetChange::Place(pl_name.clone(), token));
            }
        }
        debug!(revision = evt.revision, changes = evt.changes.len(), "Transition fired.");
        Ok(evt)
    }
}
