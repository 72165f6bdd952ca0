use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Color, ColorValue, PetriNet};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransitionShape {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// Serializable record of a net's structure and its by-value marking.
///
/// Guards and actions are not part of the record. They are supplied again by name through a
/// [`RuleRegistry`](crate::runner::RuleRegistry) when the record is turned back into a net.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NetSnapshot<V> {
    pub name: String,
    pub places: Vec<String>,
    pub transitions: Vec<TransitionShape>,
    pub marking: IndexMap<String, Vec<V>>,
}

impl<V: ColorValue> PetriNet<V> {
    /// Structure and marking of the net. Opaque tokens have no value representation and are
    /// left out.
    pub fn snapshot(&self) -> NetSnapshot<V> {
        let transitions = self
            .transitions
            .values()
            .map(|tr| TransitionShape {
                name: tr.name().to_string(),
                inputs: tr.inputs().to_vec(),
                outputs: tr.outputs().to_vec(),
            })
            .collect();
        let mut marking = IndexMap::new();
        for (pl_name, place) in &self.places {
            let mut values = Vec::with_capacity(place.len());
            for token in place.tokens() {
                match token.color() {
                    Color::Value(v) => values.push(v.clone()),
                    Color::Opaque(o) => {
                        debug!(place = pl_name, token = ?o, "Opaque token left out of snapshot.")
                    }
                }
            }
            marking.insert(pl_name.clone(), values);
        }
        NetSnapshot {
            name: self.name().to_string(),
            places: self.places.keys().cloned().collect(),
            transitions,
            marking,
        }
    }
}
