use indexmap::IndexMap;

use crate::net::Token;

/// Tokens an action wants to consume and produce, keyed by place name.
#[derive(Clone, Debug)]
pub struct FiringDelta<V> {
    consumed: IndexMap<String, Vec<Token<V>>>,
    produced: IndexMap<String, Vec<Token<V>>>,
}

impl<V> FiringDelta<V> {
    pub fn build() -> FiringDeltaBuilder<V> {
        FiringDeltaBuilder { consumed: Default::default(), produced: Default::default() }
    }

    pub fn empty() -> Self {
        FiringDelta { consumed: Default::default(), produced: Default::default() }
    }

    pub fn consumed(&self) -> &IndexMap<String, Vec<Token<V>>> {
        &self.consumed
    }

    pub fn produced(&self) -> &IndexMap<String, Vec<Token<V>>> {
        &self.produced
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.values().all(Vec::is_empty) && self.produced.values().all(Vec::is_empty)
    }

    pub(crate) fn into_parts(
        self,
    ) -> (IndexMap<String, Vec<Token<V>>>, IndexMap<String, Vec<Token<V>>>) {
        (self.consumed, self.produced)
    }
}

pub struct FiringDeltaBuilder<V> {
    consumed: IndexMap<String, Vec<Token<V>>>,
    produced: IndexMap<String, Vec<Token<V>>>,
}

impl<V> FiringDeltaBuilder<V> {
    /// Take one occurrence of `token` from `place`.
    pub fn consume(&mut self, place: impl Into<String>, token: Token<V>) {
        self.consumed.entry(place.into()).or_default().push(token);
    }

    /// Put `token` into `place`, which has to be a declared output of the transition.
    pub fn produce(&mut self, place: impl Into<String>, token: Token<V>) {
        self.produced.entry(place.into()).or_default().push(token);
    }

    pub fn result(self) -> FiringDelta<V> {
        FiringDelta { consumed: self.consumed, produced: self.produced }
    }
}
