use indexmap::IndexMap;

use crate::net::Token;

/// Snapshot of the tokens in a transition's input places, taken when the view is built.
///
/// Guards and actions only ever see a view; mutating the net goes through a
/// [`FiringDelta`](super::FiringDelta).
#[derive(Clone, Debug)]
pub struct InputView<V> {
    tokens: IndexMap<String, Vec<Token<V>>>,
}

impl<V> InputView<V> {
    pub fn new() -> Self {
        InputView { tokens: IndexMap::new() }
    }

    pub(crate) fn insert(&mut self, place: impl Into<String>, tokens: Vec<Token<V>>) {
        self.tokens.insert(place.into(), tokens);
    }

    /// Tokens of `place`. Places that are not part of the view are empty.
    pub fn tokens(&self, place: &str) -> &[Token<V>] {
        self.tokens.get(place).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn first(&self, place: &str) -> Option<&Token<V>> {
        self.tokens(place).first()
    }

    pub fn len(&self, place: &str) -> usize {
        self.tokens(place).len()
    }

    pub fn is_empty(&self, place: &str) -> bool {
        self.tokens(place).is_empty()
    }

    pub fn contains_place(&self, place: &str) -> bool {
        self.tokens.contains_key(place)
    }

    pub fn place_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Token<V>])> {
        self.tokens.iter().map(|(pl, to)| (pl.as_str(), to.as_slice()))
    }
}

impl<V> Default for InputView<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S: Into<String>> FromIterator<(S, Vec<Token<V>>)> for InputView<V> {
    fn from_iter<T: IntoIterator<Item = (S, Vec<Token<V>>)>>(iter: T) -> Self {
        let mut view = InputView::new();
        for (place, tokens) in iter {
            view.insert(place, tokens);
        }
        view
    }
}
