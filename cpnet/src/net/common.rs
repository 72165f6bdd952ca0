use std::{
    any::{type_name, Any},
    fmt::Debug,
    sync::Arc,
};

use indexmap::IndexMap;

use crate::error::{PetriError, Result};

use super::change::describe;

/// Bounds every token color type has to satisfy.
pub trait ColorValue: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T> ColorValue for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}

/// Payload without value semantics. Equal only to clones of itself.
#[derive(Clone)]
pub struct OpaqueValue {
    payload: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl OpaqueValue {
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        OpaqueValue { payload: Arc::new(payload), type_name: type_name::<T>() }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl Debug for OpaqueValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Opaque<{}>@{:p}", self.type_name, Arc::as_ptr(&self.payload))
    }
}

/// The color of a token.
///
/// `Value` colors are compared with the equality of `V`, `Opaque` colors by identity.
#[derive(Clone, PartialEq, Debug)]
pub enum Color<V> {
    Value(V),
    Opaque(OpaqueValue),
}

impl<V> Color<V> {
    pub fn value(&self) -> Option<&V> {
        match self {
            Color::Value(v) => Some(v),
            Color::Opaque(_) => None,
        }
    }
}

/// Immutable unit of data flowing through the net.
#[derive(Clone, PartialEq, Debug)]
pub struct Token<V> {
    color: Color<V>,
}

impl<V> Token<V> {
    pub fn new(value: V) -> Self {
        Token { color: Color::Value(value) }
    }

    /// Wrap a payload that has no usable equality. The token only matches its own clones.
    pub fn opaque<T: Any + Send + Sync>(payload: T) -> Self {
        Token { color: Color::Opaque(OpaqueValue::new(payload)) }
    }

    pub fn color(&self) -> &Color<V> {
        &self.color
    }

    pub fn value(&self) -> Option<&V> {
        self.color.value()
    }

    pub fn into_color(self) -> Color<V> {
        self.color
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self.color, Color::Opaque(_))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match &self.color {
            Color::Opaque(opaque) => opaque.downcast_ref::<T>(),
            Color::Value(_) => None,
        }
    }
}

/// Current token content of every place, in place registration order.
pub type Marking<V> = IndexMap<String, Vec<Color<V>>>;

/// Named multiset of tokens. Insertion order is kept so iteration is deterministic.
#[derive(Clone, Debug)]
pub struct Place<V> {
    name: String,
    pub(super) tokens: Vec<Token<V>>,
}

impl<V: ColorValue> Place<V> {
    pub fn new(name: impl Into<String>) -> Self {
        Place { name: name.into(), tokens: Default::default() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tokens(&self) -> &[Token<V>] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn add_token(&mut self, token: Token<V>) {
        self.tokens.push(token);
    }

    /// Remove exactly one token equal to `token` (the first one found).
    pub fn remove_token(&mut self, token: &Token<V>) -> Result<Token<V>> {
        match self.tokens.iter().position(|t| t == token) {
            Some(idx) => Ok(self.tokens.remove(idx)),
            None => Err(PetriError::ValueError(format!(
                "Token {} not found in place '{}'",
                describe(token),
                self.name
            ))),
        }
    }

    pub fn contains(&self, token: &Token<V>) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn count_of(&self, token: &Token<V>) -> usize {
        self.tokens.iter().filter(|&t| t == token).count()
    }

    pub fn has_value(&self, value: &V) -> bool {
        self.tokens.iter().any(|t| t.value() == Some(value))
    }

    pub fn tokens_with_value(&self, value: &V) -> Vec<&Token<V>> {
        self.tokens.iter().filter(|t| t.value() == Some(value)).collect()
    }

    /// Opaque tokens whose payload is a `T`.
    pub fn opaque_tokens_of<T: Any>(&self) -> Vec<&Token<V>> {
        self.tokens.iter().filter(|t| t.downcast_ref::<T>().is_some()).collect()
    }

    pub fn colors(&self) -> Vec<Color<V>> {
        self.tokens.iter().map(|t| t.color().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Unhashable {
        #[allow(dead_code)]
        items: Vec<f64>,
    }

    #[test]
    fn tokens_compare_by_value() {
        assert_eq!(Token::new("hello".to_string()), Token::new("hello".to_string()));
        assert_ne!(Token::new("hello".to_string()), Token::new("world".to_string()));
    }

    #[test]
    fn opaque_tokens_compare_by_identity() {
        let a = Token::<String>::opaque(Unhashable { items: vec![1.0] });
        let b = Token::<String>::opaque(Unhashable { items: vec![1.0] });
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(a, Token::new("x".to_string()));
        assert!(a.downcast_ref::<Unhashable>().is_some());
        assert!(a.value().is_none());
    }

    #[test]
    fn place_is_a_multiset() {
        let mut place = Place::new("P");
        let a = Token::new(1);
        place.add_token(a.clone());
        place.add_token(Token::new(2));
        place.add_token(a.clone());
        assert_eq!(place.count_of(&a), 2);

        place.remove_token(&a).unwrap();
        assert_eq!(place.count_of(&a), 1);
        assert_eq!(place.len(), 2);
        // the remaining occurrence of 1 is now behind 2
        assert_eq!(place.colors(), vec![Color::Value(2), Color::Value(1)]);
    }

    #[test]
    fn removing_missing_token_leaves_place_untouched() {
        let mut place = Place::new("P");
        place.add_token(Token::new("A"));
        place.add_token(Token::new("B"));
        let before = place.colors();

        assert!(place.remove_token(&Token::new("C")).is_err());
        assert_eq!(place.colors(), before);
    }

    #[test]
    fn add_remove_sequences_keep_counts() {
        let mut place = Place::new("P");
        let ops = [(true, 1), (true, 1), (true, 2), (false, 1), (false, 3), (true, 3), (false, 1)];
        let mut adds = [0i64; 4];
        let mut removes = [0i64; 4];
        for (add, v) in ops {
            if add {
                place.add_token(Token::new(v));
                adds[v as usize] += 1;
            } else if place.remove_token(&Token::new(v)).is_ok() {
                removes[v as usize] += 1;
            }
        }
        for v in 1..4 {
            let expected = adds[v as usize] - removes[v as usize];
            assert_eq!(place.count_of(&Token::new(v)) as i64, expected);
        }
    }

    #[test]
    fn queries_by_value_and_type() {
        let mut place = Place::new("P");
        place.add_token(Token::new(7u32));
        place.add_token(Token::new(7u32));
        place.add_token(Token::opaque(Unhashable { items: vec![] }));
        place.add_token(Token::opaque(String::from("raw")));

        assert!(place.has_value(&7));
        assert!(!place.has_value(&8));
        assert_eq!(place.tokens_with_value(&7).len(), 2);
        assert_eq!(place.opaque_tokens_of::<Unhashable>().len(), 1);
        assert_eq!(place.opaque_tokens_of::<String>().len(), 1);
    }
}
