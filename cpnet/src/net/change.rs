use std::fmt::{Debug, Display};

use unicode_segmentation::UnicodeSegmentation;

use super::{common::Token, Color};

#[derive(Debug, Clone, PartialEq)]
pub enum NetChange<V> {
    // changes made by a firing transition
    Take(String, Token<V>),
    Place(String, Token<V>),
    // tokens seeded from outside the net
    ExternalPlace(String, Token<V>),
}

#[derive(Debug, Clone)]
pub struct NetChangeEvent<V> {
    pub changes: Vec<NetChange<V>>,
    pub revision: u64,
    /// None for external changes
    pub transition: Option<String>,
}

impl<V> NetChangeEvent<V> {
    pub fn new(revision: u64, transition: Option<String>) -> Self {
        NetChangeEvent { changes: Default::default(), revision, transition }
    }

    pub fn taken(&self) -> impl Iterator<Item = (&str, &Token<V>)> {
        self.changes.iter().filter_map(|c| match c {
            NetChange::Take(pl, to) => Some((pl.as_str(), to)),
            _ => None,
        })
    }

    pub fn placed(&self) -> impl Iterator<Item = (&str, &Token<V>)> {
        self.changes.iter().filter_map(|c| match c {
            NetChange::Place(pl, to) | NetChange::ExternalPlace(pl, to) => Some((pl.as_str(), to)),
            _ => None,
        })
    }
}

fn truncated(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        // Note: length in bytes, but each grapheme must have one byte at least.
        return s.into();
    }
    let mut graphemes = s.graphemes(true).take(max_len + 1).collect::<Vec<_>>();
    if graphemes.len() > max_len {
        graphemes.remove(max_len);
        graphemes[max_len - 1] = ".";
        graphemes[max_len - 2] = ".";
        graphemes[max_len - 3] = ".";
    }

    graphemes.concat()
}

/// Short, log friendly rendering of a token.
pub(crate) fn describe<V: Debug>(token: &Token<V>) -> String {
    match token.color() {
        Color::Value(v) => truncated(&format!("{v:?}"), 100),
        Color::Opaque(o) => format!("{o:?}"),
    }
}

impl<V: Debug> Display for NetChangeEvent<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "revision={}, ", self.revision)?;
        if let Some(tr) = &self.transition {
            write!(f, "transition={tr}, ")?;
        }
        write!(f, "changes=[")?;
        for (idx, change) in self.changes.iter().enumerate() {
            if idx == 0 {
                write!(f, "{}", change)?;
            } else {
                write!(f, ", {}", change)?;
            }
        }
        write!(f, "]")?;
        Ok(())
    }
}

impl<V: Debug> Display for NetChange<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetChange::Take(place, token) => write!(f, "Take({} <- {})", describe(token), place),
            NetChange::Place(place, token) => write!(f, "Place({} -> {})", describe(token), place),
            NetChange::ExternalPlace(place, token) => {
                write!(f, "ExternalPlace({}: ? -> {})", describe(token), place)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_values_are_truncated() {
        let s = "ä".repeat(150);
        let out = truncated(&s, 100);
        assert_eq!(out.graphemes(true).count(), 100);
        assert!(out.ends_with("..."));
        assert_eq!(truncated("short", 100), "short");
    }

    #[test]
    fn event_display() {
        let mut evt = NetChangeEvent::new(3, Some("Move".to_string()));
        evt.changes.push(NetChange::Take("Start".into(), Token::new("data")));
        evt.changes.push(NetChange::Place("End".into(), Token::new("data_moved")));
        assert_eq!(
            evt.to_string(),
            "revision=3, transition=Move, \
             changes=[Take(\"data\" <- Start), Place(\"data_moved\" -> End)]"
        );
        assert_eq!(evt.taken().count(), 1);
        assert_eq!(evt.placed().next().map(|(pl, _)| pl), Some("End"));
    }
}
