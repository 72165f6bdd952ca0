use rand::{rngs::StdRng, Rng, SeedableRng};

/// Which enabled transition the run loop fires next.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// First enabled transition in registration order. Reproducible.
    #[default]
    FirstEnabled,
    /// Uniformly random enabled transition, reproducible for a given seed.
    Random { seed: u64 },
    /// First enabled transition in the given name order, falling back to registration order.
    Priority(Vec<String>),
}

/// Selection state kept for the duration of one run.
pub struct Selector {
    kind: SelectorKind,
}

enum SelectorKind {
    First,
    Random(StdRng),
    Priority(Vec<String>),
}

impl Selector {
    pub fn new(policy: &SelectionPolicy) -> Self {
        let kind = match policy {
            SelectionPolicy::FirstEnabled => SelectorKind::First,
            SelectionPolicy::Random { seed } => SelectorKind::Random(StdRng::seed_from_u64(*seed)),
            SelectionPolicy::Priority(order) => SelectorKind::Priority(order.clone()),
        };
        Selector { kind }
    }

    /// Pick one of the enabled transitions (given in registration order).
    pub fn select<'a>(&mut self, enabled: &'a [String]) -> Option<&'a str> {
        if enabled.is_empty() {
            return None;
        }
        let choice = match &mut self.kind {
            SelectorKind::First => &enabled[0],
            SelectorKind::Random(rng) => &enabled[rng.random_range(0..enabled.len())],
            SelectorKind::Priority(order) => order
                .iter()
                .find_map(|name| enabled.iter().find(|&tr| tr == name))
                .unwrap_or(&enabled[0]),
        };
        Some(choice.as_str())
    }
}

impl Default for Selector {
    fn default() -> Self {
        Selector::new(&SelectionPolicy::FirstEnabled)
    }
}
