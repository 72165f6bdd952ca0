use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;

use super::{main::RunLoop, RunConfig, RunReport, RunState};
use crate::{
    error::{FireError, Result},
    net::{ColorValue, Marking, NetChangeEvent, PetriNet, Token},
};

/// A net that can be observed and driven from several tasks.
///
/// Queries take the read lock, firing and seeding take the write lock. A firing is applied while
/// holding the write lock, so readers never see a partially applied firing.
pub struct SharedNet<V> {
    name: Arc<str>,
    net: Arc<RwLock<PetriNet<V>>>,
}

impl<V> Clone for SharedNet<V> {
    fn clone(&self) -> Self {
        SharedNet { name: Arc::clone(&self.name), net: Arc::clone(&self.net) }
    }
}

impl<V> std::fmt::Debug for SharedNet<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedNet")
            .field("name", &self.name)
            .field("handles", &Arc::strong_count(&self.net))
            .finish()
    }
}

impl<V: ColorValue> SharedNet<V> {
    pub fn new(net: PetriNet<V>) -> Self {
        SharedNet { name: Arc::from(net.name()), net: Arc::new(RwLock::new(net)) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn marking(&self) -> Marking<V> {
        self.net.read().await.marking()
    }

    pub async fn enabled_transitions(&self) -> Vec<String> {
        self.net.read().await.enabled_transition_names()
    }

    pub async fn revision(&self) -> u64 {
        self.net.read().await.revision()
    }

    pub async fn add_token(&self, place: &str, token: Token<V>) -> Result<NetChangeEvent<V>> {
        self.net.write().await.add_token(place, token)
    }

    pub async fn fire(
        &self,
        transition_name: &str,
    ) -> std::result::Result<NetChangeEvent<V>, FireError> {
        self.net.write().await.try_fire(transition_name)
    }

    /// Run loop that releases the lock between firings and yields to the scheduler every
    /// `config.yield_every` firings, so that other tasks can observe or seed the net meanwhile.
    #[tracing::instrument(level = "info", skip_all, fields(net = self.name()))]
    pub async fn run(&self, config: &RunConfig) -> RunReport {
        let mut run = RunLoop::new(config);
        let yield_every = config.yield_every.max(1);
        let state = loop {
            if run.limit_reached() {
                break RunState::StepLimitReached;
            }
            let outcome = self.net.write().await.step(run.selector());
            if let Some(state) = run.record(outcome) {
                break state;
            }
            if run.steps() % yield_every == 0 {
                tokio::task::yield_now().await;
            }
        };
        let revision = self.revision().await;
        run.finish(state, revision)
    }

    /// The wrapped net, if this is the last handle to it.
    pub fn into_inner(self) -> std::result::Result<PetriNet<V>, Self> {
        let name = self.name;
        Arc::try_unwrap(self.net).map(RwLock::into_inner).map_err(|net| SharedNet { name, net })
    }
}

/// Run independent nets concurrently, each on its own task, and collect their reports in the
/// order the nets were given.
pub async fn run_all<V: ColorValue>(
    nets: impl IntoIterator<Item = SharedNet<V>>,
    config: &RunConfig,
) -> Vec<Result<RunReport>> {
    let handles: Vec<_> = nets
        .into_iter()
        .map(|net| {
            let config = config.clone();
            tokio::spawn(async move { net.run(&config).await })
        })
        .collect();
    join_all(handles)
        .await
        .into_iter()
        .map(|res| res.map_err(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{FiringDelta, InputView, Transition};

    fn counting_net(tokens: usize) -> PetriNet<u32> {
        let mut net = PetriNet::new("drain");
        net.add_place("in").unwrap();
        net.add_place("out").unwrap();
        net.add_tokens("in", (0..tokens as u32).map(Token::new)).unwrap();
        net.add_transition(Transition::from_fns(
            "drain",
            ["in"],
            ["out"],
            |view: &InputView<u32>| Ok(!view.is_empty("in")),
            |view: &InputView<u32>| {
                let mut delta = FiringDelta::build();
                if let Some(token) = view.first("in") {
                    delta.consume("in", token.clone());
                    delta.produce("out", token.clone());
                }
                Ok(delta.result())
            },
        ))
        .unwrap();
        net
    }

    #[tokio::test]
    async fn run_to_quiescence() {
        let shared = SharedNet::new(counting_net(3));
        let report = shared.run(&RunConfig::default()).await;
        assert_eq!(report, RunReport { steps: 3, state: RunState::Quiescent });
        assert_eq!(shared.marking().await["out"].len(), 3);
        assert!(shared.enabled_transitions().await.is_empty());
        let net = shared.into_inner().unwrap();
        assert_eq!(net.revision(), 6);
    }

    #[tokio::test]
    async fn shared_run_honours_step_bound() {
        let shared = SharedNet::new(counting_net(3));
        assert_eq!(shared.name(), "drain");
        let config = RunConfig { max_steps: Some(2), ..Default::default() };
        let report = shared.run(&config).await;
        assert_eq!(report, RunReport { steps: 2, state: RunState::StepLimitReached });
        let report = shared.run(&RunConfig { max_steps: Some(0), ..Default::default() }).await;
        assert_eq!(report, RunReport { steps: 0, state: RunState::StepLimitReached });
        assert_eq!(shared.revision().await, 3 + 2);
        assert_eq!(shared.run(&RunConfig::default()).await.steps, 1);
    }

    #[tokio::test]
    async fn into_inner_needs_last_handle() {
        let shared = SharedNet::new(counting_net(0));
        let other = shared.clone();
        let shared = shared.into_inner().unwrap_err();
        drop(other);
        assert!(shared.into_inner().is_ok());
    }
}
