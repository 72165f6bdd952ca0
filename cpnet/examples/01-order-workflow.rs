use cpnet::{
    error::Result as PetriResult,
    exec::{FiringDelta, InputView, Transition, TransitionRule},
    net::{NetSnapshot, PetriNetBuilder, Token},
    runner::{RuleRegistry, RunConfigBuilder, SelectionPolicy, SharedNet},
    PetriError, RuleError,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct Order {
    id: u32,
    amount: u32,
    note: String,
}

type View = InputView<Order>;

/// Accepts orders up to a limit, everything above ends up in 'rejected'.
struct Validate {
    limit: u32,
}

impl TransitionRule<Order> for Validate {
    fn guard(&self, view: &View) -> Result<bool, RuleError> {
        Ok(!view.is_empty("incoming"))
    }

    fn action(&self, view: &View) -> Result<FiringDelta<Order>, RuleError> {
        let token = view.first("incoming").ok_or_else(|| RuleError::new("no order"))?;
        let order = token.value().ok_or_else(|| RuleError::new("order has no value"))?;
        let mut delta = FiringDelta::build();
        delta.consume("incoming", token.clone());
        if order.amount <= self.limit {
            delta.produce("validated", token.clone());
        } else {
            let mut rejected = order.clone();
            rejected.note = format!("amount {} over limit {}", order.amount, self.limit);
            delta.produce("rejected", Token::new(rejected));
        }
        Ok(delta.result())
    }
}

/// Packs validated orders, one parcel per order.
struct Pack;

impl TransitionRule<Order> for Pack {
    fn guard(&self, view: &View) -> Result<bool, RuleError> {
        Ok(!view.is_empty("validated"))
    }

    fn action(&self, view: &View) -> Result<FiringDelta<Order>, RuleError> {
        let token = view.first("validated").ok_or_else(|| RuleError::new("no order"))?;
        let mut order = token.value().cloned().ok_or_else(|| RuleError::new("no value"))?;
        order.note = format!("parcel {}", order.id * 1000 + order.amount % 1000);
        let mut delta = FiringDelta::build();
        delta.consume("validated", token.clone());
        delta.produce("packed", Token::new(order));
        Ok(delta.result())
    }
}

struct Ship;

impl TransitionRule<Order> for Ship {
    fn guard(&self, view: &View) -> Result<bool, RuleError> {
        Ok(!view.is_empty("packed"))
    }

    fn action(&self, view: &View) -> Result<FiringDelta<Order>, RuleError> {
        let mut delta = FiringDelta::build();
        for token in view.tokens("packed") {
            delta.consume("packed", token.clone());
            delta.produce("shipped", token.clone());
        }
        Ok(delta.result())
    }
}

fn rules() -> RuleRegistry<Order> {
    let mut rules = RuleRegistry::new();
    rules.register("validate", Validate { limit: 500 });
    rules.register("pack", Pack);
    rules.register("ship", Ship);
    rules
}

fn order(id: u32, amount: u32) -> Token<Order> {
    Token::new(Order { id, amount, note: String::new() })
}

#[tracing::instrument(level = "info")]
async fn run() -> PetriResult<()> {
    let mut registry = rules();
    let mut builder = PetriNetBuilder::new("orders");
    for pl in ["incoming", "validated", "rejected", "packed", "shipped"] {
        builder.insert_place(pl)?;
    }
    for (name, inputs, outputs) in [
        ("validate", vec!["incoming"], vec!["validated", "rejected"]),
        ("pack", vec!["validated"], vec!["packed"]),
        ("ship", vec!["packed"], vec!["shipped"]),
    ] {
        let rule = registry.take(name).ok_or_else(|| PetriError::RuleNotFound(name.into()))?;
        builder.insert_transition(Transition::with_boxed_rule(name, inputs, outputs, rule))?;
    }
    for (id, amount) in [(1, 120), (2, 760), (3, 45), (4, 310)] {
        builder.insert_token("incoming", order(id, amount))?;
    }
    let net = SharedNet::new(builder.build()?);

    let config = RunConfigBuilder::default()
        .policy(SelectionPolicy::Random { seed: 42 })
        .max_steps(100usize)
        .build()?;
    let (report, _) = tokio::join!(net.run(&config), async {
        // a late order arrives while the workflow is running
        if let Err(err) = net.add_token("incoming", order(5, 80)).await {
            warn!(%err, "Could not place late order.");
        }
    });
    info!(steps = report.steps, state = ?report.state, "Workflow finished.");

    for (place, colors) in net.marking().await {
        info!(place = place.as_str(), tokens = colors.len(), "{:?}", colors);
    }

    // store the final state and restore it into a fresh net
    let net = net
        .into_inner()
        .map_err(|_| PetriError::InconsistentState("net is still shared".to_string()))?;
    let json = serde_json::to_string_pretty(&net.snapshot())
        .map_err(|err| PetriError::ValueError(err.to_string()))?;
    info!("Snapshot:\n{json}");
    let snapshot: NetSnapshot<Order> =
        serde_json::from_str(&json).map_err(|err| PetriError::ValueError(err.to_string()))?;
    let mut restored = PetriNetBuilder::from_snapshot(snapshot, &mut rules())?.build()?;
    info!(
        shipped = restored.place("shipped").map(|pl| pl.len()).unwrap_or_default(),
        enabled = ?restored.enabled_transition_names(),
        "Restored net."
    );

    // the restored net keeps working: validate one more order by hand
    restored.add_token("incoming", order(6, 90))?;
    let evt = restored.try_fire("validate")?;
    info!(%evt, "Fired manually.");

    info!("Bye.");
    Ok(())
}

#[tokio::main]
async fn main() -> PetriResult<()> {
    // set up logging
    tracing_subscriber::fmt()
        .with_span_events(
            tracing_subscriber::fmt::format::FmtSpan::CLOSE
                | tracing_subscriber::fmt::format::FmtSpan::NEW,
        )
        .compact()
        .with_env_filter(EnvFilter::try_new("info,cpnet=debug").unwrap())
        .init();

    run().await
}
