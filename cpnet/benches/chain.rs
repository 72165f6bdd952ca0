/// Throughput of the run loop on a chain of places
///
///   pl0 ──► tr0 ──► pl1 ──► tr1 ──► ... ──► pl{len}
///
/// Every transition moves the first token of its input place to its output place. A net with `n`
/// tokens in `pl0` runs to quiescence after `n * len` firings.
///
/// The first group runs one net synchronously, the second runs several independent nets
/// concurrently on a multi threaded tokio runtime.
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cpnet::{
    exec::{FiringDelta, InputView, Transition},
    net::{PetriNet, Token},
    runner::{run_all, RunConfig, RunState, SharedNet},
    RuleError,
};
use tokio::runtime::Runtime;

fn chain(len: usize, tokens: u64) -> PetriNet<u64> {
    let mut net = PetriNet::new(format!("chain-{len}"));
    for i in 0..=len {
        net.add_place(format!("pl{i}")).expect("fresh place");
    }
    for i in 0..len {
        let pl_in = format!("pl{i}");
        let pl_out = format!("pl{}", i + 1);
        let guard_in = pl_in.clone();
        let action_in = pl_in.clone();
        let action_out = pl_out.clone();
        let tr = Transition::from_fns(
            format!("tr{i}"),
            [pl_in],
            [pl_out],
            move |view: &InputView<u64>| Ok(!view.is_empty(&guard_in)),
            move |view: &InputView<u64>| {
                let token = view.first(&action_in).ok_or_else(|| RuleError::new("empty"))?;
                let mut delta = FiringDelta::build();
                delta.consume(action_in.as_str(), token.clone());
                delta.produce(action_out.as_str(), token.clone());
                Ok(delta.result())
            },
        );
        net.add_transition(tr).expect("fresh transition");
    }
    net.add_tokens("pl0", (0..tokens).map(Token::new)).expect("pl0 exists");
    net
}

fn benchmark_chain(c: &mut Criterion) {
    // uncomment for debugging issues:
    // tracing_subscriber::fmt()
    //     .compact()
    //     .with_env_filter(tracing_subscriber::EnvFilter::try_new("info,cpnet=debug").unwrap())
    //     .init();

    let mut group = c.benchmark_group("chain");
    for &len in [1usize, 4, 16, 64].iter() {
        let tokens = 32;
        group.throughput(Throughput::Elements(len as u64 * tokens));
        group.bench_with_input(BenchmarkId::new("run", len), &len, |b, &len| {
            b.iter_batched(
                || chain(len, tokens),
                |mut net| {
                    let steps = net.run(None);
                    assert_eq!(steps as u64, len as u64 * tokens);
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn benchmark_concurrent(c: &mut Criterion) {
    let rt = Runtime::new().expect("Failed to create tokio runtime");
    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));
    for &num_nets in [1u64, 2, 4, 8, 16].iter() {
        group.throughput(Throughput::Elements(num_nets));
        group.bench_with_input(BenchmarkId::new("run_all", num_nets), &num_nets, |b, &size| {
            b.to_async(&rt).iter_custom(|iters| async move {
                let mut elapsed = Duration::ZERO;
                for _ in 0..iters {
                    let nets: Vec<_> = (0..size).map(|_| SharedNet::new(chain(8, 16))).collect();
                    let config = RunConfig { yield_every: 16, ..Default::default() };
                    let start = Instant::now();
                    let reports = run_all(nets, &config).await;
                    elapsed += start.elapsed();
                    for report in reports {
                        let report = report.expect("run task panicked");
                        assert_eq!(report.state, RunState::Quiescent);
                    }
                }
                elapsed
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_chain, benchmark_concurrent);
criterion_main!(benches);
