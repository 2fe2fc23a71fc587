//! Retry decision path benchmarks
//!
//! Run with: `cargo bench --bench retry_decision -p retrygate-core`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use http::{HeaderMap, Response, StatusCode};
use retrygate_common::random::SeededRandom;
use retrygate_common::runtime::RuntimeLoader;
use retrygate_common::testing::ManualTimerService;
use retrygate_core::{
    BackoffStrategy, Cluster, JitteredBackoffStrategy, MergedRetryPolicy, RetryEnvironment,
    RetryState,
};
use retrygate_domain::constants::{HEADER_MAX_RETRIES, HEADER_RETRY_ON};
use retrygate_domain::{CircuitBreakerConfig, ResourcePriority, RetryOn, RetryPolicy};

fn bench_backoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("backoff");

    group.bench_function("next_backoff", |b| {
        let mut backoff = JitteredBackoffStrategy::new(25, Arc::new(SeededRandom::new(1)));
        b.iter(|| black_box(backoff.next_backoff()));
    });

    group.finish();
}

fn bench_policy_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy_merge");
    let route = RetryPolicy::new(RetryOn::FIVE_XX, 2);

    group.bench_function("with_headers", |b| {
        b.iter_batched(
            || {
                let mut headers = HeaderMap::new();
                headers.insert(HEADER_RETRY_ON, "gateway-error,connect-failure".parse().unwrap());
                headers.insert(HEADER_MAX_RETRIES, "3".parse().unwrap());
                headers
            },
            |mut headers| black_box(MergedRetryPolicy::build(&route, &mut headers)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_decision(c: &mut Criterion) {
    let mut group = c.benchmark_group("decision");
    let cluster = Cluster::new("bench", &CircuitBreakerConfig::default());
    let random = Arc::new(SeededRandom::new(2));
    let env = RetryEnvironment::new(
        Arc::new(RuntimeLoader::with_random(random.clone())),
        random,
        Arc::new(ManualTimerService::new()),
    );
    let route = RetryPolicy::new(RetryOn::FIVE_XX, u32::MAX);
    let failure = Response::builder().status(StatusCode::SERVICE_UNAVAILABLE).body(()).unwrap();
    let success = Response::builder().status(StatusCode::OK).body(()).unwrap();

    group.bench_function("arm_then_settle", |b| {
        let mut headers = HeaderMap::new();
        let mut state =
            RetryState::create(&route, &mut headers, &cluster, ResourcePriority::Default, &env)
                .unwrap();
        b.iter(|| {
            black_box(state.should_retry_headers(&failure, Box::new(|| {})));
            black_box(state.should_retry_headers(&success, Box::new(|| {})));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_backoff, bench_policy_merge, bench_decision);
criterion_main!(benches);
