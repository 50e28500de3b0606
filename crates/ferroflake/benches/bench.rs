use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ferroflake::{
    AtomicResolver, Generator, LockResolver, SequenceResolver, TimeSource, global,
};
use std::{
    sync::Barrier,
    thread::scope,
    time::{Duration, Instant},
};

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

/// Benchmarks a resolver on a fixed millisecond, restarting it for every
/// batch so it never reports exhaustion.
fn bench_resolver<R>(c: &mut Criterion, group_name: &str, resolver_factory: impl Fn() -> R)
where
    R: SequenceResolver,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64 - 1));

    group.bench_function(format!("elems/{}", TOTAL_IDS - 1), |b| {
        b.iter_custom(|iters| {
            let mut elapsed = Duration::ZERO;
            for _ in 0..iters {
                let resolver = resolver_factory();
                let start = Instant::now();
                for _ in 0..TOTAL_IDS - 1 {
                    black_box(resolver.resolve(black_box(1)).unwrap());
                }
                elapsed += start.elapsed();
            }
            elapsed
        });
    });

    group.finish();
}

/// Benchmarks a generator on the wall clock, including spin-waits on
/// exhaustion.
fn bench_generator<R, T>(c: &mut Criterion, group_name: &str, generator: &Generator<R, T>)
where
    R: SequenceResolver,
    T: TimeSource,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generator.try_next_id().unwrap());
            }
        });
    });

    group.finish();
}

/// Benchmarks one generator shared by several threads.
fn bench_generator_contended<R, T>(
    c: &mut Criterion,
    group_name: &str,
    generator: &Generator<R, T>,
) where
    R: SequenceResolver + Sync,
    T: TimeSource + Sync,
{
    let mut group = c.benchmark_group(group_name);
    let threads = num_cpus::get().clamp(2, 8);
    group.throughput(Throughput::Elements((TOTAL_IDS * threads) as u64));

    group.bench_function(format!("threads/{threads}/elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let barrier = Barrier::new(threads + 1);
            let start = scope(|s| {
                for _ in 0..threads {
                    s.spawn(|| {
                        barrier.wait();
                        for _ in 0..iters {
                            for _ in 0..TOTAL_IDS {
                                black_box(generator.try_next_id().unwrap());
                            }
                        }
                    });
                }
                barrier.wait();
                Instant::now()
            });
            start.elapsed()
        });
    });

    group.finish();
}

fn benchmarks(c: &mut Criterion) {
    bench_resolver(c, "resolver/atomic", AtomicResolver::new);
    bench_resolver(c, "resolver/lock", LockResolver::new);

    let atomic = Generator::builder().node_id(1).build();
    bench_generator(c, "generator/atomic", &atomic);
    bench_generator_contended(c, "generator/atomic/contended", &atomic);

    let lock = Generator::builder()
        .node_id(2)
        .resolver(LockResolver::new())
        .build();
    bench_generator(c, "generator/lock", &lock);
    bench_generator_contended(c, "generator/lock/contended", &lock);

    let mut group = c.benchmark_group("global");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));
    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(global::next_id().unwrap());
            }
        });
    });
    group.finish();
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
