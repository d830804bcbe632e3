use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lazyset::{Options, Sequence, Source};

const N: usize = 100_000;

fn source() -> Source<u64> {
    Source::replayable(|| (0u64..).map(|n| n.wrapping_mul(0x9e37_79b9_7f4a_7c15)))
}

fn bench_retention(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_then_back");
    let policies = [
        ("cold", Options::new()),
        ("memo", Options::new().memo(true)),
        ("window_64", Options::new().cache(64)),
    ];
    for (name, opts) in policies {
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let seq = Sequence::new(source(), opts);
                let mut acc = 0u64;
                for i in 0..N {
                    acc ^= seq.get(i).unwrap();
                    // a short look back, served by memo or window and evicted when cold
                    if i >= 32 {
                        acc ^= seq.get(i - 32).unwrap_or(0);
                    }
                }
                black_box(acc)
            })
        });
    }
    group.finish();
}

fn bench_operator_chain(c: &mut Criterion) {
    c.bench_function("map_filter_take_drain", |b| {
        b.iter(|| {
            let seq = Sequence::new(source(), Options::new())
                .map(|x| x >> 7)
                .filter(|x| x % 3 == 0)
                .take(N);
            black_box(seq.count().unwrap())
        })
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .warm_up_time(std::time::Duration::from_secs(1))
        .measurement_time(std::time::Duration::from_secs(5));
    targets = bench_retention, bench_operator_chain
);
criterion_main!(benches);
