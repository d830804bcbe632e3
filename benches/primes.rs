use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use lazyset::math::{PrimeTable, Primes, primes};

fn bench_first_1m_primes(c: &mut Criterion) {
    // the bare sieve, for a baseline
    c.bench_function("first_1m_primes_iter", |b| {
        b.iter(|| {
            let mut pg = Primes::new();
            for _ in 0..1_000_000 {
                black_box(pg.next());
            }
        })
    });

    c.bench_function("first_1m_primes_sequence", |b| {
        b.iter(|| black_box(primes().take(1_000_000).count().unwrap()))
    });

    c.bench_function("prime_table_lookups", |b| {
        b.iter(|| {
            let table = PrimeTable::new();
            for n in (0..100_000).step_by(7) {
                black_box(table.nth(n).unwrap());
            }
        })
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .warm_up_time(std::time::Duration::from_secs(1))
        .measurement_time(std::time::Duration::from_secs(5));
    targets = bench_first_1m_primes
);
criterion_main!(benches);
