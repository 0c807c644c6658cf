use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use songbook::{Catalog, Domain};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn artist(n: u64) -> String {
    format!("a{:04x}", n % 1_000)
}

fn song(n: u64) -> String {
    format!("s{:016x}", n)
}

fn filled(n: usize) -> Catalog {
    let mut c = Catalog::new();
    for x in lcg(1).take(n) {
        let _ = c.insert(&artist(x), &song(x));
    }
    c
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("catalog_insert_10k", |b| {
        b.iter_batched(
            Catalog::new,
            |mut m| {
                for x in lcg(1).take(10_000) {
                    let _ = m.insert(&artist(x), &song(x));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_list(c: &mut Criterion) {
    c.bench_function("catalog_list_artist", |b| {
        let m = filled(10_000);
        let names: Vec<_> = (0..1_000).map(artist).collect();
        let mut it = names.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.list(Domain::Artist, k).len());
        })
    });
}

fn bench_remove_artist(c: &mut Criterion) {
    c.bench_function("catalog_remove_all_artists_10k", |b| {
        b.iter_batched(
            || filled(10_000),
            |mut m| {
                for n in 0..1_000 {
                    let _ = m.remove_artist(&artist(n));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(2))
        .sample_size(20)
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_list, bench_remove_artist
}
criterion_main!(benches);
