use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use netcache::config::KindSettings;
use netcache::{Candidate, RecordCache, RequestPayload, UrlPattern};

fn bench_ingest(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("ingest");

    for capacity in [100, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let cache = RecordCache::<RequestPayload>::new(KindSettings {
                    capacity,
                    ..KindSettings::default()
                });

                b.iter(|| {
                    rt.block_on(async {
                        cache
                            .ingest(Candidate::new(
                                "https://example.com/api/test",
                                RequestPayload::default(),
                            ))
                            .await
                            .unwrap()
                    })
                });
            },
        );
    }

    group.finish();
}

fn bench_exists_miss(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("exists_miss");

    for capacity in [100, 1_000, 10_000] {
        let cache = RecordCache::<RequestPayload>::new(KindSettings {
            capacity,
            ..KindSettings::default()
        });
        rt.block_on(async {
            for i in 0..capacity {
                cache
                    .ingest(Candidate::new(
                        format!("https://example.com/api/{i}"),
                        RequestPayload::default(),
                    ))
                    .await
                    .unwrap();
            }
        });
        let pattern = UrlPattern::new(r"/never/\d+").unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(capacity), &pattern, |b, p| {
            b.iter(|| cache.exists(black_box(p)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ingest, bench_exists_miss);
criterion_main!(benches);
