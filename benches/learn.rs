use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ostia::prelude::*;
use ostia::random::{generate_random_sample, generate_random_transducer};

type Learner = fn(&Sample<char, char>) -> Result<Transducer<char, char>, LearnError>;

fn samples(size: usize) -> Vec<Sample<char, char>> {
    (0..8)
        .map(|_| {
            let target = generate_random_transducer(3, 2, 0.4, 2);
            generate_random_sample(&target, 0, 10, size)
        })
        .collect()
}

fn bench_ptt(c: &mut Criterion) {
    let mut group = c.benchmark_group("ptt");
    for size in [50, 200, 800] {
        let samples = samples(size);
        let id = BenchmarkId::from_parameter(size);
        group.bench_with_input(id, &samples, |b, samples| {
            b.iter(|| {
                for sample in samples {
                    std::hint::black_box(build_ptt(sample).unwrap());
                }
            })
        });
    }
    group.finish();
}

fn bench_learners(c: &mut Criterion) {
    let learners: [(&str, Learner); 2] = [("standard", ostia), ("compress", ostia_compress)];
    let mut group = c.benchmark_group("learn");
    for size in [50, 200, 800] {
        let samples = samples(size);
        for (name, learn) in learners {
            let id = BenchmarkId::new(name, size);
            group.bench_with_input(id, &samples, |b, samples| {
                b.iter(|| {
                    for sample in samples {
                        std::hint::black_box(learn(sample).unwrap());
                    }
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_ptt, bench_learners);
criterion_main!(benches);
