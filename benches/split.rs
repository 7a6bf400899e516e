use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};
use semisplit::dataset::{Dataset, InMemoryDataset, Label, SplitOptions, build_split};

const DATASET_SIZE: usize = 100_000;
const CLASSES: usize = 9;

fn setup_dataset() -> Arc<InMemoryDataset<usize>> {
    let targets = (0..DATASET_SIZE)
        .map(|idx| (idx % CLASSES) as Label)
        .collect();
    Arc::new(InMemoryDataset::from_targets(targets))
}

fn bench_build_split(c: &mut Criterion) {
    let dataset = setup_dataset();
    for per_class in [5usize, 100] {
        let options = SplitOptions {
            images_per_class: per_class,
            ..SplitOptions::default()
        };
        c.bench_with_input(
            BenchmarkId::new("build_split", per_class),
            &options,
            |b, options| {
                b.iter(|| {
                    let mut rng = StdRng::seed_from_u64(17);
                    let split = build_split(dataset.clone(), options, &mut rng).expect("split");
                    black_box(split.unlabeled.len());
                });
            },
        );
    }
}

criterion_group!(benches, bench_build_split);
criterion_main!(benches);
