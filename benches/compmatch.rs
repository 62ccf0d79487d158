use compmatch::{score, select_indices, Affine, Criterion, ScoreMode, Volume};
use criterion::{criterion_group, criterion_main, Criterion as Bench};
use std::hint::black_box;

fn make_volume(dims: [usize; 3], seed: usize) -> Volume {
    let affine = Affine::from_voxel_size([2.0, 2.0, 2.0], [-90.0, -126.0, -72.0]);
    Volume::from_fn(dims, affine, |i, j, k| {
        let value = ((i * 13) ^ (j * 7) ^ (k * 5) ^ seed) & 0xFF;
        value as f32 / 128.0 - 1.0
    })
    .unwrap()
}

fn bench_overlap(c: &mut Bench) {
    let dims = [91, 109, 91];
    let template = make_volume(dims, 0);
    let candidate = make_volume(dims, 17);
    let criterion = Criterion::positive();

    c.bench_function("select_indices_mni2mm", |b| {
        b.iter(|| select_indices(black_box(&template), |v| criterion.accepts(v)))
    });

    let index_set = select_indices(&template, |v| criterion.accepts(v));
    c.bench_function("score_abs_mni2mm", |b| {
        b.iter(|| score(black_box(&index_set), black_box(&candidate), ScoreMode::Absolute).unwrap())
    });
}

criterion_group!(benches, bench_overlap);
criterion_main!(benches);
