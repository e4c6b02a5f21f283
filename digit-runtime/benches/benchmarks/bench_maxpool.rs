use criterion::{criterion_group, Criterion};
use lazy_static::lazy_static;
use ndarray::{ArrayD, IxDyn};
use digit_runtime::{
    operators::MaxPoolAttributes,
    providers::{NaiveProvider, ParNaiveProvider, Provider},
};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::Duration;

lazy_static! {
    static ref THREAD_POOL_1: ThreadPool = ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .expect("Unable to create ThreadPool");
    static ref THREAD_POOL_8: ThreadPool = ThreadPoolBuilder::new()
        .num_threads(8)
        .build()
        .expect("Unable to create ThreadPool");
}

fn patterned(shape: &[usize]) -> ArrayD<f32> {
    let len: usize = shape.iter().product();
    ArrayD::from_shape_vec(
        IxDyn(shape),
        (0..len).map(|v| ((v * 5 + 1) % 13) as f32 - 6.0).collect(),
    )
    .unwrap()
}

fn maxpool_feature_maps_naive() {
    let x = patterned(&[32, 16, 24, 24]);
    let attrs = MaxPoolAttributes::new([2, 2], [0, 0, 0, 0], [2, 2]);
    NaiveProvider::max_pool(&THREAD_POOL_1, x, attrs).unwrap();
}

fn maxpool_feature_maps_parallel() {
    let x = patterned(&[32, 16, 24, 24]);
    let attrs = MaxPoolAttributes::new([2, 2], [0, 0, 0, 0], [2, 2]);
    ParNaiveProvider::max_pool(&THREAD_POOL_8, x, attrs).unwrap();
}

fn bench_maxpool(c: &mut Criterion) {
    let mut group = c.benchmark_group("MaxPools");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(30));
    group.bench_function("MaxPoolFeatureMapsNaive", move |b| {
        b.iter(maxpool_feature_maps_naive)
    });
    group.bench_function("MaxPoolFeatureMapsParallel", move |b| {
        b.iter(maxpool_feature_maps_parallel)
    });
    group.finish();
}

criterion_group!(maxpools, bench_maxpool,);
