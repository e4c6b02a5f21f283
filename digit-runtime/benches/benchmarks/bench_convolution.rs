use criterion::{criterion_group, Criterion};
use lazy_static::lazy_static;
use ndarray::{ArrayD, IxDyn};
use digit_runtime::{
    operators::ConvAttributes,
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
        (0..len).map(|v| ((v * 7 + 3) % 11) as f32 - 5.0).collect(),
    )
    .unwrap()
}

// the first convolution of a digit CNN over a large batch of images
fn conv_digit_batch_naive() {
    let x = patterned(&[32, 1, 28, 28]);
    let w = patterned(&[16, 1, 5, 5]);
    let attrs = ConvAttributes::new([5, 5], [2, 2, 2, 2], [1, 1]);
    NaiveProvider::conv(&THREAD_POOL_1, x, w, None, attrs).unwrap();
}

fn conv_digit_batch_parallel() {
    let x = patterned(&[32, 1, 28, 28]);
    let w = patterned(&[16, 1, 5, 5]);
    let attrs = ConvAttributes::new([5, 5], [2, 2, 2, 2], [1, 1]);
    ParNaiveProvider::conv(&THREAD_POOL_8, x, w, None, attrs).unwrap();
}

fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("Convolutions");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(30));
    group.bench_function("ConvDigitBatchNaive", move |b| {
        b.iter(conv_digit_batch_naive)
    });
    group.bench_function("ConvDigitBatchParallel", move |b| {
        b.iter(conv_digit_batch_parallel)
    });
    group.finish();
}

criterion_group!(convolutions, bench_convolution,);
