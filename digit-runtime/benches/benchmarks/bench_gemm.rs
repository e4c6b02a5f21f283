use criterion::{criterion_group, Criterion};
use lazy_static::lazy_static;
use ndarray::{ArrayD, IxDyn};
use digit_runtime::{
    operators::GemmAttributes,
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
        (0..len).map(|v| ((v * 3 + 2) % 17) as f32 - 8.0).collect(),
    )
    .unwrap()
}

// the fully-connected head of a digit CNN over a large batch
fn gemm_head_naive() {
    let a = patterned(&[256, 1568]);
    let b = patterned(&[1568, 10]);
    let c = patterned(&[10]);
    let attrs = GemmAttributes::new(1.0, 1.0, 0, 0);
    NaiveProvider::gemm(&THREAD_POOL_1, a, b, c, attrs).unwrap();
}

fn gemm_head_parallel() {
    let a = patterned(&[256, 1568]);
    let b = patterned(&[1568, 10]);
    let c = patterned(&[10]);
    let attrs = GemmAttributes::new(1.0, 1.0, 0, 0);
    ParNaiveProvider::gemm(&THREAD_POOL_8, a, b, c, attrs).unwrap();
}

fn bench_gemm(c: &mut Criterion) {
    let mut group = c.benchmark_group("Gemms");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(30));
    group.bench_function("GemmHeadNaive", move |b| b.iter(gemm_head_naive));
    group.bench_function("GemmHeadParallel", move |b| b.iter(gemm_head_parallel));
    group.finish();
}

criterion_group!(gemms, bench_gemm,);
