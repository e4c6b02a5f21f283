pub mod bench_convolution;
pub mod bench_gemm;
pub mod bench_maxpool;
pub mod bench_runtime;
