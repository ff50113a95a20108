use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cv_sgm::prelude::*;
use image::{GrayImage, Luma};

fn noise(x: u32, y: u32) -> u8 {
    let mut h = x.wrapping_mul(374_761_393) ^ y.wrapping_mul(668_265_263);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    1 + ((h ^ (h >> 16)) % 255) as u8
}

fn sgm_bench(c: &mut Criterion) {
    // Build a synthetic pair with a constant 12 pixel shift
    let reference = GrayImage::from_fn(320, 240, |x, y| Luma([noise(x, y)]));
    let target = GrayImage::from_fn(320, 240, |x, y| Luma([noise(x + 12, y)]));
    let frame = StereoFrame::new(target, reference);

    // Build disparity algs
    let mut sgm_8 = Sgm::new(Params {
        num_disparities: 32,
        ..Params::default()
    });
    let mut sgm_16 = Sgm::new(Params {
        num_disparities: 32,
        directions: DirectionCount::Sixteen,
        ..Params::default()
    });

    // Benchmark compute function
    c.bench_function("sgm 320x240 8 directions", |b| {
        b.iter(|| sgm_8.compute(black_box(&frame)))
    });
    c.bench_function("sgm 320x240 16 directions", |b| {
        b.iter(|| sgm_16.compute(black_box(&frame)))
    });
}

criterion_group!(benches, sgm_bench);
criterion_main!(benches);
