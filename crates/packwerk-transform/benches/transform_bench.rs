// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the packwerk-transform crate.
// Covers the image path (downscale + JPEG encode), which dominates run time
// for photo batches.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use packwerk_transform::ImageProcessor;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark bounding a 3000x2000 synthetic image to 2048 px and encoding it
/// at quality 80.
fn bench_fit_and_encode(c: &mut Criterion) {
    let (width, height) = (3000u32, 2000u32);
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    });
    let dynamic = DynamicImage::ImageRgb8(img);

    c.bench_function("fit_within + jpeg (3000x2000 -> 2048)", |b| {
        b.iter(|| {
            let processor = ImageProcessor::from_dynamic(black_box(dynamic.clone())).fit_within(2048);
            black_box(processor.to_jpeg_bytes(80).expect("encode"));
        });
    });
}

/// Benchmark encoding alone on an image that is already within bounds.
fn bench_encode_only(c: &mut Criterion) {
    let img = RgbImage::from_fn(1024, 768, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let dynamic = DynamicImage::ImageRgb8(img);

    c.bench_function("jpeg encode (1024x768)", |b| {
        b.iter(|| {
            let processor = ImageProcessor::from_dynamic(black_box(dynamic.clone()));
            black_box(processor.to_jpeg_bytes(80).expect("encode"));
        });
    });
}

criterion_group!(benches, bench_fit_and_encode, bench_encode_only);
criterion_main!(benches);
