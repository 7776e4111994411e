use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rgba_gif::codecs::gif::{quantize, FrameOptions, GifEncoder};
use rgba_gif::{Rgba, RgbaFrame};

/// A smooth gradient, close to the worst case for the palette search.
fn gradient(size: u32) -> RgbaFrame {
    RgbaFrame::from_fn(size, size, |x, y| {
        Rgba([
            (x * 255 / size) as u8,
            (y * 255 / size) as u8,
            ((x + y) * 127 / size) as u8,
            255,
        ])
    })
}

fn quantize_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantize");

    for size in [64u32, 128, 256] {
        let frame = gradient(size);
        for keep in [false, true] {
            let name = if keep { "keep" } else { "merge" };
            group.bench_with_input(BenchmarkId::new(name, size), &frame, |b, frame| {
                b.iter(|| quantize(frame.as_raw(), keep));
            });
        }
    }
}

fn encode_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [64u32, 256] {
        let frame = gradient(size);
        group.bench_with_input(BenchmarkId::new("gradient", size), &frame, |b, frame| {
            let mut v = Vec::new();
            b.iter(|| {
                v.clear();
                let mut encoder = GifEncoder::new(&mut v, size, size, None).unwrap();
                encoder.add_frame(frame, FrameOptions::default()).unwrap();
                encoder.finish().unwrap();
            });
        });
    }
}

criterion_group!(benches, quantize_all, encode_all);
criterion_main!(benches);
