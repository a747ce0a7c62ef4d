use criterion::{criterion_group, criterion_main, Criterion};
use image::Rgb;
use retro_target_detector::{ColorRange, Frame, TargetDetector, TargetDetectorParams};
use std::hint::black_box;

/// 640x480 frame with a few green blobs on a noisy dark background.
fn synthetic_frame() -> Frame {
    let mut state = 12_345u32;
    Frame::from_fn(640, 480, |x, y| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let noise = (state >> 27) as u8;
        let blob = [(200, 150, 40), (420, 300, 25), (90, 380, 12)]
            .iter()
            .any(|&(cx, cy, r): &(i32, i32, i32)| {
                let (dx, dy) = (x as i32 - cx, y as i32 - cy);
                dx * dx + dy * dy <= r * r
            });
        if blob {
            Rgb([30, 220 - noise, 40])
        } else {
            Rgb([noise, noise, noise])
        }
    })
}

fn bench_detect(c: &mut Criterion) {
    let frame = synthetic_frame();
    let detector = TargetDetector::new(TargetDetectorParams {
        color: ColorRange::new([50, 100, 100], [70, 255, 255]),
        ..TargetDetectorParams::default()
    });
    c.bench_function("detect_640x480", |b| {
        b.iter(|| detector.detect(black_box(&frame)))
    });

    let mut undilated = detector.params().clone();
    undilated.dilation_radius = 0;
    let detector = TargetDetector::new(undilated);
    c.bench_function("detect_640x480_no_dilation", |b| {
        b.iter(|| detector.detect(black_box(&frame)))
    });
}

criterion_group!(benches, bench_detect);
criterion_main!(benches);
