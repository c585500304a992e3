use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::Rgb;
use pantilt_cns::MemoryTransport;
use pantilt_eye::processing::{extract_regions, morphology, Mask};
use pantilt_eye::{ColorRange, Frame, FrameSegmenter};
use pantilt_loop::{ControlLoop, TrackerConfig};

fn vga_frame() -> Frame {
    let mut frame = Frame::from_pixel(640, 480, Rgb([40, 110, 60]));
    for y in 180..300u32 {
        for x in 380..500u32 {
            let (dx, dy) = (x as i64 - 440, y as i64 - 240);
            if dx * dx + dy * dy <= 60 * 60 {
                frame.put_pixel(x, y, Rgb([220, 30, 30]));
            }
        }
    }
    // sprinkle of noise
    for i in 0..400u32 {
        frame.put_pixel((i * 97) % 640, (i * 61) % 480, Rgb([230, 20, 20]));
    }
    frame
}

fn bench_threshold(c: &mut Criterion) {
    let frame = vga_frame();
    let range = ColorRange::red();

    c.bench_function("threshold_vga", |b| {
        b.iter(|| Mask::threshold(black_box(&frame), black_box(&range)))
    });
}

fn bench_denoise(c: &mut Criterion) {
    let mask = Mask::threshold(&vga_frame(), &ColorRange::red());

    c.bench_function("denoise_vga", |b| {
        b.iter(|| morphology::denoise(black_box(&mask)))
    });
}

fn bench_regions(c: &mut Criterion) {
    let mask = morphology::denoise(&Mask::threshold(&vga_frame(), &ColorRange::red()));

    c.bench_function("extract_regions_vga", |b| {
        b.iter(|| extract_regions(black_box(&mask)))
    });
}

fn bench_segment(c: &mut Criterion) {
    let frame = vga_frame();
    let segmenter = FrameSegmenter::new(500).with_overlay(true);
    let range = ColorRange::red();

    c.bench_function("segment_vga", |b| {
        b.iter(|| {
            let mut frame = frame.clone();
            black_box(segmenter.segment(&mut frame, &range))
        })
    });
}

fn bench_control_step(c: &mut Criterion) {
    let mut config = TrackerConfig::default();
    config.servo.settle_delay_ms = 0;
    config.vision.draw_overlay = false;
    let mut control = ControlLoop::new(MemoryTransport::new(), &config).unwrap();
    control.start().unwrap();
    let frame = vga_frame();

    c.bench_function("control_step_vga", |b| {
        b.iter(|| {
            let mut frame = frame.clone();
            black_box(control.step(&mut frame).unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_threshold,
    bench_denoise,
    bench_regions,
    bench_segment,
    bench_control_step
);
criterion_main!(benches);
