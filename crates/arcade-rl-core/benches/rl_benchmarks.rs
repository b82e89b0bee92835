use arcade_rl_core::{ExplorationSchedule, FrameBuffer, FrameSize, GrayscaleResize, Perception};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::{Array2, Array3};

fn frame_buffer(c: &mut Criterion) {
    let size = FrameSize::default();
    let frame = Array2::from_elem(size.shape(), 128u8);
    let mut buffer = FrameBuffer::new(4, size);

    c.bench_function("frame_buffer_push", |b| {
        b.iter(|| buffer.push(black_box(frame.view())).unwrap());
    });
    c.bench_function("frame_buffer_stacked_with", |b| {
        b.iter(|| black_box(buffer.stacked_with(frame.view()).unwrap()));
    });
}

fn perception(c: &mut Criterion) {
    let screen = Array3::from_elem((210, 160, 3), 90u8);
    let transform = GrayscaleResize::new(FrameSize::default());

    c.bench_function("grayscale_resize_210x160", |b| {
        b.iter(|| black_box(transform.to_canonical_gray(screen.view()).unwrap()));
    });
}

fn schedule(c: &mut Criterion) {
    let schedule = ExplorationSchedule::new(1.0, 0.1, 1_000_000, 0.01);
    c.bench_function("exploration_epsilon", |b| {
        b.iter(|| black_box(schedule.epsilon(black_box(123_456))));
    });
}

criterion_group!(benches, frame_buffer, perception, schedule);
criterion_main!(benches);
