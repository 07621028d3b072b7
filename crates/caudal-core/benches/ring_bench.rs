//! Criterion benchmarks for caudal-core streaming primitives
//!
//! Run with: cargo bench -p caudal-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use caudal_core::{ByteRing, PlaybackSchedule, interleave_i16};

/// Audio-typical chunk sizes in bytes (stereo 16-bit frames).
const CHUNK_BYTES: &[usize] = &[256, 1024, 4096];

fn bench_ring_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ByteRing");

    for &chunk in CHUNK_BYTES {
        let payload = vec![0x55u8; chunk];
        let mut out = vec![0u8; chunk];

        group.bench_with_input(
            BenchmarkId::new("write_read_cycle", chunk),
            &chunk,
            |b, _| {
                let (mut tx, mut rx) = ByteRing::new(chunk * 4 + 1).split();
                b.iter(|| {
                    black_box(tx.write(black_box(&payload)));
                    black_box(rx.read(black_box(&mut out)));
                });
            },
        );
    }

    group.finish();
}

fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");

    for &frames in &[64usize, 256, 1024] {
        let left: Vec<f32> = (0..frames).map(|i| (i as f32 / 31.0).sin()).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        let mut out = vec![0i16; frames * 2];

        group.bench_with_input(
            BenchmarkId::new("interleave_i16", frames),
            &frames,
            |b, _| {
                b.iter(|| {
                    interleave_i16(black_box(&left), black_box(&right), black_box(&mut out));
                });
            },
        );
    }

    group.finish();
}

fn bench_schedule(c: &mut Criterion) {
    c.bench_function("PlaybackSchedule/advance", |b| {
        let mut schedule = PlaybackSchedule::new(512, 44100);
        let mut now = 0u64;
        b.iter(|| {
            now += schedule.advance(black_box(now)) + 25;
            black_box(now)
        });
    });
}

criterion_group!(
    benches,
    bench_ring_transfer,
    bench_conversion,
    bench_schedule
);
criterion_main!(benches);
