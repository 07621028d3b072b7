//! The feeder thread: render, convert, deliver.
//!
//! Both delivery modes run the same front half (pull a chunk from the
//! source, interleave, convert) and differ in how the chunk leaves the
//! thread. The loops exit when the driver raises the stop flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use caudal_core::{
    BYTES_PER_FRAME, CHANNELS, PlaybackSchedule, RingProducer, interleave_i16, samples_to_bytes,
};

use crate::driver::SharedStats;
use crate::sink::OutputSink;
use crate::source::AudioSource;

/// State shared by both feeder loops.
pub(crate) struct FeederContext<S> {
    pub(crate) source: S,
    pub(crate) frames_per_chunk: usize,
    pub(crate) stop: Arc<AtomicBool>,
    pub(crate) stats: Arc<SharedStats>,
}

/// Self-paced loop: render a chunk, sleep until its deadline, push it into
/// the sink.
///
/// Submission errors are treated as transient. The first one is logged, the
/// rest are only counted, and the loop keeps rendering so the schedule stays
/// on its grid.
pub(crate) fn run_self_paced<S: AudioSource>(
    mut ctx: FeederContext<S>,
    mut schedule: PlaybackSchedule,
    mut sink: Box<dyn OutputSink>,
) {
    let frames = ctx.frames_per_chunk;
    let mut left = vec![0.0f32; frames];
    let mut right = vec![0.0f32; frames];
    let mut chunk = vec![0i16; frames * CHANNELS];
    let clock = Instant::now();
    let mut submit_error_logged = false;

    while !ctx.stop.load(Ordering::Relaxed) {
        ctx.source.render(&mut left, &mut right);
        interleave_i16(&left, &right, &mut chunk);
        ctx.stats.chunks_rendered.fetch_add(1, Ordering::Relaxed);

        let now = clock.elapsed().as_micros() as u64;
        let sleep = schedule.advance(now);
        if sleep > 0 {
            thread::sleep(Duration::from_micros(sleep));
        }

        match sink.submit(&chunk) {
            Ok(()) => {
                ctx.stats.chunks_delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                if !submit_error_logged {
                    tracing::warn!(error = %err, "output sink rejected a chunk");
                    submit_error_logged = true;
                }
                ctx.stats.submit_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    if let Err(err) = sink.finish() {
        tracing::warn!(error = %err, "output sink failed to finish");
    }
}

/// Device-driven loop: render a chunk and write it into the ring, sleeping
/// briefly whenever the ring is full.
///
/// Nothing is dropped on backpressure. A partial write resumes where it
/// left off until the whole chunk is in; the stop flag is rechecked between
/// retries so shutdown is never held up by a full ring.
pub(crate) fn run_device_driven<S: AudioSource>(
    mut ctx: FeederContext<S>,
    mut producer: RingProducer,
    backoff: Duration,
) {
    let frames = ctx.frames_per_chunk;
    let mut left = vec![0.0f32; frames];
    let mut right = vec![0.0f32; frames];
    let mut chunk = vec![0i16; frames * CHANNELS];
    let mut bytes = vec![0u8; frames * BYTES_PER_FRAME];

    'feed: while !ctx.stop.load(Ordering::Relaxed) {
        ctx.source.render(&mut left, &mut right);
        interleave_i16(&left, &right, &mut chunk);
        samples_to_bytes(&chunk, &mut bytes);
        ctx.stats.chunks_rendered.fetch_add(1, Ordering::Relaxed);

        let mut offset = 0;
        while offset < bytes.len() {
            offset += producer.write(&bytes[offset..]);
            if offset == bytes.len() {
                break;
            }
            if ctx.stop.load(Ordering::Relaxed) {
                break 'feed;
            }
            ctx.stats.backpressure_waits.fetch_add(1, Ordering::Relaxed);
            thread::sleep(backoff);
        }
        ctx.stats.chunks_delivered.fetch_add(1, Ordering::Relaxed);
    }
}
