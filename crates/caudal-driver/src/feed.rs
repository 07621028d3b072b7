//! Ring drain for device callbacks.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use caudal_core::{
    BYTES_PER_FRAME, BYTES_PER_SAMPLE, CHANNELS, RingConsumer, bytes_to_samples, i16_to_sample,
};

use crate::driver::SharedStats;

/// Consuming end of the pipeline, owned by the output device.
///
/// The device calls [`fill_chunk`](ChunkFeed::fill_chunk) (or the `f32`
/// variant) from its audio callback whenever it needs data. The buffer is
/// always filled completely: whatever the ring cannot cover is zeroed,
/// which plays as silence. Only whole frames leave the ring, so a frame
/// the feeder has written halfway stays behind until it is complete. The
/// zero-fill also covers startup, before the feeder has produced anything.
///
/// Both fill methods are callback-safe: no allocation, no locking, no
/// logging. Underruns are tallied in a shared counter and reported when
/// the driver stops.
#[derive(Debug)]
pub struct ChunkFeed {
    consumer: RingConsumer,
    /// Wire-format staging for one chunk.
    bytes: Vec<u8>,
    /// Decoded staging for the `f32` path.
    samples: Vec<i16>,
    stats: Arc<SharedStats>,
}

impl ChunkFeed {
    pub(crate) fn new(
        consumer: RingConsumer,
        frames_per_chunk: usize,
        stats: Arc<SharedStats>,
    ) -> Self {
        Self {
            consumer,
            bytes: vec![0; frames_per_chunk * BYTES_PER_FRAME],
            samples: vec![0; frames_per_chunk * CHANNELS],
            stats,
        }
    }

    /// Fill `out` with interleaved stereo samples from the ring.
    ///
    /// `out` must hold whole frames. Buffers larger than one chunk are
    /// drained chunk by chunk, so devices with unusual period sizes still
    /// work.
    pub fn fill_chunk(&mut self, out: &mut [i16]) {
        debug_assert_eq!(out.len() % CHANNELS, 0, "buffer must hold whole frames");
        let seg_len = self.samples.len();
        for seg in out.chunks_mut(seg_len) {
            self.fill_segment(seg);
        }
    }

    /// Like [`fill_chunk`](ChunkFeed::fill_chunk), widening each sample to
    /// `f32` for devices that only open float streams.
    pub fn fill_chunk_f32(&mut self, out: &mut [f32]) {
        debug_assert_eq!(out.len() % CHANNELS, 0, "buffer must hold whole frames");
        // Stage through the preallocated i16 buffer; taking it keeps the
        // borrow checker happy without allocating on the audio thread.
        let mut samples = core::mem::take(&mut self.samples);
        for seg in out.chunks_mut(samples.len()) {
            let staged = &mut samples[..seg.len()];
            self.fill_segment(staged);
            for (dst, &src) in seg.iter_mut().zip(staged.iter()) {
                *dst = i16_to_sample(src);
            }
        }
        self.samples = samples;
    }

    fn fill_segment(&mut self, out: &mut [i16]) {
        let want = out.len() * BYTES_PER_SAMPLE;
        let avail = self.consumer.readable_bytes();
        let take = want.min(avail - avail % BYTES_PER_FRAME);
        let got = self.consumer.read(&mut self.bytes[..take]);
        bytes_to_samples(&self.bytes[..got], &mut out[..got / BYTES_PER_SAMPLE]);
        if got < want {
            out[got / BYTES_PER_SAMPLE..].fill(0);
            self.stats
                .underrun_bytes
                .fetch_add((want - got) as u64, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caudal_core::{ByteRing, RingProducer, samples_to_bytes};

    fn feed_with_ring(frames_per_chunk: usize, ring_chunks: usize) -> (RingProducer, ChunkFeed) {
        let capacity = ring_chunks * frames_per_chunk * BYTES_PER_FRAME + 1;
        let (producer, consumer) = ByteRing::new(capacity).split();
        let stats = Arc::new(SharedStats::default());
        let feed = ChunkFeed::new(consumer, frames_per_chunk, stats);
        (producer, feed)
    }

    fn push_samples(producer: &mut RingProducer, samples: &[i16]) {
        let mut bytes = vec![0u8; samples.len() * BYTES_PER_SAMPLE];
        samples_to_bytes(samples, &mut bytes);
        assert_eq!(producer.write(&bytes), bytes.len());
    }

    #[test]
    fn test_full_ring_fills_exactly() {
        let (mut producer, mut feed) = feed_with_ring(4, 2);
        let samples: Vec<i16> = (0..8).map(|n| n * 1000 - 4000).collect();
        push_samples(&mut producer, &samples);

        let mut out = [0i16; 8];
        feed.fill_chunk(&mut out);
        assert_eq!(&out[..], &samples[..]);
        assert_eq!(feed.stats.underrun_bytes.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_shortfall_is_zero_filled_and_counted() {
        let (mut producer, mut feed) = feed_with_ring(4, 2);
        push_samples(&mut producer, &[100, 200, 300, 400]);

        let mut out = [i16::MAX; 8];
        feed.fill_chunk(&mut out);
        assert_eq!(&out[..4], &[100, 200, 300, 400]);
        assert_eq!(&out[4..], &[0, 0, 0, 0]);
        assert_eq!(feed.stats.underrun_bytes.load(Ordering::Relaxed), 8);
    }

    #[test]
    fn test_empty_ring_plays_silence() {
        let (_producer, mut feed) = feed_with_ring(4, 2);
        let mut out = [i16::MAX; 8];
        feed.fill_chunk(&mut out);
        assert_eq!(out, [0i16; 8]);
        assert_eq!(feed.stats.underrun_bytes.load(Ordering::Relaxed), 16);
    }

    #[test]
    fn test_torn_frame_stays_in_the_ring() {
        let (mut producer, mut feed) = feed_with_ring(4, 2);
        // Half a frame: the left sample of [0x1234, 0x2468].
        assert_eq!(producer.write(&[0x34, 0x12]), 2);

        let mut out = [i16::MAX; 2];
        feed.fill_chunk(&mut out);
        assert_eq!(out, [0, 0]);
        assert_eq!(feed.stats.underrun_bytes.load(Ordering::Relaxed), 4);

        // Completing the frame makes it visible.
        assert_eq!(producer.write(&[0x68, 0x24]), 2);
        feed.fill_chunk(&mut out);
        assert_eq!(out, [0x1234, 0x2468]);
        assert_eq!(feed.stats.underrun_bytes.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_oversized_buffer_drains_in_segments() {
        let (mut producer, mut feed) = feed_with_ring(4, 3);
        let samples: Vec<i16> = (0..20).map(|n| n * 7 - 70).collect();
        push_samples(&mut producer, &samples);

        // 2.5 chunks in one callback.
        let mut out = [0i16; 20];
        feed.fill_chunk(&mut out);
        assert_eq!(&out[..], &samples[..]);
        assert_eq!(feed.stats.underrun_bytes.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_f32_path_widens_samples() {
        let (mut producer, mut feed) = feed_with_ring(4, 2);
        push_samples(&mut producer, &[-32768, 16384, -16384, 32767]);

        let mut out = [9.0f32; 8];
        feed.fill_chunk_f32(&mut out);
        assert_eq!(out[0], -1.0);
        assert_eq!(out[1], 0.5);
        assert_eq!(out[2], -0.5);
        assert!((out[3] - 32767.0 / 32768.0).abs() < 1e-6);
        assert_eq!(&out[4..], &[0.0; 4]);
        assert_eq!(feed.stats.underrun_bytes.load(Ordering::Relaxed), 8);
    }
}
