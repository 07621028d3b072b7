//! Lock-free single-producer/single-consumer byte ring buffer.
//!
//! The ring is the hand-off between the feeder thread and the output device's
//! callback context. It is byte-granular so it stays agnostic to sample
//! format; callers move whole frames by passing byte-aligned slices.
//!
//! # Capacity policy
//!
//! One byte of capacity is reserved as a sentinel to tell a full ring from an
//! empty one without a separate counter: `wp == rp` always means empty, so the
//! usable capacity is `capacity() - 1`. Size the ring one byte larger than the
//! whole number of chunks it must hold.
//!
//! # Concurrency
//!
//! [`ByteRing::split`] yields a [`RingProducer`] / [`RingConsumer`] pair; each
//! half may move to its own thread, and each advances only its own cursor.
//! A cursor is published with release ordering once, after its byte region is
//! fully copied, and the opposite side observes it with acquire ordering, so
//! a reader can never see a cursor ahead of the data it covers. The storage
//! cells are atomic bytes, which lets the two halves share the buffer without
//! `unsafe`; the cursor protocol carries the actual ordering, so cell access
//! itself stays relaxed.
//!
//! # Example
//!
//! ```rust
//! use caudal_core::ByteRing;
//!
//! let (mut tx, mut rx) = ByteRing::new(9).split();
//! assert_eq!(tx.writable_bytes(), 8);
//! assert_eq!(tx.write(&[1, 2, 3, 4]), 4);
//! assert_eq!(rx.readable_bytes(), 4);
//!
//! let mut out = [0u8; 4];
//! assert_eq!(rx.read(&mut out), 4);
//! assert_eq!(out, [1, 2, 3, 4]);
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Free bytes between the cursors, reserving the one-byte sentinel.
#[inline]
fn free_bytes(wp: usize, rp: usize, size: usize) -> usize {
    if wp > rp {
        rp + size - wp - 1
    } else if wp < rp {
        rp - wp - 1
    } else {
        size - 1
    }
}

/// Bytes queued between the cursors; 0 when they are equal.
#[inline]
fn used_bytes(wp: usize, rp: usize, size: usize) -> usize {
    if wp >= rp { wp - rp } else { wp + size - rp }
}

/// Storage and cursors shared by the two halves.
#[derive(Debug)]
struct Shared {
    storage: Box<[AtomicU8]>,
    wp: AtomicUsize,
    rp: AtomicUsize,
}

/// Fixed-capacity SPSC byte ring buffer.
///
/// Construct with [`ByteRing::new`], then [`split`](ByteRing::split) into the
/// producer and consumer halves. Each half owns its cursor; the single-writer
/// single-reader discipline is structural, not a usage convention.
///
/// # Memory
///
/// The backing storage is allocated once at construction and released when
/// both halves have been dropped. Reads and writes never allocate.
#[derive(Debug)]
pub struct ByteRing {
    shared: Arc<Shared>,
}

impl ByteRing {
    /// Creates a ring with `capacity` bytes of backing storage.
    ///
    /// The sentinel policy makes `capacity - 1` of those bytes usable.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2` (a sentinel-only ring could hold nothing).
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "ring capacity must be >= 2");

        let storage: Box<[AtomicU8]> = (0..capacity).map(|_| AtomicU8::new(0)).collect();
        Self {
            shared: Arc::new(Shared {
                storage,
                wp: AtomicUsize::new(0),
                rp: AtomicUsize::new(0),
            }),
        }
    }

    /// Splits the ring into its write and read halves.
    pub fn split(self) -> (RingProducer, RingConsumer) {
        let consumer = RingConsumer {
            shared: Arc::clone(&self.shared),
        };
        let producer = RingProducer {
            shared: self.shared,
        };
        (producer, consumer)
    }
}

/// Write half of a [`ByteRing`]; owned by exactly one thread at a time.
#[derive(Debug)]
pub struct RingProducer {
    shared: Arc<Shared>,
}

impl RingProducer {
    /// Total backing capacity in bytes. Usable capacity is one byte less.
    pub fn capacity(&self) -> usize {
        self.shared.storage.len()
    }

    /// Bytes that can be written right now without overwriting unread data.
    pub fn writable_bytes(&self) -> usize {
        let wp = self.shared.wp.load(Ordering::Relaxed);
        let rp = self.shared.rp.load(Ordering::Acquire);
        free_bytes(wp, rp, self.capacity())
    }

    /// Copies as much of `src` as currently fits, returning the bytes taken.
    ///
    /// Bytes are copied one at a time into the wrapped cursor position; the
    /// shared write cursor is published once, after the whole region is in
    /// place. A return shorter than `src.len()` means the ring filled up:
    /// callers either retry the remainder under backpressure or account for
    /// the drop.
    pub fn write(&mut self, src: &[u8]) -> usize {
        let size = self.capacity();
        let wp = self.shared.wp.load(Ordering::Relaxed);
        let rp = self.shared.rp.load(Ordering::Acquire);

        let n = src.len().min(free_bytes(wp, rp, size));
        let mut pos = wp;
        for &byte in &src[..n] {
            self.shared.storage[pos].store(byte, Ordering::Relaxed);
            pos += 1;
            if pos == size {
                pos = 0;
            }
        }
        self.shared.wp.store(pos, Ordering::Release);
        n
    }
}

/// Read half of a [`ByteRing`]; owned by exactly one thread at a time.
#[derive(Debug)]
pub struct RingConsumer {
    shared: Arc<Shared>,
}

impl RingConsumer {
    /// Total backing capacity in bytes. Usable capacity is one byte less.
    pub fn capacity(&self) -> usize {
        self.shared.storage.len()
    }

    /// Bytes queued and ready to read; 0 when the ring is empty.
    pub fn readable_bytes(&self) -> usize {
        let rp = self.shared.rp.load(Ordering::Relaxed);
        let wp = self.shared.wp.load(Ordering::Acquire);
        used_bytes(wp, rp, self.capacity())
    }

    /// Drains up to `dst.len()` bytes, returning the count actually copied.
    ///
    /// Returns 0 when the ring is empty rather than blocking; the read cursor
    /// is published once, after the copy, mirroring the write side.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let size = self.capacity();
        let rp = self.shared.rp.load(Ordering::Relaxed);
        let wp = self.shared.wp.load(Ordering::Acquire);

        let n = dst.len().min(used_bytes(wp, rp, size));
        let mut pos = rp;
        for slot in &mut dst[..n] {
            *slot = self.shared.storage[pos].load(Ordering::Relaxed);
            pos += 1;
            if pos == size {
                pos = 0;
            }
        }
        self.shared.rp.store(pos, Ordering::Release);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ring_is_empty() {
        let (tx, rx) = ByteRing::new(16).split();
        assert_eq!(tx.capacity(), 16);
        assert_eq!(rx.capacity(), 16);
        assert_eq!(tx.writable_bytes(), 15);
        assert_eq!(rx.readable_bytes(), 0);
    }

    #[test]
    #[should_panic(expected = "ring capacity must be >= 2")]
    fn degenerate_capacity_panics() {
        let _ = ByteRing::new(1);
    }

    #[test]
    fn accounting_holds_across_operations() {
        let (mut tx, mut rx) = ByteRing::new(64).split();
        let mut scratch = [0u8; 64];

        for step in 0..200 {
            if step % 3 == 0 {
                let len = (step * 7) % 40 + 1;
                tx.write(&scratch[..len]);
            } else {
                let len = (step * 5) % 24 + 1;
                rx.read(&mut scratch[..len]);
            }
            assert_eq!(
                rx.readable_bytes() + tx.writable_bytes(),
                63,
                "accounting broke at step {step}"
            );
        }
    }

    #[test]
    fn boundary_fill_leaves_one_sentinel_byte() {
        let (mut tx, rx) = ByteRing::new(4096).split();
        let chunk = [0xabu8; 1024];

        for _ in 0..3 {
            assert_eq!(tx.write(&chunk), 1024);
        }
        assert_eq!(rx.readable_bytes(), 3072);

        // The fourth chunk lands short by the sentinel byte.
        assert_eq!(tx.write(&chunk), 1023);
        assert_eq!(tx.writable_bytes(), 0);
        assert_eq!(rx.readable_bytes(), 4095);

        // Nothing more fits until the consumer drains.
        assert_eq!(tx.write(&chunk), 0);
    }

    #[test]
    fn empty_read_returns_zero_and_keeps_cursor() {
        let (mut tx, mut rx) = ByteRing::new(2048).split();
        let mut out = [0u8; 1024];

        assert_eq!(rx.read(&mut out), 0);
        assert_eq!(rx.readable_bytes(), 0);

        // A subsequent write is read back intact, so the failed read moved
        // nothing.
        assert_eq!(tx.write(&[7, 8, 9]), 3);
        assert_eq!(rx.read(&mut out), 3);
        assert_eq!(&out[..3], &[7, 8, 9]);
    }

    #[test]
    fn wraparound_preserves_byte_order() {
        let (mut tx, mut rx) = ByteRing::new(8).split();
        let mut out = [0u8; 8];

        // Push the cursors near the end of storage, then write across it.
        assert_eq!(tx.write(&[1, 2, 3, 4, 5]), 5);
        assert_eq!(rx.read(&mut out[..5]), 5);
        assert_eq!(tx.write(&[10, 11, 12, 13, 14, 15]), 6);
        assert_eq!(rx.read(&mut out[..6]), 6);
        assert_eq!(&out[..6], &[10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn partial_write_keeps_prefix() {
        let (mut tx, mut rx) = ByteRing::new(6).split();
        let mut out = [0u8; 8];

        assert_eq!(tx.write(&[1, 2, 3, 4, 5, 6, 7, 8]), 5);
        assert_eq!(tx.writable_bytes(), 0);
        assert_eq!(rx.read(&mut out), 5);
        assert_eq!(&out[..5], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn partial_read_drains_in_order() {
        let (mut tx, mut rx) = ByteRing::new(16).split();
        let mut out = [0u8; 4];

        assert_eq!(tx.write(&[1, 2, 3, 4, 5, 6]), 6);
        assert_eq!(rx.read(&mut out), 4);
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(rx.read(&mut out), 2);
        assert_eq!(&out[..2], &[5, 6]);
        assert_eq!(rx.readable_bytes(), 0);
    }
}
