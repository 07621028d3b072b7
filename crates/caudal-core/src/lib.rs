//! Caudal Core - streaming primitives for real-time audio output
//!
//! This crate provides the leaf components of the caudal streaming pipeline:
//! the lock-free hand-off between a rendering thread and an output device,
//! and the pure math around it. Everything here is allocation-free after
//! construction and has no opinion about which device (or thread) sits at
//! either end.
//!
//! # Components
//!
//! ## Ring Buffer
//!
//! - [`ByteRing`] - Fixed-capacity SPSC byte ring, split into halves
//! - [`RingProducer`] / [`RingConsumer`] - The two sides of the hand-off
//!
//! ## Sample Conversion
//!
//! - [`sample_to_i16`] / [`i16_to_sample`] - Clamped float ↔ fixed-point
//! - [`interleave_i16`] - Planar stereo floats into interleaved frames
//! - [`samples_to_bytes`] / [`bytes_to_samples`] - Little-endian wire form
//!
//! ## Pacing
//!
//! - [`PlaybackSchedule`] - Drift-corrected absolute-deadline submission
//!   pacing for self-paced output
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (alloc is required for the ring's
//! backing storage). Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! caudal-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use caudal_core::{ByteRing, interleave_i16, samples_to_bytes};
//!
//! // Ring sized for four 64-frame stereo chunks plus the sentinel byte.
//! let (mut tx, mut rx) = ByteRing::new(4 * 64 * 4 + 1).split();
//!
//! // Producer side: render, convert, enqueue.
//! let left = [0.5f32; 64];
//! let right = [-0.5f32; 64];
//! let mut frames = [0i16; 128];
//! let mut bytes = [0u8; 256];
//! interleave_i16(&left, &right, &mut frames);
//! samples_to_bytes(&frames, &mut bytes);
//! assert_eq!(tx.write(&bytes), 256);
//!
//! // Consumer side (typically another thread): drain.
//! let mut out = [0u8; 256];
//! assert_eq!(rx.read(&mut out), 256);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod convert;
pub mod pacing;
pub mod ring;

// Re-export main types at crate root
pub use convert::{
    BYTES_PER_FRAME, BYTES_PER_SAMPLE, CHANNELS, bytes_to_samples, i16_to_sample, interleave_i16,
    sample_to_i16, samples_to_bytes,
};
pub use pacing::PlaybackSchedule;
pub use ring::{ByteRing, RingConsumer, RingProducer};
