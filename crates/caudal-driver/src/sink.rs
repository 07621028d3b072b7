//! Output sink abstractions.
//!
//! Two contracts cover the two ways audio leaves the pipeline:
//!
//! - [`OutputSink`]: the feeder thread pushes finished chunks into the sink
//!   and the sink is allowed to block until the device can take them. Used
//!   by self-paced outputs such as [`WavFileSink`](crate::WavFileSink).
//! - [`CallbackSink`]: the device pulls audio on its own thread. Starting
//!   the sink hands it a [`ChunkFeed`](crate::ChunkFeed) that drains the
//!   shared ring from inside the device callback. Used by
//!   [`CpalOutput`](crate::CpalOutput).
//!
//! Both traits are object-safe so the driver can accept `Box<dyn OutputSink>`
//! or `Box<dyn CallbackSink>` and select the output at runtime.

use crate::{ChunkFeed, Result};

/// A push-based destination for interleaved `i16` chunks.
///
/// [`submit`](OutputSink::submit) is called from the feeder thread once per
/// chunk period and may block. Submission errors are treated as transient:
/// the driver logs the first one, counts the rest, and keeps the pipeline
/// running.
pub trait OutputSink: Send {
    /// Accept one chunk of interleaved stereo samples (`[L0, R0, L1, R1, ...]`).
    fn submit(&mut self, chunk: &[i16]) -> Result<()>;

    /// Flush buffered data and release the output.
    ///
    /// Called once after the feeder loop exits. The default does nothing.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A pull-based audio device that consumes chunks from its own callback.
///
/// Starting the sink consumes it: the device takes ownership of the
/// [`ChunkFeed`] and calls [`ChunkFeed::fill_chunk`](crate::ChunkFeed::fill_chunk)
/// from its audio thread whenever it needs data. The returned
/// [`StreamHandle`] keeps the device running; dropping it stops playback.
pub trait CallbackSink: Send {
    /// Start the device, wiring `feed` into its audio callback.
    fn start(self: Box<Self>, feed: ChunkFeed) -> Result<StreamHandle>;
}

/// Type-erased audio stream handle.
///
/// Wraps a device-specific stream object. The stream is active while this
/// handle exists; dropping it stops playback. This design ensures RAII
/// cleanup regardless of which device produced the stream.
///
/// The inner value is `Box<dyn Send>`, keeping device types out of the
/// driver and application code.
pub struct StreamHandle {
    /// The device-specific stream object, kept alive via RAII.
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Create a new stream handle wrapping a device-specific stream object.
    ///
    /// The wrapped value is kept alive until this handle is dropped.
    /// The type `T` must be `Send + 'static` so it can be safely moved
    /// between threads.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_handle_keeps_value_alive() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        struct Guard(Arc<AtomicBool>);
        impl Drop for Guard {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let handle = StreamHandle::new(Guard(Arc::clone(&dropped)));
        assert!(!dropped.load(Ordering::SeqCst));
        drop(handle);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_stream_handle_debug_is_opaque() {
        let handle = StreamHandle::new(42_u32);
        let text = format!("{handle:?}");
        assert!(text.contains("StreamHandle"));
    }
}
