//! Sample format conversion between the renderer's floats and the device's
//! 16-bit fixed-point stream.
//!
//! Conversion is stateless and applied per sample, per channel, preserving
//! interleaving order (a frame is a left sample followed by a right sample).
//! Narrowing clamps to the 16-bit range first, so transient overshoot from
//! the renderer saturates instead of wrapping into full-scale distortion.
//!
//! The byte-level helpers fix the wire form crossing the ring buffer:
//! interleaved samples in little-endian order.

/// Number of output channels; the pipeline is fixed stereo.
pub const CHANNELS: usize = 2;

/// Bytes per 16-bit sample on the wire.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Bytes per interleaved stereo frame.
pub const BYTES_PER_FRAME: usize = CHANNELS * BYTES_PER_SAMPLE;

/// Converts one float sample to 16-bit fixed point.
///
/// Scales by 32768 and clamps to the signed 16-bit range before narrowing:
/// -1.0 maps to -32768, +1.0 saturates to 32767, and anything beyond pins to
/// the nearer extreme.
#[inline]
pub fn sample_to_i16(sample: f32) -> i16 {
    (sample * 32768.0).clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

/// Converts one 16-bit sample back to a float in [-1.0, 1.0).
///
/// Inverse of [`sample_to_i16`] up to the +1.0 saturation point; used when a
/// float-format output device consumes the fixed-point stream.
#[inline]
pub fn i16_to_sample(sample: i16) -> f32 {
    f32::from(sample) / 32768.0
}

/// Interleaves planar stereo floats into 16-bit frames.
///
/// # Panics
///
/// Panics if `left` and `right` differ in length or `out` does not hold
/// exactly one frame per input sample pair.
pub fn interleave_i16(left: &[f32], right: &[f32], out: &mut [i16]) {
    assert_eq!(left.len(), right.len(), "channel buffers must match");
    assert_eq!(
        out.len(),
        left.len() * CHANNELS,
        "output must hold exactly one frame per sample pair"
    );

    for ((frame, &l), &r) in out.chunks_exact_mut(CHANNELS).zip(left).zip(right) {
        frame[0] = sample_to_i16(l);
        frame[1] = sample_to_i16(r);
    }
}

/// Encodes interleaved 16-bit samples into little-endian bytes.
///
/// # Panics
///
/// Panics if `out` is not exactly [`BYTES_PER_SAMPLE`] times `samples` long.
pub fn samples_to_bytes(samples: &[i16], out: &mut [u8]) {
    assert_eq!(
        out.len(),
        samples.len() * BYTES_PER_SAMPLE,
        "byte buffer must hold exactly the encoded samples"
    );

    for (pair, &sample) in out.chunks_exact_mut(BYTES_PER_SAMPLE).zip(samples) {
        pair.copy_from_slice(&sample.to_le_bytes());
    }
}

/// Decodes little-endian bytes into interleaved 16-bit samples.
///
/// # Panics
///
/// Panics if `bytes` is not exactly [`BYTES_PER_SAMPLE`] times `out` long.
pub fn bytes_to_samples(bytes: &[u8], out: &mut [i16]) {
    assert_eq!(
        bytes.len(),
        out.len() * BYTES_PER_SAMPLE,
        "byte buffer must decode to exactly the output samples"
    );

    for (sample, pair) in out.iter_mut().zip(bytes.chunks_exact(BYTES_PER_SAMPLE)) {
        *sample = i16::from_le_bytes([pair[0], pair[1]]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_range_maps_to_full_scale() {
        assert_eq!(sample_to_i16(0.0), 0);
        assert_eq!(sample_to_i16(-1.0), i16::MIN);
        assert_eq!(sample_to_i16(1.0), i16::MAX);
    }

    #[test]
    fn overshoot_saturates_instead_of_wrapping() {
        assert_eq!(sample_to_i16(1.5), i16::MAX);
        assert_eq!(sample_to_i16(-1.5), i16::MIN);
        assert_eq!(sample_to_i16(1000.0), i16::MAX);
        assert_eq!(sample_to_i16(-1000.0), i16::MIN);
    }

    #[test]
    fn half_scale_is_exact() {
        assert_eq!(sample_to_i16(0.5), 16384);
        assert_eq!(sample_to_i16(-0.5), -16384);
    }

    #[test]
    fn fixed_point_round_trips_through_float() {
        for sample in [i16::MIN, -12345, -1, 0, 1, 999, i16::MAX] {
            assert_eq!(sample_to_i16(i16_to_sample(sample)), sample);
        }
    }

    #[test]
    fn interleaving_preserves_channel_order() {
        let left = [0.25f32, -0.25, 0.5];
        let right = [-0.5f32, 0.75, -1.0];
        let mut out = [0i16; 6];

        interleave_i16(&left, &right, &mut out);
        assert_eq!(out, [8192, -16384, -8192, 24576, 16384, i16::MIN]);
    }

    #[test]
    #[should_panic(expected = "channel buffers must match")]
    fn mismatched_channels_panic() {
        let mut out = [0i16; 4];
        interleave_i16(&[0.0; 2], &[0.0; 3], &mut out);
    }

    #[test]
    fn wire_form_is_little_endian() {
        let mut bytes = [0u8; 4];
        samples_to_bytes(&[0x1234, -2], &mut bytes);
        assert_eq!(bytes, [0x34, 0x12, 0xfe, 0xff]);
    }

    #[test]
    fn byte_encoding_round_trips() {
        let samples = [i16::MIN, -1, 0, 1, 0x7fff, 257];
        let mut bytes = [0u8; 12];
        let mut back = [0i16; 6];

        samples_to_bytes(&samples, &mut bytes);
        bytes_to_samples(&bytes, &mut back);
        assert_eq!(back, samples);
    }
}
