//! Transport frame size arithmetic.
//!
//! Pure integer arithmetic deriving frame sizes from the PCM format. No
//! state, no rounding drift across repeated calls.

use crate::defaults;

/// Frame size calculator for a fixed PCM format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample (16 for signed little-endian PCM).
    pub bits_per_sample: u32,
    /// Channel count (1 after downmix, 2 before).
    pub channels: u32,
}

impl FrameCodec {
    /// Creates a codec for the given PCM format.
    pub const fn new(sample_rate: u32, bits_per_sample: u32, channels: u32) -> Self {
        Self {
            sample_rate,
            bits_per_sample,
            channels,
        }
    }

    /// Mono 16-bit codec at the given sample rate (the post-downmix format).
    pub const fn mono_16(sample_rate: u32) -> Self {
        Self::new(sample_rate, defaults::BITS_PER_SAMPLE, 1)
    }

    /// Stereo 16-bit codec at the given sample rate (the decoder output format).
    pub const fn stereo_16(sample_rate: u32) -> Self {
        Self::new(sample_rate, defaults::BITS_PER_SAMPLE, 2)
    }

    /// Bytes per sample across all channels.
    pub const fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample / 8 * self.channels) as usize
    }

    /// Bytes of PCM per millisecond (96 for mono 16-bit at 48kHz).
    pub const fn bytes_per_ms(&self) -> usize {
        (self.sample_rate as usize * self.bytes_per_sample()) / 1000
    }

    /// Exact byte length of a frame of the given duration.
    pub const fn frame_bytes(&self, duration_ms: u32) -> usize {
        self.bytes_per_ms() * duration_ms as usize
    }

    /// A frame of all-zero samples (silence) of the given duration.
    pub fn silence_frame(&self, duration_ms: u32) -> Vec<u8> {
        vec![0u8; self.frame_bytes(duration_ms)]
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::mono_16(defaults::SAMPLE_RATE)
    }
}
