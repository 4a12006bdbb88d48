//! Frame assembler.
//!
//! Accumulates downmixed PCM bytes in a carry buffer and emits exact
//! target-duration frames as soon as enough data exists. On drain the tail
//! is either sent as a short frame (>= minimum), zero-padded up to the
//! minimum, or dropped, per the pad policy.

use crate::defaults;
use crate::framing::codec::FrameCodec;

/// Stateful accumulator producing fixed-size frames from a byte stream.
pub struct FrameAssembler {
    target_bytes: usize,
    min_bytes: usize,
    /// Buffered bytes not yet large enough to form a full frame.
    /// Holds 0..target_bytes between calls; cleared on every drain.
    carry: Vec<u8>,
}

impl FrameAssembler {
    /// Creates an assembler with the default 100ms/50ms frame policy.
    pub fn new(codec: &FrameCodec) -> Self {
        Self::with_durations(codec, defaults::TARGET_FRAME_MS, defaults::MIN_FRAME_MS)
    }

    /// Creates an assembler with custom target and minimum frame durations.
    pub fn with_durations(codec: &FrameCodec, target_ms: u32, min_ms: u32) -> Self {
        let target_bytes = codec.frame_bytes(target_ms);
        let min_bytes = codec.frame_bytes(min_ms);
        debug_assert!(target_bytes >= min_bytes);
        Self {
            target_bytes,
            min_bytes,
            carry: Vec::new(),
        }
    }

    /// Exact byte length of emitted full frames.
    pub fn target_bytes(&self) -> usize {
        self.target_bytes
    }

    /// Minimum byte length the transport accepts.
    pub fn min_bytes(&self) -> usize {
        self.min_bytes
    }

    /// Bytes currently buffered below one full frame.
    pub fn carry_len(&self) -> usize {
        self.carry.len()
    }

    /// Appends a chunk and returns every full target-size frame now available,
    /// in input order. The remainder (< target) stays in the carry buffer.
    pub fn on_data(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.carry.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while self.carry.len() >= self.target_bytes {
            frames.push(self.carry.drain(..self.target_bytes).collect());
        }
        frames
    }

    /// Flushes the carry buffer on end-of-stream or watchdog expiry.
    ///
    /// Returns the tail as one frame if it meets the minimum, zero-padded
    /// up to the minimum if `pad_if_needed` is set, or `None` (dropping the
    /// tail) otherwise. The carry is cleared on every branch.
    pub fn drain(&mut self, pad_if_needed: bool) -> Option<Vec<u8>> {
        if self.carry.is_empty() {
            return None;
        }

        let mut tail = std::mem::take(&mut self.carry);
        if tail.len() >= self.min_bytes {
            Some(tail)
        } else if pad_if_needed {
            tail.resize(self.min_bytes, 0);
            Some(tail)
        } else {
            None
        }
    }
}
