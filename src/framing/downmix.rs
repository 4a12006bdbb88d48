//! Stereo-to-mono downmix.
//!
//! Transforms interleaved dual-channel 16-bit little-endian PCM into mono
//! by averaging each left/right pair with an arithmetic right shift, which
//! rounds toward negative infinity for odd negative sums.

/// Configuration for the downmixer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownmixConfig {
    /// Carry trailing 1-3 bytes of an incomplete stereo sample pair into
    /// the next chunk instead of dropping them.
    ///
    /// Off by default: dropping the tail per chunk matches the upstream
    /// decoder, which emits whole stereo samples except around stream
    /// boundaries, where up to 3 bytes of audio may be lost.
    pub carry_remainder: bool,
}

/// Stateless (by default) stream transform from stereo to mono PCM bytes.
pub struct Downmixer {
    config: DownmixConfig,
    /// Incomplete stereo sample pair held across chunks (strict mode only).
    remainder: Vec<u8>,
}

impl Downmixer {
    /// Creates a downmixer with default configuration.
    pub fn new() -> Self {
        Self::with_config(DownmixConfig::default())
    }

    /// Creates a downmixer with custom configuration.
    pub fn with_config(config: DownmixConfig) -> Self {
        Self {
            config,
            remainder: Vec::new(),
        }
    }

    /// Downmixes one chunk of interleaved stereo PCM to mono.
    ///
    /// Output length is always a whole number of 2-byte mono samples.
    pub fn process(&mut self, chunk: &[u8]) -> Vec<u8> {
        let input: Vec<u8>;
        let data = if self.config.carry_remainder && !self.remainder.is_empty() {
            let mut joined = std::mem::take(&mut self.remainder);
            joined.extend_from_slice(chunk);
            input = joined;
            &input[..]
        } else {
            chunk
        };

        let whole = data.len() / 4 * 4;
        let mut out = Vec::with_capacity(whole / 2);
        for pair in data[..whole].chunks_exact(4) {
            let left = i16::from_le_bytes([pair[0], pair[1]]);
            let right = i16::from_le_bytes([pair[2], pair[3]]);
            let mixed = ((left as i32 + right as i32) >> 1) as i16;
            out.extend_from_slice(&mixed.to_le_bytes());
        }

        if self.config.carry_remainder {
            self.remainder.extend_from_slice(&data[whole..]);
        }

        out
    }

    /// Bytes currently held back waiting for a complete stereo sample pair.
    pub fn remainder_len(&self) -> usize {
        self.remainder.len()
    }
}

impl Default for Downmixer {
    fn default() -> Self {
        Self::new()
    }
}
