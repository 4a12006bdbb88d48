//! Default configuration constants for voxbridge.
//!
//! Shared constants used across configuration types to keep the framing
//! arithmetic and timer defaults in one place.

/// Default audio sample rate in Hz.
///
/// The voice-chat decoder hands us 48kHz PCM, and the STT transport is
/// configured with the same rate so no resampling happens in between.
pub const SAMPLE_RATE: u32 = 48_000;

/// Bits per sample for signed little-endian PCM.
pub const BITS_PER_SAMPLE: u32 = 16;

/// Target frame duration in milliseconds.
///
/// 100ms frames (9600 bytes mono at 48kHz) keep transport overhead low
/// while staying well under provider per-write limits.
pub const TARGET_FRAME_MS: u32 = 100;

/// Minimum sendable frame duration in milliseconds.
///
/// The STT transport rejects frames shorter than 50ms. Drained tails below
/// this are zero-padded up to it rather than dropped, trading a few
/// milliseconds of synthetic silence for the last utterance fragment.
pub const MIN_FRAME_MS: u32 = 50;

/// Idle watchdog threshold in milliseconds.
///
/// 8 seconds without PCM is treated as end-of-utterance: the carry buffer
/// is drained and the STT session closed.
pub const IDLE_TIMEOUT_MS: u64 = 8_000;

/// Keepalive delay in milliseconds.
///
/// If no PCM arrives within 700ms of session start, one target-duration
/// silence frame is sent so the provider does not drop the stream during
/// the initial connection-setup gap.
pub const KEEPALIVE_DELAY_MS: u64 = 700;

/// Silence duration after which the upstream voice subscription auto-closes.
///
/// This belongs to the voice-input collaborator, not the idle watchdog;
/// it is carried here so both sides agree on the configured value.
pub const SUBSCRIPTION_SILENCE_MS: u64 = 5_000;

/// Default recognition locale.
pub const DEFAULT_LANGUAGE: &str = "es-ES";

/// Default wake word required before intent patterns are matched.
pub const WAKE_WORD: &str = "alfred";

/// Default bounded-channel capacity between pipeline stages.
pub const CHANNEL_BUFFER_SIZE: usize = 100;

/// PCM chunks between progress log lines on the relay.
pub const PROGRESS_LOG_CHUNKS: u64 = 20;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_defaults_are_whole_milliseconds() {
        // 96 bytes/ms mono at 48kHz; both frame sizes must be exact multiples.
        let bytes_per_ms = SAMPLE_RATE * (BITS_PER_SAMPLE / 8) / 1000;
        assert_eq!(bytes_per_ms, 96);
        assert_eq!(bytes_per_ms * TARGET_FRAME_MS, 9600);
        assert_eq!(bytes_per_ms * MIN_FRAME_MS, 4800);
        assert!(TARGET_FRAME_MS >= MIN_FRAME_MS);
    }
}
