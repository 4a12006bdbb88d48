//! voxbridge - Per-speaker voice-chat → streaming STT relay
//!
//! Bridges compressed per-speaker audio subscriptions to a cloud
//! speech-to-text transport: decode, stereo→mono downmix, frame assembly,
//! idle/keepalive timers, and idempotent session teardown.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod config;
pub mod defaults;
pub mod error;
pub mod framing;
pub mod intent;
pub mod pipeline;
pub mod stt;

// Pipeline
pub use pipeline::orchestrator::{BridgeConfig, BridgeHandle, BridgeSession};

// Core seams (decoder in, transcripts out)
pub use pipeline::decode::AudioDecoder;
pub use stt::transport::{SttStream, SttTransport};
pub use stt::types::{TranscriptCallback, TranscriptEvent};

// Error handling
pub use error::{BridgeError, Result};
pub use pipeline::error::{ErrorReporter, StageError};

// Config
pub use config::Config;

// Intent layer (downstream of final transcripts)
pub use intent::{Intent, IntentParser};
