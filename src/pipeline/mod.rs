//! Per-speaker relay pipeline.
//!
//! Decode stage → frame relay → STT session, wired by the orchestrator.
//! Each stage owns its state; faults flow through [`error::ErrorReporter`]
//! instead of crossing stage boundaries as panics.

pub mod decode;
pub mod error;
pub mod orchestrator;
pub mod timers;

pub use decode::{AudioDecoder, DecodeStage, MockDecoder, PassthroughDecoder, PcmEvent};
pub use error::{CollectingReporter, ErrorReporter, StageError, StderrReporter};
pub use orchestrator::{BridgeConfig, BridgeHandle, BridgeSession};
pub use timers::{IdleWatchdog, Keepalive};
