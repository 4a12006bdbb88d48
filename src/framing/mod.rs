//! Byte-level framing for the STT transport.
//!
//! Converts the decoded voice stream into the exact framing the transport
//! requires:
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌────────────┐
//! │  48kHz     │───▶│  Stereo →  │───▶│   Frame    │───▶ 100ms frames
//! │  stereo    │    │  mono      │    │  assembler │     (padded tail
//! │  PCM       │    │  downmix   │    │  (carry)   │      on drain)
//! └────────────┘    └────────────┘    └────────────┘
//! ```

pub mod assembler;
pub mod codec;
pub mod downmix;

pub use assembler::FrameAssembler;
pub use codec::FrameCodec;
pub use downmix::{DownmixConfig, Downmixer};
