//! Streaming speech-to-text session and transport abstraction.

pub mod session;
pub mod transport;
pub mod types;

pub use session::SttSession;
pub use transport::{MockSttTransport, SttStream, SttTransport};
pub use types::{
    RecognitionBatch, RecognitionConfig, RecognitionResult, SttEvent, TranscriptAlternative,
    TranscriptCallback, TranscriptEvent,
};
