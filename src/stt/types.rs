//! Types shared across the STT transport boundary.

use crate::defaults;

/// Streaming recognition configuration handed to the transport at session
/// start. Only recognized options, no provider-specific magic dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionConfig {
    /// PCM sample rate in Hz; encoding is always linear 16-bit mono.
    pub sample_rate: u32,
    /// Recognition locale, fixed for the session.
    pub language_code: String,
    /// Emit non-final (interim) results as live captions.
    pub interim_results: bool,
    /// Let the provider insert punctuation.
    pub enable_automatic_punctuation: bool,
    /// Mask profanity in transcripts.
    pub profanity_filter: bool,
    /// Stop after the first complete utterance instead of streaming on.
    pub single_utterance: bool,
    /// Provider recognition model, when one should be pinned.
    pub model: Option<String>,
    /// Opt into the provider's enhanced model tier.
    pub use_enhanced: bool,
    /// Phrases biasing recognition toward expected vocabulary.
    pub phrase_hints: Vec<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            language_code: defaults::DEFAULT_LANGUAGE.to_string(),
            interim_results: true,
            enable_automatic_punctuation: true,
            profanity_filter: false,
            single_utterance: false,
            model: None,
            use_enhanced: false,
            phrase_hints: Vec::new(),
        }
    }
}

/// One ranked transcript candidate inside a recognition result.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptAlternative {
    pub transcript: String,
    pub confidence: f32,
}

/// One recognized segment with its ranked alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    /// Ranked best-first; the top alternative is the one forwarded.
    pub alternatives: Vec<TranscriptAlternative>,
    /// Whether the provider has committed this segment.
    pub is_final: bool,
}

/// One response batch from the provider, containing zero or more results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionBatch {
    pub results: Vec<RecognitionResult>,
}

impl RecognitionBatch {
    /// Convenience constructor for a single-result batch.
    pub fn single(transcript: &str, is_final: bool) -> Self {
        Self {
            results: vec![RecognitionResult {
                alternatives: vec![TranscriptAlternative {
                    transcript: transcript.to_string(),
                    confidence: 1.0,
                }],
                is_final,
            }],
        }
    }
}

/// Events surfaced by the transport's receive side.
#[derive(Debug, Clone)]
pub enum SttEvent {
    /// A response batch with transcript candidates.
    Batch(RecognitionBatch),
    /// Transport-level fault; the session is dead after this.
    Error(String),
    /// Provider closed the stream (graceful or not).
    Closed,
}

/// Transcript delivered to the result sink: the only outward contract.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
}

/// Callback receiving transcripts in provider order.
pub type TranscriptCallback = Box<dyn FnMut(TranscriptEvent) + Send>;
