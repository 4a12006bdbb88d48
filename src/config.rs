use crate::defaults;
use crate::framing::downmix::DownmixConfig;
use crate::pipeline::orchestrator::BridgeConfig;
use crate::stt::types::RecognitionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub stt: SttConfig,
    pub session: SessionConfig,
    pub intent: IntentConfig,
}

/// Audio framing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub target_frame_ms: u32,
    pub min_frame_ms: u32,
    /// Carry incomplete stereo sample pairs across chunks in the downmixer.
    pub carry_downmix_remainder: bool,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub language: String,
    pub interim_results: bool,
    pub punctuation: bool,
    pub profanity_filter: bool,
    pub model: Option<String>,
    pub use_enhanced: bool,
    pub phrase_hints: Vec<String>,
}

/// Session timer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub idle_timeout_ms: u64,
    pub keepalive_delay_ms: u64,
    pub subscription_silence_ms: u64,
    pub channel_buffer_size: usize,
}

/// Intent matcher configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntentConfig {
    pub wake_word: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            target_frame_ms: defaults::TARGET_FRAME_MS,
            min_frame_ms: defaults::MIN_FRAME_MS,
            carry_downmix_remainder: false,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            interim_results: true,
            punctuation: true,
            profanity_filter: false,
            model: None,
            use_enhanced: false,
            phrase_hints: Vec::new(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: defaults::IDLE_TIMEOUT_MS,
            keepalive_delay_ms: defaults::KEEPALIVE_DELAY_MS,
            subscription_silence_ms: defaults::SUBSCRIPTION_SILENCE_MS,
            channel_buffer_size: defaults::CHANNEL_BUFFER_SIZE,
        }
    }
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            wake_word: defaults::WAKE_WORD.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if e.downcast_ref::<std::io::Error>()
                    .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound) =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOXBRIDGE_LANGUAGE → stt.language
    /// - VOXBRIDGE_MODEL → stt.model
    /// - VOXBRIDGE_WAKE_WORD → intent.wake_word
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("VOXBRIDGE_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(model) = std::env::var("VOXBRIDGE_MODEL")
            && !model.is_empty()
        {
            self.stt.model = Some(model);
        }

        if let Ok(wake_word) = std::env::var("VOXBRIDGE_WAKE_WORD")
            && !wake_word.is_empty()
        {
            self.intent.wake_word = wake_word;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voxbridge/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxbridge")
            .join("config.toml")
    }

    /// Builds the per-session pipeline configuration from this config.
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            sample_rate: self.audio.sample_rate,
            target_frame_ms: self.audio.target_frame_ms,
            min_frame_ms: self.audio.min_frame_ms,
            idle_timeout_ms: self.session.idle_timeout_ms,
            keepalive_delay_ms: self.session.keepalive_delay_ms,
            subscription_silence_ms: self.session.subscription_silence_ms,
            channel_buffer_size: self.session.channel_buffer_size,
            downmix: DownmixConfig {
                carry_remainder: self.audio.carry_downmix_remainder,
            },
            recognition: self.recognition_config(),
        }
    }

    /// Builds the recognition options handed to the STT transport.
    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig {
            sample_rate: self.audio.sample_rate,
            language_code: self.stt.language.clone(),
            interim_results: self.stt.interim_results,
            enable_automatic_punctuation: self.stt.punctuation,
            profanity_filter: self.stt.profanity_filter,
            single_utterance: false,
            model: self.stt.model.clone(),
            use_enhanced: self.stt.use_enhanced,
            phrase_hints: self.stt.phrase_hints.clone(),
        }
    }
}
