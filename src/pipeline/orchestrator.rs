//! Session orchestrator.
//!
//! Wires decode, downmix, frame assembly, timers, and the STT session
//! together for one (voice connection, speaker) pair, and exposes a single
//! idempotent cleanup that tears every owned resource down exactly once
//! regardless of which path triggered shutdown.

use crate::defaults;
use crate::error::{BridgeError, Result};
use crate::framing::assembler::FrameAssembler;
use crate::framing::codec::FrameCodec;
use crate::framing::downmix::{DownmixConfig, Downmixer};
use crate::pipeline::decode::{AudioDecoder, DecodeStage, PcmEvent};
use crate::pipeline::error::{ErrorReporter, StageError, StderrReporter};
use crate::pipeline::timers::{IdleWatchdog, Keepalive};
use crate::stt::session::SttSession;
use crate::stt::transport::SttTransport;
use crate::stt::types::{RecognitionConfig, TranscriptCallback};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;

/// Configuration for one bridge session.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// PCM sample rate shared by decoder output and STT input.
    pub sample_rate: u32,
    /// Target frame duration sent to the transport.
    pub target_frame_ms: u32,
    /// Minimum frame duration the transport accepts.
    pub min_frame_ms: u32,
    /// Silence gap after which end-of-utterance is declared.
    pub idle_timeout_ms: u64,
    /// Delay before the one-shot silence keepalive fires.
    pub keepalive_delay_ms: u64,
    /// Silence duration after which the upstream voice subscription closes
    /// itself. Collaborator behavior, recorded here so operators see both
    /// timeouts side by side.
    pub subscription_silence_ms: u64,
    /// Bounded-channel capacity between decode and relay.
    pub channel_buffer_size: usize,
    /// Downmixer options.
    pub downmix: DownmixConfig,
    /// Recognition options forwarded to the transport (sample_rate is
    /// overridden with the pipeline rate at start).
    pub recognition: RecognitionConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            target_frame_ms: defaults::TARGET_FRAME_MS,
            min_frame_ms: defaults::MIN_FRAME_MS,
            idle_timeout_ms: defaults::IDLE_TIMEOUT_MS,
            keepalive_delay_ms: defaults::KEEPALIVE_DELAY_MS,
            subscription_silence_ms: defaults::SUBSCRIPTION_SILENCE_MS,
            channel_buffer_size: defaults::CHANNEL_BUFFER_SIZE,
            downmix: DownmixConfig::default(),
            recognition: RecognitionConfig::default(),
        }
    }
}

impl BridgeConfig {
    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(BridgeError::ConfigInvalidValue {
                key: "sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.target_frame_ms < self.min_frame_ms {
            return Err(BridgeError::ConfigInvalidValue {
                key: "target_frame_ms".to_string(),
                message: "must be at least min_frame_ms".to_string(),
            });
        }
        if self.min_frame_ms == 0 {
            return Err(BridgeError::ConfigInvalidValue {
                key: "min_frame_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Orchestrator for bridge sessions; one instance can start many, each
/// fully independent.
pub struct BridgeSession {
    config: BridgeConfig,
}

impl BridgeSession {
    /// Creates an orchestrator with default configuration.
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    /// Creates an orchestrator with custom configuration.
    pub fn with_config(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// Starts one session, reporting faults to stderr.
    ///
    /// `packets` is the compressed per-speaker subscription stream;
    /// `on_transcript` is the single outward contract of the pipeline.
    pub async fn start(
        &self,
        packets: mpsc::Receiver<Vec<u8>>,
        decoder: Box<dyn AudioDecoder>,
        transport: &dyn SttTransport,
        on_transcript: TranscriptCallback,
    ) -> Result<BridgeHandle> {
        self.start_with_reporter(
            packets,
            decoder,
            transport,
            on_transcript,
            Arc::new(StderrReporter),
        )
        .await
    }

    /// Starts one session with a custom error reporter.
    pub async fn start_with_reporter(
        &self,
        packets: mpsc::Receiver<Vec<u8>>,
        decoder: Box<dyn AudioDecoder>,
        transport: &dyn SttTransport,
        on_transcript: TranscriptCallback,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<BridgeHandle> {
        self.config.validate()?;

        let codec = FrameCodec::mono_16(self.config.sample_rate);
        let mut assembler = FrameAssembler::with_durations(
            &codec,
            self.config.target_frame_ms,
            self.config.min_frame_ms,
        );
        let silence = codec.silence_frame(self.config.target_frame_ms);

        let mut recognition = self.config.recognition.clone();
        recognition.sample_rate = self.config.sample_rate;
        let mut session =
            SttSession::start(transport, &recognition, on_transcript, reporter.clone()).await?;

        // Decode stage feeds the relay through a bounded channel; a slow
        // transport back-pressures into the decoder instead of fanning out
        // unbounded events.
        let (pcm_tx, mut pcm_rx) = mpsc::channel::<PcmEvent>(self.config.channel_buffer_size);
        let stage = DecodeStage::new(decoder, Downmixer::with_config(self.config.downmix));
        let decode_task = tokio::spawn(async move {
            stage.run(packets, pcm_tx).await;
        });

        let stop = Arc::new(Notify::new());
        let chunks = Arc::new(AtomicU64::new(0));
        let bytes = Arc::new(AtomicU64::new(0));

        let relay_stop = stop.clone();
        let relay_chunks = chunks.clone();
        let relay_bytes = bytes.clone();
        let relay_reporter = reporter.clone();
        let mut watchdog = IdleWatchdog::new(Duration::from_millis(self.config.idle_timeout_ms));
        let mut keepalive = Keepalive::new(Duration::from_millis(self.config.keepalive_delay_ms));

        let relay_task = tokio::spawn(async move {
            let mut input_open = true;
            loop {
                tokio::select! {
                    _ = relay_stop.notified() => {
                        session.end().await;
                        break;
                    }
                    event = pcm_rx.recv(), if input_open => match event {
                        Some(PcmEvent::Data(mono)) => {
                            let count = relay_chunks.fetch_add(1, Ordering::Relaxed) + 1;
                            let total = relay_bytes.fetch_add(mono.len() as u64, Ordering::Relaxed)
                                + mono.len() as u64;
                            if count % defaults::PROGRESS_LOG_CHUNKS == 0 {
                                eprintln!(
                                    "voxbridge: relayed {} pcm chunks ({} bytes)",
                                    count, total
                                );
                            }
                            keepalive.disarm();
                            watchdog.rearm();
                            for frame in assembler.on_data(&mono) {
                                session.write(&frame).await;
                            }
                        }
                        Some(PcmEvent::Failed(message)) => {
                            relay_reporter.report("decode", &StageError::Fatal(message));
                            session.end().await;
                            break;
                        }
                        None => {
                            // Upstream ended: flush the tail, then leave the
                            // session open until the watchdog declares
                            // end-of-utterance so late finals still arrive.
                            input_open = false;
                            if let Some(tail) = assembler.drain(true) {
                                session.write(&tail).await;
                            }
                            watchdog.rearm();
                        }
                    },
                    _ = keepalive.expired(), if keepalive.is_armed() => {
                        keepalive.disarm();
                        if !session.is_closed() {
                            session.write(&silence).await;
                        }
                        watchdog.rearm();
                    }
                    _ = watchdog.expired(), if watchdog.is_armed() => {
                        if let Some(tail) = assembler.drain(true) {
                            session.write(&tail).await;
                        }
                        session.end().await;
                        break;
                    }
                }
            }
            // Let buffered provider events reach the callback before the
            // relay retires.
            session.join_demux().await;
        });

        Ok(BridgeHandle {
            stop,
            cleaned: AtomicBool::new(false),
            decode_task,
            relay_task,
            chunks,
            bytes,
        })
    }
}

impl Default for BridgeSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one running bridge session.
pub struct BridgeHandle {
    stop: Arc<Notify>,
    cleaned: AtomicBool,
    decode_task: JoinHandle<()>,
    relay_task: JoinHandle<()>,
    chunks: Arc<AtomicU64>,
    bytes: Arc<AtomicU64>,
}

impl BridgeHandle {
    /// Tears down the session: detaches the decode stage from its input,
    /// releases the subscription, and ends the STT session.
    ///
    /// Safe to call more than once and from error paths; each release is
    /// independent of the others.
    pub fn cleanup(&self) {
        if self.cleaned.swap(true, Ordering::SeqCst) {
            return;
        }
        // Dropping the decode task drops the subscription receiver and the
        // decoder with it.
        self.decode_task.abort();
        // The relay ends the STT session on its own task so transport
        // shutdown still happens in order with in-flight writes.
        self.stop.notify_one();
    }

    /// Waits for the session to finish (watchdog, EOS, fault, or cleanup).
    pub async fn join(&mut self) {
        let _ = (&mut self.relay_task).await;
        self.decode_task.abort();
        let _ = (&mut self.decode_task).await;
    }

    /// True while the relay is still running.
    pub fn is_active(&self) -> bool {
        !self.relay_task.is_finished()
    }

    /// PCM chunks observed at the assembler input.
    pub fn chunks_received(&self) -> u64 {
        self.chunks.load(Ordering::Relaxed)
    }

    /// PCM bytes observed at the assembler input.
    pub fn bytes_received(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}
