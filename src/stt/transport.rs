//! Duplex streaming transport abstraction for the STT provider.
//!
//! This trait seam is what the session wraps; real providers (gRPC,
//! websocket) live behind it, and tests use [`MockSttTransport`].

use crate::error::{BridgeError, Result};
use crate::stt::types::{RecognitionConfig, SttEvent};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// Capacity of the provider event channel returned by `start`.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Factory for duplex streaming recognition sessions.
#[async_trait]
pub trait SttTransport: Send + Sync {
    /// Opens one streaming recognition session.
    ///
    /// Returns the write half and a receiver for provider events. The
    /// receiver yields batches, faults, and close notifications in provider
    /// order; the channel closing means the provider side is gone.
    async fn start(
        &self,
        config: &RecognitionConfig,
    ) -> Result<(Box<dyn SttStream>, mpsc::Receiver<SttEvent>)>;
}

/// Write half of a streaming recognition session.
#[async_trait]
pub trait SttStream: Send {
    /// Sends one PCM frame to the provider.
    async fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Requests graceful shutdown and releases the underlying client.
    async fn finish(&mut self) -> Result<()>;
}

/// Shared state between a mock transport and its streams.
#[derive(Default)]
struct MockState {
    frames: Mutex<Vec<Vec<u8>>>,
    finish_calls: AtomicUsize,
    fail_sends: AtomicBool,
    fail_finish: AtomicBool,
    started: AtomicBool,
    event_tx: Mutex<Option<mpsc::Sender<SttEvent>>>,
}

/// In-memory transport for tests: records written frames and lets the test
/// script provider events.
#[derive(Clone, Default)]
pub struct MockSttTransport {
    state: Arc<MockState>,
}

impl MockSttTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `send` fail.
    pub fn with_failing_sends(self) -> Self {
        self.state.fail_sends.store(true, Ordering::SeqCst);
        self
    }

    /// Makes `finish` return an error (the session must still converge).
    pub fn with_failing_finish(self) -> Self {
        self.state.fail_finish.store(true, Ordering::SeqCst);
        self
    }

    /// Flips send failures on for an already-started transport.
    pub fn fail_sends_from_now(&self) {
        self.state.fail_sends.store(true, Ordering::SeqCst);
    }

    /// All frames written so far, in write order.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.state
            .frames
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    /// Total bytes across all written frames.
    pub fn total_bytes(&self) -> usize {
        self.frames().iter().map(Vec::len).sum()
    }

    /// How many times `finish` was called.
    pub fn finish_count(&self) -> usize {
        self.state.finish_calls.load(Ordering::SeqCst)
    }

    /// Whether `start` has been called.
    pub fn started(&self) -> bool {
        self.state.started.load(Ordering::SeqCst)
    }

    /// Emits a provider event into the running session.
    ///
    /// Returns false if no session is active or the receiver is gone.
    pub async fn push(&self, event: SttEvent) -> bool {
        let tx = match self.state.event_tx.lock() {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        match tx {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Simulates the provider dropping the stream: closes the event channel.
    pub fn drop_provider(&self) {
        if let Ok(mut slot) = self.state.event_tx.lock() {
            *slot = None;
        }
    }
}

#[async_trait]
impl SttTransport for MockSttTransport {
    async fn start(
        &self,
        _config: &RecognitionConfig,
    ) -> Result<(Box<dyn SttStream>, mpsc::Receiver<SttEvent>)> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        if let Ok(mut slot) = self.state.event_tx.lock() {
            *slot = Some(tx);
        }
        self.state.started.store(true, Ordering::SeqCst);

        let stream = MockSttStream {
            state: self.state.clone(),
        };
        Ok((Box::new(stream), rx))
    }
}

struct MockSttStream {
    state: Arc<MockState>,
}

#[async_trait]
impl SttStream for MockSttStream {
    async fn send(&mut self, frame: &[u8]) -> Result<()> {
        if self.state.fail_sends.load(Ordering::SeqCst) {
            return Err(BridgeError::Transport {
                message: "mock send failure".to_string(),
            });
        }
        if let Ok(mut frames) = self.state.frames.lock() {
            frames.push(frame.to_vec());
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        self.state.finish_calls.fetch_add(1, Ordering::SeqCst);
        // Graceful shutdown ends the provider stream too.
        if let Ok(mut slot) = self.state.event_tx.lock() {
            *slot = None;
        }
        if self.state.fail_finish.load(Ordering::SeqCst) {
            return Err(BridgeError::Transport {
                message: "mock finish failure".to_string(),
            });
        }
        Ok(())
    }
}
