//! STT streaming session.
//!
//! Wraps one duplex recognition stream: forwards assembled PCM frames,
//! demultiplexes provider response batches into `(text, is_final)`
//! transcript events, and tracks Open→Closed state so stale producers
//! no-op instead of erroring. The transition is one-way; a dead session is
//! surfaced, never resumed.

use crate::error::Result;
use crate::pipeline::error::{ErrorReporter, StageError};
use crate::stt::transport::{SttStream, SttTransport};
use crate::stt::types::{RecognitionConfig, SttEvent, TranscriptCallback, TranscriptEvent};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;

const STAGE: &str = "stt-session";

/// One streaming recognition session with Open→Closed lifecycle.
pub struct SttSession {
    stream: Box<dyn SttStream>,
    /// Single arbiter of whether downstream components may still write.
    /// Shared with the demux task, which flips it on provider error/close.
    closed: Arc<AtomicBool>,
    /// Guards the transport release so it runs exactly once.
    released: bool,
    reporter: Arc<dyn ErrorReporter>,
    demux: Option<JoinHandle<()>>,
}

impl SttSession {
    /// Opens a session on the given transport and spawns the result demux.
    ///
    /// `on_transcript` receives every usable alternative's top transcript in
    /// provider order; batches without one are ignored without error.
    pub async fn start(
        transport: &dyn SttTransport,
        config: &RecognitionConfig,
        mut on_transcript: TranscriptCallback,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self> {
        let (stream, mut events) = transport.start(config).await?;

        let closed = Arc::new(AtomicBool::new(false));
        let demux_closed = closed.clone();
        let demux_reporter = reporter.clone();

        let demux = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    SttEvent::Batch(batch) => {
                        for result in batch.results {
                            let Some(alt) = result.alternatives.first() else {
                                continue;
                            };
                            if alt.transcript.is_empty() {
                                continue;
                            }
                            on_transcript(TranscriptEvent {
                                text: alt.transcript.clone(),
                                is_final: result.is_final,
                            });
                        }
                    }
                    SttEvent::Error(message) => {
                        // Report once; later events just confirm the state.
                        if !demux_closed.swap(true, Ordering::SeqCst) {
                            demux_reporter.report(STAGE, &StageError::Fatal(message));
                        }
                    }
                    SttEvent::Closed => {
                        demux_closed.store(true, Ordering::SeqCst);
                    }
                }
            }
            // Provider end-of-stream converges to the same Closed state.
            demux_closed.store(true, Ordering::SeqCst);
        });

        Ok(Self {
            stream,
            closed,
            released: false,
            reporter,
            demux: Some(demux),
        })
    }

    /// Point-in-time query of session state.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Forwards one frame to the provider.
    ///
    /// No-op when the session is closed or the frame is empty. A forwarding
    /// fault closes the session and is reported, not retried.
    pub async fn write(&mut self, frame: &[u8]) {
        if frame.is_empty() || self.is_closed() {
            return;
        }
        if let Err(e) = self.stream.send(frame).await {
            self.closed.store(true, Ordering::SeqCst);
            self.reporter
                .report(STAGE, &StageError::Fatal(format!("write failed: {}", e)));
            self.release().await;
        }
    }

    /// Closes the session and releases the transport.
    ///
    /// Idempotent and safe to call from error paths; every termination path
    /// converges here.
    pub async fn end(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        self.release().await;
    }

    async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.stream.finish().await {
            self.reporter
                .report(STAGE, &StageError::Recoverable(format!("shutdown: {}", e)));
        }
    }

    /// Waits for the demux task to drain remaining provider events.
    ///
    /// Call after `end` when late final transcripts matter; otherwise the
    /// task finishes on its own when the provider channel closes.
    pub async fn join_demux(&mut self) {
        if let Some(handle) = self.demux.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::error::CollectingReporter;
    use crate::stt::transport::MockSttTransport;
    use crate::stt::types::{RecognitionBatch, RecognitionResult};
    use std::sync::Mutex;
    use std::time::Duration;

    fn collector() -> (TranscriptCallback, Arc<Mutex<Vec<TranscriptEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: TranscriptCallback = Box::new(move |event| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(event);
            }
        });
        (callback, seen)
    }

    async fn start_session(
        transport: &MockSttTransport,
    ) -> (
        SttSession,
        Arc<Mutex<Vec<TranscriptEvent>>>,
        Arc<CollectingReporter>,
    ) {
        let (callback, seen) = collector();
        let reporter = Arc::new(CollectingReporter::new());
        let session = SttSession::start(
            transport,
            &RecognitionConfig::default(),
            callback,
            reporter.clone(),
        )
        .await
        .unwrap();
        (session, seen, reporter)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_write_forwards_frames() {
        let transport = MockSttTransport::new();
        let (mut session, _seen, _reporter) = start_session(&transport).await;

        assert!(!session.is_closed());
        session.write(&[1u8; 9600]).await;
        session.write(&[2u8; 4800]).await;

        let frames = transport.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].len(), 9600);
        assert_eq!(frames[1].len(), 4800);
    }

    #[tokio::test]
    async fn test_empty_frame_is_noop() {
        let transport = MockSttTransport::new();
        let (mut session, _seen, _reporter) = start_session(&transport).await;

        session.write(&[]).await;
        assert!(transport.frames().is_empty());
        assert!(!session.is_closed());
    }

    #[tokio::test]
    async fn test_demux_forwards_transcripts_in_order() {
        let transport = MockSttTransport::new();
        let (_session, seen, _reporter) = start_session(&transport).await;

        transport
            .push(SttEvent::Batch(RecognitionBatch::single("hola", false)))
            .await;
        transport
            .push(SttEvent::Batch(RecognitionBatch::single("hola mundo", true)))
            .await;
        settle().await;

        let events = seen.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                TranscriptEvent {
                    text: "hola".to_string(),
                    is_final: false
                },
                TranscriptEvent {
                    text: "hola mundo".to_string(),
                    is_final: true
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_demux_skips_unusable_results() {
        let transport = MockSttTransport::new();
        let (_session, seen, reporter) = start_session(&transport).await;

        // Empty batch, result with no alternatives, empty transcript: all
        // ignored without error.
        transport
            .push(SttEvent::Batch(RecognitionBatch::default()))
            .await;
        transport
            .push(SttEvent::Batch(RecognitionBatch {
                results: vec![RecognitionResult {
                    alternatives: vec![],
                    is_final: true,
                }],
            }))
            .await;
        transport
            .push(SttEvent::Batch(RecognitionBatch::single("", true)))
            .await;
        transport
            .push(SttEvent::Batch(RecognitionBatch::single("bien", true)))
            .await;
        settle().await;

        let events = seen.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "bien");
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_closes_session_and_reports_once() {
        let transport = MockSttTransport::new();
        let (mut session, _seen, reporter) = start_session(&transport).await;

        transport
            .push(SttEvent::Error("stream reset".to_string()))
            .await;
        transport.push(SttEvent::Error("again".to_string())).await;
        settle().await;

        assert!(session.is_closed());
        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].1.contains("stream reset"));

        // Writes after Closed are no-ops, not errors.
        session.write(&[1u8; 4800]).await;
        assert!(transport.frames().is_empty());
    }

    #[tokio::test]
    async fn test_provider_close_event_closes_session() {
        let transport = MockSttTransport::new();
        let (mut session, _seen, reporter) = start_session(&transport).await;

        transport.push(SttEvent::Closed).await;
        settle().await;

        assert!(session.is_closed());
        assert!(reporter.is_empty());
        session.write(&[1u8; 4800]).await;
        assert!(transport.frames().is_empty());
    }

    #[tokio::test]
    async fn test_provider_end_of_stream_closes_session() {
        let transport = MockSttTransport::new();
        let (mut session, _seen, _reporter) = start_session(&transport).await;

        transport.drop_provider();
        session.join_demux().await;

        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_end_is_idempotent() {
        let transport = MockSttTransport::new();
        let (mut session, _seen, _reporter) = start_session(&transport).await;

        session.end().await;
        session.end().await;
        session.end().await;

        assert!(session.is_closed());
        assert_eq!(transport.finish_count(), 1);
    }

    #[tokio::test]
    async fn test_write_fault_closes_and_releases() {
        let transport = MockSttTransport::new();
        let (mut session, _seen, reporter) = start_session(&transport).await;

        transport.fail_sends_from_now();
        session.write(&[1u8; 4800]).await;

        assert!(session.is_closed());
        assert_eq!(transport.finish_count(), 1);
        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].1.contains("write failed"));

        // A later end() from cleanup must not release twice.
        session.end().await;
        assert_eq!(transport.finish_count(), 1);
    }

    #[tokio::test]
    async fn test_finish_fault_is_reported_but_converges() {
        let transport = MockSttTransport::new().with_failing_finish();
        let (mut session, _seen, reporter) = start_session(&transport).await;

        session.end().await;
        session.end().await;

        assert!(session.is_closed());
        assert_eq!(transport.finish_count(), 1);
        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].1.contains("shutdown"));
    }

    #[tokio::test]
    async fn test_transcripts_still_demuxed_after_end() {
        // Final results can arrive between our end() and the provider's
        // close; they must still reach the callback.
        let transport = MockSttTransport::new();
        let (mut session, seen, _reporter) = start_session(&transport).await;

        session.write(&[1u8; 9600]).await;
        transport
            .push(SttEvent::Batch(RecognitionBatch::single("adios", true)))
            .await;
        session.end().await;
        session.join_demux().await;

        let events = seen.lock().unwrap().clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "adios");
        assert!(events[0].is_final);
    }
}
