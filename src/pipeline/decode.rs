//! Decode stage: compressed per-speaker packets → stereo PCM.
//!
//! Actual decompression belongs to an external codec collaborator behind
//! the [`AudioDecoder`] trait; this stage adapts it into the pipeline and
//! runs the downmix directly behind it, so the channel downstream carries
//! mono PCM ready for assembly.

use crate::error::{BridgeError, Result};
use crate::framing::downmix::Downmixer;
use tokio::sync::mpsc;

/// Trait for decoding compressed audio packets to 48kHz stereo 16-bit PCM.
///
/// Implementations wrap the platform codec (Opus for the voice-chat case).
pub trait AudioDecoder: Send {
    /// Decodes one compressed packet into interleaved stereo PCM bytes.
    fn decode(&mut self, packet: &[u8]) -> Result<Vec<u8>>;
}

/// Decoder for sources that already deliver stereo PCM.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughDecoder;

impl AudioDecoder for PassthroughDecoder {
    fn decode(&mut self, packet: &[u8]) -> Result<Vec<u8>> {
        Ok(packet.to_vec())
    }
}

/// Mock decoder for tests: passes packets through until a configured
/// failure point.
#[derive(Debug, Clone, Default)]
pub struct MockDecoder {
    fail_after: Option<usize>,
    decoded: usize,
}

impl MockDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails on the packet after `n` successful decodes.
    pub fn with_failure_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl AudioDecoder for MockDecoder {
    fn decode(&mut self, packet: &[u8]) -> Result<Vec<u8>> {
        if let Some(limit) = self.fail_after
            && self.decoded >= limit
        {
            return Err(BridgeError::Decode {
                message: "mock decode failure".to_string(),
            });
        }
        self.decoded += 1;
        Ok(packet.to_vec())
    }
}

/// Mono PCM flowing out of the decode stage.
#[derive(Debug, Clone)]
pub enum PcmEvent {
    /// One chunk of downmixed mono PCM bytes.
    Data(Vec<u8>),
    /// Decode fault; the stage stops and the session winds down.
    Failed(String),
}

/// Stage adapting a compressed packet stream into mono PCM events.
pub struct DecodeStage {
    decoder: Box<dyn AudioDecoder>,
    downmixer: Downmixer,
}

impl DecodeStage {
    pub fn new(decoder: Box<dyn AudioDecoder>, downmixer: Downmixer) -> Self {
        Self { decoder, downmixer }
    }

    /// Runs the stage: decode, downmix, forward.
    ///
    /// Stops on input end-of-stream (closing the output by dropping it), on
    /// a decode fault (after forwarding `Failed`), or when the consumer is
    /// gone. Back-pressure comes from the bounded output channel.
    pub async fn run(mut self, mut input: mpsc::Receiver<Vec<u8>>, output: mpsc::Sender<PcmEvent>) {
        while let Some(packet) = input.recv().await {
            match self.decoder.decode(&packet) {
                Ok(stereo) => {
                    let mono = self.downmixer.process(&stereo);
                    if mono.is_empty() {
                        continue;
                    }
                    if output.send(PcmEvent::Data(mono)).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    let _ = output.send(PcmEvent::Failed(e.to_string())).await;
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_chunk(pairs: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for _ in 0..pairs {
            out.extend_from_slice(&100i16.to_le_bytes());
            out.extend_from_slice(&300i16.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_passthrough_decoder() {
        let mut decoder = PassthroughDecoder;
        assert_eq!(decoder.decode(&[1, 2, 3]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_mock_decoder_fails_after_limit() {
        let mut decoder = MockDecoder::new().with_failure_after(2);
        assert!(decoder.decode(&[1]).is_ok());
        assert!(decoder.decode(&[2]).is_ok());
        assert!(decoder.decode(&[3]).is_err());
    }

    #[tokio::test]
    async fn test_decode_stage_downmixes_packets() {
        let stage = DecodeStage::new(Box::new(PassthroughDecoder), Downmixer::new());
        let (input_tx, input_rx) = mpsc::channel(10);
        let (output_tx, mut output_rx) = mpsc::channel(10);

        tokio::spawn(async move {
            stage.run(input_rx, output_tx).await;
        });

        input_tx.send(stereo_chunk(4)).await.unwrap();
        match output_rx.recv().await.unwrap() {
            PcmEvent::Data(mono) => {
                // 4 stereo pairs of (100, 300) average to 4 mono samples of 200.
                assert_eq!(mono.len(), 8);
                for sample in mono.chunks_exact(2) {
                    assert_eq!(i16::from_le_bytes([sample[0], sample[1]]), 200);
                }
            }
            other => panic!("expected Data, got {:?}", other),
        }

        // Input end-of-stream closes the output.
        drop(input_tx);
        assert!(output_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_decode_stage_forwards_fault_and_stops() {
        let stage = DecodeStage::new(
            Box::new(MockDecoder::new().with_failure_after(1)),
            Downmixer::new(),
        );
        let (input_tx, input_rx) = mpsc::channel(10);
        let (output_tx, mut output_rx) = mpsc::channel(10);

        tokio::spawn(async move {
            stage.run(input_rx, output_tx).await;
        });

        input_tx.send(stereo_chunk(2)).await.unwrap();
        input_tx.send(stereo_chunk(2)).await.unwrap();

        assert!(matches!(
            output_rx.recv().await,
            Some(PcmEvent::Data(_))
        ));
        match output_rx.recv().await {
            Some(PcmEvent::Failed(msg)) => assert!(msg.contains("decode")),
            other => panic!("expected Failed, got {:?}", other),
        }
        assert!(output_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_decode_stage_skips_empty_mono_chunks() {
        // A packet smaller than one stereo sample pair downmixes to nothing.
        let stage = DecodeStage::new(Box::new(PassthroughDecoder), Downmixer::new());
        let (input_tx, input_rx) = mpsc::channel(10);
        let (output_tx, mut output_rx) = mpsc::channel(10);

        tokio::spawn(async move {
            stage.run(input_rx, output_tx).await;
        });

        input_tx.send(vec![1, 2, 3]).await.unwrap();
        drop(input_tx);
        assert!(output_rx.recv().await.is_none());
    }
}
