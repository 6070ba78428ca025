//! Server-sent event plumbing shared by the vendor adapters
//!
//! Vendors push newline-delimited `data:` lines. Network reads may split a
//! line (or a UTF-8 sequence) anywhere, so bytes are buffered until a full
//! line is available.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, trace, warn};

use super::http_client::ByteStream;
use crate::domain::{DomainError, LlmStream, ProviderId, StreamChunk};

/// Accumulates raw bytes and yields complete `data:` payloads
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network read; returns the payloads of every line completed by it
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut payloads = Vec::new();

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();

            if let Some(payload) = data_payload(&line) {
                payloads.push(payload);
            }
        }

        payloads
    }

    /// Flush a trailing line the vendor did not terminate with a newline
    pub fn finish(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.pending);
        data_payload(&line)
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data).trim();

    if data.is_empty() {
        None
    } else {
        Some(data.to_string())
    }
}

/// What one vendor payload means for the unified stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    pub delta: Option<String>,
    pub done: bool,
    /// Vendor error reported inside an otherwise successful response
    pub error: Option<String>,
}

impl SseEvent {
    pub fn delta(text: impl Into<String>) -> Self {
        Self {
            delta: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn done() -> Self {
        Self {
            done: true,
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Maps one `data:` payload to an event, or `None` to skip it
pub type PayloadParser = fn(&str) -> Option<SseEvent>;

/// Turn a vendor byte stream into a chunk stream.
///
/// A background task reads the body, hands each payload to `parse`, and
/// pushes chunks into a bounded channel of `capacity`. `parse` returns
/// `None` for payloads to skip (malformed or irrelevant). Exactly one
/// `done` chunk ends a successful stream, whether or not the vendor sent a
/// stop signal. A transport error or a vendor error event ends the stream
/// with that error instead.
/// Dropping the returned stream abandons the upstream read.
pub fn spawn_chunk_stream(
    provider: ProviderId,
    bytes: ByteStream,
    capacity: usize,
    parse: PayloadParser,
) -> LlmStream {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    tokio::spawn(pump(provider, bytes, tx, parse));

    Box::pin(ReceiverStream::new(rx))
}

enum Flow {
    Continue,
    Finished,
    Abandoned,
}

async fn pump(
    provider: ProviderId,
    mut bytes: ByteStream,
    tx: mpsc::Sender<Result<StreamChunk, DomainError>>,
    parse: PayloadParser,
) {
    let mut lines = SseLineBuffer::new();

    loop {
        let next = tokio::select! {
            _ = tx.closed() => {
                debug!(provider = %provider, "Stream consumer dropped, abandoning upstream read");
                return;
            }
            next = bytes.next() => next,
        };

        let (payloads, ended) = match next {
            Some(Ok(chunk)) => (lines.push(&chunk), false),
            Some(Err(e)) => {
                let _ = tx.send(Err(e)).await;
                return;
            }
            None => (lines.finish().into_iter().collect(), true),
        };

        match forward(provider, payloads, &tx, parse).await {
            Flow::Continue => {}
            Flow::Finished | Flow::Abandoned => return,
        }

        if ended {
            break;
        }
    }

    // Body ended without a stop signal
    let _ = tx.send(Ok(StreamChunk::done())).await;
}

async fn forward(
    provider: ProviderId,
    payloads: Vec<String>,
    tx: &mpsc::Sender<Result<StreamChunk, DomainError>>,
    parse: PayloadParser,
) -> Flow {
    for payload in payloads {
        let Some(event) = parse(&payload) else {
            trace!(provider = %provider, "Skipping unrecognized stream payload");
            continue;
        };

        if let Some(message) = event.error {
            warn!(provider = %provider, error = %message, "Vendor reported an error mid-stream");
            let _ = tx
                .send(Err(DomainError::provider(provider.as_str(), message)))
                .await;
            return Flow::Finished;
        }

        if let Some(delta) = event.delta.filter(|d| !d.is_empty()) {
            if tx.send(Ok(StreamChunk::delta(delta))).await.is_err() {
                return Flow::Abandoned;
            }
        }

        if event.done {
            let _ = tx.send(Ok(StreamChunk::done())).await;
            return Flow::Finished;
        }
    }

    Flow::Continue
}
