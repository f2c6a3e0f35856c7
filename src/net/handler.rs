//! Per-connection request handling.
//!
//! # Frame Lifecycle
//! ```text
//! read frame ──EOF / read error──────────────────────────▶ close
//!     │
//!     ├─ stop-processing already set ──▶ write Cancelled ─▶ close
//!     │
//!     ▼
//! spawn processing ──┬─ result first ──▶ write response ─▶ read next frame
//!                    └─ stop first ────▶ write Cancelled ─▶ close
//! ```
//!
//! # Design Decisions
//! - The handler is the only writer of its socket; one `select!` picks exactly one response per frame
//! - Processing runs in its own task so losing the race never interrupts it mid-call
//! - A detached processing task keeps a `WorkGuard`, so shutdown still waits for it
//! - An idle connection (no frame pending) is closed when stop-processing fires
//! - Frames are split as raw bytes; invalid UTF-8 is decoded lossily and left to the
//!   parser to reject, so only I/O failures and oversized lines end the connection

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio_util::codec::{AnyDelimiterCodec, FramedRead};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::net::connection::{ConnectionId, WorkGuard, WorkTracker};
use crate::observability::metrics;
use crate::processing::PaymentService;
use crate::protocol::{PaymentRequest, Response};

/// Everything a connection handler needs, shared by all handlers.
#[derive(Clone)]
pub struct ConnectionContext {
    pub service: Arc<dyn PaymentService>,
    pub stop_processing: CancellationToken,
    pub tracker: WorkTracker,
    pub max_line_length: usize,
}

/// How a single frame ended.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Processing finished; the connection stays open.
    Completed(Response),
    /// Stop-processing won the race; the connection must close after replying.
    Cancelled,
}

impl FrameOutcome {
    fn response(&self) -> Response {
        match self {
            FrameOutcome::Completed(response) => response.clone(),
            FrameOutcome::Cancelled => Response::cancelled(),
        }
    }
}

/// Why a connection was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    Eof,
    ReadError,
    WriteError,
    Cancelled,
    Idle,
}

impl CloseReason {
    fn as_str(&self) -> &'static str {
        match self {
            CloseReason::Eof => "eof",
            CloseReason::ReadError => "read_error",
            CloseReason::WriteError => "write_error",
            CloseReason::Cancelled => "cancelled",
            CloseReason::Idle => "shutdown_idle",
        }
    }
}

/// Serve one connection until EOF, an I/O failure or cancellation.
///
/// `guard` is held for the whole lifetime of the handler.
pub async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    ctx: ConnectionContext,
    guard: WorkGuard,
) {
    let id = ConnectionId::new();
    let span = tracing::debug_span!("connection", connection_id = %id, peer_addr = %peer_addr);

    async move {
        let _guard = guard;
        metrics::connection_opened();
        tracing::debug!("Handling connection");

        let reason = serve_frames(stream, &ctx).await;

        metrics::connection_closed(reason.as_str());
        tracing::debug!(reason = reason.as_str(), "Connection closed");
    }
    .instrument(span)
    .await
}

async fn serve_frames(stream: TcpStream, ctx: &ConnectionContext) -> CloseReason {
    let (reader, mut writer) = stream.into_split();
    let codec =
        AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), Vec::new(), ctx.max_line_length);
    let mut frames = FramedRead::new(reader, codec);

    let reason = loop {
        // A frame already buffered beats the stop signal so it still gets an answer.
        let next = tokio::select! {
            biased;
            next = frames.next() => next,
            _ = ctx.stop_processing.cancelled() => break CloseReason::Idle,
        };

        let line = match next {
            None => break CloseReason::Eof,
            Some(Ok(chunk)) => decode_line(&chunk),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Error reading from connection");
                break CloseReason::ReadError;
            }
        };

        let started = Instant::now();
        let outcome = process_frame(ctx, &line).await;
        let response = outcome.response();
        metrics::record_request(response.status.as_str(), started);

        if let Err(e) = write_response(&mut writer, &line, &response).await {
            tracing::error!(error = %e, request = %line, response = %response, "Failed to write response");
            break CloseReason::WriteError;
        }

        if outcome == FrameOutcome::Cancelled {
            break CloseReason::Cancelled;
        }
    };

    if let Err(e) = writer.shutdown().await {
        tracing::trace!(error = %e, "Connection already closed by peer");
    }
    reason
}

/// Strip an optional `\r` and decode, replacing invalid UTF-8.
fn decode_line(chunk: &[u8]) -> String {
    let chunk = chunk.strip_suffix(b"\r").unwrap_or(chunk);
    String::from_utf8_lossy(chunk).into_owned()
}

/// Turn one frame into its outcome, racing processing against stop-processing.
pub async fn process_frame(ctx: &ConnectionContext, line: &str) -> FrameOutcome {
    if ctx.stop_processing.is_cancelled() {
        return FrameOutcome::Cancelled;
    }

    let request = match PaymentRequest::parse(line) {
        Ok(request) => request,
        Err(e) => return FrameOutcome::Completed(Response::from(&e)),
    };

    let service = Arc::clone(&ctx.service);
    let work = ctx.tracker.track();
    let processing = tokio::spawn(
        async move {
            let _work = work;
            service.process(request.amount).await
        }
        .in_current_span(),
    );

    tokio::select! {
        biased;
        _ = ctx.stop_processing.cancelled() => {
            tracing::debug!(amount = request.amount, "Processing overtaken by shutdown");
            FrameOutcome::Cancelled
        }
        joined = processing => FrameOutcome::Completed(match joined {
            Ok(Ok(())) => Response::accepted(),
            Ok(Err(e)) => Response::from(&e),
            Err(e) => {
                tracing::error!(error = %e, amount = request.amount, "Processing task failed");
                Response::internal_error()
            }
        }),
    }
}

async fn write_response(
    writer: &mut OwnedWriteHalf,
    request: &str,
    response: &Response,
) -> std::io::Result<()> {
    writer.write_all(response.to_frame().as_bytes()).await?;
    tracing::debug!(request = %request, response = %response, "Handled request");
    Ok(())
}
