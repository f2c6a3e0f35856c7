//! Transport state machine.
//!
//! # States
//! - Idle: constructed, nothing bound
//! - Listening: socket bound, accept loop running
//! - Draining: listener closed, in-flight requests get the grace period
//! - Stopped: stop-processing broadcast and all outstanding work finished
//!
//! # State Transitions
//! ```text
//! Idle → Listening: bind() succeeds (bind failure is returned, state stays Idle)
//! Listening → Draining: external shutdown token cancelled, listener dropped
//! Draining → Stopped: grace timer fired, stop-processing broadcast, work drained to zero
//! ```
//!
//! # Design Decisions
//! - One grace timer for the whole transport, owned by `serve`
//! - `Draining` is published only after the accept task has exited, so any
//!   connect attempt that observes it is refused by the OS
//! - Accept errors are logged and the loop continues

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::lifecycle::Shutdown;
use crate::net::connection::WorkTracker;
use crate::net::handler::{handle_connection, ConnectionContext};
use crate::net::listener::{Listener, ListenerError};
use crate::observability::metrics;
use crate::processing::PaymentService;
use crate::time::Clock;

/// Lifecycle state of a [`Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Listening,
    Draining,
    Stopped,
}

/// Errors surfaced to the caller of [`Transport::bind`] / [`Transport::serve`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Bind(#[from] ListenerError),

    #[error("transport cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: TransportState,
    },
}

/// Line-protocol TCP server with two-phase graceful shutdown.
pub struct Transport {
    config: ServerConfig,
    service: Arc<dyn PaymentService>,
    clock: Arc<dyn Clock>,
    listener: Option<Listener>,
    shutdown: Shutdown,
    tracker: WorkTracker,
    state: watch::Sender<TransportState>,
}

impl Transport {
    pub fn new(config: ServerConfig, service: Arc<dyn PaymentService>, clock: Arc<dyn Clock>) -> Self {
        let (state, _) = watch::channel(TransportState::Idle);
        Self {
            config,
            service,
            clock,
            listener: None,
            shutdown: Shutdown::new(),
            tracker: WorkTracker::new(),
            state,
        }
    }

    pub fn state(&self) -> TransportState {
        *self.state.borrow()
    }

    /// Observe state transitions, e.g. to wait for `Draining`.
    pub fn subscribe_state(&self) -> watch::Receiver<TransportState> {
        self.state.subscribe()
    }

    /// Bound address, once listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(Listener::local_addr)
    }

    /// Shared counter of live handlers and in-flight processing calls.
    pub fn tracker(&self) -> &WorkTracker {
        &self.tracker
    }

    /// Bind the configured endpoint: `Idle → Listening`.
    pub async fn bind(&mut self) -> Result<SocketAddr, TransportError> {
        let state = self.state();
        if state != TransportState::Idle {
            return Err(TransportError::InvalidState {
                operation: "bind",
                state,
            });
        }

        let listener = Listener::bind(&self.config.host, self.config.port).await?;
        let addr = listener.local_addr();
        self.listener = Some(listener);
        self.set_state(TransportState::Listening);

        tracing::info!(address = %addr, "Server started");
        Ok(addr)
    }

    /// Bind (if still idle) and serve until `shutdown` is cancelled and the
    /// drain completes.
    pub async fn start(mut self, shutdown: CancellationToken) -> Result<(), TransportError> {
        if self.state() == TransportState::Idle {
            self.bind().await?;
        }
        self.serve(shutdown).await
    }

    /// Run the accept loop and the shutdown sequence: `Listening → Draining → Stopped`.
    pub async fn serve(mut self, shutdown: CancellationToken) -> Result<(), TransportError> {
        let Some(listener) = self.listener.take() else {
            return Err(TransportError::InvalidState {
                operation: "serve",
                state: self.state(),
            });
        };

        let ctx = ConnectionContext {
            service: Arc::clone(&self.service),
            stop_processing: self.shutdown.processing_token(),
            tracker: self.tracker.clone(),
            max_line_length: self.config.max_line_length,
        };
        let accept_task = tokio::spawn(accept_loop(listener, self.shutdown.accepting_token(), ctx));

        shutdown.cancelled().await;
        tracing::info!("Server graceful shutdown started");

        self.shutdown.stop_accepting();
        if let Err(e) = accept_task.await {
            tracing::error!(error = %e, "Accept loop terminated abnormally");
        }
        self.set_state(TransportState::Draining);

        self.clock.sleep(self.config.graceful_shutdown_timeout).await;

        tracing::info!(
            outstanding = self.tracker.active(),
            "Grace period elapsed, cancelling outstanding requests"
        );
        self.shutdown.stop_processing();
        self.tracker.wait_idle().await;

        self.set_state(TransportState::Stopped);
        tracing::info!("Server stopped");
        Ok(())
    }

    fn set_state(&self, state: TransportState) {
        self.state.send_replace(state);
        tracing::debug!(state = ?state, "Transport state changed");
    }
}

/// Accept until told to stop. The listener is dropped, closing the socket,
/// when this returns.
async fn accept_loop(listener: Listener, stop_accepting: CancellationToken, ctx: ConnectionContext) {
    loop {
        let accepted = tokio::select! {
            biased;
            _ = stop_accepting.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, peer_addr)) => {
                let guard = ctx.tracker.track();
                tokio::spawn(handle_connection(stream, peer_addr, ctx.clone(), guard));
            }
            Err(e) => {
                metrics::record_accept_error();
                tracing::error!(error = %e, "Failed to accept connection");
            }
        }
    }

    drop(listener);
    tracing::info!("Listener closed, no longer accepting connections");
}
