//! TCP listener.
//!
//! # Responsibilities
//! - Bind to the configured host and port
//! - Accept incoming TCP connections
//! - Distinguish fatal bind failures from transient accept failures

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address. Fatal.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to accept connection. Transient.
    #[error("failed to accept: {0}")]
    Accept(#[source] std::io::Error),
}

/// Listening socket; dropping it closes the socket.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to `host:port`. Port 0 picks an ephemeral port.
    pub async fn bind(host: &str, port: u16) -> Result<Self, ListenerError> {
        let address = format!("{host}:{port}");
        let bind_error = |source| ListenerError::Bind {
            address: address.clone(),
            source,
        };

        let inner = TcpListener::bind((host, port)).await.map_err(bind_error)?;
        let local_addr = inner.local_addr().map_err(bind_error)?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Accept a new connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        tracing::debug!(peer_addr = %addr, "Connection accepted");

        Ok((stream, addr))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let listener = Listener::bind("127.0.0.1", 0).await.unwrap();
        assert_ne!(listener.local_addr().port(), 0);

        let client = TcpStream::connect(listener.local_addr());
        let (accepted, client) = tokio::join!(listener.accept(), client);
        let (_, peer) = accepted.unwrap();
        assert_eq!(peer, client.unwrap().local_addr().unwrap());
    }

    #[tokio::test]
    async fn bind_conflict_is_fatal_error() {
        let first = Listener::bind("127.0.0.1", 0).await.unwrap();
        let port = first.local_addr().port();

        let err = Listener::bind("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }), "{err}");
        assert!(err.to_string().contains(&port.to_string()));
    }
}
