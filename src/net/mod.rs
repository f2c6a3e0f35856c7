//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, accept)
//!     → transport.rs (accept loop, shutdown state machine)
//!     → handler.rs (one task per connection: read frame, process, reply)
//!     → connection.rs (ids, outstanding-work tracking)
//!
//! Transport States:
//!     Idle → Listening → Draining → Stopped
//! ```
//!
//! # Design Decisions
//! - The listener is dropped before `Draining` is published, so late connects are refused
//! - Each connection is owned by exactly one task; the transport never touches its socket
//! - Shutdown waits for outstanding work instead of aborting tasks

pub mod connection;
pub mod handler;
pub mod listener;
pub mod transport;

pub use connection::{ConnectionId, WorkGuard, WorkTracker};
pub use listener::{Listener, ListenerError};
pub use transport::{Transport, TransportError, TransportState};
