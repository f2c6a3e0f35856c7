//! Shared harness for transport integration tests.
//!
//! Every `TestServer` binds its own ephemeral port and owns its clock,
//! shutdown token and scripted service; nothing is shared between tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use payment_simulator::config::ServerConfig;
use payment_simulator::net::{Transport, TransportError, TransportState, WorkTracker};
use payment_simulator::time::VirtualClock;
use payment_simulator::{PaymentService, ServiceError};

/// Upper bound for any single wait in these tests.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Grace period configured on every test server.
pub const GRACE: Duration = Duration::from_secs(1);

/// Payment service whose behaviour is scripted per amount.
pub struct ScriptedService {
    failures: HashMap<i64, String>,
    blocking: HashSet<i64>,
    released: watch::Sender<bool>,
    calls: watch::Sender<Vec<i64>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        let (released, _) = watch::channel(false);
        let (calls, _) = watch::channel(Vec::new());
        Self {
            failures: HashMap::new(),
            blocking: HashSet::new(),
            released,
            calls,
        }
    }

    /// `amount` fails with `message` as a downstream error.
    pub fn failing(mut self, amount: i64, message: &str) -> Self {
        self.failures.insert(amount, message.to_string());
        self
    }

    /// `amount` blocks until [`ScriptedService::release`] is called.
    pub fn blocking(mut self, amount: i64) -> Self {
        self.blocking.insert(amount);
        self
    }

    /// Let every blocked call, current and future, complete.
    pub fn release(&self) {
        self.released.send_replace(true);
    }

    /// Amounts received so far, in call order.
    pub fn calls(&self) -> Vec<i64> {
        self.calls.borrow().clone()
    }

    /// Wait until at least `count` calls have started.
    pub async fn wait_for_calls(&self, count: usize) {
        let mut rx = self.calls.subscribe();
        tokio::time::timeout(STEP_TIMEOUT, rx.wait_for(|calls| calls.len() >= count))
            .await
            .expect("service was not called in time")
            .expect("calls channel closed");
    }
}

#[async_trait]
impl PaymentService for ScriptedService {
    async fn process(&self, amount: i64) -> Result<(), ServiceError> {
        self.calls.send_modify(|calls| calls.push(amount));

        if self.blocking.contains(&amount) {
            let mut released = self.released.subscribe();
            let _ = released.wait_for(|released| *released).await;
        }

        match self.failures.get(&amount) {
            Some(message) => Err(ServiceError::Downstream(message.clone())),
            None => Ok(()),
        }
    }
}

/// A transport bound on 127.0.0.1 with a virtual clock.
pub struct TestServer {
    pub addr: SocketAddr,
    pub clock: Arc<VirtualClock>,
    pub shutdown: CancellationToken,
    pub state: watch::Receiver<TransportState>,
    pub tracker: WorkTracker,
    handle: JoinHandle<Result<(), TransportError>>,
}

impl TestServer {
    pub async fn start(service: Arc<dyn PaymentService>) -> Self {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            graceful_shutdown_timeout: GRACE,
            ..ServerConfig::default()
        };
        let clock = Arc::new(VirtualClock::new());

        let mut transport = Transport::new(config, service, clock.clone());
        let addr = transport.bind().await.expect("bind test server");
        let state = transport.subscribe_state();
        let tracker = transport.tracker().clone();

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(transport.serve(shutdown.clone()));

        Self {
            addr,
            clock,
            shutdown,
            state,
            tracker,
            handle,
        }
    }

    pub async fn connect(&self) -> Client {
        Client::connect(self.addr).await
    }

    /// Cancel the shutdown token and wait until the listener is closed.
    pub async fn begin_shutdown(&mut self) {
        self.shutdown.cancel();
        self.wait_for_state(TransportState::Draining).await;
    }

    /// Let the grace timer fire.
    pub async fn expire_grace(&self) {
        tokio::time::timeout(STEP_TIMEOUT, self.clock.wait_for_sleepers(1))
            .await
            .expect("grace timer was never armed");
        self.clock.advance(GRACE);
    }

    pub async fn wait_for_state(&mut self, expected: TransportState) {
        tokio::time::timeout(STEP_TIMEOUT, self.state.wait_for(|s| *s == expected))
            .await
            .unwrap_or_else(|_| panic!("transport never reached {expected:?}"))
            .expect("transport dropped");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for `serve` to return.
    pub async fn join(self) -> Result<(), TransportError> {
        tokio::time::timeout(STEP_TIMEOUT, self.handle)
            .await
            .expect("transport did not stop in time")
            .expect("transport task panicked")
    }
}

/// Line-oriented client connection.
pub struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect to test server");
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    /// Send one frame; `\n` is appended.
    pub async fn send(&mut self, frame: &str) {
        self.writer
            .write_all(format!("{frame}\n").as_bytes())
            .await
            .expect("write frame");
    }

    /// Send bytes as-is, terminator included.
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.expect("write bytes");
    }

    /// Next response line, `None` once the server closed the connection.
    pub async fn recv(&mut self) -> Option<String> {
        tokio::time::timeout(STEP_TIMEOUT, self.lines.next_line())
            .await
            .expect("no response in time")
            .unwrap_or(None)
    }

    /// Send a frame and return its response line.
    pub async fn request(&mut self, frame: &str) -> String {
        self.send(frame).await;
        self.recv().await.expect("connection closed before response")
    }
}
