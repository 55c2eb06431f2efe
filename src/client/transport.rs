//! Transport connection management.
//!
//! Wraps one message-based bidirectional connection (a WebSocket in the
//! shipped client) and enforces its event contract: one `Open`, any number of
//! `Message`s, at most one `Error` and at most one `Close` per attempt. An
//! `Error` does not imply a `Close` will follow.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// Connection status as seen by the lobby screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionStatus {
    /// No live connection
    Disconnected,

    /// Connect issued, waiting for the open signal
    Connecting,

    /// Open signal received, frames may be sent
    Connected,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::Disconnected
    }
}

impl ConnectionStatus {
    /// Check if frames can be sent.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if a connection attempt is in flight or open.
    pub fn is_live(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

/// Events emitted by a transport, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    Message(String),
    Error(String),
    Close,
}

/// Connection-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub reason: String,
}

impl TransportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transport failure: {}", self.reason)
    }
}

impl std::error::Error for TransportError {}

/// Returned when sending before the open signal or after close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotConnectedError;

impl fmt::Display for NotConnectedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Not connected to the game server")
    }
}

impl std::error::Error for NotConnectedError {}

/// A message-based transport supplied by the host runtime.
///
/// Every operation is fire-and-forget. Outcomes arrive later as
/// [`TransportEvent`]s, either pushed into the session by the runtime or
/// pulled through [`Transport::poll_event`].
pub trait Transport {
    /// Start opening a connection to a fully resolved URL.
    ///
    /// Only synchronous rejections (a malformed endpoint, say) are returned
    /// here; everything else is reported through an `Error` event.
    fn connect(&mut self, url: &Url) -> Result<(), TransportError>;

    /// Queue one text frame.
    fn send(&mut self, payload: &str);

    /// Close the connection.
    fn close(&mut self);

    /// Next buffered event, if the transport buffers them.
    fn poll_event(&mut self) -> Option<TransportEvent> {
        None
    }
}

/// One connection attempt over a [`Transport`].
///
/// Dropping a connection closes it.
#[derive(Debug)]
pub struct Connection<T: Transport> {
    transport: T,

    /// Current connection status
    status: ConnectionStatus,

    /// URL the attempt was made against
    url: Option<Url>,

    /// When the open signal arrived
    opened_at: Option<DateTime<Utc>>,

    /// Frames sent so far
    send_seq: u64,

    seen_open: bool,
    seen_error: bool,
    seen_close: bool,
    closed_locally: bool,
}

impl<T: Transport> Connection<T> {
    /// Wrap a transport that has not been connected yet.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            status: ConnectionStatus::Disconnected,
            url: None,
            opened_at: None,
            send_seq: 0,
            seen_open: false,
            seen_error: false,
            seen_close: false,
            closed_locally: false,
        }
    }

    /// Open the connection. A connection is attempted at most once.
    pub fn connect(&mut self, url: Url) -> Result<(), TransportError> {
        if self.url.is_some() || self.closed_locally {
            return Err(TransportError::new("connection already attempted"));
        }

        self.transport.connect(&url)?;
        self.url = Some(url);
        self.status = ConnectionStatus::Connecting;
        Ok(())
    }

    /// Record an incoming event and update status.
    ///
    /// Returns `None` for events that break the per-attempt contract
    /// (duplicate open, second error or close) or arrive after a local close.
    pub fn observe(&mut self, event: TransportEvent) -> Option<TransportEvent> {
        if self.closed_locally {
            return None;
        }

        match &event {
            TransportEvent::Open => {
                if self.seen_open || self.seen_close {
                    return None;
                }
                self.seen_open = true;
                self.status = ConnectionStatus::Connected;
                self.opened_at = Some(Utc::now());
            }
            TransportEvent::Message(_) => {
                if self.seen_close {
                    return None;
                }
            }
            TransportEvent::Error(_) => {
                if self.seen_error {
                    return None;
                }
                self.seen_error = true;
                self.status = ConnectionStatus::Disconnected;
            }
            TransportEvent::Close => {
                if self.seen_close {
                    return None;
                }
                self.seen_close = true;
                self.status = ConnectionStatus::Disconnected;
            }
        }

        Some(event)
    }

    /// Send a frame. Returns the frame's sequence number.
    pub fn send(&mut self, payload: &str) -> Result<u64, NotConnectedError> {
        if !self.status.is_connected() {
            return Err(NotConnectedError);
        }

        self.transport.send(payload);
        self.send_seq += 1;
        Ok(self.send_seq)
    }

    /// Close the connection. Idempotent; always ends `Disconnected`.
    pub fn close(&mut self) {
        if !self.closed_locally && self.url.is_some() && !self.seen_close {
            self.transport.close();
        }
        self.closed_locally = true;
        self.status = ConnectionStatus::Disconnected;
    }

    /// Pull the next buffered event from the transport.
    pub fn poll_event(&mut self) -> Option<TransportEvent> {
        if self.closed_locally {
            return None;
        }
        self.transport.poll_event()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }

    /// Number of frames sent.
    pub fn sent_count(&self) -> u64 {
        self.send_seq
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Drop for Connection<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    connected_url: Option<Url>,
    refuse_connect: Option<String>,
    sent: Vec<String>,
    close_calls: usize,
    inbox: VecDeque<TransportEvent>,
}

/// In-process transport.
///
/// Clones share one buffer, so the runtime (or a test) keeps a handle to push
/// server events and inspect what the session sent.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose `connect` is rejected synchronously.
    pub fn refusing(reason: impl Into<String>) -> Self {
        let transport = Self::default();
        transport.inner.borrow_mut().refuse_connect = Some(reason.into());
        transport
    }

    /// Buffer an event for the session to poll.
    pub fn push_event(&self, event: TransportEvent) {
        self.inner.borrow_mut().inbox.push_back(event);
    }

    /// Buffer a text frame from the server.
    pub fn push_message(&self, payload: impl Into<String>) {
        self.push_event(TransportEvent::Message(payload.into()));
    }

    pub fn connected_url(&self) -> Option<Url> {
        self.inner.borrow().connected_url.clone()
    }

    /// Frames sent so far.
    pub fn sent(&self) -> Vec<String> {
        self.inner.borrow().sent.clone()
    }

    pub fn close_calls(&self) -> usize {
        self.inner.borrow().close_calls
    }
}

impl Transport for MemoryTransport {
    fn connect(&mut self, url: &Url) -> Result<(), TransportError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(reason) = &inner.refuse_connect {
            return Err(TransportError::new(reason.clone()));
        }
        inner.connected_url = Some(url.clone());
        Ok(())
    }

    fn send(&mut self, payload: &str) {
        self.inner.borrow_mut().sent.push(payload.to_string());
    }

    fn close(&mut self) {
        self.inner.borrow_mut().close_calls += 1;
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.inner.borrow_mut().inbox.pop_front()
    }
}
