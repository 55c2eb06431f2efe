//! Lobby session client for Spy.
//!
//! This module provides the client side of the lobby protocol:
//!
//! - `transport` - Connection wrapper over a host-supplied message transport
//! - `codec` - JSON wire messages and connect-time query encoding
//! - `validator` - Join code and player name checks
//! - `phase` - Session lifecycle state machine
//! - `lobby` - Local lobby view (roster, code, deck, mode, host flag)
//! - `sink` - Output for user-visible messages
//! - `endpoint` - Default server endpoints per platform
//! - `session` - The session tying all of the above together
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           LobbySession                              │
//! │                                                                     │
//! │  user intent ──▶ validator ──▶ codec::encode ──▶ Connection::connect│
//! │                                                                     │
//! │  Transport events ──▶ queue ──▶ Connection::observe                 │
//! │                                    │                                │
//! │                                    ├─ Message ──▶ codec::decode     │
//! │                                    │                 │              │
//! │                                    │                 ▼              │
//! │                                    │      SessionPhase + LobbyState │
//! │                                    │                                │
//! │                                    └─ Error / Close ──▶ Closed      │
//! │                                                                     │
//! │  user-visible text ──▶ ErrorSink                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod endpoint;
pub mod lobby;
pub mod phase;
pub mod session;
pub mod sink;
pub mod transport;
pub mod validator;

// Re-export commonly used types
pub use codec::{
    decode, decode_outbound, encode, CodecError, InboundMessage, OutboundCommand, WirePayload,
};
pub use endpoint::{Platform, DEFAULT_PORT};
pub use lobby::{LobbyState, Player, MAX_LOBBY_PLAYERS};
pub use phase::{InvalidTransition, PhaseEvent, SessionPhase};
pub use session::{
    LobbyIntent, LobbySession, SessionConfig, SessionError, HOST_PROMOTION_MESSAGE,
    TRANSPORT_FAILURE_MESSAGE,
};
pub use sink::{ErrorSink, RecordingSink};
pub use transport::{
    Connection, ConnectionStatus, MemoryTransport, NotConnectedError, Transport, TransportError,
    TransportEvent,
};
pub use validator::{
    normalize_join_code, validate_join_code, validate_name, ValidationError, JOIN_CODE_LEN,
};
