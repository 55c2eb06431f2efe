//! Spy Lobby Client
//!
//! This crate provides the lobby session client for the Spy party game.
//!
//! # Overview
//!
//! The client module provides:
//!
//! - **Session State Machine** - Idle, Awaiting, InLobby, Closed, with
//!   validated transitions and a single owned transport per session.
//!
//! - **Wire Codec** - Typed server messages and client commands over JSON,
//!   with the host/join intent folded into the connection URL.
//!
//! - **Roster Reconciliation** - The local lobby view is replaced by each
//!   server sync, and host status follows the roster and migration notices.
//!
//! # Design Principles
//!
//! 1. **The server owns the lobby** - The client never edits a roster, it
//!    only replaces its copy.
//!
//! 2. **No networking** - Sockets live behind the `Transport` trait, supplied
//!    by the host app.
//!
//! 3. **One event at a time** - Transport callbacks are queued and processed
//!    in arrival order.
//!
//! # Example
//!
//! ```rust
//! use spy_lobby::{
//!     normalize_join_code, LobbySession, MemoryTransport, Platform, RecordingSink, SessionConfig,
//!     TransportEvent,
//! };
//!
//! let transport = MemoryTransport::new();
//! let config = SessionConfig::for_platform(&Platform::Web).unwrap();
//! let mut session = LobbySession::new(config, transport.clone(), RecordingSink::new());
//!
//! // Cleanup happens where the code is typed in
//! let code = normalize_join_code("ab-cd");
//! session.join(&code, "Bob").unwrap();
//!
//! transport.push_event(TransportEvent::Open);
//! transport.push_message(r#"{"type":"error","message":"Lobby not found"}"#);
//! session.poll();
//!
//! assert!(session.phase().is_closed());
//! assert_eq!(session.sink().last(), Some("Lobby not found"));
//! ```

pub mod client;

// Re-export everything from client module at crate root
pub use client::*;
