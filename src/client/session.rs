//! Lobby session state machine.
//!
//! A [`LobbySession`] owns exactly one transport for its whole life: it opens
//! it on host/join, reconciles server syncs into [`LobbyState`], and releases
//! it on leave, transport failure, or a server-reported error. Transport
//! callbacks are queued and processed one at a time in arrival order.
//!
//! # Example
//!
//! ```rust
//! use spy_lobby::client::{
//!     LobbySession, MemoryTransport, RecordingSink, SessionConfig, SessionPhase, TransportEvent,
//! };
//! use url::Url;
//!
//! let transport = MemoryTransport::new();
//! let config = SessionConfig::new(Url::parse("ws://localhost:3000").unwrap());
//! let mut session = LobbySession::new(config, transport.clone(), RecordingSink::new());
//!
//! session.host("Alice").unwrap();
//! transport.push_event(TransportEvent::Open);
//! transport.push_message(
//!     r#"{"type":"playerList","partyCode":"ABCD","players":[{"name":"Alice","isHost":true}]}"#,
//! );
//! session.poll();
//!
//! assert_eq!(session.phase(), SessionPhase::InLobby);
//! assert!(session.state().local_is_host);
//! session.update_deck("classic").unwrap();
//! ```

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, info, warn};
use url::Url;

use super::codec::{self, InboundMessage, OutboundCommand, WirePayload};
use super::endpoint::Platform;
use super::lobby::{LobbyState, MAX_LOBBY_PLAYERS};
use super::phase::{InvalidTransition, PhaseEvent, SessionPhase};
use super::sink::ErrorSink;
use super::transport::{
    Connection, ConnectionStatus, NotConnectedError, Transport, TransportError, TransportEvent,
};
use super::validator::{self, ValidationError};

/// Shown for any connection-level failure.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to connect to the game server";

/// Shown when the server promotes the local player.
pub const HOST_PROMOTION_MESSAGE: &str = "You are now the host!";

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Resolved lobby server base URL
    pub endpoint: Url,
}

impl SessionConfig {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    /// Configuration using the platform's default endpoint.
    pub fn for_platform(platform: &Platform) -> Result<Self, url::ParseError> {
        Ok(Self::new(platform.endpoint()?))
    }
}

/// What the lobby screen was opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyIntent {
    Host,
    Join { code: String },
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Bad user input; nothing was sent
    Validation(ValidationError),

    /// The transport rejected the connection
    Transport(TransportError),

    /// No open connection
    NotConnected(NotConnectedError),

    /// Deck and mode changes are reserved to the host
    NotAuthorized,

    /// Operation not valid in the current phase
    InvalidTransition(InvalidTransition),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{}", err),
            Self::Transport(err) => write!(f, "{}", err),
            Self::NotConnected(err) => write!(f, "{}", err),
            Self::NotAuthorized => write!(f, "Only the host can change lobby settings"),
            Self::InvalidTransition(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

impl From<NotConnectedError> for SessionError {
    fn from(err: NotConnectedError) -> Self {
        Self::NotConnected(err)
    }
}

impl From<InvalidTransition> for SessionError {
    fn from(err: InvalidTransition) -> Self {
        Self::InvalidTransition(err)
    }
}

/// One lobby session.
///
/// Sessions share nothing; a closed session stays closed and is replaced by
/// constructing a new one.
#[derive(Debug)]
pub struct LobbySession<T: Transport, S: ErrorSink> {
    config: SessionConfig,
    phase: SessionPhase,
    state: LobbyState,

    /// Name sent with the host/join intent
    local_name: Option<String>,

    /// `None` once released
    connection: Option<Connection<T>>,

    /// Transport events not yet processed
    queue: VecDeque<TransportEvent>,

    sink: S,
}

impl<T: Transport, S: ErrorSink> LobbySession<T, S> {
    /// Create an idle session around an unconnected transport.
    pub fn new(config: SessionConfig, transport: T, sink: S) -> Self {
        Self {
            config,
            phase: SessionPhase::Idle,
            state: LobbyState::new(),
            local_name: None,
            connection: Some(Connection::new(transport)),
            queue: VecDeque::new(),
            sink,
        }
    }

    /// Host a new lobby.
    pub fn host(&mut self, player_name: &str) -> Result<(), SessionError> {
        self.open(LobbyIntent::Host, player_name)
    }

    /// Join an existing lobby by code.
    pub fn join(&mut self, code: &str, player_name: &str) -> Result<(), SessionError> {
        self.open(
            LobbyIntent::Join {
                code: code.to_string(),
            },
            player_name,
        )
    }

    /// Validate the intent and open the connection carrying it.
    ///
    /// Validation failures are reported to the sink and leave the session
    /// idle. A rejected connect is terminal.
    pub fn open(&mut self, intent: LobbyIntent, player_name: &str) -> Result<(), SessionError> {
        let next = self.phase.transition(PhaseEvent::Connect)?;

        let name = player_name.trim();
        let command = match Self::command_for(intent, name) {
            Ok(command) => command,
            Err(err) => {
                debug!(%err, "rejected lobby input");
                self.sink.report(&err.to_string());
                return Err(err.into());
            }
        };

        let url = encode_connect_url(&command, &self.config.endpoint)?;
        let connection = self.connection.as_mut().ok_or(NotConnectedError)?;
        if let Err(err) = connection.connect(url) {
            warn!(reason = %err.reason, "connect rejected");
            self.fail_transport();
            return Err(err.into());
        }

        info!(player = %name, "connecting to lobby server");
        self.local_name = Some(name.to_string());
        self.phase = next;
        self.state.connection_status = ConnectionStatus::Connecting;
        Ok(())
    }

    fn command_for(
        intent: LobbyIntent,
        player_name: &str,
    ) -> Result<OutboundCommand, ValidationError> {
        let player_name = player_name.to_string();
        match intent {
            LobbyIntent::Host => {
                validator::validate_name(&player_name)?;
                Ok(OutboundCommand::Host { player_name })
            }
            LobbyIntent::Join { code } => {
                validator::validate_join_code(&code)?;
                validator::validate_name(&player_name)?;
                Ok(OutboundCommand::Join { code, player_name })
            }
        }
    }

    /// Ask the server to switch decks. Host only.
    pub fn update_deck(&mut self, deck: impl Into<String>) -> Result<u64, SessionError> {
        self.send_frame(OutboundCommand::UpdateDeck { deck: deck.into() })
    }

    /// Ask the server to switch game modes. Host only.
    pub fn update_mode(&mut self, mode: impl Into<String>) -> Result<u64, SessionError> {
        self.send_frame(OutboundCommand::UpdateMode { mode: mode.into() })
    }

    fn send_frame(&mut self, command: OutboundCommand) -> Result<u64, SessionError> {
        let frame = match codec::encode(&command) {
            WirePayload::Frame(frame) => frame,
            // Connect intents only travel in the connection URL
            WirePayload::Query(_) => return Err(NotConnectedError.into()),
        };

        if !self.phase.is_live() {
            return Err(NotConnectedError.into());
        }
        let connection = self.connection.as_mut().ok_or(NotConnectedError)?;
        if !connection.status().is_connected() {
            return Err(NotConnectedError.into());
        }
        if !self.state.local_is_host {
            warn!(?command, "refusing host-only command");
            return Err(SessionError::NotAuthorized);
        }

        let seq = connection.send(&frame)?;
        debug!(seq, %frame, "sent frame");
        Ok(seq)
    }

    /// Leave the lobby: release the transport and forget the lobby.
    pub fn leave(&mut self) {
        if !self.phase.is_closed() {
            info!(code = %self.state.code, "leaving lobby");
        }
        self.shut_down();
        self.state.reset();
    }

    /// Queue a transport event without processing it.
    pub fn enqueue(&mut self, event: TransportEvent) {
        self.queue.push_back(event);
    }

    /// Process queued events in order. Returns how many were processed.
    pub fn process_events(&mut self) -> usize {
        let mut processed = 0;
        while let Some(event) = self.queue.pop_front() {
            self.dispatch(event);
            processed += 1;
        }
        processed
    }

    /// Queue one event and process the queue.
    pub fn handle_event(&mut self, event: TransportEvent) {
        self.enqueue(event);
        self.process_events();
    }

    /// Drain the transport's buffered events, then process the queue.
    pub fn poll(&mut self) -> usize {
        while let Some(event) = self.connection.as_mut().and_then(Connection::poll_event) {
            self.queue.push_back(event);
        }
        self.process_events()
    }

    fn dispatch(&mut self, event: TransportEvent) {
        if self.phase.is_closed() {
            debug!(?event, "session closed, ignoring transport event");
            return;
        }
        if self.phase == SessionPhase::Idle
            && matches!(event, TransportEvent::Open | TransportEvent::Message(_))
        {
            debug!(?event, "no connection requested, ignoring transport event");
            return;
        }

        let Some(connection) = self.connection.as_mut() else {
            return;
        };
        let Some(event) = connection.observe(event) else {
            debug!("dropping out-of-contract transport event");
            return;
        };
        let status = connection.status();

        match event {
            TransportEvent::Open => {
                info!("connection open");
                self.state.connection_status = status;
            }
            TransportEvent::Message(raw) => match codec::decode(&raw) {
                Ok(message) => self.apply_message(message),
                Err(err) => warn!(%err, "dropping inbound frame"),
            },
            TransportEvent::Error(reason) => {
                warn!(%reason, "transport error");
                self.fail_transport();
            }
            TransportEvent::Close => {
                info!("connection closed");
                self.shut_down();
            }
        }
    }

    /// Apply a decoded server message.
    pub fn apply_message(&mut self, message: InboundMessage) {
        if !self.phase.is_live() {
            debug!(phase = %self.phase, ?message, "ignoring message outside a live session");
            return;
        }

        match message {
            InboundMessage::PlayerList {
                party_code,
                players,
                selected_deck,
                selected_mode,
            } => {
                if validator::validate_join_code(&party_code).is_err() {
                    warn!(%party_code, "dropping roster with malformed lobby code");
                    return;
                }
                if players.len() > MAX_LOBBY_PLAYERS {
                    warn!(count = players.len(), "roster exceeds lobby capacity");
                }
                if let Err(err) = self.phase.apply_mut(PhaseEvent::RosterReceived) {
                    debug!(%err, "dropping roster");
                    return;
                }

                self.state.apply_roster(
                    party_code,
                    players,
                    selected_deck,
                    selected_mode,
                    self.local_name.as_deref(),
                );
                debug!(
                    code = %self.state.code,
                    players = self.state.player_count(),
                    local_is_host = self.state.local_is_host,
                    "roster synced"
                );
            }
            InboundMessage::NewHost { host_name } => {
                if self.local_name.as_deref() == Some(host_name.as_str()) {
                    info!(%host_name, "promoted to host");
                    self.state.local_is_host = true;
                    self.sink.report(HOST_PROMOTION_MESSAGE);
                } else {
                    debug!(%host_name, "host moved to another player");
                }
            }
            InboundMessage::Error { message } => {
                warn!(%message, "server reported error");
                self.sink.report(&message);
                self.shut_down();
            }
        }
    }

    fn fail_transport(&mut self) {
        self.sink.report(TRANSPORT_FAILURE_MESSAGE);
        self.shut_down();
    }

    /// Release the transport and close the session. Keeps the last roster.
    fn shut_down(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close();
        }
        if !self.phase.is_closed() {
            self.phase = SessionPhase::Closed;
            debug!("session closed");
        }
        self.state.connection_status = ConnectionStatus::Disconnected;
        self.queue.clear();
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> &LobbyState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The connection, until it is released.
    pub fn connection(&self) -> Option<&Connection<T>> {
        self.connection.as_ref()
    }
}

fn encode_connect_url(command: &OutboundCommand, endpoint: &Url) -> Result<Url, TransportError> {
    codec::encode(command)
        .into_connect_url(endpoint)
        .ok_or_else(|| TransportError::new("command cannot open a connection"))
}
