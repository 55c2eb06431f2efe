//! Local view of a lobby.
//!
//! The server owns the roster. The client only ever replaces its copy
//! wholesale when a roster sync arrives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transport::ConnectionStatus;

/// Maximum players per lobby (enforced server-side).
pub const MAX_LOBBY_PLAYERS: usize = 8;

/// A roster entry. The name doubles as the player's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub is_host: bool,
}

impl Player {
    pub fn new(name: impl Into<String>, is_host: bool) -> Self {
        Self {
            name: name.into(),
            is_host,
        }
    }
}

/// Lobby state as displayed by the lobby screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LobbyState {
    /// Four uppercase letters, or empty before a lobby exists
    pub code: String,

    /// Server-ordered roster
    pub players: Vec<Player>,

    pub selected_deck: Option<String>,

    pub selected_mode: Option<String>,

    /// Whether the local player holds host privilege
    pub local_is_host: bool,

    pub connection_status: ConnectionStatus,

    /// When the last roster sync was applied
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl LobbyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a roster sync.
    ///
    /// Code and players are replaced; deck and mode only when present. Host
    /// status is recomputed from the new roster.
    pub fn apply_roster(
        &mut self,
        code: String,
        players: Vec<Player>,
        selected_deck: Option<String>,
        selected_mode: Option<String>,
        local_name: Option<&str>,
    ) {
        self.code = code;
        self.players = players;
        if selected_deck.is_some() {
            self.selected_deck = selected_deck;
        }
        if selected_mode.is_some() {
            self.selected_mode = selected_mode;
        }
        self.local_is_host = local_name.is_some_and(|name| self.is_host_name(name));
        self.last_synced_at = Some(Utc::now());
    }

    /// Check the roster's host flag for a player. `false` if absent.
    pub fn is_host_name(&self, name: &str) -> bool {
        self.players
            .iter()
            .find(|p| p.name == name)
            .is_some_and(|p| p.is_host)
    }

    /// The first roster entry flagged as host.
    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn has_lobby(&self) -> bool {
        !self.code.is_empty()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_LOBBY_PLAYERS
    }

    /// Roster header shown above the player list.
    pub fn player_count_label(&self) -> String {
        format!(
            "Players in lobby: {}/{}",
            self.players.len(),
            MAX_LOBBY_PLAYERS
        )
    }

    /// Back to a fresh, lobby-less state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Convert to JSON for the view layer.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code,
            "players": self.players,
            "selectedDeck": self.selected_deck,
            "selectedMode": self.selected_mode,
            "localIsHost": self.local_is_host,
            "connectionStatus": self.connection_status,
            "lastSyncedAt": self.last_synced_at,
        })
    }
}
