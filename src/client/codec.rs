//! Wire codec for the lobby protocol.
//!
//! Server frames and post-connect client frames are JSON objects discriminated
//! by a `type` field. The `Host` and `Join` intents are not frames: they ride
//! in the query string of the connection URL.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::lobby::Player;

/// `type` tags the server may send.
const INBOUND_TYPES: [&str; 3] = ["playerList", "newHost", "error"];

/// `type` tags the client sends after connecting.
const FRAME_TYPES: [&str; 2] = ["updateDeck", "updateMode"];

/// Server to client messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Full roster sync
    #[serde(rename_all = "camelCase")]
    PlayerList {
        party_code: String,
        players: Vec<Player>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selected_deck: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selected_mode: Option<String>,
    },

    /// Host migration announcement
    #[serde(rename_all = "camelCase")]
    NewHost { host_name: String },

    /// Server-reported error, always session-ending
    Error { message: String },
}

/// Client to server commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundCommand {
    #[serde(rename_all = "camelCase")]
    Join { code: String, player_name: String },
    #[serde(rename_all = "camelCase")]
    Host { player_name: String },
    UpdateDeck { deck: String },
    UpdateMode { mode: String },
}

impl OutboundCommand {
    /// Check if this command is carried by the connection URL.
    pub fn opens_connection(&self) -> bool {
        matches!(self, Self::Join { .. } | Self::Host { .. })
    }
}

/// An encoded command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WirePayload {
    /// Query parameters for the connection URL, in order
    Query(Vec<(&'static str, String)>),

    /// A JSON text frame
    Frame(String),
}

impl WirePayload {
    /// Append the query parameters to `base`. `None` for frames.
    pub fn into_connect_url(self, base: &Url) -> Option<Url> {
        match self {
            Self::Query(pairs) => {
                let mut url = base.clone();
                {
                    let mut query = url.query_pairs_mut();
                    for (key, value) in &pairs {
                        query.append_pair(key, value);
                    }
                }
                Some(url)
            }
            Self::Frame(_) => None,
        }
    }
}

/// Codec errors. Both kinds are absorbed by the session, never shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Not parseable, or the wrong shape for its tag
    Malformed(String),

    /// Well-formed but with a tag this client does not know
    UnknownType(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(reason) => write!(f, "Malformed message: {}", reason),
            Self::UnknownType(tag) => write!(f, "Unknown message type: {}", tag),
        }
    }
}

impl std::error::Error for CodecError {}

/// Decode a server frame.
pub fn decode(raw: &str) -> Result<InboundMessage, CodecError> {
    decode_tagged(raw, &INBOUND_TYPES)
}

/// Decode a post-connect client frame (the server's view of [`encode`]).
pub fn decode_outbound(raw: &str) -> Result<OutboundCommand, CodecError> {
    decode_tagged(raw, &FRAME_TYPES)
}

fn decode_tagged<M>(raw: &str, known: &[&str]) -> Result<M, CodecError>
where
    M: serde::de::DeserializeOwned,
{
    let value: Value =
        serde_json::from_str(raw).map_err(|e| CodecError::Malformed(e.to_string()))?;

    match value.get("type").and_then(Value::as_str) {
        Some(tag) if known.contains(&tag) => {}
        Some(tag) => return Err(CodecError::UnknownType(tag.to_string())),
        None => return Err(CodecError::Malformed("missing type tag".to_string())),
    }

    serde_json::from_value(value).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Encode a command.
pub fn encode(command: &OutboundCommand) -> WirePayload {
    match command {
        OutboundCommand::Host { player_name } => {
            WirePayload::Query(vec![("playerName", player_name.clone())])
        }
        OutboundCommand::Join { code, player_name } => WirePayload::Query(vec![
            ("partyCode", code.clone()),
            ("playerName", player_name.clone()),
        ]),
        OutboundCommand::UpdateDeck { deck } => WirePayload::Frame(
            serde_json::json!({ "type": "updateDeck", "deck": deck }).to_string(),
        ),
        OutboundCommand::UpdateMode { mode } => WirePayload::Frame(
            serde_json::json!({ "type": "updateMode", "mode": mode }).to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("ws://localhost:3000").unwrap()
    }

    #[test]
    fn test_decode_player_list() {
        let raw = r#"{
            "type": "playerList",
            "partyCode": "ABCD",
            "players": [
                { "name": "Alice", "isHost": true },
                { "name": "Bob", "isHost": false }
            ],
            "selectedDeck": "classic"
        }"#;

        let msg = decode(raw).unwrap();
        assert_eq!(
            msg,
            InboundMessage::PlayerList {
                party_code: "ABCD".to_string(),
                players: vec![
                    Player::new("Alice", true),
                    Player::new("Bob", false),
                ],
                selected_deck: Some("classic".to_string()),
                selected_mode: None,
            }
        );
    }

    #[test]
    fn test_decode_empty_roster() {
        let msg = decode(r#"{"type":"playerList","partyCode":"WXYZ","players":[]}"#).unwrap();
        match msg {
            InboundMessage::PlayerList { players, .. } => assert!(players.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_new_host_and_error() {
        assert_eq!(
            decode(r#"{"type":"newHost","hostName":"Bob"}"#).unwrap(),
            InboundMessage::NewHost {
                host_name: "Bob".to_string()
            }
        );
        assert_eq!(
            decode(r#"{"type":"error","message":"Lobby is full"}"#).unwrap(),
            InboundMessage::Error {
                message: "Lobby is full".to_string()
            }
        );
    }

    #[test]
    fn test_decode_malformed() {
        for raw in [
            "not json",
            "[1, 2, 3]",
            r#"{"partyCode":"ABCD"}"#,
            r#"{"type": 7}"#,
            r#"{"type":"playerList","partyCode":"ABCD"}"#,
            r#"{"type":"newHost"}"#,
        ] {
            assert!(
                matches!(decode(raw), Err(CodecError::Malformed(_))),
                "expected malformed for {}",
                raw
            );
        }
    }

    #[test]
    fn test_decode_unknown_type() {
        assert_eq!(
            decode(r#"{"type":"gameStarted","round":1}"#),
            Err(CodecError::UnknownType("gameStarted".to_string()))
        );
        // Client frames are not server messages
        assert_eq!(
            decode(r#"{"type":"updateDeck","deck":"classic"}"#),
            Err(CodecError::UnknownType("updateDeck".to_string()))
        );
    }

    #[test]
    fn test_update_deck_round_trip() {
        let command = OutboundCommand::UpdateDeck {
            deck: "classic".to_string(),
        };

        let WirePayload::Frame(raw) = encode(&command) else {
            panic!("updateDeck must encode as a frame");
        };
        assert_eq!(decode_outbound(&raw).unwrap(), command);
    }

    #[test]
    fn test_update_mode_wire_shape() {
        let payload = encode(&OutboundCommand::UpdateMode {
            mode: "timed".to_string(),
        });
        let WirePayload::Frame(raw) = payload else {
            panic!("updateMode must encode as a frame");
        };

        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "updateMode", "mode": "timed" }));
    }

    #[test]
    fn test_decode_outbound_rejects_connect_intents() {
        assert_eq!(
            decode_outbound(r#"{"type":"host","playerName":"Alice"}"#),
            Err(CodecError::UnknownType("host".to_string()))
        );
    }

    #[test]
    fn test_host_connect_url() {
        let command = OutboundCommand::Host {
            player_name: "Alice".to_string(),
        };
        assert!(command.opens_connection());

        let url = encode(&command).into_connect_url(&base()).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:3000/?playerName=Alice");
    }

    #[test]
    fn test_join_connect_url() {
        let command = OutboundCommand::Join {
            code: "QRST".to_string(),
            player_name: "Ann Lee".to_string(),
        };

        let url = encode(&command).into_connect_url(&base()).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("partyCode".to_string(), "QRST".to_string()),
                ("playerName".to_string(), "Ann Lee".to_string()),
            ]
        );
    }

    #[test]
    fn test_frames_have_no_connect_url() {
        let command = OutboundCommand::UpdateDeck {
            deck: "classic".to_string(),
        };
        assert!(!command.opens_connection());
        assert!(encode(&command).into_connect_url(&base()).is_none());
    }
}
