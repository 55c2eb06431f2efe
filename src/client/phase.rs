//! Session phase state machine.
//!
//! Tracks where a lobby session is in its lifecycle and validates transitions.
//!
//! # State Diagram
//!
//! ```text
//! ┌──────────┐  connect   ┌──────────┐  roster   ┌──────────┐
//! │   Idle   │───────────▶│ Awaiting │──────────▶│ InLobby  │◀─┐
//! └────┬─────┘            └────┬─────┘           └────┬─────┘  │ roster
//!      │                       │                      ├────────┘
//!      │ close                 │ close                │ close
//!      ▼                       ▼                      ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Closed                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Closed` is terminal. A new lobby needs a new session.

use std::fmt;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No transport yet
    Idle,

    /// Connect issued with the host/join intent, no roster yet
    Awaiting,

    /// At least one roster received
    InLobby,

    /// Transport closed, by either side
    Closed,
}

impl Default for SessionPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl SessionPhase {
    /// Check if inbound messages are accepted.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Awaiting | Self::InLobby)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Awaiting => write!(f, "Awaiting"),
            Self::InLobby => write!(f, "InLobby"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// Phase transition events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Connect,
    RosterReceived,
    Close,
}

/// Error when a phase transition is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: SessionPhase,
    pub event: PhaseEvent,
    pub reason: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} via {:?}: {}",
            self.from, self.event, self.reason
        )
    }
}

impl std::error::Error for InvalidTransition {}

impl SessionPhase {
    /// Apply an event in place, returning error if invalid.
    pub fn apply_mut(&mut self, event: PhaseEvent) -> Result<(), InvalidTransition> {
        *self = self.transition(event)?;
        Ok(())
    }

    /// Calculate the next phase for an event.
    pub fn transition(&self, event: PhaseEvent) -> Result<SessionPhase, InvalidTransition> {
        use PhaseEvent::*;
        use SessionPhase::*;

        let invalid = |reason: &'static str| InvalidTransition {
            from: *self,
            event,
            reason,
        };

        match (self, event) {
            (Idle, Connect) => Ok(Awaiting),
            (Closed, Connect) => Err(invalid("Session is closed")),
            (_, Connect) => Err(invalid("Already connected")),

            (Awaiting | InLobby, RosterReceived) => Ok(InLobby),
            (Idle, RosterReceived) => Err(invalid("Not connected")),
            (Closed, RosterReceived) => Err(invalid("Session is closed")),

            (Closed, Close) => Err(invalid("Already closed")),
            (_, Close) => Ok(Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_phase() {
        let phase = SessionPhase::default();
        assert_eq!(phase, SessionPhase::Idle);
        assert!(!phase.is_live());
    }

    #[test]
    fn test_happy_path() {
        let mut phase = SessionPhase::Idle;

        phase.apply_mut(PhaseEvent::Connect).unwrap();
        assert_eq!(phase, SessionPhase::Awaiting);
        assert!(phase.is_live());

        phase.apply_mut(PhaseEvent::RosterReceived).unwrap();
        assert_eq!(phase, SessionPhase::InLobby);

        // Every later roster keeps us in the lobby
        phase.apply_mut(PhaseEvent::RosterReceived).unwrap();
        assert_eq!(phase, SessionPhase::InLobby);

        phase.apply_mut(PhaseEvent::Close).unwrap();
        assert!(phase.is_closed());
    }

    #[test]
    fn test_close_from_any_open_phase() {
        for from in [SessionPhase::Idle, SessionPhase::Awaiting, SessionPhase::InLobby] {
            assert_eq!(from.transition(PhaseEvent::Close), Ok(SessionPhase::Closed));
        }
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(SessionPhase::Idle.transition(PhaseEvent::RosterReceived).is_err());
        assert!(SessionPhase::Awaiting.transition(PhaseEvent::Connect).is_err());
        assert!(SessionPhase::InLobby.transition(PhaseEvent::Connect).is_err());

        // Closed is terminal
        for event in [PhaseEvent::Connect, PhaseEvent::RosterReceived, PhaseEvent::Close] {
            assert!(SessionPhase::Closed.transition(event).is_err());
        }
    }

    #[test]
    fn test_display() {
        let err = SessionPhase::Closed
            .transition(PhaseEvent::Connect)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid transition from Closed via Connect: Session is closed"
        );
    }
}
