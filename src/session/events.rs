//! Session events delivered to registered listeners.
//!
//! Delivery is best-effort, at-most-once: a listener whose channel is
//! closed is skipped, and no command ever fails because an event could
//! not be delivered.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

use super::models::ParticipantId;

/// Events emitted as sessions mutate
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum SessionEvent {
    ParticipantJoined {
        code: String,
        participant_id: ParticipantId,
        name: String,
    },
    RoundGenerated {
        code: String,
        round: u32,
        table_count: usize,
    },
    RoundStarted {
        code: String,
        round: u32,
    },
    ParticipantDropped {
        code: String,
        participant_id: ParticipantId,
    },
    GameEnded {
        code: String,
        rounds_played: u32,
    },
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::ParticipantJoined { code, name, .. } => {
                format!("{name} joined session {code}")
            }
            Self::RoundGenerated {
                code,
                round,
                table_count,
            } => format!("session {code} generated round {round} with {table_count} tables"),
            Self::RoundStarted { code, round } => {
                format!("session {code} started round {round}")
            }
            Self::ParticipantDropped {
                code,
                participant_id,
            } => format!("{participant_id} dropped from session {code}"),
            Self::GameEnded {
                code,
                rounds_played,
            } => format!("session {code} ended after {rounds_played} rounds"),
        };
        write!(f, "{repr}")
    }
}

/// Listener list for session events.
///
/// Listeners subscribe with an unbounded channel; sends to closed channels
/// are ignored rather than pruned eagerly.
#[derive(Debug, Default)]
pub struct EventBus {
    listeners: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return its receiving end.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    /// Deliver an event to every live listener.
    pub fn publish(&self, event: SessionEvent) {
        log::debug!("{event}");
        for listener in &self.listeners {
            // Best-effort: a dropped receiver is not an error.
            let _ = listener.send(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_all_listeners() {
        let mut bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(SessionEvent::RoundStarted {
            code: "ABCD".into(),
            round: 1,
        });

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_publish_survives_closed_listener() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        drop(rx);

        // Must not panic or error.
        bus.publish(SessionEvent::GameEnded {
            code: "ABCD".into(),
            rounds_played: 3,
        });
    }

    #[test]
    fn test_event_display() {
        let event = SessionEvent::ParticipantJoined {
            code: "ABCD".into(),
            participant_id: "p1".into(),
            name: "Alice".into(),
        };
        assert_eq!(event.to_string(), "Alice joined session ABCD");
    }
}
