//! Client event bus.
//!
//! State machines in this crate never talk to a UI directly; they emit
//! [`ClientEvent`]s on an injected [`EventBus`] and whoever embeds the
//! crate (CLI, desktop shell) decides what to do with them. Emission is
//! best-effort: a missing or closed listener is never an error.

use serde_json::{json, Value};
use tokio::sync::mpsc;

/// Events emitted by the progress and exercise machinery.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// An atom's completion reward was granted. Fired at most once per
    /// atom per session, on the transition into `completed`.
    XpAwarded { atom_id: String, amount: i64 },
    /// An atom reached `completed`.
    AtomCompleted {
        atom_id: String,
        molecule_id: String,
    },
    /// The user left an active capsule (window close, navigation away).
    ActivityEnded { capsule_id: String },
}

impl ClientEvent {
    /// Namespaced event name for listeners keyed by string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::XpAwarded { .. } => "nanshe:xp-awarded",
            Self::AtomCompleted { .. } => "nanshe:atom-completed",
            Self::ActivityEnded { .. } => "nanshe:activity-ended",
        }
    }

    /// JSON payload matching the event name.
    pub fn payload(&self) -> Value {
        match self {
            Self::XpAwarded { atom_id, amount } => {
                json!({ "atomId": atom_id, "amount": amount })
            }
            Self::AtomCompleted { atom_id, molecule_id } => {
                json!({ "atomId": atom_id, "moleculeId": molecule_id })
            }
            Self::ActivityEnded { capsule_id } => {
                json!({ "capsuleId": capsule_id })
            }
        }
    }
}

/// Cloneable sending half of the event channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: mpsc::UnboundedSender<ClientEvent>,
}

impl EventBus {
    /// Create a bus and the receiver that drains it.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: tx }, rx)
    }

    /// Bus with no listener. Emitted events go nowhere.
    pub fn noop() -> Self {
        let (bus, _rx) = Self::channel();
        bus
    }

    /// Emit an event, ignoring a closed receiver.
    pub fn emit(&self, event: ClientEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_receiver() {
        let (bus, mut rx) = EventBus::channel();
        bus.emit(ClientEvent::XpAwarded {
            atom_id: "a1".to_string(),
            amount: 50,
        });

        let event = rx.try_recv().unwrap();
        assert_eq!(event.name(), "nanshe:xp-awarded");
        assert_eq!(event.payload()["amount"], 50);
    }

    #[test]
    fn test_emit_without_listener_does_not_panic() {
        let bus = EventBus::noop();
        bus.emit(ClientEvent::ActivityEnded {
            capsule_id: "c1".to_string(),
        });
    }

    #[test]
    fn test_clone_shares_channel() {
        let (bus, mut rx) = EventBus::channel();
        let other = bus.clone();
        other.emit(ClientEvent::AtomCompleted {
            atom_id: "a1".to_string(),
            molecule_id: "m1".to_string(),
        });
        assert!(rx.try_recv().is_ok());
    }
}
