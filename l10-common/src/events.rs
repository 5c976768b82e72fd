//! Event types for the L10 event system
//!
//! Provides the shared `MeetingEvent` definitions and the `EventBus` used by
//! the service (SSE fan-out) and by in-process relays in the facade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Facts about a meeting session that co-present participants must apply
///
/// The serialized `type` tag uses the relay's event names
/// (`timer-paused`, `timer-resumed`, `section-change`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MeetingEvent {
    /// A new session row was created
    SessionStarted {
        session_id: Uuid,
        organization_id: String,
        team_id: String,
        meeting_type: String,
        timestamp: DateTime<Utc>,
    },

    /// Session paused
    TimerPaused {
        session_id: Uuid,
        reason: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// Session resumed
    ///
    /// Carries the server-computed active duration so receivers can reseed
    /// their display without recomputing from local state.
    TimerResumed {
        session_id: Uuid,
        active_duration_seconds: i64,
        timestamp: DateTime<Utc>,
    },

    /// Meeting moved to another agenda section
    SectionChange {
        session_id: Uuid,
        section_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Session concluded (explicitly or by stale cleanup)
    SessionEnded {
        session_id: Uuid,
        final_duration_seconds: i64,
        timestamp: DateTime<Utc>,
    },
}

impl MeetingEvent {
    /// Wire name of the event, used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            MeetingEvent::SessionStarted { .. } => "session-started",
            MeetingEvent::TimerPaused { .. } => "timer-paused",
            MeetingEvent::TimerResumed { .. } => "timer-resumed",
            MeetingEvent::SectionChange { .. } => "section-change",
            MeetingEvent::SessionEnded { .. } => "session-ended",
        }
    }

    /// Session the event refers to
    pub fn session_id(&self) -> Uuid {
        match self {
            MeetingEvent::SessionStarted { session_id, .. }
            | MeetingEvent::TimerPaused { session_id, .. }
            | MeetingEvent::TimerResumed { session_id, .. }
            | MeetingEvent::SectionChange { session_id, .. }
            | MeetingEvent::SessionEnded { session_id, .. } => *session_id,
        }
    }
}

/// Central event distribution bus
///
/// Uses `tokio::broadcast` internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MeetingEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<MeetingEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: MeetingEvent,
    ) -> Result<usize, broadcast::error::SendError<MeetingEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: MeetingEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paused(session_id: Uuid) -> MeetingEvent {
        MeetingEvent::TimerPaused {
            session_id,
            reason: Some("break".to_string()),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_event_type_names_match_serde_tag() {
        let id = Uuid::new_v4();
        let event = paused(id);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "timer-paused");
        assert_eq!(event.event_type(), "timer-paused");

        let event = MeetingEvent::SectionChange {
            session_id: id,
            section_id: "ids".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
        assert_eq!(event.session_id(), id);
    }

    #[test]
    fn test_event_deserializes_from_relay_payload() {
        let id = Uuid::new_v4();
        let payload = serde_json::json!({
            "type": "timer-resumed",
            "session_id": id,
            "active_duration_seconds": 380,
            "timestamp": "2026-01-05T15:00:00Z",
        });
        let event: MeetingEvent = serde_json::from_value(payload).unwrap();
        match event {
            MeetingEvent::TimerResumed {
                session_id,
                active_duration_seconds,
                ..
            } => {
                assert_eq!(session_id, id);
                assert_eq!(active_duration_seconds, 380);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_err() {
        let bus = EventBus::new(10);
        assert!(bus.emit(paused(Uuid::new_v4())).is_err());
        // Lossy variant never fails
        bus.emit_lossy(paused(Uuid::new_v4()));
        assert_eq!(bus.capacity(), 10);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let id = Uuid::new_v4();
        assert_eq!(bus.emit(paused(id)).unwrap(), 2);

        assert_eq!(rx1.recv().await.unwrap().session_id(), id);
        assert_eq!(rx2.recv().await.unwrap().session_id(), id);
    }
}
