//! Real-time relay between co-present meeting participants
//!
//! The relay only carries facts; receivers re-read authoritative state from
//! the session service when one arrives.

use l10_common::events::{EventBus, MeetingEvent};
use tokio::sync::broadcast;

/// Pub/sub channel for meeting events
pub trait Relay: Send + Sync {
    /// Publish to every other participant; delivery is best-effort
    fn broadcast(&self, event: MeetingEvent);

    fn subscribe(&self) -> broadcast::Receiver<MeetingEvent>;
}

/// In-process relay backed by the shared event bus
///
/// Clones share one channel, so facades created from clones of the same
/// relay see each other's events.
#[derive(Clone)]
pub struct LocalRelay {
    bus: EventBus,
}

impl LocalRelay {
    pub fn new(capacity: usize) -> Self {
        Self {
            bus: EventBus::new(capacity),
        }
    }

    /// Relay over an existing bus (for example the service's own)
    pub fn from_bus(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl Default for LocalRelay {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Relay for LocalRelay {
    fn broadcast(&self, event: MeetingEvent) {
        self.bus.emit_lossy(event);
    }

    fn subscribe(&self) -> broadcast::Receiver<MeetingEvent> {
        self.bus.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_clones_share_channel() {
        let relay = LocalRelay::default();
        let other = relay.clone();
        let mut rx = other.subscribe();

        let session_id = Uuid::new_v4();
        relay.broadcast(MeetingEvent::SectionChange {
            session_id,
            section_id: "ids".to_string(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.session_id(), session_id);
        assert_eq!(event.event_type(), "section-change");
    }

    #[test]
    fn test_broadcast_without_subscribers_is_silent() {
        let relay = LocalRelay::new(4);
        relay.broadcast(MeetingEvent::TimerPaused {
            session_id: Uuid::new_v4(),
            reason: None,
            timestamp: Utc::now(),
        });
    }
}
