//! Event fan-out
//!
//! A broadcast bus carrying lifecycle and retrieval events to every
//! connected subscriber. Delivery is best-effort, at-least-once for
//! connected subscribers; there is no replay for late joiners. Events
//! are emitted only after the corresponding state change has been
//! durably committed.

use serde::Serialize;
use tokio::sync::broadcast;

use super::gate::RejectReason;

/// A state change worth telling viewers about
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JukeEvent {
    RequestCreated {
        request_id: String,
        song_id: i64,
        title: String,
        artist: String,
        explicit: bool,
        status: String,
    },
    RequestApproved {
        request_id: String,
        /// True when a moderator overrode an automatic rejection
        overridden: bool,
    },
    RequestRejected {
        request_id: String,
        /// True for pipeline rejections, false for moderator ones
        automatic: bool,
        reasons: Vec<RejectReason>,
    },
    LikeToggled {
        song_id: i64,
        guest_id: String,
        liked: bool,
    },
    LyricsResolved {
        song_id: i64,
        found: bool,
        source: Option<String>,
        clean: bool,
    },
}

impl JukeEvent {
    /// Event name used on the wire (SSE event field)
    pub fn name(&self) -> &'static str {
        match self {
            JukeEvent::RequestCreated { .. } => "request_created",
            JukeEvent::RequestApproved { .. } => "request_approved",
            JukeEvent::RequestRejected { .. } => "request_rejected",
            JukeEvent::LikeToggled { .. } => "like_toggled",
            JukeEvent::LyricsResolved { .. } => "lyrics_resolved",
        }
    }
}

/// Broadcast bus for [`JukeEvent`]s
///
/// Wraps tokio::broadcast: non-blocking publish, any number of
/// subscribers, slow subscribers lag rather than block producers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<JukeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events. Events emitted before the
    /// subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<JukeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all current subscribers. Having no subscribers
    /// is fine; the event is simply dropped.
    pub fn emit(&self, event: JukeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_ok() {
        let bus = EventBus::new(8);
        bus.emit(JukeEvent::LikeToggled {
            song_id: 1,
            guest_id: "g".to_string(),
            liked: true,
        });
    }

    #[tokio::test]
    async fn test_all_subscribers_receive() {
        let bus = EventBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(JukeEvent::RequestApproved {
            request_id: "r1".to_string(),
            overridden: false,
        });

        for rx in [&mut rx1, &mut rx2] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.name(), "request_approved");
        }
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_no_replay() {
        let bus = EventBus::new(8);

        let mut early = bus.subscribe();
        bus.emit(JukeEvent::RequestApproved {
            request_id: "r1".to_string(),
            overridden: true,
        });

        let mut late = bus.subscribe();
        assert!(early.try_recv().is_ok());
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn test_event_payload_serialization() {
        let event = JukeEvent::RequestRejected {
            request_id: "r1".to_string(),
            automatic: true,
            reasons: vec![RejectReason::LyricsUnclean],
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["request_id"], "r1");
        assert_eq!(json["automatic"], true);
        assert_eq!(json["reasons"][0], "lyrics_unclean");
        assert_eq!(event.name(), "request_rejected");
    }
}
