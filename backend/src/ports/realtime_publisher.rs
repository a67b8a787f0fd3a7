//! Publish port consumed by request-handling code.
//!
//! State-changing handlers call this after their change is committed. Both
//! operations are fire-and-forget: they never block on subscribers, never
//! fail observably, and are no-ops for rooms without subscribers.
//!
//! # Example
//!
//! ```ignore
//! async fn move_card(publisher: Arc<dyn RealtimePublisher>, card: &Card) {
//!     // ... commit the move first ...
//!     publisher.publish_to_room(
//!         &RoomId::board(&card.board_id),
//!         event_kinds::CARD_MOVED,
//!         json!({ "cardId": card.id, "columnId": card.column_id }),
//!     );
//! }
//! ```

use crate::domain::foundation::UserId;
use crate::domain::realtime::RoomId;

/// Fan-out entry point for events.
pub trait RealtimePublisher: Send + Sync {
    /// Publish an event to every connection subscribed to `room`.
    fn publish_to_room(&self, room: &RoomId, kind: &str, payload: serde_json::Value);

    /// Publish an event to the personal room of `user_id`.
    fn publish_to_user(&self, user_id: &UserId, kind: &str, payload: serde_json::Value) {
        self.publish_to_room(&RoomId::user(user_id), kind, payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<(String, String)>>,
    }

    impl RealtimePublisher for RecordingPublisher {
        fn publish_to_room(&self, room: &RoomId, kind: &str, _payload: serde_json::Value) {
            self.published
                .lock()
                .unwrap()
                .push((room.to_string(), kind.to_string()));
        }
    }

    #[test]
    fn publish_to_user_targets_prefixed_room() {
        let publisher = RecordingPublisher::default();
        publisher.publish_to_user(
            &UserId::new("alice").unwrap(),
            "NOTIFICATION_RECEIVED",
            json!({}),
        );

        let published = publisher.published.lock().unwrap();
        assert_eq!(
            published.as_slice(),
            &[("user:alice".to_string(), "NOTIFICATION_RECEIVED".to_string())]
        );
    }
}
