//! Broadcast message and its wire representation.

use serde::Serialize;

use super::RoomId;

/// An event published to one room.
///
/// Constructed by publishers and never mutated afterwards; the hub shares a
/// single `Arc<Message>` across every recipient queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    kind: String,
    payload: serde_json::Value,
    room: RoomId,
}

impl Message {
    /// Creates a message for `room`.
    pub fn new(room: RoomId, kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            room,
        }
    }

    /// The event tag, e.g. `CARD_MOVED`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Routing key. Never sent to clients.
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Borrowed view in the shape clients receive.
    pub fn to_wire(&self) -> WireMessage<'_> {
        WireMessage {
            kind: &self.kind,
            payload: &self.payload,
        }
    }

    /// Serializes the wire shape into a text frame body.
    pub fn to_wire_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_wire())
    }
}

/// `{ "type": ..., "payload": ... }` as sent to each subscriber.
#[derive(Debug, Serialize)]
pub struct WireMessage<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub payload: &'a serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_json_has_type_and_payload_only() {
        let msg = Message::new(
            RoomId::new("board-7").unwrap(),
            "CARD_MOVED",
            json!({"cardId": "c1", "toColumn": "done"}),
        );

        let value: serde_json::Value = serde_json::from_str(&msg.to_wire_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"type": "CARD_MOVED", "payload": {"cardId": "c1", "toColumn": "done"}})
        );
    }

    #[test]
    fn wire_json_never_leaks_room() {
        let msg = Message::new(RoomId::new("user:alice").unwrap(), "PING", json!(null));
        let text = msg.to_wire_json().unwrap();
        assert!(!text.contains("user:alice"));
        assert!(!text.contains("room"));
    }

    #[test]
    fn null_payload_is_serialized_explicitly() {
        let msg = Message::new(RoomId::new("r").unwrap(), "MSG", serde_json::Value::Null);
        assert_eq!(msg.to_wire_json().unwrap(), r#"{"type":"MSG","payload":null}"#);
    }
}
