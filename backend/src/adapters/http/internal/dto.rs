//! Request and response types for the internal API.

use serde::{Deserialize, Serialize};

use crate::adapters::websocket::hub::RegistrySnapshot;

/// Body of a publish request: the same `{type, payload}` shape clients receive.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishRequest {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Acknowledgement for an accepted publish.
///
/// Acceptance means the hub took the message, not that anyone received it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishAccepted {
    pub room: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One room in the stats response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomStats {
    pub room: String,
    pub subscribers: usize,
}

/// Registry statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub connections: usize,
    pub room_count: usize,
    pub rooms: Vec<RoomStats>,
}

impl From<RegistrySnapshot> for StatsResponse {
    fn from(snapshot: RegistrySnapshot) -> Self {
        let rooms = snapshot
            .rooms
            .iter()
            .map(|(room, members)| RoomStats {
                room: room.to_string(),
                subscribers: members.len(),
            })
            .collect();

        Self {
            connections: snapshot.connections,
            room_count: snapshot.room_count(),
            rooms,
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ConnectionId;
    use crate::domain::realtime::RoomId;
    use std::collections::{BTreeMap, BTreeSet};

    #[test]
    fn publish_request_payload_defaults_to_null() {
        let req: PublishRequest = serde_json::from_str(r#"{"type":"board_updated"}"#).unwrap();
        assert_eq!(req.kind, "board_updated");
        assert!(req.payload.is_null());
    }

    #[test]
    fn stats_response_counts_room_members() {
        let mut rooms = BTreeMap::new();
        rooms.insert(
            RoomId::new("user:alice").unwrap(),
            BTreeSet::from([ConnectionId::new(), ConnectionId::new()]),
        );
        let snapshot = RegistrySnapshot {
            rooms,
            connections: 2,
        };

        let stats = StatsResponse::from(snapshot);

        assert_eq!(stats.connections, 2);
        assert_eq!(stats.room_count, 1);
        assert_eq!(
            stats.rooms,
            vec![RoomStats {
                room: "user:alice".to_string(),
                subscribers: 2
            }]
        );
    }
}
