/// Realtime Bridge Protocol
///
/// Message types exchanged between client and server over the WebSocket
/// connection. Clients declare an identity, then watch at two
/// granularities: the whole room list, or one open room.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::message::schema::MessageEntity;
use crate::modules::notification::schema::NotificationEntity;
use crate::modules::room::schema::{ParticipantRole, RoomEntity};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Declare who this connection acts as. Authentication happens
    /// upstream; the bridge only scopes delivery by the declared identity.
    #[serde(rename_all = "camelCase")]
    Hello { participant_id: Uuid, role: ParticipantRole },

    /// Start receiving room-list-level changes (new rooms, last-message
    /// updates) for every room the identity can see.
    WatchRooms,

    /// Stop room-list delivery. No event arrives after this is handled.
    UnwatchRooms,

    /// Start receiving individual message inserts for one open room.
    #[serde(rename_all = "camelCase")]
    WatchRoom { room_id: Uuid },

    /// Stop open-room delivery for the room.
    #[serde(rename_all = "camelCase")]
    UnwatchRoom { room_id: Uuid },

    /// Keep-alive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Identity accepted
    #[serde(rename_all = "camelCase")]
    HelloAck { participant_id: Uuid },

    /// A visible room changed (created, or its last-message cache moved)
    #[serde(rename_all = "camelCase")]
    RoomChanged { room: RoomEntity },

    /// New message in a watched room
    #[serde(rename_all = "camelCase")]
    NewMessage { room_id: Uuid, message: MessageEntity },

    /// A reader marked the room read (set operation, no per-message ids)
    #[serde(rename_all = "camelCase")]
    MessagesRead { room_id: Uuid, reader_id: Uuid },

    /// New notification for this identity
    #[serde(rename_all = "camelCase")]
    Notification { notification: NotificationEntity },

    /// The feed skipped events; the client must refetch its snapshots
    Resync,

    /// Pong response for Ping
    Pong,

    /// Something went wrong
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    // === ClientMessage deserialization ===

    #[test]
    fn test_client_hello_deserialize() {
        let id = Uuid::now_v7();
        let json = format!(r#"{{"type":"hello","participantId":"{}","role":"customer"}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ClientMessage::Hello { participant_id, role } => {
                assert_eq!(participant_id, id);
                assert_eq!(role, ParticipantRole::Customer);
            }
            _ => panic!("Expected Hello variant"),
        }
    }

    #[test]
    fn test_client_watch_rooms_deserialize() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"watchRooms"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::WatchRooms));
    }

    #[test]
    fn test_client_watch_room_deserialize() {
        let id = Uuid::now_v7();
        let json = format!(r#"{{"type":"watchRoom","roomId":"{}"}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(msg, ClientMessage::WatchRoom { room_id } if room_id == id));
    }

    #[test]
    fn test_client_unwatch_room_deserialize() {
        let id = Uuid::now_v7();
        let json = format!(r#"{{"type":"unwatchRoom","roomId":"{}"}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(msg, ClientMessage::UnwatchRoom { room_id } if room_id == id));
    }

    #[test]
    fn test_client_ping_deserialize() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_invalid_type_returns_error() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"unknownType"}"#).is_err());
    }

    #[test]
    fn test_teknisi_role_deserialize() {
        let id = Uuid::now_v7();
        let json = format!(r#"{{"type":"hello","participantId":"{}","role":"teknisi"}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(msg, ClientMessage::Hello { role, .. } if role == ParticipantRole::Teknisi));
    }

    // === ServerMessage serialization ===

    #[test]
    fn test_server_hello_ack_serialize() {
        let id = Uuid::now_v7();
        let msg = ServerMessage::HelloAck { participant_id: id };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"helloAck\""));
        assert!(json.contains(&id.to_string()));
    }

    #[test]
    fn test_server_messages_read_serialize() {
        let room = Uuid::now_v7();
        let reader = Uuid::now_v7();
        let msg = ServerMessage::MessagesRead { room_id: room, reader_id: reader };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"messagesRead\""));
        assert!(json.contains("\"roomId\""));
        assert!(json.contains("\"readerId\""));
    }

    #[test]
    fn test_server_resync_serialize() {
        let json = serde_json::to_string(&ServerMessage::Resync).unwrap();
        assert_eq!(json, r#"{"type":"resync"}"#);
    }

    #[test]
    fn test_server_pong_serialize() {
        let json = serde_json::to_string(&ServerMessage::Pong).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_server_error_serialize() {
        let msg = ServerMessage::Error { message: "boom".to_string() };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("boom"));
    }

    // === Roundtrip ===

    #[test]
    fn test_client_message_roundtrip() {
        let id = Uuid::now_v7();
        let original = ClientMessage::WatchRoom { room_id: id };
        let json = serde_json::to_string(&original).unwrap();
        let deserialized: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(deserialized, ClientMessage::WatchRoom { room_id } if room_id == id));
    }
}
