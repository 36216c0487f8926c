//! Named events exchanged with clients, and the closed intent set.
//!
//! Every frame on the wire is adjacently tagged:
//!
//! ```text
//! { "event": "playerAction", "data": { "type": "shoot", "angle": -1.2 } }
//! ```
//!
//! Inbound frames decode into [`ClientEvent`]. Events that change room
//! state are then validated into an [`Intent`] before they reach a room,
//! so room code never sees a loosely-typed payload.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, ProtocolError, RoomId, RoomListEntry, RoomSnapshot};

/// Longest display name kept from a `joinRoom` request, in characters.
pub const MAX_NAME_LEN: usize = 24;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Everything a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Take a seat in the given room.
    JoinRoom {
        room_id: RoomId,
        /// Optional display name; the server picks one if absent.
        #[serde(default)]
        name: Option<String>,
    },
    /// Toggle the sender's ready vote.
    PlayerReady,
    /// An in-game action.
    PlayerAction(PlayerAction),
    /// Keep-alive; refreshes the idle timer and nothing else.
    Heartbeat,
    /// Ask for a `roomListUpdate`.
    ListRooms,
}

/// In-game actions carried by `playerAction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerAction {
    /// Fire the launcher bubble. `angle` is in radians, canvas
    /// orientation (negative is upward).
    Shoot { angle: f64 },
}

/// The closed set of state-changing intents a connection can produce.
///
/// All but [`Intent::Disconnect`] are decoded from client frames. The
/// connection handler raises `Disconnect` itself when the socket closes
/// or idles out; no client frame maps to it.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Join {
        room_id: RoomId,
        name: Option<String>,
    },
    Ready,
    Shoot {
        angle: f64,
    },
    Disconnect,
}

impl TryFrom<ClientEvent> for Intent {
    type Error = ProtocolError;

    fn try_from(event: ClientEvent) -> Result<Self, Self::Error> {
        match event {
            ClientEvent::JoinRoom { room_id, name } => Ok(Intent::Join {
                room_id,
                name: name.and_then(clean_name),
            }),
            ClientEvent::PlayerReady => Ok(Intent::Ready),
            ClientEvent::PlayerAction(PlayerAction::Shoot { angle }) => {
                if !angle.is_finite() {
                    return Err(ProtocolError::InvalidMessage(
                        "shot angle must be a finite number".into(),
                    ));
                }
                Ok(Intent::Shoot { angle })
            }
            ClientEvent::Heartbeat | ClientEvent::ListRooms => {
                Err(ProtocolError::InvalidMessage(
                    "not a room intent".into(),
                ))
            }
        }
    }
}

fn clean_name(raw: String) -> Option<String> {
    let name: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
    (!name.is_empty()).then_some(name)
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Everything the server may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// First frame on every connection: the id the server assigned.
    Welcome { player_id: PlayerId },
    /// Membership, readiness, or lobby state changed.
    UpdateRoom(RoomSnapshot),
    /// A round just started.
    GameStarted(RoomSnapshot),
    /// Per-tick state while a round is running.
    GameStateUpdate(RoomSnapshot),
    /// A player's board reached the game-over row; they sit out the rest
    /// of the round.
    PlayerEliminated { player_id: PlayerId },
    /// The round ended. `winner` is the last player standing, if any.
    GameOver { winner: Option<PlayerId> },
    /// A rejected intent, sent to the originating connection only.
    Error(String),
    /// Occupancy of every room.
    RoomListUpdate(Vec<RoomListEntry>),
    /// The server is closing this connection.
    ForceDisconnect(String),
}

/// Outbound wrapper carrying sequencing metadata.
///
/// `seq` increments per connection; `timestamp` is milliseconds since the
/// connection was accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub seq: u64,
    pub timestamp: u64,
    pub message: ServerEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoomState;

    fn decode(json: &str) -> ClientEvent {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_join_room_decodes_with_and_without_name() {
        let ev = decode(r#"{"event":"joinRoom","data":{"roomId":"room-2"}}"#);
        assert_eq!(
            ev,
            ClientEvent::JoinRoom {
                room_id: RoomId(2),
                name: None
            }
        );

        let ev = decode(
            r#"{"event":"joinRoom","data":{"roomId":"room-1","name":"ana"}}"#,
        );
        assert_eq!(
            ev,
            ClientEvent::JoinRoom {
                room_id: RoomId(1),
                name: Some("ana".into())
            }
        );
    }

    #[test]
    fn test_player_action_shoot_decodes() {
        let ev = decode(
            r#"{"event":"playerAction","data":{"type":"shoot","angle":-1.5}}"#,
        );
        assert_eq!(
            ev,
            ClientEvent::PlayerAction(PlayerAction::Shoot { angle: -1.5 })
        );
    }

    #[test]
    fn test_unit_events_serialize_without_data() {
        let json = serde_json::to_value(ClientEvent::PlayerReady).unwrap();
        assert_eq!(json["event"], "playerReady");
        let back: ClientEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, ClientEvent::PlayerReady);
    }

    #[test]
    fn test_unknown_action_type_fails_to_decode() {
        let result: Result<ClientEvent, _> = serde_json::from_str(
            r#"{"event":"playerAction","data":{"type":"teleport"}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_event_fails_to_decode() {
        let result: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"event":"chat","data":"hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_intent_from_join_trims_and_caps_name() {
        let intent = Intent::try_from(ClientEvent::JoinRoom {
            room_id: RoomId(1),
            name: Some(format!("  {}  ", "x".repeat(40))),
        })
        .unwrap();
        match intent {
            Intent::Join { name: Some(name), .. } => {
                assert_eq!(name.len(), MAX_NAME_LEN)
            }
            other => panic!("expected named join, got {other:?}"),
        }

        let intent = Intent::try_from(ClientEvent::JoinRoom {
            room_id: RoomId(1),
            name: Some("   ".into()),
        })
        .unwrap();
        assert_eq!(
            intent,
            Intent::Join {
                room_id: RoomId(1),
                name: None
            }
        );
    }

    #[test]
    fn test_intent_rejects_non_finite_angle() {
        let result = Intent::try_from(ClientEvent::PlayerAction(
            PlayerAction::Shoot { angle: f64::NAN },
        ));
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_heartbeat_is_not_an_intent() {
        assert!(Intent::try_from(ClientEvent::Heartbeat).is_err());
        assert!(Intent::try_from(ClientEvent::ListRooms).is_err());
    }

    #[test]
    fn test_server_event_names() {
        let snap = RoomSnapshot {
            id: RoomId(1),
            name: "Room 1".into(),
            state: RoomState::LobbyVoting,
            capacity: 10,
            players: vec![],
        };
        let cases = [
            (ServerEvent::UpdateRoom(snap.clone()), "updateRoom"),
            (ServerEvent::GameStarted(snap.clone()), "gameStarted"),
            (ServerEvent::GameStateUpdate(snap), "gameStateUpdate"),
            (
                ServerEvent::PlayerEliminated {
                    player_id: PlayerId(2),
                },
                "playerEliminated",
            ),
            (ServerEvent::GameOver { winner: None }, "gameOver"),
            (ServerEvent::Error("room is full".into()), "error"),
        ];
        for (event, name) in cases {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["event"], name);
        }
    }

    #[test]
    fn test_game_over_carries_winner() {
        let json = serde_json::to_value(ServerEvent::GameOver {
            winner: Some(PlayerId(4)),
        })
        .unwrap();
        assert_eq!(json["data"]["winner"], 4);
    }
}
