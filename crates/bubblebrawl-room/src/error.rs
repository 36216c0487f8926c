//! Error types for the room layer.

use bubblebrawl_protocol::{PlayerId, RoomId, RoomState};

/// Errors that can occur during room operations.
///
/// The `Display` text is what a rejected client sees in its `error` event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No room with this id exists.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// Every seat is taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player already holds a seat, here or in another room.
    #[error("player {0} is already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The player has no seat in this room.
    #[error("player {0} is not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The player has no seat anywhere.
    #[error("player {0} is not in any room")]
    NotSeated(PlayerId),

    /// The intent is not allowed in the room's current state.
    #[error("{action} is not allowed while the room is {state}")]
    InvalidState {
        action: &'static str,
        state: RoomState,
    },

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
