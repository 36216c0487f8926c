//! Core identity and enumeration types shared by every layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// Newtype wrapper around `u64` so a `PlayerId` can never be passed where
/// something else is expected. `#[serde(transparent)]` keeps it a plain
/// number on the wire: `PlayerId(42)` becomes `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifier of one of the pre-allocated rooms.
///
/// Rooms are numbered from 1. On the wire a room id is the string
/// `"room-<n>"`, which is also its `Display` form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room-{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("room-")
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .map(RoomId)
            .ok_or_else(|| ProtocolError::InvalidRoomId(s.to_string()))
    }
}

impl TryFrom<String> for RoomId {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server event.
///
/// Room logic returns `(Recipient, ServerEvent)` pairs and the room actor
/// fans them out to the matching player channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every player seated in the room.
    All,

    /// One specific player (rejected intents are reported this way).
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Color — the bubble palette
// ---------------------------------------------------------------------------

/// One entry of the fixed bubble palette.
///
/// Two bubbles match when they hold the same palette entry; clients are
/// free to render shades, but the server only compares variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Cyan,
}

impl Color {
    /// Every palette entry, in a fixed order.
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Purple,
        Color::Cyan,
    ];
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
///            all seated players ready
/// LobbyVoting ────────────────────────→ InProgress
///      ↑  ↑                                 │
///      │  └──── room emptied ───────────────┤ ≤ 1 player alive
///      │                                    ▼
///      └──────── grace period elapsed ── GameOver
/// ```
///
/// Serialized in SCREAMING_SNAKE_CASE (`"LOBBY_VOTING"`), matching what
/// browser clients switch on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomState {
    /// Accepting joins and ready votes.
    #[default]
    LobbyVoting,
    /// A round is being played; the tick loop is running.
    InProgress,
    /// The round ended; waiting out the grace period before the lobby.
    GameOver,
}

impl RoomState {
    /// Returns `true` while ready votes count.
    pub fn is_voting(&self) -> bool {
        matches!(self, Self::LobbyVoting)
    }

    /// Returns `true` while the tick loop should be attached.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LobbyVoting => write!(f, "LOBBY_VOTING"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::GameOver => write!(f, "GAME_OVER"),
        }
    }
}
