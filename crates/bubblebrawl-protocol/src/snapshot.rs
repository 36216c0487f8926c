//! Room snapshots: the authoritative view broadcast to clients.
//!
//! A snapshot is a plain data copy of a room. It is rebuilt after every
//! mutation (and every tick while a round is running) and serialized as
//! camelCase JSON for the browser.

use serde::{Deserialize, Serialize};

use crate::{Color, PlayerId, RoomId, RoomState};

/// Full state of one room as seen by its players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub name: String,
    pub state: RoomState,
    pub capacity: usize,
    /// Seated players, ordered by id.
    pub players: Vec<PlayerSnapshot>,
}

impl RoomSnapshot {
    /// Looks up one player's entry.
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// One player's board and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub is_ready: bool,
    pub is_alive: bool,
    pub score: u64,
    pub level: u32,
    /// `rows × cols` cells, `null` for an empty cell.
    pub grid: Vec<Vec<Option<Color>>>,
    pub launcher: Option<Color>,
    pub next: Option<Color>,
    pub projectile: Option<ProjectileSnapshot>,
}

/// Position of a bubble currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

/// A summary of a room returned in room listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListEntry {
    pub id: RoomId,
    pub name: String,
    pub state: RoomState,
    pub player_count: usize,
    pub capacity: usize,
}
