//! Wire protocol for Bubble Brawl.
//!
//! This crate defines the "language" that browser clients and the game
//! server speak:
//!
//! - **Types** ([`PlayerId`], [`RoomId`], [`Color`], [`RoomState`]) —
//!   identities and enumerations shared by every layer.
//! - **Snapshots** ([`RoomSnapshot`], [`PlayerSnapshot`]) — the full,
//!   authoritative view of a room that is broadcast to its players.
//! - **Events** ([`ClientEvent`], [`ServerEvent`], [`Envelope`]) — the
//!   named messages that travel on the wire, and the closed [`Intent`]
//!   set that inbound events are validated into.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from bytes.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEvent → Intent) → Room (game state)
//! ```
//!
//! The protocol layer doesn't know about connections, rooms, or grids. It
//! only knows message shapes and how to (de)serialize them.

mod codec;
mod error;
mod events;
mod snapshot;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientEvent, Envelope, Intent, PlayerAction, ServerEvent};
pub use snapshot::{
    PlayerSnapshot, ProjectileSnapshot, RoomListEntry, RoomSnapshot,
};
pub use types::{Color, PlayerId, Recipient, RoomId, RoomState};
