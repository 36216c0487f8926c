//! Rooms for Bubble Brawl.
//!
//! A fixed pool of rooms is created at startup. Each room runs as an
//! isolated Tokio task (actor model) that owns its players' boards and
//! drives its own tick loop while a round is in progress.
//!
//! # Key types
//!
//! - [`Room`] — the synchronous room state machine
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomRegistry`] — the room pool plus the player→room assignment table
//! - [`RoomConfig`] — capacity, tick rate, game-over grace period

mod config;
mod error;
mod machine;
mod registry;
mod room;

pub use bubblebrawl_protocol::RoomState;
pub use config::RoomConfig;
pub use error::RoomError;
pub use machine::{Outbound, Room};
pub use registry::RoomRegistry;
pub use room::{PlayerSender, RoomHandle};
