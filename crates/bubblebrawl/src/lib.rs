//! # Bubble Brawl
//!
//! Server-authoritative multiplayer bubble shooter.
//!
//! Clients connect over WebSocket, pick one of a fixed set of rooms, vote
//! ready, and play rounds where every player clears their own hex grid of
//! bubbles. The server owns all game state: it simulates shots, resolves
//! matches and avalanches, tracks eliminations, and streams snapshots.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bubblebrawl::{BubbleBrawlServer, ServerConfig};
//!
//! # async fn run() -> Result<(), bubblebrawl::BubbleBrawlError> {
//! let server = BubbleBrawlServer::builder()
//!     .config(ServerConfig::load()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{CONFIG_ENV, DEFAULT_CONFIG_PATH, PORT_ENV, ServerConfig};
pub use error::BubbleBrawlError;
pub use server::{BubbleBrawlServer, BubbleBrawlServerBuilder};

pub use bubblebrawl_game::GameConfig;
pub use bubblebrawl_protocol::{ClientEvent, Envelope, PlayerId, RoomId, ServerEvent};
pub use bubblebrawl_room::{RoomConfig, RoomState};
