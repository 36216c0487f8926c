//! Game rules for Bubble Brawl.
//!
//! Everything in this crate is synchronous and free of I/O: a room feeds
//! it a [`GameConfig`], a random source, and player intents, and reads
//! back snapshots and shot outcomes.
//!
//! # Key types
//!
//! - [`Grid`] — one player's hexagonal-offset board
//! - [`matching`] — same-color clusters, ceiling connectivity, avalanches
//! - [`Projectile`] — a bubble in flight, wall bounces, snap search
//! - [`PlayerSession`] — grid + queue + score + alive flag for one player

mod config;
mod grid;
pub mod matching;
mod player;
mod projectile;

pub use config::GameConfig;
pub use grid::{cell_center, Bubble, Cell, Grid};
pub use player::{PlayerSession, ShotOutcome};
pub use projectile::{best_snap_spot, clamp_angle, Projectile};
