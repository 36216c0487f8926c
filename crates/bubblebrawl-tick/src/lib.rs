//! Room timers for Bubble Brawl.
//!
//! Two pieces sit inside a room actor's `tokio::select!` loop:
//!
//! - [`TickScheduler`] drives the fixed-rate game loop while a round is
//!   running. It starts stopped; the room calls [`TickScheduler::start`]
//!   when a round begins and [`TickScheduler::stop`] when it ends.
//! - [`Deadline`] is a single cancelable point in time, used for the
//!   game-over grace period.
//!
//! Both futures pend forever while idle, so `select!` simply keeps serving
//! the other branches:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* join, leave, intents */ }
//!         _ = scheduler.wait_for_tick() => {
//!             room.tick();
//!             scheduler.record_tick_end();
//!         }
//!         _ = deadline.wait() => room.finish_grace(),
//!     }
//! }
//! ```

mod deadline;
mod scheduler;

pub use deadline::Deadline;
pub use scheduler::{TickConfig, TickInfo, TickMetrics, TickScheduler};
