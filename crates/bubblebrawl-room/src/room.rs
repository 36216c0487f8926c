//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Commands, ticks, and the game-over deadline are all handled on the
//! actor's own task, so the room state has exactly one writer and needs no
//! lock.

use std::collections::HashMap;
use std::time::Duration;

use bubblebrawl_game::GameConfig;
use bubblebrawl_protocol::{
    PlayerId, Recipient, RoomId, RoomListEntry, RoomSnapshot, RoomState,
    ServerEvent,
};
use bubblebrawl_tick::{Deadline, TickConfig, TickScheduler};
use rand::rngs::StdRng;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::machine::Outbound;
use crate::{Room, RoomConfig, RoomError};

/// Channel sender for delivering outbound events to a player's connection.
///
/// Bounded: once half the buffer is taken, per-tick `gameStateUpdate`s for
/// that player are skipped until the connection catches up. The other
/// half is kept for discrete events (joins, round start, eliminations,
/// game over).
pub type PlayerSender = mpsc::Sender<ServerEvent>;

/// Commands sent to a room actor through its channel.
///
/// Variants carrying a `oneshot::Sender` are requests: the caller waits
/// for the reply. The rest are fire-and-forget; a rejection is delivered
/// to the player through their [`PlayerSender`] instead.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: Option<String>,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Ready {
        player_id: PlayerId,
    },
    Shoot {
        player_id: PlayerId,
        angle: f64,
    },
    GetInfo {
        reply: oneshot::Sender<RoomListEntry>,
    },
    GetSnapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone: it wraps an `mpsc::Sender`.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub(crate) fn new(room_id: RoomId, sender: mpsc::Sender<RoomCommand>) -> Self {
        Self { room_id, sender }
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Seats a player. On success the room starts sending them events
    /// through `sender`, beginning with an `updateRoom`.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: Option<String>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            name,
            sender,
            reply,
        })
        .await?;
        rx.await.map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Leave { player_id, reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    /// Toggles the player's ready vote.
    pub async fn ready(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.send(RoomCommand::Ready { player_id }).await
    }

    pub async fn shoot(
        &self,
        player_id: PlayerId,
        angle: f64,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Shoot { player_id, angle }).await
    }

    pub async fn get_info(&self) -> Result<RoomListEntry, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable(self.room_id))
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::GetSnapshot { reply }).await?;
        rx.await.map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Stops the actor. Seated players simply stop receiving events.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    grace_period: Duration,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    scheduler: TickScheduler,
    grace: Deadline,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        let room_id = self.room.id();
        tracing::info!(%room_id, "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                _ = self.scheduler.wait_for_tick() => {
                    let out = self.room.tick();
                    self.dispatch(out);
                    self.scheduler.record_tick_end();
                }
                _ = self.grace.wait() => {
                    let out = self.room.finish_grace();
                    self.dispatch(out);
                }
            }
            self.sync_timers();
        }

        tracing::info!(%room_id, "room actor stopped");
    }

    /// Returns `false` when the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                player_id,
                name,
                sender,
                reply,
            } => {
                let result = self.room.join(player_id, name).map(|out| {
                    self.senders.insert(player_id, sender);
                    self.dispatch(out);
                });
                let _ = reply.send(result);
            }
            RoomCommand::Leave { player_id, reply } => {
                let result = self.room.leave(player_id).map(|out| {
                    self.senders.remove(&player_id);
                    self.dispatch(out);
                });
                let _ = reply.send(result);
            }
            RoomCommand::Ready { player_id } => {
                let out = self.room.toggle_ready(player_id);
                self.dispatch(out);
            }
            RoomCommand::Shoot { player_id, angle } => {
                let out = self.room.shoot(player_id, angle);
                self.dispatch(out);
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.room.info());
            }
            RoomCommand::GetSnapshot { reply } => {
                let _ = reply.send(self.room.snapshot());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room_id = %self.room.id(), "room shutting down");
                return false;
            }
        }
        true
    }

    /// Attaches the tick loop while a round runs and arms the grace
    /// deadline on entering `GAME_OVER`. Leaving either state detaches
    /// them at once.
    fn sync_timers(&mut self) {
        match self.room.state() {
            RoomState::InProgress => {
                self.scheduler.start();
                self.grace.cancel();
            }
            RoomState::GameOver => {
                self.scheduler.stop();
                if !self.grace.is_armed() {
                    self.grace.arm_in(self.grace_period);
                }
            }
            RoomState::LobbyVoting => {
                self.scheduler.stop();
                self.grace.cancel();
            }
        }
    }

    /// Dispatches events to the matching seated players.
    fn dispatch(&self, out: Outbound) {
        for (recipient, event) in out {
            match recipient {
                Recipient::All => {
                    for (&pid, sender) in &self.senders {
                        deliver(pid, sender, event.clone());
                    }
                }
                Recipient::Player(pid) => self.send_to(pid, event),
            }
        }
    }

    /// Sends to a single player. Silently drops if their connection is gone.
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            deliver(player_id, sender, event);
        }
    }
}

/// Queues one event for a player without blocking the room.
fn deliver(player_id: PlayerId, sender: &PlayerSender, event: ServerEvent) {
    if matches!(event, ServerEvent::GameStateUpdate(_))
        && sender.capacity() <= sender.max_capacity() / 2
    {
        tracing::trace!(%player_id, "outbound queue backed up, skipping state update");
        return;
    }
    match sender.try_send(event) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(_)) => {
            tracing::warn!(%player_id, "outbound queue full, event dropped");
        }
    }
}

/// Spawns a room actor task and returns a handle to it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: &RoomConfig,
    game: GameConfig,
    rng: StdRng,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer);

    let actor = RoomActor {
        room: Room::new(room_id, config, game, rng),
        grace_period: config.game_over_grace(),
        senders: HashMap::new(),
        scheduler: TickScheduler::new(TickConfig::with_rate(config.tick_rate)),
        grace: Deadline::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle::new(room_id, tx)
}
