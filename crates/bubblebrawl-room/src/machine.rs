//! The room state machine.
//!
//! [`Room`] is plain synchronous state: the actor in `room.rs` owns one,
//! feeds it commands and ticks, and dispatches the `(Recipient, event)`
//! pairs every operation returns.
//!
//! ```text
//! LOBBY_VOTING ──all seated players ready──→ IN_PROGRESS
//!      ↑                                          │ ≤ 1 alive
//!      ├───────── room emptied ───────────────────┤
//!      │                                          ▼
//!      └────── finish_grace() ─────────────── GAME_OVER
//! ```

use std::collections::BTreeMap;

use bubblebrawl_game::{GameConfig, PlayerSession};
use bubblebrawl_protocol::{
    PlayerId, Recipient, RoomId, RoomListEntry, RoomSnapshot, RoomState,
    ServerEvent,
};
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use crate::{RoomConfig, RoomError};

/// Events produced by one room operation.
pub type Outbound = Vec<(Recipient, ServerEvent)>;

/// One pre-allocated room.
pub struct Room {
    id: RoomId,
    name: String,
    capacity: usize,
    game: GameConfig,
    state: RoomState,
    /// Ordered by id so snapshots are stable.
    players: BTreeMap<PlayerId, PlayerSession>,
    /// Players dealt into the current round.
    started_with: usize,
    rng: StdRng,
}

impl Room {
    pub fn new(
        id: RoomId,
        config: &RoomConfig,
        game: GameConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            id,
            name: format!("Room {}", id.0),
            capacity: config.capacity,
            game,
            state: RoomState::LobbyVoting,
            players: BTreeMap::new(),
            started_with: 0,
            rng,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.contains_key(&player_id)
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerSession> {
        self.players.get(&player_id)
    }

    /// Seats a player.
    ///
    /// Joining is allowed in every state while seats remain. A player who
    /// joins mid-round sits out with an empty board until the next round.
    pub fn join(
        &mut self,
        player_id: PlayerId,
        name: Option<String>,
    ) -> Result<Outbound, RoomError> {
        if self.players.contains_key(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, self.id));
        }
        if self.players.len() >= self.capacity {
            return Err(RoomError::RoomFull(self.id));
        }

        let name = name.unwrap_or_else(|| format!("Player {}", player_id.0));
        let mut session = PlayerSession::new(player_id, name, &self.game);
        session.is_alive = self.state.is_voting();
        self.players.insert(player_id, session);

        info!(
            room_id = %self.id,
            %player_id,
            players = self.players.len(),
            state = %self.state,
            "player joined"
        );
        Ok(vec![self.update_room()])
    }

    /// Removes a player's seat.
    ///
    /// An emptied room drops straight back to the lobby. Otherwise the
    /// remaining players may now all be ready (lobby) or down to a single
    /// survivor (round in progress).
    pub fn leave(&mut self, player_id: PlayerId) -> Result<Outbound, RoomError> {
        if self.players.remove(&player_id).is_none() {
            return Err(RoomError::NotInRoom(player_id, self.id));
        }
        info!(
            room_id = %self.id,
            %player_id,
            players = self.players.len(),
            "player left"
        );

        if self.players.is_empty() {
            if self.state != RoomState::LobbyVoting {
                info!(room_id = %self.id, "room emptied, back to lobby");
            }
            self.state = RoomState::LobbyVoting;
            self.started_with = 0;
            return Ok(Vec::new());
        }

        let mut out = vec![self.update_room()];
        match self.state {
            RoomState::LobbyVoting => out.extend(self.check_start()),
            RoomState::InProgress => out.extend(self.check_winner()),
            RoomState::GameOver => {}
        }
        Ok(out)
    }

    /// Flips the player's ready vote and starts the round once every seated
    /// player is ready.
    pub fn toggle_ready(&mut self, player_id: PlayerId) -> Outbound {
        if !self.state.is_voting() {
            debug!(room_id = %self.id, %player_id, state = %self.state, "ready vote rejected");
            return vec![reject(
                player_id,
                RoomError::InvalidState {
                    action: "voting ready",
                    state: self.state,
                },
            )];
        }
        let Some(player) = self.players.get_mut(&player_id) else {
            return vec![reject(player_id, RoomError::NotInRoom(player_id, self.id))];
        };
        player.is_ready = !player.is_ready;
        debug!(room_id = %self.id, %player_id, ready = player.is_ready, "ready toggled");

        let mut out = vec![self.update_room()];
        out.extend(self.check_start());
        out
    }

    /// Fires the player's launcher bubble.
    ///
    /// Shots from players without a seat, eliminated players, or players
    /// with a bubble already in flight are dropped without a reply. The
    /// result shows up in the next tick's `gameStateUpdate`.
    pub fn shoot(&mut self, player_id: PlayerId, angle: f64) -> Outbound {
        if !self.state.is_active() {
            debug!(room_id = %self.id, %player_id, state = %self.state, "shot rejected");
            return vec![reject(
                player_id,
                RoomError::InvalidState {
                    action: "shooting",
                    state: self.state,
                },
            )];
        }
        let fired = self
            .players
            .get_mut(&player_id)
            .is_some_and(|p| p.launch(angle, &self.game));
        if fired {
            trace!(room_id = %self.id, %player_id, angle, "shot fired");
        } else {
            debug!(room_id = %self.id, %player_id, "shot ignored");
        }
        Vec::new()
    }

    /// Advances every projectile by one step, announces eliminations,
    /// then runs the win check.
    ///
    /// No-op unless a round is in progress.
    pub fn tick(&mut self) -> Outbound {
        if !self.state.is_active() {
            return Vec::new();
        }

        let mut out = Vec::new();
        for player in self.players.values_mut() {
            let Some(outcome) = player.step(&self.game, &mut self.rng) else {
                continue;
            };
            if outcome.eliminated {
                info!(
                    room_id = %self.id,
                    player_id = %player.id,
                    score = player.score,
                    "player eliminated"
                );
                out.push((
                    Recipient::All,
                    ServerEvent::PlayerEliminated {
                        player_id: player.id,
                    },
                ));
            }
        }

        out.push((
            Recipient::All,
            ServerEvent::GameStateUpdate(self.snapshot()),
        ));
        out.extend(self.check_winner());
        out
    }

    /// Ends the game-over grace period: ready votes cleared, everyone
    /// alive again, boards kept for display.
    ///
    /// No-op outside `GAME_OVER`.
    pub fn finish_grace(&mut self) -> Outbound {
        if self.state != RoomState::GameOver {
            return Vec::new();
        }
        for player in self.players.values_mut() {
            player.is_ready = false;
            player.is_alive = true;
            player.projectile = None;
        }
        self.state = RoomState::LobbyVoting;
        self.started_with = 0;
        info!(room_id = %self.id, "back to lobby");
        vec![self.update_room()]
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id,
            name: self.name.clone(),
            state: self.state,
            capacity: self.capacity,
            players: self.players.values().map(PlayerSession::snapshot).collect(),
        }
    }

    pub fn info(&self) -> RoomListEntry {
        RoomListEntry {
            id: self.id,
            name: self.name.clone(),
            state: self.state,
            player_count: self.players.len(),
            capacity: self.capacity,
        }
    }

    fn update_room(&self) -> (Recipient, ServerEvent) {
        (Recipient::All, ServerEvent::UpdateRoom(self.snapshot()))
    }

    fn check_start(&mut self) -> Outbound {
        let all_ready = !self.players.is_empty()
            && self.players.values().all(|p| p.is_ready);
        if !self.state.is_voting() || !all_ready {
            return Vec::new();
        }

        for player in self.players.values_mut() {
            player.reset_for_round(&self.game, &mut self.rng);
        }
        self.started_with = self.players.len();
        self.state = RoomState::InProgress;
        info!(room_id = %self.id, players = self.started_with, "round started");
        vec![(Recipient::All, ServerEvent::GameStarted(self.snapshot()))]
    }

    fn check_winner(&mut self) -> Outbound {
        if !self.state.is_active() {
            return Vec::new();
        }
        let alive: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| p.is_alive)
            .map(|p| p.id)
            .collect();
        let over = if self.started_with > 1 {
            alive.len() <= 1
        } else {
            alive.is_empty()
        };
        if !over {
            return Vec::new();
        }

        let winner = match alive[..] {
            [survivor] if self.started_with > 1 => Some(survivor),
            _ => None,
        };
        for player in self.players.values_mut() {
            player.projectile = None;
        }
        self.state = RoomState::GameOver;
        info!(
            room_id = %self.id,
            winner = ?winner,
            "round over"
        );
        vec![(Recipient::All, ServerEvent::GameOver { winner })]
    }
}

fn reject(player_id: PlayerId, err: RoomError) -> (Recipient, ServerEvent) {
    (Recipient::Player(player_id), ServerEvent::Error(err.to_string()))
}
