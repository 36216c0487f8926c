//! Per-player round state: board, bubble queue, score, and the shot in
//! flight.

use bubblebrawl_protocol::{Color, PlayerId, PlayerSnapshot};
use rand::Rng;
use tracing::{debug, trace};

use crate::grid::random_color;
use crate::matching::{self, avalanche, resolve_match};
use crate::{best_snap_spot, Cell, GameConfig, Grid, Projectile};

/// What happened when a projectile came to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShotOutcome {
    /// Where the bubble snapped, or `None` if it was discarded.
    pub cell: Option<Cell>,
    /// Bubbles popped by the match (0 if the cluster was too small).
    pub matched: usize,
    /// Bubbles that fell after the match.
    pub avalanche: usize,
    /// Points awarded for this shot.
    pub points: u64,
    /// The shot pushed the board into the game-over row.
    pub eliminated: bool,
}

/// One seated player.
///
/// A session is created on join and lives until the player leaves. It
/// starts sitting out (`is_alive == false`, empty board) and is brought
/// into play by [`PlayerSession::reset_for_round`].
#[derive(Debug, Clone)]
pub struct PlayerSession {
    pub id: PlayerId,
    pub name: String,
    pub is_ready: bool,
    pub is_alive: bool,
    pub score: u64,
    pub level: u32,
    pub grid: Grid,
    /// The bubble about to be fired. Empty only while a shot is in flight.
    pub launcher: Option<Color>,
    /// The bubble queued behind the launcher.
    pub next: Option<Color>,
    pub projectile: Option<Projectile>,
}

impl PlayerSession {
    pub fn new(id: PlayerId, name: String, config: &GameConfig) -> Self {
        Self {
            id,
            name,
            is_ready: false,
            is_alive: false,
            score: 0,
            level: 1,
            grid: Grid::empty(config.rows, config.cols),
            launcher: None,
            next: None,
            projectile: None,
        }
    }

    /// Deals a fresh board and queue for a new round.
    pub fn reset_for_round(&mut self, config: &GameConfig, rng: &mut impl Rng) {
        self.grid = Grid::initial(config, rng);
        self.score = 0;
        self.level = 1;
        self.launcher = Some(random_color(rng));
        self.next = Some(random_color(rng));
        self.projectile = None;
        self.is_alive = true;
    }

    /// Whether a shoot intent would be accepted right now.
    pub fn can_shoot(&self) -> bool {
        self.is_alive && self.projectile.is_none() && self.launcher.is_some()
    }

    /// Fires the launcher bubble. Returns `false` and changes nothing if
    /// the player cannot shoot.
    pub fn launch(&mut self, angle: f64, config: &GameConfig) -> bool {
        if !self.can_shoot() {
            return false;
        }
        let Some(color) = self.launcher.take() else {
            return false;
        };
        self.projectile = Some(Projectile::launch(color, angle, config));
        true
    }

    /// Advances the in-flight projectile by one tick and resolves it on
    /// collision.
    pub fn step(
        &mut self,
        config: &GameConfig,
        rng: &mut impl Rng,
    ) -> Option<ShotOutcome> {
        let projectile = self.projectile.as_mut()?;
        projectile.advance(config);
        if !projectile.collides(&self.grid, config) {
            return None;
        }
        Some(self.resolve_shot(config, rng))
    }

    /// Snaps the projectile into the grid and settles the board: match,
    /// avalanche, score, queue refill, elimination check.
    ///
    /// With no projectile in flight this is a no-op returning the default
    /// outcome.
    pub fn resolve_shot(
        &mut self,
        config: &GameConfig,
        rng: &mut impl Rng,
    ) -> ShotOutcome {
        let Some(projectile) = self.projectile.take() else {
            return ShotOutcome::default();
        };

        let mut outcome = ShotOutcome::default();
        match best_snap_spot(&self.grid, projectile.x, projectile.y, config.radius)
        {
            Some((row, col)) => {
                self.grid.place(row, col, projectile.color);
                outcome.cell = Some((row, col));
                outcome.matched = resolve_match(&mut self.grid, row, col);
                if outcome.matched > 0 {
                    outcome.avalanche = avalanche(&mut self.grid);
                }
                outcome.points = matching::score(outcome.matched, outcome.avalanche);
            }
            None => {
                debug!(
                    player_id = %self.id,
                    x = projectile.x,
                    y = projectile.y,
                    "no snap spot, discarding bubble"
                );
            }
        }

        self.score += outcome.points;
        self.level = level_for(self.score, config);
        self.launcher = self.next.take().or_else(|| Some(random_color(rng)));
        self.next = Some(random_color(rng));

        if self.grid.row_occupied(config.game_over_row) {
            self.is_alive = false;
            outcome.eliminated = true;
        }

        trace!(
            player_id = %self.id,
            matched = outcome.matched,
            avalanche = outcome.avalanche,
            points = outcome.points,
            "shot resolved"
        );
        outcome
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            is_ready: self.is_ready,
            is_alive: self.is_alive,
            score: self.score,
            level: self.level,
            grid: self.grid.to_color_rows(),
            launcher: self.launcher,
            next: self.next,
            projectile: self.projectile.as_ref().map(Projectile::snapshot),
        }
    }
}

fn level_for(score: u64, config: &GameConfig) -> u32 {
    let steps = score / config.points_per_level.max(1);
    u32::try_from(steps).unwrap_or(u32::MAX - 1).saturating_add(1)
}
