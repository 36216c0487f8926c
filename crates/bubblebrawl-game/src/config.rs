//! Board geometry and physics constants.

use serde::{Deserialize, Serialize};

/// Vertical distance between hex rows, as a multiple of the diameter.
const ROW_PITCH_RATIO: f64 = 0.866;

/// Largest per-tick step, as a fraction of the collision distance. Keeps
/// a shot from jumping over a bubble between two ticks.
const MAX_STEP_RATIO: f64 = 0.5;

/// Configuration shared by every board in a room.
///
/// All lengths are in canvas pixels; velocities are pixels per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid rows.
    pub rows: usize,
    /// Grid columns (every row has the same count).
    pub cols: usize,
    /// Bubble radius.
    pub radius: f64,
    /// How many top rows are seeded at round start.
    pub initial_rows: usize,
    /// Chance that a seeded cell holds a bubble.
    pub fill_probability: f64,
    /// Projectile speed per tick, as a fraction of the radius.
    pub speed_factor: f64,
    /// A projectile collides with a bubble closer than
    /// `collision_factor · radius`.
    pub collision_factor: f64,
    /// Any bubble resting in this row eliminates its owner.
    pub game_over_row: usize,
    /// Score needed per level step.
    pub points_per_level: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 13,
            cols: 8,
            radius: 20.0,
            initial_rows: 5,
            fill_probability: 0.4,
            speed_factor: 0.5,
            collision_factor: 1.8,
            game_over_row: 12,
            points_per_level: 1000,
        }
    }
}

impl GameConfig {
    /// Fix any out-of-range values so the config is safe to use.
    ///
    /// - `rows`/`cols` at least 1, `radius` positive
    /// - `initial_rows` ≤ `rows`, `game_over_row` < `rows`
    /// - `fill_probability` clamped to `0.0..=1.0`
    /// - `speed_factor`/`collision_factor` finite and positive, and a
    ///   step no longer than half the collision distance
    /// - `points_per_level` at least 1
    pub fn validated(mut self) -> Self {
        self.rows = self.rows.max(1);
        self.cols = self.cols.max(1);
        if !(self.radius.is_finite() && self.radius > 0.0) {
            tracing::warn!(radius = self.radius, "invalid radius, using default");
            self.radius = Self::default().radius;
        }
        self.initial_rows = self.initial_rows.min(self.rows);
        self.game_over_row = self.game_over_row.min(self.rows - 1);
        self.fill_probability = if self.fill_probability.is_finite() {
            self.fill_probability.clamp(0.0, 1.0)
        } else {
            Self::default().fill_probability
        };
        if !(self.collision_factor.is_finite() && self.collision_factor > 0.0) {
            tracing::warn!(
                collision_factor = self.collision_factor,
                "invalid collision_factor, using default"
            );
            self.collision_factor = Self::default().collision_factor;
        }
        if !(self.speed_factor.is_finite() && self.speed_factor > 0.0) {
            tracing::warn!(
                speed_factor = self.speed_factor,
                "invalid speed_factor, using default"
            );
            self.speed_factor = Self::default().speed_factor;
        }
        let max_speed = self.collision_factor * MAX_STEP_RATIO;
        if self.speed_factor > max_speed {
            tracing::warn!(
                speed_factor = self.speed_factor,
                max = max_speed,
                "speed_factor too high, capping"
            );
            self.speed_factor = max_speed;
        }
        self.points_per_level = self.points_per_level.max(1);
        self
    }

    /// Vertical step between row centers.
    pub fn row_pitch(&self) -> f64 {
        self.radius * 2.0 * ROW_PITCH_RATIO
    }

    /// Width of the playfield: every column plus the odd-row stagger.
    pub fn canvas_width(&self) -> f64 {
        2.0 * self.radius * self.cols as f64 + self.radius
    }

    /// Height of the playfield, leaving room below the grid for the
    /// launcher.
    pub fn canvas_height(&self) -> f64 {
        self.radius
            + self.rows.saturating_sub(1) as f64 * self.row_pitch()
            + 4.0 * self.radius
    }

    /// Bottom-center point every shot starts from.
    pub fn launch_point(&self) -> (f64, f64) {
        (self.canvas_width() / 2.0, self.canvas_height() - self.radius)
    }

    /// Projectile speed in pixels per tick.
    pub fn speed(&self) -> f64 {
        self.speed_factor * self.radius
    }

    /// Distance below which a projectile touches a resting bubble.
    pub fn collision_distance(&self) -> f64 {
        self.collision_factor * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.canvas_width(), 340.0);
        assert!((cfg.row_pitch() - 34.64).abs() < 1e-9);
        let (x, y) = cfg.launch_point();
        assert_eq!(x, 170.0);
        assert!(y > cfg.radius + 12.0 * cfg.row_pitch());
        assert_eq!(cfg.speed(), 10.0);
    }

    #[test]
    fn test_validated_clamps_out_of_range_values() {
        let cfg = GameConfig {
            rows: 4,
            initial_rows: 9,
            game_over_row: 20,
            fill_probability: 3.0,
            points_per_level: 0,
            radius: -1.0,
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(cfg.initial_rows, 4);
        assert_eq!(cfg.game_over_row, 3);
        assert_eq!(cfg.fill_probability, 1.0);
        assert_eq!(cfg.points_per_level, 1);
        assert_eq!(cfg.radius, 20.0);
    }

    #[test]
    fn test_validated_resets_stalled_physics() {
        let cfg = GameConfig {
            speed_factor: 0.0,
            collision_factor: f64::NAN,
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(cfg.speed_factor, 0.5);
        assert_eq!(cfg.collision_factor, 1.8);

        let cfg = GameConfig {
            speed_factor: -2.0,
            collision_factor: -1.0,
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(cfg.speed_factor, 0.5);
        assert_eq!(cfg.collision_factor, 1.8);
    }

    #[test]
    fn test_validated_caps_speed_below_collision_distance() {
        let cfg = GameConfig {
            speed_factor: 5.0,
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(cfg.speed_factor, 0.9);
        assert!(cfg.speed() < cfg.collision_distance());

        let cfg = GameConfig {
            speed_factor: 0.3,
            collision_factor: 0.4,
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(cfg.speed_factor, 0.2);
    }

    #[test]
    fn test_deserializes_partial_table() {
        let cfg: GameConfig =
            serde_json::from_str(r#"{"rows": 10, "radius": 16.0}"#).unwrap();
        assert_eq!(cfg.rows, 10);
        assert_eq!(cfg.radius, 16.0);
        assert_eq!(cfg.cols, 8);
    }
}
