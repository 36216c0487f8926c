//! Bubbles in flight: launch, integration, wall bounces, collision, and
//! snap-cell search.

use std::f64::consts::{PI, TAU};

use bubblebrawl_protocol::{Color, ProjectileSnapshot};

use crate::{cell_center, Cell, GameConfig, Grid};

/// Shots must leave the launcher at least this far (radians) above the
/// horizontal.
const MIN_ELEVATION: f64 = 0.05;

/// A bubble travelling across the canvas. Velocity is per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub color: Color,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

/// Normalizes an angle to `(-π, π]` and clamps it into the upward cone.
///
/// Canvas y grows downward, so "up" is negative.
pub fn clamp_angle(angle: f64) -> f64 {
    let mut a = angle.rem_euclid(TAU);
    if a > PI {
        a -= TAU;
    }
    if a > 0.0 {
        // Pointing downward: keep the horizontal side it was aimed at.
        a = if a > PI / 2.0 { -PI } else { 0.0 };
    }
    a.clamp(-PI + MIN_ELEVATION, -MIN_ELEVATION)
}

impl Projectile {
    /// A projectile leaving the launch point at `angle` (radians).
    pub fn launch(color: Color, angle: f64, config: &GameConfig) -> Self {
        let angle = clamp_angle(angle);
        let speed = config.speed();
        let (x, y) = config.launch_point();
        Self {
            color,
            x,
            y,
            vx: speed * angle.cos(),
            vy: speed * angle.sin(),
        }
    }

    /// Moves one tick forward, bouncing off the side walls.
    ///
    /// Returns `true` if a wall was hit. On a hit the position is clamped
    /// to the wall and `vx` points back into the field, so one crossing
    /// flips the direction exactly once.
    pub fn advance(&mut self, config: &GameConfig) -> bool {
        self.x += self.vx;
        self.y += self.vy;

        let min_x = config.radius;
        let max_x = config.canvas_width() - config.radius;
        if self.x < min_x {
            self.x = min_x;
            self.vx = self.vx.abs();
            true
        } else if self.x > max_x {
            self.x = max_x;
            self.vx = -self.vx.abs();
            true
        } else {
            false
        }
    }

    /// Whether the projectile touched the ceiling or a resting bubble.
    pub fn collides(&self, grid: &Grid, config: &GameConfig) -> bool {
        if self.y - config.radius <= 0.0 {
            return true;
        }
        let reach = config.collision_distance();
        grid.bubbles().any(|b| {
            let (cx, cy) = cell_center(b.row, b.col, config.radius);
            (cx - self.x).hypot(cy - self.y) < reach
        })
    }

    pub fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            x: self.x,
            y: self.y,
            color: self.color,
        }
    }
}

/// The empty, supported cell closest to `(x, y)`.
///
/// A cell is supported if it is in row 0 or touches an occupied cell.
/// `None` only when no such cell exists.
pub fn best_snap_spot(
    grid: &Grid,
    x: f64,
    y: f64,
    radius: f64,
) -> Option<Cell> {
    grid.coords()
        .filter(|&(r, c)| !grid.is_occupied(r, c))
        .filter(|&(r, c)| {
            r == 0 || grid.neighbors(r, c).any(|(nr, nc)| grid.is_occupied(nr, nc))
        })
        .map(|(r, c)| {
            let (cx, cy) = cell_center(r, c, radius);
            ((r, c), (cx - x).hypot(cy - y))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(cell, _)| cell)
}
