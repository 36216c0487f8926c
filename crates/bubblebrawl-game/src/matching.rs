//! Cluster matching and avalanche resolution.
//!
//! After a projectile snaps into the grid the room runs, in order:
//!
//! 1. [`resolve_match`] — pop the same-color cluster around the new bubble
//!    if it has at least [`MIN_MATCH`] members.
//! 2. [`avalanche`] — drop every bubble that lost its path to row 0.
//!
//! The order matters: clearing a cluster is what disconnects the bubbles
//! hanging below it.

use std::collections::{HashSet, VecDeque};

use crate::{Cell, Grid};

/// Smallest cluster that pops.
pub const MIN_MATCH: usize = 3;

/// Points per matched bubble and per avalanche step.
const POINTS_PER_BUBBLE: u64 = 10;

/// The connected same-color component containing `(row, col)`.
///
/// Breadth-first over [`Grid::neighbors`]. Returns an empty set for an
/// empty origin cell.
pub fn cluster(grid: &Grid, row: usize, col: usize) -> HashSet<Cell> {
    let mut visited = HashSet::new();
    let Some(color) = grid.color_at(row, col) else {
        return visited;
    };

    let mut queue = VecDeque::new();
    visited.insert((row, col));
    queue.push_back((row, col));

    while let Some((r, c)) = queue.pop_front() {
        for (nr, nc) in grid.neighbors(r, c) {
            if grid.color_at(nr, nc) == Some(color) && visited.insert((nr, nc)) {
                queue.push_back((nr, nc));
            }
        }
    }
    visited
}

/// Pops the cluster at `(row, col)` if it is large enough.
///
/// Returns how many bubbles were removed (0 when nothing matched).
pub fn resolve_match(grid: &mut Grid, row: usize, col: usize) -> usize {
    let members = cluster(grid, row, col);
    if members.len() < MIN_MATCH {
        return 0;
    }
    for &(r, c) in &members {
        grid.remove(r, c);
    }
    members.len()
}

/// Every occupied cell with a path of occupied neighbors to row 0.
pub fn ceiling_connected(grid: &Grid) -> HashSet<Cell> {
    let mut supported = HashSet::new();
    let mut queue: VecDeque<Cell> = (0..grid.cols())
        .filter(|&col| grid.is_occupied(0, col))
        .map(|col| (0, col))
        .collect();
    supported.extend(queue.iter().copied());

    while let Some((r, c)) = queue.pop_front() {
        for (nr, nc) in grid.neighbors(r, c) {
            if grid.is_occupied(nr, nc) && supported.insert((nr, nc)) {
                queue.push_back((nr, nc));
            }
        }
    }
    supported
}

/// Removes every floating bubble and returns how many fell.
pub fn avalanche(grid: &mut Grid) -> usize {
    let supported = ceiling_connected(grid);
    let floating: Vec<Cell> = grid
        .bubbles()
        .map(|b| (b.row, b.col))
        .filter(|cell| !supported.contains(cell))
        .collect();
    for &(r, c) in &floating {
        grid.remove(r, c);
    }
    floating.len()
}

/// Points for a shot: `10·matched + 10·avalanche²`.
pub fn score(matched: usize, avalanche: usize) -> u64 {
    let m = matched as u64;
    let a = avalanche as u64;
    POINTS_PER_BUBBLE * m + POINTS_PER_BUBBLE * a * a
}
