//! Hexagonal-offset bubble grid.
//!
//! The board is a `rows × cols` rectangle. Odd rows are shifted right by
//! one radius, which gives every interior cell six neighbors:
//!
//! ```text
//! row 0:  ( )( )( )( )
//! row 1:    ( )( )( )( )
//! row 2:  ( )( )( )( )
//! ```

use bubblebrawl_protocol::Color;
use rand::Rng;

use crate::GameConfig;

/// A `(row, col)` coordinate.
pub type Cell = (usize, usize);

/// Neighbor offsets `(d_row, d_col)` for even rows.
const EVEN_ROW_OFFSETS: [(isize, isize); 6] =
    [(-1, -1), (-1, 0), (0, -1), (0, 1), (1, -1), (1, 0)];

/// Neighbor offsets `(d_row, d_col)` for odd (shifted) rows.
const ODD_ROW_OFFSETS: [(isize, isize); 6] =
    [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, 1)];

/// A bubble resting in a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bubble {
    pub row: usize,
    pub col: usize,
    pub color: Color,
}

/// One player's board.
///
/// Cells are only written through [`Grid::place`], so a bubble's
/// `row`/`col` always match the cell that holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Bubble>>,
}

impl Grid {
    /// A board with every cell empty.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// A fresh round board: each cell of the top `initial_rows` rows holds
    /// a random color with probability `fill_probability`.
    pub fn initial(config: &GameConfig, rng: &mut impl Rng) -> Self {
        let mut grid = Self::empty(config.rows, config.cols);
        for row in 0..config.initial_rows.min(config.rows) {
            for col in 0..config.cols {
                if rng.random_bool(config.fill_probability) {
                    grid.place(row, col, random_color(rng));
                }
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// The bubble at `(row, col)`, if any.
    pub fn get(&self, row: usize, col: usize) -> Option<&Bubble> {
        self.index(row, col).and_then(|i| self.cells[i].as_ref())
    }

    pub fn color_at(&self, row: usize, col: usize) -> Option<Color> {
        self.get(row, col).map(|b| b.color)
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some()
    }

    /// Puts a bubble into an empty in-bounds cell. Returns `false` (and
    /// leaves the grid untouched) otherwise.
    pub fn place(&mut self, row: usize, col: usize, color: Color) -> bool {
        match self.index(row, col) {
            Some(i) if self.cells[i].is_none() => {
                self.cells[i] = Some(Bubble { row, col, color });
                true
            }
            _ => false,
        }
    }

    /// Empties a cell, returning what it held.
    pub fn remove(&mut self, row: usize, col: usize) -> Option<Bubble> {
        let i = self.index(row, col)?;
        self.cells[i].take()
    }

    /// In-bounds neighbors of a cell, using the parity offset table.
    pub fn neighbors(
        &self,
        row: usize,
        col: usize,
    ) -> impl Iterator<Item = Cell> + '_ {
        let offsets = if row % 2 == 0 {
            &EVEN_ROW_OFFSETS
        } else {
            &ODD_ROW_OFFSETS
        };
        offsets.iter().filter_map(move |&(dr, dc)| {
            let r = row.checked_add_signed(dr)?;
            let c = col.checked_add_signed(dc)?;
            (r < self.rows && c < self.cols).then_some((r, c))
        })
    }

    /// Every resting bubble, row by row.
    pub fn bubbles(&self) -> impl Iterator<Item = &Bubble> {
        self.cells.iter().flatten()
    }

    /// Every coordinate of the board, row by row.
    pub fn coords(&self) -> impl Iterator<Item = Cell> + use<> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |r| (0..cols).map(move |c| (r, c)))
    }

    /// Whether any cell in `row` holds a bubble.
    pub fn row_occupied(&self, row: usize) -> bool {
        (0..self.cols).any(|col| self.is_occupied(row, col))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Colors as nested rows, for snapshots.
    pub fn to_color_rows(&self) -> Vec<Vec<Option<Color>>> {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| row.iter().map(|b| b.map(|b| b.color)).collect())
            .collect()
    }
}

/// Canvas-space center of a cell.
pub fn cell_center(row: usize, col: usize, radius: f64) -> (f64, f64) {
    let stagger = if row % 2 == 1 { radius } else { 0.0 };
    let x = radius + col as f64 * radius * 2.0 + stagger;
    let y = radius + row as f64 * radius * 2.0 * 0.866;
    (x, y)
}

/// A uniformly random palette entry.
pub(crate) fn random_color(rng: &mut impl Rng) -> Color {
    Color::ALL[rng.random_range(0..Color::ALL.len())]
}
