mod rule;
mod step;

use crate::Pos2;
use rand::Rng;

/// Probability of a cell being alive after [`Grid::randomize_default`]
pub const DEFAULT_DENSITY: f64 = 0.2;

/// A rectangular matrix of live/dead cells
///
/// Cells are stored row-major, `row * columns + column`. Both dimensions are
/// always at least one and the backing storage always holds exactly
/// `columns * rows` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    columns: usize,
    rows: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Creates an all-dead grid, clamping both dimensions to at least one
    pub fn new(columns: usize, rows: usize) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            cells: vec![false; columns * rows],
        }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }
    /// Total number of cells, `columns * rows`
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    /// Whether no cell is alive
    #[inline]
    pub fn all_dead(&self) -> bool {
        !self.cells.contains(&true)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.columns && y < self.rows).then(|| y * self.columns + x)
    }

    /// Whether the cell at `(x, y)` is alive
    ///
    /// Any coordinate outside the grid reads as dead.
    #[inline]
    pub fn cell_at(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.cells[i])
    }

    /// Flips the cell at `(x, y)`, ignoring out-of-bounds coordinates
    pub fn toggle(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = !self.cells[i];
        }
    }

    /// Writes the cell at `(x, y)`, ignoring out-of-bounds coordinates
    pub fn set(&mut self, x: i32, y: i32, alive: bool) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = alive;
        }
    }

    /// Kills every cell
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Changes the dimensions, keeping the overlapping top-left rectangle
    ///
    /// Both dimensions are clamped to at least one. Cells that fall outside the
    /// new bounds are dropped and newly exposed cells are dead.
    pub fn resize(&mut self, columns: usize, rows: usize) {
        let columns = columns.max(1);
        let rows = rows.max(1);
        if columns == self.columns && rows == self.rows {
            return;
        }

        let mut cells = vec![false; columns * rows];
        let keep = self.columns.min(columns);
        for y in 0..self.rows.min(rows) {
            let src = y * self.columns;
            let dst = y * columns;
            cells[dst..dst + keep].copy_from_slice(&self.cells[src..src + keep]);
        }

        self.columns = columns;
        self.rows = rows;
        self.cells = cells;
    }

    /// Sets each cell alive independently with probability `density`
    ///
    /// `density` is clamped to `[0, 1]`; NaN is treated as zero.
    pub fn randomize(&mut self, density: f64) {
        let density = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };

        let mut rng = rand::rng();
        for cell in &mut self.cells {
            *cell = rng.random_bool(density);
        }
    }

    /// [`Grid::randomize`] with [`DEFAULT_DENSITY`]
    pub fn randomize_default(&mut self) {
        self.randomize(DEFAULT_DENSITY);
    }

    #[inline]
    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Iterates live cells in row-major order
    pub fn alive(&self) -> impl Iterator<Item = Pos2> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(i, _)| Pos2::from_row_major(i, self.columns))
    }
}
