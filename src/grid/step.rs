use super::{Grid, rule};
use rayon::prelude::*;

/// Maps an out-of-range neighbor coordinate onto the opposite edge
///
/// Neighbors are at most one cell away, so only `-1` and `max` need folding.
#[inline]
fn wrap_axis(v: i32, max: usize) -> i32 {
    if v < 0 {
        max as i32 - 1
    } else if v as usize >= max {
        0
    } else {
        v
    }
}

impl Grid {
    /// Packs the 3x3 neighborhood centered on `(x, y)` into a rule table index
    fn neighborhood(&self, x: i32, y: i32, wrap: bool) -> usize {
        let mut index = 0;
        let mut bit = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = if wrap {
                    (wrap_axis(x + dx, self.columns), wrap_axis(y + dy, self.rows))
                } else {
                    (x + dx, y + dy)
                };
                if self.cell_at(nx, ny) {
                    index |= 1 << bit;
                }
                bit += 1;
            }
        }
        index
    }

    fn next_row(&self, y: usize, row: &mut [bool], wrap: bool) {
        let table = rule::rule_table();
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = table[self.neighborhood(x as i32, y as i32, wrap)];
        }
    }

    fn next_blank(&self) -> Grid {
        Grid {
            columns: self.columns,
            rows: self.rows,
            cells: vec![false; self.cells.len()],
        }
    }

    /// Computes the next generation, leaving `self` untouched
    ///
    /// With `wrap` the grid is a torus; otherwise everything beyond the edges
    /// is dead.
    pub fn step(&self, wrap: bool) -> Grid {
        let mut next = self.next_blank();
        for (y, row) in next.cells.chunks_mut(self.columns).enumerate() {
            self.next_row(y, row, wrap);
        }
        next
    }

    /// Same as [`Grid::step`], computing rows on the rayon thread pool
    pub fn step_parallel(&self, wrap: bool) -> Grid {
        let mut next = self.next_blank();
        next.cells
            .par_chunks_mut(self.columns)
            .enumerate()
            .for_each(|(y, row)| self.next_row(y, row, wrap));
        next
    }
}
