use crate::Pos2;
use std::time::Duration;

/// Values a driver feeds into the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Pixels per cell along both axes
    pub cell_size: u32,
    /// Delay between generations while running
    pub interval: Duration,
    /// Whether [`Grid::step`](crate::Grid::step) treats the grid as a torus
    pub wrap: bool,
    /// Whether generations are computed with [`Grid::step_parallel`](crate::Grid::step_parallel)
    pub parallel: bool,
}

impl Settings {
    pub const DEFAULT_CELL_SIZE: u32 = 10;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(120);

    /// The cell under pixel `(px, py)`
    #[inline]
    pub fn cell_at_pixel(&self, px: i32, py: i32) -> Pos2 {
        Pos2::from_pixel(px, py, self.cell_size)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cell_size: Self::DEFAULT_CELL_SIZE,
            interval: Self::DEFAULT_INTERVAL,
            wrap: false,
            parallel: false,
        }
    }
}
