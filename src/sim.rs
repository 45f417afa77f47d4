use crate::{
    Grid, LifeConfig, Settings,
    codec::{self, DecodeOutcome},
};

/// The grid a driver owns, together with its settings
///
/// Every mutation and every generation goes through here, so a single lock
/// around a [`Simulation`] serializes a UI thread against a [`Runner`](crate::Runner).
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    settings: Settings,
    generation: u64,
}

impl Simulation {
    pub fn new(grid: Grid, settings: Settings) -> Self {
        Self {
            grid,
            settings,
            generation: 0,
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    #[inline]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
    #[inline]
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resizes the grid only if the dimensions differ
    ///
    /// Returns whether a resize happened.
    pub fn ensure_size(&mut self, columns: usize, rows: usize) -> bool {
        if self.grid.columns() == columns.max(1) && self.grid.rows() == rows.max(1) {
            return false;
        }
        self.grid.resize(columns, rows);
        true
    }

    /// Toggles the cell under a pixel position
    pub fn toggle_at_pixel(&mut self, px: i32, py: i32) {
        let cell = self.settings.cell_at_pixel(px, py);
        self.grid.toggle(cell.x, cell.y);
    }

    /// Replaces the grid with its next generation
    pub fn step(&mut self) {
        let wrap = self.settings.wrap;
        self.grid = if self.settings.parallel {
            self.grid.step_parallel(wrap)
        } else {
            self.grid.step(wrap)
        };
        self.generation += 1;
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    pub fn randomize(&mut self) {
        self.grid.randomize_default();
    }

    pub fn export(&self) -> LifeConfig {
        codec::encode(&self.grid)
    }

    /// Replaces the grid with a decoded document
    ///
    /// The generation counter restarts unless the document is rejected.
    pub fn import(&mut self, config: &LifeConfig) -> DecodeOutcome {
        let outcome = codec::decode_into(config, &mut self.grid);
        if outcome.changed() {
            self.generation = 0;
        }
        outcome
    }
}
