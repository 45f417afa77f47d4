use std::sync::OnceLock;

/// Every combination of a cell and its eight neighbors
const NEIGHBORHOODS: usize = 1 << 9;
/// Bit of the center cell within a neighborhood index
pub(super) const CENTER: usize = 0b000_010_000;

type RuleTable = [bool; NEIGHBORHOODS];

/// Next-state table shared by every [`Grid::step`](super::Grid::step) call
pub(super) fn rule_table() -> &'static RuleTable {
    static TABLE: OnceLock<RuleTable> = OnceLock::new();
    TABLE.get_or_init(generate_rule_table)
}

/// Maps a packed 3x3 neighborhood to the B3/S23 next state of its center
///
/// Bit `3 * row + column` of the index holds the sample at that position,
/// so [`CENTER`] is bit 4. On a wrapped grid narrower than three cells the
/// same cell can fill several positions, and each position counts on its
/// own.
fn generate_rule_table() -> RuleTable {
    let mut table = [false; NEIGHBORHOODS];
    for (i, next) in table.iter_mut().enumerate() {
        let neighbors = (i & !CENTER).count_ones();
        let alive = i & CENTER != 0;
        *next = matches!((alive, neighbors), (true, 2) | (_, 3));
    }
    table
}
