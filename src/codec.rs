//! Compact word-level encoding of a [`Grid`]
//!
//! Cells are packed row-major into words of [`WORD_BITS`] bits each, and runs
//! of identical words are collapsed into `(value, count)` pairs. The width is
//! 31, not 32: bit 31 of a word is never written, and documents saved with that
//! layout must keep decoding exactly.

use crate::{Grid, Pos2};
use log::debug;
use serde::{Deserialize, Serialize};
use std::iter;

/// Number of cell bits carried by one word
pub const WORD_BITS: usize = 31;

/// Largest grid, in cells, a document may describe
///
/// Larger documents are rejected before anything is allocated.
pub const MAX_CELLS: usize = 1 << 26;

/// Number of words needed to hold `cells` bits
#[inline]
pub fn word_count(cells: usize) -> usize {
    cells.div_ceil(WORD_BITS)
}

/// A serializable grid snapshot
///
/// Field names follow the document layout already found on disk (`Columns`,
/// `Rows`, `Compressed`, `Data`); lowercase spellings are accepted on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifeConfig {
    #[serde(default, alias = "columns")]
    pub columns: i32,
    #[serde(default, alias = "rows")]
    pub rows: i32,
    /// Run-length encoded words, `[v0, c0, v1, c1, ...]`
    #[serde(
        rename = "Compressed",
        alias = "compressed",
        alias = "encodedCells",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub encoded_cells: Option<Vec<i32>>,
    /// Legacy cell data: either literal words or run-length pairs
    #[serde(default, alias = "data", skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<i32>>,
}

/// What [`decode_into`] did to the target grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Non-positive dimensions or more than [`MAX_CELLS`] cells; the grid was
    /// not touched
    Rejected,
    /// The grid took the new dimensions but no cell data was usable
    Empty,
    /// The grid took the new dimensions and the cells were restored
    Restored,
}
impl DecodeOutcome {
    /// Whether the grid changed and observers should redraw
    #[inline]
    pub fn changed(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Packs the grid into words, `ceil(len / 31)` of them
pub fn pack_words(grid: &Grid) -> Vec<i32> {
    let mut words = vec![0i32; word_count(grid.len())];
    for Pos2 { x, y } in grid.alive() {
        let i = y as usize * grid.columns() + x as usize;
        words[i / WORD_BITS] |= 1 << (i % WORD_BITS);
    }
    words
}

/// Collapses consecutive identical words into flat `(value, count)` pairs
pub fn run_length(words: &[i32]) -> Vec<i32> {
    let mut pairs = Vec::new();
    for run in words.chunk_by(|a, b| a == b) {
        pairs.push(run[0]);
        pairs.push(run.len() as i32);
    }
    pairs
}

/// Expands flat `(value, count)` pairs; non-positive counts yield nothing and
/// a trailing unpaired value is ignored
fn expand_pairs(pairs: &[i32]) -> impl Iterator<Item = i32> + '_ {
    pairs
        .chunks_exact(2)
        .flat_map(|pair| iter::repeat_n(pair[0], pair[1].max(0) as usize))
}

/// Sum of the counts of flat `(value, count)` pairs, negatives floored at zero
fn pairs_len(pairs: &[i32]) -> u64 {
    pairs
        .chunks_exact(2)
        .map(|pair| pair[1].max(0) as u64)
        .sum()
}

/// Where the cell words of a document come from
enum WordSource<'a> {
    Pairs(&'a [i32]),
    Literal(&'a [i32]),
    Nothing,
}
impl<'a> WordSource<'a> {
    fn select(config: &'a LifeConfig, expected: usize) -> Self {
        if let Some(pairs) = config.encoded_cells.as_deref().filter(|c| c.len() >= 2) {
            debug!("decoding {} compressed values", pairs.len());
            return Self::Pairs(pairs);
        }

        let Some(data) = config.data.as_deref() else {
            debug!("document has no cell data");
            return Self::Nothing;
        };
        if data.len() == expected {
            debug!("decoding {} literal words", data.len());
            Self::Literal(data)
        } else if data.len() % 2 == 0 && pairs_len(data) == expected as u64 {
            debug!("decoding {} legacy run-length values", data.len());
            Self::Pairs(data)
        } else {
            debug!(
                "discarding {} data values, expected {} words",
                data.len(),
                expected
            );
            Self::Nothing
        }
    }

    fn words(self) -> Option<Box<dyn Iterator<Item = i32> + 'a>> {
        match self {
            Self::Pairs(pairs) => Some(Box::new(expand_pairs(pairs))),
            Self::Literal(words) => Some(Box::new(words.iter().copied())),
            Self::Nothing => None,
        }
    }
}

/// Snapshots `grid`
pub fn encode(grid: &Grid) -> LifeConfig {
    LifeConfig {
        columns: i32::try_from(grid.columns()).unwrap_or(i32::MAX),
        rows: i32::try_from(grid.rows()).unwrap_or(i32::MAX),
        encoded_cells: Some(run_length(&pack_words(grid))),
        data: None,
    }
}

/// Restores `config` into `grid`
///
/// A document with a non-positive dimension, or one describing more than
/// [`MAX_CELLS`] cells, leaves the grid as it was.
/// Otherwise the grid is resized to the document's dimensions and cleared, and
/// then filled from the first usable cell source. No more than
/// `columns * rows` cells are ever written, whatever the stream holds.
pub fn decode_into(config: &LifeConfig, grid: &mut Grid) -> DecodeOutcome {
    if config.columns <= 0 || config.rows <= 0 {
        debug!(
            "rejecting document with dimensions {}x{}",
            config.columns, config.rows
        );
        return DecodeOutcome::Rejected;
    }
    let (columns, rows) = (config.columns as usize, config.rows as usize);
    if columns.checked_mul(rows).is_none_or(|cells| cells > MAX_CELLS) {
        debug!("rejecting {}x{} document, over {} cells", columns, rows, MAX_CELLS);
        return DecodeOutcome::Rejected;
    }

    grid.resize(columns, rows);
    grid.clear();

    let total = grid.len();
    let Some(words) = WordSource::select(config, word_count(total)).words() else {
        return DecodeOutcome::Empty;
    };

    let columns = grid.columns();
    let bits = words
        .flat_map(|word| (0..WORD_BITS).map(move |bit| (word >> bit) & 1 == 1))
        .take(total);
    for (i, alive) in bits.enumerate() {
        if alive {
            let Pos2 { x, y } = Pos2::from_row_major(i, columns);
            grid.set(x, y, true);
        }
    }
    DecodeOutcome::Restored
}

/// Decodes `config` into a new grid, or `None` if the document is rejected
pub fn decode(config: &LifeConfig) -> Option<Grid> {
    let mut grid = Grid::new(1, 1);
    decode_into(config, &mut grid).changed().then_some(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(columns: i32, rows: i32) -> LifeConfig {
        LifeConfig {
            columns,
            rows,
            ..Default::default()
        }
    }

    fn random_grid(columns: usize, rows: usize, density: f64) -> Grid {
        let mut grid = Grid::new(columns, rows);
        grid.randomize(density);
        grid
    }

    #[test]
    fn word_count_rounds_up() {
        assert_eq!(word_count(0), 0);
        assert_eq!(word_count(1), 1);
        assert_eq!(word_count(31), 1);
        assert_eq!(word_count(32), 2);
        assert_eq!(word_count(62), 2);
        assert_eq!(word_count(63), 3);
    }

    #[test]
    fn packs_31_bits_per_word() {
        let mut grid = Grid::new(32, 1);
        grid.set(0, 0, true);
        grid.set(30, 0, true);
        grid.set(31, 0, true);

        assert_eq!(pack_words(&grid), vec![1 | (1 << 30), 1]);
    }

    #[test]
    fn full_grid_never_sets_bit_31() {
        let grid = random_grid(10, 10, 1.0);
        let words = pack_words(&grid);

        assert_eq!(words.len(), 4);
        assert!(words.iter().all(|&w| w >= 0));
        assert_eq!(&words[..3], &[i32::MAX; 3]);
        // 100 - 93 = 7 cells in the last word
        assert_eq!(words[3], 0b111_1111);
    }

    #[test]
    fn run_length_collapses_repeats() {
        assert_eq!(run_length(&[]), Vec::<i32>::new());
        assert_eq!(run_length(&[5]), vec![5, 1]);
        assert_eq!(run_length(&[0, 0, 0, 7, 7, 0]), vec![0, 3, 7, 2, 0, 1]);
    }

    #[test]
    fn encode_writes_compressed_field() {
        let grid = Grid::new(40, 40);
        let config = encode(&grid);

        assert_eq!((config.columns, config.rows), (40, 40));
        assert_eq!(config.encoded_cells, Some(vec![0, 52]));
        assert_eq!(config.data, None);
    }

    #[test]
    fn round_trip_preserves_cells() {
        let shapes = [(1, 1), (3, 3), (31, 1), (1, 31), (7, 5), (33, 17), (64, 48)];
        let densities = [0.0, 0.1, 0.5, 1.0];
        for (columns, rows) in shapes {
            for density in densities {
                let grid = random_grid(columns, rows, density);
                let decoded = decode(&encode(&grid));

                assert_eq!(decoded.as_ref(), Some(&grid), "{columns}x{rows} @ {density}");
            }
        }
    }

    #[test]
    fn literal_data_matches_compressed() {
        let grid = random_grid(23, 11, 0.4);
        let words = pack_words(&grid);

        let literal = LifeConfig {
            data: Some(words.clone()),
            ..config(23, 11)
        };
        let compressed = LifeConfig {
            encoded_cells: Some(run_length(&words)),
            ..config(23, 11)
        };

        assert_eq!(decode(&literal), decode(&compressed));
        assert_eq!(decode(&literal), Some(grid));
    }

    #[test]
    fn legacy_run_length_data_is_accepted() {
        let grid = random_grid(50, 50, 0.0);
        let words = pack_words(&grid);
        let pairs = run_length(&words);
        assert_ne!(pairs.len(), words.len());

        let legacy = LifeConfig {
            data: Some(pairs),
            ..config(50, 50)
        };
        let mut target = Grid::new(2, 2);
        assert_eq!(decode_into(&legacy, &mut target), DecodeOutcome::Restored);
        assert_eq!(target, grid);
    }

    #[test]
    fn legacy_run_length_with_wrong_sum_is_discarded() {
        // 10x10 needs 4 words; the pairs claim 5
        let legacy = LifeConfig {
            data: Some(vec![i32::MAX, 3, 1, 1, 0, 1]),
            ..config(10, 10)
        };
        let mut target = Grid::new(3, 3);
        target.set(0, 0, true);

        assert_eq!(decode_into(&legacy, &mut target), DecodeOutcome::Empty);
        assert_eq!((target.columns(), target.rows()), (10, 10));
        assert!(target.all_dead());
    }

    #[test]
    fn odd_or_missing_data_leaves_grid_empty() {
        for data in [None, Some(vec![1, 2, 3])] {
            let document = LifeConfig {
                data,
                ..config(10, 10)
            };
            let mut target = Grid::new(10, 10);
            target.randomize(1.0);

            assert_eq!(decode_into(&document, &mut target), DecodeOutcome::Empty);
            assert!(target.all_dead());
        }
    }

    #[test]
    fn compressed_takes_priority_over_data() {
        let document = LifeConfig {
            encoded_cells: Some(vec![1, 1]),
            data: Some(vec![0]),
            ..config(2, 2)
        };
        let grid = decode(&document).expect("decoded");

        assert!(grid.cell_at(0, 0));
        assert_eq!(grid.alive_count(), 1);
    }

    #[test]
    fn short_compressed_falls_back_to_data() {
        let document = LifeConfig {
            encoded_cells: Some(vec![9]),
            data: Some(vec![0b10]),
            ..config(2, 2)
        };
        let grid = decode(&document).expect("decoded");

        assert_eq!(grid.alive().collect::<Vec<_>>(), vec![Pos2::new(1, 0)]);
    }

    #[test]
    fn non_positive_counts_contribute_nothing() {
        // the first pair is skipped, so the second word lands first
        let document = LifeConfig {
            encoded_cells: Some(vec![i32::MAX, -4, 0b1, 1, 0b11, 0]),
            ..config(4, 1)
        };
        let grid = decode(&document).expect("decoded");

        assert_eq!(grid.alive().collect::<Vec<_>>(), vec![Pos2::new(0, 0)]);
    }

    #[test]
    fn trailing_bits_are_ignored() {
        // every bit set, but only 2x2 cells exist
        let document = LifeConfig {
            data: Some(vec![-1]),
            ..config(2, 2)
        };
        let grid = decode(&document).expect("decoded");

        assert_eq!(grid.len(), 4);
        assert_eq!(grid.alive_count(), 4);
    }

    #[test]
    fn huge_run_counts_stay_bounded() {
        let document = LifeConfig {
            encoded_cells: Some(vec![i32::MAX, i32::MAX]),
            ..config(3, 3)
        };
        let grid = decode(&document).expect("decoded");

        assert_eq!(grid.alive_count(), 9);
    }

    #[test]
    fn short_stream_leaves_rest_dead() {
        // 62 cells need 2 words; only the first is supplied
        let document = LifeConfig {
            encoded_cells: Some(vec![i32::MAX, 1]),
            ..config(62, 1)
        };
        let grid = decode(&document).expect("decoded");

        assert_eq!(grid.alive_count(), 31);
        assert!(grid.cell_at(30, 0));
        assert!(!grid.cell_at(31, 0));
    }

    #[test]
    fn non_positive_dimensions_are_rejected() {
        let mut target = Grid::new(6, 4);
        target.set(2, 2, true);
        let before = target.clone();

        for (columns, rows) in [(0, 4), (6, 0), (-1, 4), (6, -3)] {
            let document = LifeConfig {
                encoded_cells: Some(vec![i32::MAX, 1]),
                ..config(columns, rows)
            };
            let outcome = decode_into(&document, &mut target);

            assert_eq!(outcome, DecodeOutcome::Rejected);
            assert!(!outcome.changed());
            assert_eq!(target, before);
            assert_eq!(decode(&document), None);
        }
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let mut target = Grid::new(3, 3);
        target.set(1, 1, true);
        let before = target.clone();

        for (columns, rows) in [(i32::MAX, i32::MAX), (1 << 14, 1 << 13), (i32::MAX, 1)] {
            let document = LifeConfig {
                encoded_cells: Some(vec![0, 1]),
                ..config(columns, rows)
            };

            assert_eq!(decode_into(&document, &mut target), DecodeOutcome::Rejected);
            assert_eq!(target, before);
        }
    }

    #[test]
    fn largest_allowed_document_decodes() {
        // 8192 * 8192 is exactly the cap
        let document = LifeConfig {
            encoded_cells: Some(vec![1, 1]),
            ..config(1 << 13, 1 << 13)
        };
        let grid = decode(&document).expect("decoded");

        assert_eq!(grid.len(), MAX_CELLS);
        assert_eq!(grid.alive_count(), 1);
    }
}
