use std::{
    cmp::Ordering,
    ops::{Add, Sub},
};

/// A cell (or pixel) coordinate
///
/// Coordinates are signed so that positions left of or above a grid can be
/// expressed; the grid treats those as dead rather than rejecting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos2 {
    pub x: i32,
    pub y: i32,
}
impl Pos2 {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
    #[inline]
    pub fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// The position of the `index`-th cell of a row-major sequence
    #[inline]
    pub fn from_row_major(index: usize, columns: usize) -> Self {
        Self {
            x: (index % columns) as i32,
            y: (index / columns) as i32,
        }
    }

    /// Translates a pixel position to the cell containing it
    ///
    /// Uses floor division so that pixels just left of or above the origin land
    /// on cell `-1` instead of being folded onto cell `0`.
    #[inline]
    pub fn from_pixel(px: i32, py: i32, cell_size: u32) -> Self {
        let size = cell_size.max(1) as i32;
        Self {
            x: px.div_euclid(size),
            y: py.div_euclid(size),
        }
    }
}
impl Default for Pos2 {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}
impl PartialOrd for Pos2 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Pos2 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        // row-major: y first, then x
        Ord::cmp(&self.y, &other.y).then(Ord::cmp(&self.x, &other.x))
    }
}
impl Add for Pos2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}
impl Sub for Pos2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
