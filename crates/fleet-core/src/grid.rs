//! Grid geometry: integer cells, map bounds, and continuous positions.
//!
//! Vehicles move through continuous `Point` space but route over integer
//! `GridPos` cells.  `Point::cell()` rounds to the nearest cell, so a vehicle
//! sitting exactly on a waypoint maps back to that waypoint.

use std::fmt;

// ── GridPos ──────────────────────────────────────────────────────────────────

/// An integer grid cell.  Signed so neighbour arithmetic never underflows;
/// bounds checks live on `GridBounds`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Straight-line distance in cells.
    #[inline]
    pub fn euclidean(self, other: GridPos) -> f32 {
        self.to_point().distance(other.to_point())
    }

    /// The four orthogonal neighbours, in E/W/S/N order.  May lie outside the
    /// map; callers filter with `GridBounds::contains`.
    #[inline]
    pub fn neighbors4(self) -> [GridPos; 4] {
        [
            GridPos::new(self.x + 1, self.y),
            GridPos::new(self.x - 1, self.y),
            GridPos::new(self.x, self.y + 1),
            GridPos::new(self.x, self.y - 1),
        ]
    }

    /// `true` when `other` is exactly one orthogonal step away.
    #[inline]
    pub fn is_adjacent(self, other: GridPos) -> bool {
        self.manhattan(other) == 1
    }

    #[inline]
    pub fn to_point(self) -> Point {
        Point::new(self.x as f32, self.y as f32)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── GridBounds ───────────────────────────────────────────────────────────────

/// Map extent.  Valid cells are `0 <= x < width`, `0 <= y < height`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    pub width:  u32,
    pub height: u32,
}

impl GridBounds {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn contains(&self, p: GridPos) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height
    }

    /// Row-major flat index, or `None` when `p` is outside the map.
    #[inline]
    pub fn index(&self, p: GridPos) -> Option<usize> {
        self.contains(p)
            .then(|| p.y as usize * self.width as usize + p.x as usize)
    }

    /// Inverse of `index`.  The caller guarantees `idx < cell_count()`.
    #[inline]
    pub fn pos_at(&self, idx: usize) -> GridPos {
        let w = self.width as usize;
        GridPos::new((idx % w) as i32, (idx / w) as i32)
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Clamp a possibly out-of-range cell onto the map edge.
    pub fn clamp(&self, p: GridPos) -> GridPos {
        GridPos::new(
            p.x.clamp(0, self.width as i32 - 1),
            p.y.clamp(0, self.height as i32 - 1),
        )
    }
}

// ── Point ────────────────────────────────────────────────────────────────────

/// Continuous position in cell units.  `f32` is plenty for a map a few
/// hundred cells across.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Nearest integer cell.
    #[inline]
    pub fn cell(self) -> GridPos {
        GridPos::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<GridPos> for Point {
    fn from(p: GridPos) -> Self {
        p.to_point()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
