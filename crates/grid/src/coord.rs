//! Coordinates, grid configuration and the grid metric.

use std::fmt;

/// Discrete grid coordinate.
///
/// On square grids `(x, y)` are column and row. On hex grids the same pair is
/// read as axial `(q, r)` with pointy-top layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shifts the coordinate, saturating at the edges of `i32`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Component-wise difference `self - other`, saturating at the edges of
    /// `i32`.
    pub const fn delta(self, other: Coord) -> (i32, i32) {
        (self.x.saturating_sub(other.x), self.y.saturating_sub(other.y))
    }

    /// Exact component-wise difference.
    const fn wide_delta(self, other: Coord) -> (i64, i64) {
        (self.x as i64 - other.x as i64, self.y as i64 - other.y as i64)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Cell shape of a combat grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridKind {
    #[default]
    Square,
    Hex,
}

/// Diagonal movement rule for square grids. Ignored on hex grids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagonalRule {
    /// Diagonal steps cost the same as orthogonal ones.
    #[default]
    Chebyshev,
    /// No diagonal steps.
    Manhattan,
}

/// Immutable per-combat grid configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    pub kind: GridKind,
    pub diagonal: DiagonalRule,
    /// Edge length of one cell in feet.
    pub cell_size: u32,
}

impl GridConfig {
    pub const DEFAULT_CELL_SIZE: u32 = 5;

    pub const fn square() -> Self {
        Self {
            kind: GridKind::Square,
            diagonal: DiagonalRule::Chebyshev,
            cell_size: Self::DEFAULT_CELL_SIZE,
        }
    }

    pub const fn hex() -> Self {
        Self {
            kind: GridKind::Hex,
            diagonal: DiagonalRule::Chebyshev,
            cell_size: Self::DEFAULT_CELL_SIZE,
        }
    }

    pub const fn with_diagonal(mut self, diagonal: DiagonalRule) -> Self {
        self.diagonal = diagonal;
        self
    }

    pub const fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Converts a distance in feet to whole cells (rounded down).
    pub fn feet_to_cells(&self, feet: u32) -> u32 {
        if self.cell_size == 0 {
            return 0;
        }
        feet / self.cell_size
    }

    /// Grid distance under this configuration's metric.
    pub fn distance(&self, a: Coord, b: Coord) -> u32 {
        distance(self, a, b)
    }

    /// Neighbouring coordinates in a fixed, deterministic order.
    pub fn neighbors(&self, c: Coord) -> impl Iterator<Item = Coord> + use<> {
        let steps: &'static [(i32, i32)] = match (self.kind, self.diagonal) {
            (GridKind::Square, DiagonalRule::Chebyshev) => &SQUARE_STEPS,
            (GridKind::Square, DiagonalRule::Manhattan) => &SQUARE_STEPS[..4],
            (GridKind::Hex, _) => &HEX_STEPS,
        };
        steps.iter().map(move |&(dx, dy)| c.offset(dx, dy))
    }

    /// Returns true if `a` and `b` are distinct neighbouring cells.
    pub fn is_adjacent(&self, a: Coord, b: Coord) -> bool {
        a != b && self.neighbors(a).any(|n| n == b)
    }

    /// Planar position of a cell center in cell units, used by angular tests.
    pub fn center(&self, c: Coord) -> (f64, f64) {
        match self.kind {
            GridKind::Square => (c.x as f64, c.y as f64),
            GridKind::Hex => (
                c.x as f64 + c.y as f64 / 2.0,
                c.y as f64 * (3.0_f64).sqrt() / 2.0,
            ),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::square()
    }
}

// Orthogonal steps first so Manhattan can slice them off.
const SQUARE_STEPS: [(i32, i32); 8] = [
    (1, 0),
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

const HEX_STEPS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Distance between two cells under the grid's own metric.
///
/// - Square + Chebyshev: `max(|dx|, |dy|)`
/// - Square + Manhattan: `|dx| + |dy|`
/// - Hex (axial): `(|dq| + |dr| + |dq + dr|) / 2`
///
/// Distances too long for a `u32` saturate.
pub fn distance(config: &GridConfig, a: Coord, b: Coord) -> u32 {
    let (dx, dy) = a.wide_delta(b);
    let cells = match (config.kind, config.diagonal) {
        (GridKind::Square, DiagonalRule::Chebyshev) => dx.abs().max(dy.abs()),
        (GridKind::Square, DiagonalRule::Manhattan) => dx.abs() + dy.abs(),
        (GridKind::Hex, _) => hex_distance(dx, dy),
    };
    saturate(cells)
}

/// Heuristic used to break ties between equal-cost frontier nodes:
/// Manhattan on square grids, axial distance on hex grids.
pub(crate) fn tie_break_distance(config: &GridConfig, a: Coord, b: Coord) -> u32 {
    let (dx, dy) = a.wide_delta(b);
    saturate(match config.kind {
        GridKind::Square => dx.abs() + dy.abs(),
        GridKind::Hex => hex_distance(dx, dy),
    })
}

fn hex_distance(dq: i64, dr: i64) -> i64 {
    (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
}

fn saturate(cells: i64) -> u32 {
    u32::try_from(cells).unwrap_or(u32::MAX)
}
