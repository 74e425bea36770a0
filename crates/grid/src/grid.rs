//! Bounded combat grid with per-cell terrain.

use std::collections::{BTreeMap, BTreeSet};

use crate::cell::Cell;
use crate::coord::{Coord, GridConfig};
use crate::footprint::Footprint;

/// Width and height of a grid in cells.
///
/// Hex grids use the same bounds on axial coordinates, which yields a
/// rhombus-shaped board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as i64) < self.width as i64 && (c.y as i64) < self.height as i64
    }
}

/// Combat grid: configuration, bounds and terrain.
///
/// Terrain is stored sparsely; cells without an explicit entry are open
/// floor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    config: GridConfig,
    dimensions: Dimensions,
    terrain: BTreeMap<Coord, Cell>,
}

impl Grid {
    pub fn new(config: GridConfig, dimensions: Dimensions) -> Self {
        Self {
            config,
            dimensions,
            terrain: BTreeMap::new(),
        }
    }

    /// Square grid of open floor with the default configuration.
    pub fn square(width: u32, height: u32) -> Self {
        Self::new(GridConfig::square(), Dimensions::new(width, height))
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.dimensions.contains(c)
    }

    /// Terrain at `c`, or `None` outside the grid.
    pub fn cell(&self, c: Coord) -> Option<Cell> {
        if !self.contains(c) {
            return None;
        }
        Some(self.terrain.get(&c).copied().unwrap_or_default())
    }

    /// Replaces the terrain at `c`. Returns false if `c` is out of bounds.
    pub fn set_cell(&mut self, c: Coord, cell: Cell) -> bool {
        if !self.contains(c) {
            return false;
        }
        if cell == Cell::FLOOR {
            self.terrain.remove(&c);
        } else {
            self.terrain.insert(c, cell);
        }
        true
    }

    pub fn with_cell(mut self, c: Coord, cell: Cell) -> Self {
        self.set_cell(c, cell);
        self
    }

    /// Cells that differ from open floor, in coordinate order.
    pub fn terrain(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        self.terrain.iter().map(|(&c, &cell)| (c, cell))
    }

    pub fn is_walkable(&self, c: Coord) -> bool {
        self.cell(c).is_some_and(|cell| cell.walkable)
    }

    /// Every coordinate inside the bounds, in lexicographic order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let Dimensions { width, height } = self.dimensions;
        (0..width as i32).flat_map(move |x| (0..height as i32).map(move |y| Coord::new(x, y)))
    }

    /// Returns true if the footprint anchored at `anchor` lies on walkable,
    /// unoccupied cells.
    pub fn footprint_fits<F>(&self, anchor: Coord, footprint: Footprint, is_occupied: F) -> bool
    where
        F: Fn(Coord) -> bool,
    {
        footprint
            .cells(&self.config, anchor)
            .into_iter()
            .all(|c| self.is_walkable(c) && !is_occupied(c))
    }

    /// Cost of entering `anchor` with the given footprint: the highest cost
    /// multiplier among the covered cells.
    pub fn entry_cost(&self, anchor: Coord, footprint: Footprint) -> Option<u32> {
        footprint
            .cells(&self.config, anchor)
            .into_iter()
            .map(|c| self.cell(c).map(|cell| cell.step_cost()))
            .try_fold(1, |acc, cost| cost.map(|cost| acc.max(cost)))
    }

    /// Validates a movement path and returns its cost.
    ///
    /// The path starts at the token's current anchor. Every following step
    /// must be adjacent to the previous one and the footprint must fit at
    /// each step. Returns `None` for an illegal path.
    pub fn path_cost<F>(&self, path: &[Coord], footprint: Footprint, is_occupied: F) -> Option<u32>
    where
        F: Fn(Coord) -> bool,
    {
        let (first, rest) = path.split_first()?;
        if !self.contains(*first) {
            return None;
        }

        let mut previous = *first;
        let mut total = 0u32;
        for &step in rest {
            if !self.config.is_adjacent(previous, step) {
                return None;
            }
            if !self.footprint_fits(step, footprint, &is_occupied) {
                return None;
            }
            total = total.checked_add(self.entry_cost(step, footprint)?)?;
            previous = step;
        }
        Some(total)
    }

    /// Drops cells outside the grid.
    pub fn clip(&self, cells: BTreeSet<Coord>) -> BTreeSet<Coord> {
        cells.into_iter().filter(|&c| self.contains(c)).collect()
    }
}
