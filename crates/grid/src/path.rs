//! Footprint-aware A* pathfinding.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::coord::{Coord, tie_break_distance};
use crate::footprint::Footprint;
use crate::grid::Grid;

/// A movement path: ordered anchor positions (start included) and the total
/// movement cost of the steps after the start.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    pub cells: Vec<Coord>,
    pub cost: u32,
}

impl Path {
    pub fn start(&self) -> Option<Coord> {
        self.cells.first().copied()
    }

    pub fn destination(&self) -> Option<Coord> {
        self.cells.last().copied()
    }

    /// Number of steps taken (cells entered).
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }
}

/// Frontier entry ordered by `(f, tie-break heuristic, coordinate)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Frontier {
    f: u32,
    tie: u32,
    at: Coord,
    g: u32,
}

/// Finds the cheapest path for a footprint from `start` to `goal`.
///
/// Each step is priced by the highest cost multiplier under the footprint.
/// At every step the whole footprint must be on walkable cells that
/// `is_occupied` reports as free (the caller excludes the moving token
/// itself). Returns `None` when the goal is unreachable or costs more than
/// `budget`.
///
/// Determinism: equal `f` scores are expanded in order of the
/// Manhattan/axial distance to the goal, then by coordinate.
pub fn find_path<F>(
    grid: &Grid,
    start: Coord,
    goal: Coord,
    footprint: Footprint,
    budget: u32,
    is_occupied: F,
) -> Option<Path>
where
    F: Fn(Coord) -> bool,
{
    let config = *grid.config();
    if !grid.contains(start) || !grid.footprint_fits(goal, footprint, &is_occupied) {
        return None;
    }
    if start == goal {
        return Some(Path {
            cells: vec![start],
            cost: 0,
        });
    }

    let mut open = BinaryHeap::new();
    let mut best: HashMap<Coord, u32> = HashMap::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();

    best.insert(start, 0);
    open.push(Reverse(Frontier {
        f: config.distance(start, goal),
        tie: tie_break_distance(&config, start, goal),
        at: start,
        g: 0,
    }));

    while let Some(Reverse(node)) = open.pop() {
        if best.get(&node.at).is_some_and(|&g| node.g > g) {
            continue;
        }
        if node.at == goal {
            return Some(Path {
                cells: reconstruct(&came_from, start, goal),
                cost: node.g,
            });
        }

        for next in config.neighbors(node.at) {
            if !grid.footprint_fits(next, footprint, &is_occupied) {
                continue;
            }
            let Some(step) = grid.entry_cost(next, footprint) else {
                continue;
            };
            let g = node.g + step;
            if g > budget {
                continue;
            }
            if best.get(&next).is_none_or(|&known| g < known) {
                best.insert(next, g);
                came_from.insert(next, node.at);
                open.push(Reverse(Frontier {
                    f: g + config.distance(next, goal),
                    tie: tie_break_distance(&config, next, goal),
                    at: next,
                    g,
                }));
            }
        }
    }

    None
}

fn reconstruct(came_from: &HashMap<Coord, Coord>, start: Coord, goal: Coord) -> Vec<Coord> {
    let mut cells = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(&previous) => {
                cells.push(previous);
                current = previous;
            }
            None => break,
        }
    }
    cells.reverse();
    cells
}

/// Key of a memoized path query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathQuery {
    pub start: Coord,
    pub goal: Coord,
    pub footprint: Footprint,
    pub budget: u32,
}

/// Memo of path queries for one combat.
///
/// Entries are only valid for the board revision they were computed
/// against; asking with a different revision drops everything. Callers bump
/// the revision whenever terrain or token placement changes.
#[derive(Debug, Default)]
pub struct PathCache {
    revision: u64,
    capacity: usize,
    entries: HashMap<PathQuery, Option<Path>>,
}

impl PathCache {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            revision: 0,
            capacity: capacity.max(1),
            entries: HashMap::new(),
        }
    }

    /// Returns the cached answer for `query` at `revision`, computing and
    /// storing it on a miss.
    pub fn get_or_compute<C>(&mut self, revision: u64, query: PathQuery, compute: C) -> Option<Path>
    where
        C: FnOnce(&PathQuery) -> Option<Path>,
    {
        if revision != self.revision {
            self.entries.clear();
            self.revision = revision;
        }
        if let Some(hit) = self.entries.get(&query) {
            return hit.clone();
        }
        if self.entries.len() >= self.capacity {
            self.entries.clear();
        }
        let path = compute(&query);
        self.entries.insert(query, path.clone());
        path
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
