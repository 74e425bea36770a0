//! Token footprints: the block of cells a token occupies.

use crate::coord::{Coord, GridConfig, GridKind};

/// Footprint of a token, measured in cells per side.
///
/// On square grids a footprint of size `n` covers the `n × n` block whose
/// lowest corner is the anchor. On hex grids it covers every hex within
/// `n - 1` steps of the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Footprint {
    size: u8,
}

impl Footprint {
    pub const SINGLE: Self = Self { size: 1 };

    /// Creates a footprint; a size of zero is treated as one cell.
    pub const fn new(size: u8) -> Self {
        Self {
            size: if size == 0 { 1 } else { size },
        }
    }

    pub const fn size(self) -> u8 {
        self.size
    }

    /// Cells covered when anchored at `anchor`, in lexicographic order.
    pub fn cells(self, config: &GridConfig, anchor: Coord) -> Vec<Coord> {
        let n = self.size as i32;
        let mut cells = Vec::with_capacity((n * n) as usize);
        match config.kind {
            GridKind::Square => {
                for dx in 0..n {
                    for dy in 0..n {
                        cells.push(anchor.offset(dx, dy));
                    }
                }
            }
            GridKind::Hex => {
                let radius = n - 1;
                for dq in -radius..=radius {
                    for dr in (-radius).max(-dq - radius)..=radius.min(-dq + radius) {
                        cells.push(anchor.offset(dq, dr));
                    }
                }
            }
        }
        cells.sort();
        cells
    }

    /// Smallest grid distance between any cell of two placed footprints.
    pub fn distance_between(
        config: &GridConfig,
        a: (Coord, Footprint),
        b: (Coord, Footprint),
    ) -> u32 {
        let b_cells = b.1.cells(config, b.0);
        a.1.cells(config, a.0)
            .into_iter()
            .flat_map(|ca| b_cells.iter().map(move |&cb| config.distance(ca, cb)))
            .min()
            .unwrap_or(u32::MAX)
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::SINGLE
    }
}
