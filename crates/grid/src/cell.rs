//! Terrain attributes attached to grid cells.

/// Degree of cover a cell provides to anything behind it.
///
/// Ordered from least to most protective so the highest cover along a line
/// can be taken with `max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoverType {
    #[default]
    None,
    Half,
    ThreeQuarters,
    /// Blocks targeting entirely.
    Full,
}

impl CoverType {
    /// Standard armor-class bonus granted by this cover. Full cover has no
    /// bonus because it forbids targeting.
    pub const fn ac_bonus(self) -> i32 {
        match self {
            CoverType::None | CoverType::Full => 0,
            CoverType::Half => 2,
            CoverType::ThreeQuarters => 5,
        }
    }

    pub const fn blocks(self) -> bool {
        matches!(self, CoverType::Full)
    }
}

/// Terrain of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub walkable: bool,
    /// Movement cost multiplier (1 = normal, 2 = difficult terrain).
    pub cost: u8,
    pub cover: CoverType,
    pub elevation: i16,
}

impl Cell {
    /// Open, level floor.
    pub const FLOOR: Self = Self {
        walkable: true,
        cost: 1,
        cover: CoverType::None,
        elevation: 0,
    };

    /// Solid wall: impassable and blocks sight.
    pub const WALL: Self = Self {
        walkable: false,
        cost: 1,
        cover: CoverType::Full,
        elevation: 0,
    };

    pub const fn difficult() -> Self {
        Self {
            cost: 2,
            ..Self::FLOOR
        }
    }

    /// Impassable obstacle granting the given cover (a low wall, a boulder).
    pub const fn obstacle(cover: CoverType) -> Self {
        Self {
            walkable: false,
            cost: 1,
            cover,
            elevation: 0,
        }
    }

    pub const fn with_elevation(mut self, elevation: i16) -> Self {
        self.elevation = elevation;
        self
    }

    /// Cost multiplier clamped to at least 1 so A* stays admissible.
    pub fn step_cost(&self) -> u32 {
        self.cost.max(1) as u32
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::FLOOR
    }
}
