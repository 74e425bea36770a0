//! Grid geometry for tactical combat.
//!
//! `grid-math` owns everything spatial: coordinates and the per-grid metric,
//! terrain cells, token footprints, footprint-aware pathfinding, line of sight
//! with cover, and area-of-effect shapes. Nothing here knows about creatures
//! or turns; callers pass occupancy in as a predicate.
pub mod aoe;
pub mod cell;
pub mod coord;
pub mod footprint;
pub mod grid;
pub mod los;
pub mod path;

pub use aoe::{AreaShape, CONE_HALF_ANGLE, Direction, calculate_aoe, calculate_aoe_within};
pub use cell::{Cell, CoverType};
pub use coord::{Coord, DiagonalRule, GridConfig, GridKind, distance};
pub use footprint::Footprint;
pub use grid::{Dimensions, Grid};
pub use los::{Crossing, LineOfSight, check_line_of_sight, trace};
pub use path::{Path, PathCache, PathQuery, find_path};
