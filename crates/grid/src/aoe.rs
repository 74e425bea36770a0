//! Area-of-effect shape resolution.
//!
//! Shapes are resolved against the grid configuration, optionally limited to
//! the board's bounds. Callers decide which tokens are caught.

use std::collections::BTreeSet;

use crate::coord::{Coord, GridConfig, GridKind};
use crate::grid::Dimensions;

/// Half-angle of a cone: a cone is as wide at its end as it is long.
pub const CONE_HALF_ANGLE: f64 = 0.463_647_609_000_806_1; // atan(1/2)

const EPSILON: f64 = 1e-9;

/// Geometric shape of an area effect, sized in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AreaShape {
    /// Every cell within `radius` of the origin (sphere, circle, burst).
    Burst { radius: u32 },
    /// Cells within `length` whose bearing is within the cone half-angle of
    /// the direction. The origin cell is excluded.
    Cone { length: u32 },
    /// Cells along the direction up to `length`, `width` cells wide. The
    /// origin cell is excluded.
    Line { length: u32, width: u32 },
    /// Axis-aligned block with the origin as its corner, extending toward
    /// the direction's quadrant. On hex grids, a burst of half the side.
    Cube { side: u32 },
}

/// Aim of a directional shape as a grid vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl Direction {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Direction from `origin` toward `target`.
    pub const fn toward(origin: Coord, target: Coord) -> Self {
        Self::new(target.x.saturating_sub(origin.x), target.y.saturating_sub(origin.y))
    }

    pub const fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Resolves a shape to the set of affected cells.
///
/// Directional shapes (`Cone`, `Line`) without a usable direction resolve to
/// an empty set. The whole shape is enumerated, so callers holding a board
/// should prefer [`calculate_aoe_within`].
pub fn calculate_aoe(
    config: &GridConfig,
    shape: AreaShape,
    origin: Coord,
    direction: Option<Direction>,
) -> BTreeSet<Coord> {
    resolve(config, shape, origin, direction, None)
}

/// Like [`calculate_aoe`] but only visits cells inside `bounds`, so the work
/// is bounded by the board rather than by the shape's size.
pub fn calculate_aoe_within(
    config: &GridConfig,
    bounds: Dimensions,
    shape: AreaShape,
    origin: Coord,
    direction: Option<Direction>,
) -> BTreeSet<Coord> {
    resolve(config, shape, origin, direction, Some(bounds))
}

fn resolve(
    config: &GridConfig,
    shape: AreaShape,
    origin: Coord,
    direction: Option<Direction>,
    bounds: Option<Dimensions>,
) -> BTreeSet<Coord> {
    match shape {
        AreaShape::Burst { radius } => within(config, origin, radius, bounds).collect(),
        AreaShape::Cone { length } => match direction.filter(|d| !d.is_zero()) {
            Some(direction) => within(config, origin, length, bounds)
                .filter(|&c| c != origin)
                .filter(|&c| {
                    bearing_cosine(config, origin, c, direction) >= CONE_HALF_ANGLE.cos() - EPSILON
                })
                .collect(),
            None => BTreeSet::new(),
        },
        AreaShape::Line { length, width } => match direction.filter(|d| !d.is_zero()) {
            Some(direction) => {
                let half_width = width.max(1) as f64 / 2.0;
                within(config, origin, length, bounds)
                    .filter(|&c| c != origin)
                    .filter(|&c| {
                        let (along, across) = project(config, origin, c, direction);
                        along > EPSILON && across <= half_width + EPSILON
                    })
                    .collect()
            }
            None => BTreeSet::new(),
        },
        AreaShape::Cube { side } => match config.kind {
            GridKind::Square => {
                let direction = direction.unwrap_or(Direction::new(1, 1));
                let far = i64::from(side) - 1;
                let (x, y) = (i64::from(origin.x), i64::from(origin.y));
                let (min_x, max_x) = if direction.dx < 0 { (x - far, x) } else { (x, x + far) };
                let (min_y, max_y) = if direction.dy < 0 { (y - far, y) } else { (y, y + far) };
                Window { min_x, max_x, min_y, max_y }.clip_to(bounds).cells().collect()
            }
            GridKind::Hex => within(config, origin, side / 2, bounds).collect(),
        },
    }
}

/// Cells whose grid distance from `origin` is at most `radius`.
fn within(
    config: &GridConfig,
    origin: Coord,
    radius: u32,
    bounds: Option<Dimensions>,
) -> impl Iterator<Item = Coord> + '_ {
    Window::around(origin, radius)
        .clip_to(bounds)
        .cells()
        .filter(move |&c| config.distance(origin, c) <= radius)
}

/// Inclusive rectangle of candidate cells.
#[derive(Clone, Copy, Debug)]
struct Window {
    min_x: i64,
    max_x: i64,
    min_y: i64,
    max_y: i64,
}

impl Window {
    fn around(origin: Coord, reach: u32) -> Self {
        let reach = i64::from(reach);
        let (x, y) = (i64::from(origin.x), i64::from(origin.y));
        Self {
            min_x: x - reach,
            max_x: x + reach,
            min_y: y - reach,
            max_y: y + reach,
        }
    }

    /// Intersects with the board, or with the coordinate range when there is
    /// no board.
    fn clip_to(self, bounds: Option<Dimensions>) -> Self {
        let (low, high_x, high_y) = match bounds {
            Some(b) => (0, i64::from(b.width) - 1, i64::from(b.height) - 1),
            None => (i64::from(i32::MIN), i64::from(i32::MAX), i64::from(i32::MAX)),
        };
        Self {
            min_x: self.min_x.max(low),
            max_x: self.max_x.min(high_x),
            min_y: self.min_y.max(low),
            max_y: self.max_y.min(high_y),
        }
    }

    fn cells(self) -> impl Iterator<Item = Coord> {
        let Self { min_x, max_x, min_y, max_y } = self;
        (min_x..=max_x).flat_map(move |x| {
            (min_y..=max_y).map(move |y| Coord::new(x as i32, y as i32))
        })
    }
}

/// Cosine of the angle between `origin -> cell` and the direction.
fn bearing_cosine(config: &GridConfig, origin: Coord, cell: Coord, direction: Direction) -> f64 {
    let (vx, vy) = planar(config, origin, cell);
    let (dx, dy) = config.center(Coord::new(direction.dx, direction.dy));
    let norm = (vx.hypot(vy)) * (dx.hypot(dy));
    if norm < EPSILON {
        return -1.0;
    }
    (vx * dx + vy * dy) / norm
}

/// Distance of `cell` along and across the direction, in cell units.
fn project(config: &GridConfig, origin: Coord, cell: Coord, direction: Direction) -> (f64, f64) {
    let (vx, vy) = planar(config, origin, cell);
    let (dx, dy) = config.center(Coord::new(direction.dx, direction.dy));
    let length = dx.hypot(dy);
    ((vx * dx + vy * dy) / length, (vx * dy - vy * dx).abs() / length)
}

fn planar(config: &GridConfig, origin: Coord, cell: Coord) -> (f64, f64) {
    let (ox, oy) = config.center(origin);
    let (cx, cy) = config.center(cell);
    (cx - ox, cy - oy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::DiagonalRule;
    use crate::grid::Grid;

    #[test]
    fn burst_radius_two_is_five_by_five_block() {
        let config = GridConfig::square();
        let cells = calculate_aoe(&config, AreaShape::Burst { radius: 2 }, Coord::new(5, 5), None);
        assert_eq!(cells.len(), 25);
        for x in 3..=7 {
            for y in 3..=7 {
                assert!(cells.contains(&Coord::new(x, y)));
            }
        }
        assert!(cells.iter().all(|&c| config.distance(Coord::new(5, 5), c) <= 2));
    }

    #[test]
    fn burst_follows_metric() {
        let manhattan = GridConfig::square().with_diagonal(DiagonalRule::Manhattan);
        let diamond = calculate_aoe(&manhattan, AreaShape::Burst { radius: 1 }, Coord::ORIGIN, None);
        assert_eq!(diamond.len(), 5);

        let hex = calculate_aoe(&GridConfig::hex(), AreaShape::Burst { radius: 1 }, Coord::ORIGIN, None);
        assert_eq!(hex.len(), 7);
    }

    #[test]
    fn cone_widens_with_distance() {
        let config = GridConfig::square();
        let cells = calculate_aoe(
            &config,
            AreaShape::Cone { length: 3 },
            Coord::ORIGIN,
            Some(Direction::new(1, 0)),
        );
        let expected: BTreeSet<Coord> = [
            (1, 0),
            (2, -1),
            (2, 0),
            (2, 1),
            (3, -1),
            (3, 0),
            (3, 1),
        ]
        .into_iter()
        .map(Coord::from)
        .collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn line_runs_along_direction() {
        let config = GridConfig::square();
        let east = calculate_aoe(
            &config,
            AreaShape::Line { length: 4, width: 1 },
            Coord::new(2, 2),
            Some(Direction::new(1, 0)),
        );
        assert_eq!(
            east.into_iter().collect::<Vec<_>>(),
            vec![
                Coord::new(3, 2),
                Coord::new(4, 2),
                Coord::new(5, 2),
                Coord::new(6, 2)
            ]
        );

        let diagonal = calculate_aoe(
            &config,
            AreaShape::Line { length: 2, width: 1 },
            Coord::ORIGIN,
            Some(Direction::new(1, 1)),
        );
        assert_eq!(
            diagonal.into_iter().collect::<Vec<_>>(),
            vec![Coord::new(1, 1), Coord::new(2, 2)]
        );
    }

    #[test]
    fn cube_extends_toward_direction_quadrant() {
        let config = GridConfig::square();
        let cells = calculate_aoe(
            &config,
            AreaShape::Cube { side: 2 },
            Coord::new(4, 4),
            Some(Direction::new(-1, 1)),
        );
        let expected: BTreeSet<Coord> = [(4, 4), (3, 4), (4, 5), (3, 5)]
            .into_iter()
            .map(Coord::from)
            .collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn directional_shapes_need_a_direction() {
        let config = GridConfig::square();
        assert!(calculate_aoe(&config, AreaShape::Cone { length: 3 }, Coord::ORIGIN, None).is_empty());
        assert!(
            calculate_aoe(
                &config,
                AreaShape::Line { length: 3, width: 1 },
                Coord::ORIGIN,
                Some(Direction::new(0, 0))
            )
            .is_empty()
        );
    }

    #[test]
    fn clip_removes_cells_off_the_board() {
        let grid = Grid::square(3, 3);
        let cells = calculate_aoe(grid.config(), AreaShape::Burst { radius: 1 }, Coord::ORIGIN, None);
        assert_eq!(cells.len(), 9);
        assert_eq!(grid.clip(cells).len(), 4);
    }

    #[test]
    fn bounded_resolution_matches_clipping() {
        let grid = Grid::square(6, 4);
        let origin = Coord::new(1, 2);
        let shapes = [
            (AreaShape::Burst { radius: 2 }, None),
            (AreaShape::Cone { length: 4 }, Some(Direction::new(1, 0))),
            (AreaShape::Line { length: 5, width: 1 }, Some(Direction::new(-1, 1))),
            (AreaShape::Cube { side: 3 }, Some(Direction::new(-1, -1))),
        ];
        for (shape, direction) in shapes {
            let clipped = grid.clip(calculate_aoe(grid.config(), shape, origin, direction));
            let bounded = calculate_aoe_within(grid.config(), grid.dimensions(), shape, origin, direction);
            assert_eq!(bounded, clipped, "{shape:?}");
        }
    }

    #[test]
    fn huge_areas_only_visit_the_board() {
        let grid = Grid::square(10, 10);
        let burst = calculate_aoe_within(
            grid.config(),
            grid.dimensions(),
            AreaShape::Burst { radius: 40_000 },
            Coord::new(5, 5),
            None,
        );
        assert_eq!(burst.len(), 100);

        let cube = calculate_aoe_within(
            grid.config(),
            grid.dimensions(),
            AreaShape::Cube { side: u32::MAX },
            Coord::new(i32::MAX, i32::MAX),
            Some(Direction::new(-1, -1)),
        );
        assert_eq!(cube.len(), 100);

        let line = calculate_aoe_within(
            grid.config(),
            grid.dimensions(),
            AreaShape::Line { length: u32::MAX, width: u32::MAX },
            Coord::new(-3, 0),
            Some(Direction::new(1, 0)),
        );
        assert!(line.iter().all(|&c| grid.contains(c)));
    }
}
