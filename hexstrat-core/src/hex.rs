//! Hex grid geometry with axial coordinates
//!
//! Cells are pointy-top along the world Z axis. Directions and vertices are
//! numbered clockwise when viewed from above (+Y), vertex 0 pointing at +Z and
//! direction 0 crossing the edge between vertex 0 and vertex 1.

use std::ops::{Add, Mul, Sub};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::to_map2d;

/// Center-to-vertex distance of a cell (1 / sqrt(3))
pub const CIRCUMRADIUS: f32 = 0.577_350_26;

/// Z offset between two adjacent rows (sqrt(3) / 2)
pub const CELL_HEIGHT: f32 = 0.866_025_4;

/// Edge length of a cell; equal to the circumradius for a regular hexagon
pub const SIDE_LENGTH: f32 = CIRCUMRADIUS;

/// Vertex to opposite vertex
pub const LONG_DIAGONAL: f32 = 2.0 * CIRCUMRADIUS;

/// Direction vectors in axial coordinates (dq, dr)
/// Index: 0=N, 1=NE, 2=SE, 3=S, 4=SW, 5=NW
pub const DIRECTIONS: [(i32, i32); 6] = [
    (0, 1),   // N
    (1, 0),   // NE
    (1, -1),  // SE
    (0, -1),  // S
    (-1, 0),  // SW
    (-1, 1),  // NW
];

/// Signed turn count between an incoming and an outgoing direction.
/// Rows are the incoming direction, columns the outgoing one.
const TURNS: [[i32; 6]; 6] = [
    [0, 1, 2, 3, -2, -1],
    [-1, 0, 1, 2, 3, -2],
    [-2, -1, 0, 1, 2, 3],
    [3, -2, -1, 0, 1, 2],
    [2, 3, -2, -1, 0, 1],
    [1, 2, 3, -2, -1, 0],
];

// ============================================================================
// AXIAL / CUBE COORDINATES
// ============================================================================

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

/// Cube coordinates, always satisfying `x + y + z == 0`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cube {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Fractional cube position, e.g. a lerp between two cells
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FracCube {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Hex {
    pub const ORIGIN: Hex = Hex::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Derived third cube component
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    pub const fn to_cube(self) -> Cube {
        Cube {
            x: self.q,
            y: self.r,
            z: -self.q - self.r,
        }
    }

    /// Distance from the origin
    pub fn length(&self) -> i32 {
        (self.q.abs() + self.r.abs() + (self.q + self.r).abs()) / 2
    }

    /// Vancouver distance: minimum number of steps between two cells
    pub fn distance_to(&self, other: Hex) -> i32 {
        (*self - other).length()
    }

    /// Straight-line distance in lattice units. Visual use only.
    pub fn crow_distance(&self, other: Hex) -> f32 {
        let dq = (other.q - self.q) as f32;
        let dr = (other.r - self.r) as f32;
        (dq * dq + dr * dr + dq * dr).sqrt()
    }

    pub fn neighbor(&self, direction: Direction) -> Hex {
        *self + direction.offset()
    }

    pub fn neighbors(&self) -> [Hex; 6] {
        Direction::ALL.map(|d| self.neighbor(d))
    }

    /// Direction leading to an adjacent cell, `None` if `other` is not adjacent
    pub fn direction_to(&self, other: Hex) -> Option<Direction> {
        let delta = other - *self;
        Direction::ALL
            .into_iter()
            .find(|d| d.offset() == delta)
    }

    /// All cells within `range` of `center`, q-major then r-minor
    pub fn vancouver_square(center: Hex, range: u32) -> Vec<Hex> {
        let range = range as i32;
        let mut cells = Vec::with_capacity(vancouver_area(range as u32));
        for i in -range..=range {
            let lo = (-range).max(-i - range);
            let hi = range.min(-i + range);
            for j in lo..=hi {
                cells.push(center + Hex::new(i, j));
            }
        }
        cells
    }

    /// All cells exactly `range` away from `center`
    pub fn vancouver_ring(center: Hex, range: u32) -> Vec<Hex> {
        if range == 0 {
            return vec![center];
        }
        let range = range as i32;
        let mut cells = Vec::with_capacity(vancouver_circumference(range as u32));
        for side in 0..6 {
            let out = Direction::from_index(side).offset() * range;
            let along = Direction::from_index(side + 2).offset();
            for j in 0..range {
                cells.push(center + out + along * j);
            }
        }
        cells
    }

    /// Straight, traversable line of cells from `self` to `end`, both inclusive
    pub fn line_to(&self, end: Hex) -> Vec<Hex> {
        let steps = self.distance_to(end);
        if steps == 0 {
            return vec![*self];
        }
        // Nudge off the exact midpoints so ties resolve consistently.
        let a = FracCube::from(self.to_cube()).nudged();
        let b = FracCube::from(end.to_cube()).nudged();
        let mut line: Vec<Hex> = Vec::with_capacity(steps as usize + 1);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let cell = a.lerp(b, t).round().to_axial();
            if line.last() != Some(&cell) {
                line.push(cell);
            }
        }
        line
    }

    /// World-space center of the cell (y = 0)
    pub fn to_world(&self) -> Vec3 {
        Vec3::new(
            self.q as f32 + self.r as f32 * 0.5,
            0.0,
            self.r as f32 * CELL_HEIGHT,
        )
    }

    /// Containing cell of a world position; the inverse of [`Hex::to_world`]
    pub fn from_world(pos: Vec3) -> Hex {
        Hex::from_map(to_map2d(pos))
    }

    /// Cell center on the map plane, `(x, z)`
    pub fn to_map(&self) -> Vec2 {
        to_map2d(self.to_world())
    }

    /// Containing cell of a map-plane point `(x, z)`
    pub fn from_map(point: Vec2) -> Hex {
        let r = point.y / CELL_HEIGHT;
        let q = point.x - r * 0.5;
        FracCube {
            x: q,
            y: r,
            z: -q - r,
        }
        .round()
        .to_axial()
    }
}

impl Add for Hex {
    type Output = Hex;

    fn add(self, rhs: Hex) -> Hex {
        Hex::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for Hex {
    type Output = Hex;

    fn sub(self, rhs: Hex) -> Hex {
        Hex::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl Mul<i32> for Hex {
    type Output = Hex;

    fn mul(self, rhs: i32) -> Hex {
        Hex::new(self.q * rhs, self.r * rhs)
    }
}

impl Cube {
    pub const fn to_axial(self) -> Hex {
        Hex::new(self.x, self.y)
    }
}

impl From<Cube> for FracCube {
    fn from(c: Cube) -> Self {
        FracCube {
            x: c.x as f32,
            y: c.y as f32,
            z: c.z as f32,
        }
    }
}

impl FracCube {
    pub fn lerp(self, other: FracCube, t: f32) -> FracCube {
        FracCube {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    fn nudged(self) -> FracCube {
        FracCube {
            x: self.x + 1e-4,
            y: self.y + 2e-4,
            z: self.z - 3e-4,
        }
    }

    /// Nearest integer cube coordinate.
    ///
    /// Each component is rounded on its own, then the one with the largest
    /// rounding error is recomputed from the other two. Ties favour fixing
    /// x over y, and y over z.
    pub fn round(self) -> Cube {
        let mut rx = self.x.round();
        let mut ry = self.y.round();
        let mut rz = self.z.round();

        let x_err = (rx - self.x).abs();
        let y_err = (ry - self.y).abs();
        let z_err = (rz - self.z).abs();

        if x_err >= y_err && x_err >= z_err {
            rx = -ry - rz;
        } else if y_err >= z_err {
            ry = -rx - rz;
        } else {
            rz = -rx - ry;
        }

        Cube {
            x: rx as i32,
            y: ry as i32,
            z: rz as i32,
        }
    }
}

// ============================================================================
// DIRECTIONS
// ============================================================================

/// The six canonical neighbor directions, clockwise from north
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction for any integer index, wrapping modulo 6
    pub fn from_index(index: i32) -> Direction {
        Direction::ALL[index.rem_euclid(6) as usize]
    }

    pub fn offset(self) -> Hex {
        let (dq, dr) = DIRECTIONS[self.index()];
        Hex::new(dq, dr)
    }

    /// Rotate clockwise by `steps` sixths of a turn (negative for counter-clockwise)
    pub fn rotated(self, steps: i32) -> Direction {
        Direction::from_index(self.index() as i32 + steps)
    }

    pub fn opposite(self) -> Direction {
        self.rotated(3)
    }

    /// Signed turns from `self` (incoming) to `out` (outgoing), in [-2, 3].
    /// 3 means the two directions are opposite, i.e. a path passes straight through.
    pub fn turns_to(self, out: Direction) -> i32 {
        TURNS[self.index()][out.index()]
    }

    /// Compass bearing in degrees, clockwise from +Z
    pub fn yaw_degrees(self) -> f32 {
        30.0 + 60.0 * self.index() as f32
    }
}

// ============================================================================
// AREA AND VERTEX HELPERS
// ============================================================================

/// Number of cells within `radius` of a center, center included
pub fn vancouver_area(radius: u32) -> usize {
    let r = radius as usize;
    1 + 3 * r * (r + 1)
}

/// Number of cells exactly `radius` away from a center
pub fn vancouver_circumference(radius: u32) -> usize {
    6 * radius as usize
}

/// Recover the radius of a Vancouver square from its cell count
pub fn radius_from_area(area: usize) -> Option<u32> {
    let mut radius = 0u32;
    loop {
        let candidate = vancouver_area(radius);
        if candidate == area {
            return Some(radius);
        }
        if candidate > area {
            return None;
        }
        radius += 1;
    }
}

/// Bearing of vertex `index` in degrees, clockwise from +Z
pub fn vertex_angle(index: i32) -> f32 {
    60.0 * index.rem_euclid(6) as f32
}

/// Offset from a cell center to vertex `index` (wrapping modulo 6)
pub fn corner_offset(index: i32) -> Vec3 {
    const HALF_R: f32 = CIRCUMRADIUS * 0.5;
    match index.rem_euclid(6) {
        0 => Vec3::new(0.0, 0.0, CIRCUMRADIUS),
        1 => Vec3::new(0.5, 0.0, HALF_R),
        2 => Vec3::new(0.5, 0.0, -HALF_R),
        3 => Vec3::new(0.0, 0.0, -CIRCUMRADIUS),
        4 => Vec3::new(-0.5, 0.0, -HALF_R),
        _ => Vec3::new(-0.5, 0.0, HALF_R),
    }
}

/// Corner offset projected on the map plane
pub fn corner_offset_2d(index: i32) -> Vec2 {
    to_map2d(corner_offset(index))
}
