use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// An axial hex coordinate. The implicit third cube component is `s = -q - r`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AxialHex {
    pub q: i32,
    pub r: i32,
}

/// A cube hex coordinate with the invariant `q + r + s = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeHex {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

/// The six cube unit directions, in the fixed order used by ring enumeration.
pub const CUBE_DIRECTIONS: [CubeHex; 6] = [
    CubeHex { q: 1, r: 0, s: -1 },
    CubeHex { q: 1, r: -1, s: 0 },
    CubeHex { q: 0, r: -1, s: 1 },
    CubeHex { q: -1, r: 0, s: 1 },
    CubeHex { q: -1, r: 1, s: 0 },
    CubeHex { q: 0, r: 1, s: -1 },
];

impl AxialHex {
    pub const ZERO: Self = Self { q: 0, r: 0 };

    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third cube component.
    pub fn s(self) -> i32 {
        -self.q - self.r
    }

    pub fn to_cube(self) -> CubeHex {
        CubeHex::new(self.q, self.r, self.s())
    }

    /// Hex distance: `(|dq| + |dq + dr| + |dr|) / 2`, equal to cube distance.
    pub fn distance(self, other: Self) -> i32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.abs() + (dq + dr).abs() + dr.abs()) / 2
    }

    /// The six axial neighbors, in direction order.
    pub fn neighbors(self) -> [Self; 6] {
        let mut out = [Self::ZERO; 6];
        for (i, d) in CUBE_DIRECTIONS.iter().enumerate() {
            out[i] = Self::new(self.q + d.q, self.r + d.r);
        }
        out
    }

    /// Rotate 60 degrees clockwise around the origin: `(q, r) -> (q + r, -q)`.
    pub fn rotate_cw(self) -> Self {
        Self::new(self.q + self.r, -self.q)
    }
}

impl Add for AxialHex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for AxialHex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl std::fmt::Display for AxialHex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

impl CubeHex {
    pub fn new(q: i32, r: i32, s: i32) -> Self {
        debug_assert_eq!(q + r + s, 0, "cube coordinate must satisfy q + r + s = 0");
        Self { q, r, s }
    }

    pub fn to_axial(self) -> AxialHex {
        AxialHex::new(self.q, self.r)
    }

    /// Cube distance: `max(|dq|, |dr|, |ds|)`.
    pub fn distance(self, other: Self) -> i32 {
        (self.q - other.q)
            .abs()
            .max((self.r - other.r).abs())
            .max((self.s - other.s).abs())
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.q + other.q, self.r + other.r, self.s + other.s)
    }

    pub fn scale(self, factor: i32) -> Self {
        Self::new(self.q * factor, self.r * factor, self.s * factor)
    }

    /// Neighbor in one of the six fixed directions.
    pub fn neighbor(self, direction: usize) -> Self {
        self.add(CUBE_DIRECTIONS[direction % 6])
    }

    /// The ring of hexes at exact distance `radius` from `self`.
    ///
    /// Starts at `self + radius * CUBE_DIRECTIONS[4]` and walks the six sides
    /// in direction order, `radius` steps each. Radius 0 yields just `self`.
    pub fn ring(self, radius: i32) -> Vec<CubeHex> {
        if radius == 0 {
            return vec![self];
        }
        let mut out = Vec::with_capacity((6 * radius) as usize);
        let mut current = self.add(CUBE_DIRECTIONS[4].scale(radius));
        for side in 0..6 {
            for _ in 0..radius {
                out.push(current);
                current = current.neighbor(side);
            }
        }
        out
    }

    /// All hexes within `radius` of `self`: the union of rings `0..=radius`,
    /// enumerated from the center outwards. `3R(R+1) + 1` hexes in total.
    pub fn grid(self, radius: i32) -> Vec<CubeHex> {
        let count = (3 * radius * (radius + 1) + 1) as usize;
        let mut out = Vec::with_capacity(count);
        for layer in 0..=radius {
            out.extend(self.ring(layer));
        }
        out
    }
}
