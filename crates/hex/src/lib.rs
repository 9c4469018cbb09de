//! Hex coordinate algebra: axial/cube coordinates, distances, ring and grid
//! enumeration, pointy-top world projection, and chunk packing geometry.
//!
//! # Invariants
//! - Cube coordinates always satisfy `q + r + s = 0`.
//! - Ring enumeration of radius R yields exactly `6R` hexes (1 for R = 0).
//! - Packing neighbors of a radius-R chunk sit at distance `2R + 1` (1 for R = 0).

mod axial;
mod packing;
mod projection;

pub use axial::{AxialHex, CubeHex, CUBE_DIRECTIONS};
pub use packing::chunk_neighbors;
pub use projection::{hex_to_world, world_to_hex};

pub fn crate_info() -> &'static str {
    "hexspace-hex v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("hex"));
    }
}
