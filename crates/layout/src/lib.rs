//! Layout generation: Voronoi biome regions, a connected road network grown
//! over passable terrain, road-adjacent building placement, and grass fill,
//! committed once per chunk.
//!
//! # Invariants
//! - Roads form a single connected component over the generation union.
//! - Roads and buildings only ever replace Grass or Forest, never Water.
//! - A failed run commits nothing; targeted chunks stay ungenerated.
//! - The same seed over the same union produces identical tile kinds.

pub mod astar;
pub mod constraints;
pub mod generator;
pub mod roads;
pub mod voronoi;

pub use astar::hex_astar;
pub use constraints::{BuildingDensity, BuildingSize, Clustering, LayoutConstraints};
pub use generator::{LayoutError, LayoutGenerator, LayoutOutcome, LayoutParams};

pub fn crate_info() -> &'static str {
    "hexspace-layout v0.1.0"
}
