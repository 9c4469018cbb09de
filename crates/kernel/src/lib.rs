//! World kernel: authoritative chunk and tile state.
//!
//! # Invariants
//! - Every tile of a chunk lies within `rings` of the chunk center.
//! - Tile kinds transition `None -> Some` once per generation pass and are
//!   immutable afterwards, except under explicit force-recompute.
//! - The tile spatial index maps each hex to exactly one owning chunk
//!   (first writer wins on shared boundary hexes).
//! - Chunks are removed only by explicit `WorldMap::remove`; their index
//!   entries go with them atomically.

pub mod chunk;
pub mod tile;
pub mod world_map;

pub use chunk::{Chunk, ChunkError, GRID_BATCH, INDEX_BATCH};
pub use tile::{RenderHandle, Tile, TileKind, TileStats};
pub use world_map::WorldMap;

pub fn crate_info() -> &'static str {
    "hexspace-kernel v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("kernel"));
    }
}
