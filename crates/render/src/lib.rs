//! Rendering adapter: renderer-agnostic tile instancing.
//!
//! # Invariants
//! - The renderer cannot mutate world truth; it reads the world map
//!   synchronously after each tick, never concurrently.
//! - Instance handles are renderer-owned; the core only stores and clears
//!   them.
//!
//! # Workaround
//! Ships a recording in-memory backend in place of a GPU backend. The trait
//! is stable; swap in a real instancing implementation without changing
//! consumers.

mod renderer;

pub use renderer::{tile_world_position, InstanceRecord, RecordingRenderer, TileRenderer};

pub fn crate_info() -> &'static str {
    "hexspace-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
