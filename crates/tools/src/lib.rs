//! Developer tooling: read-only queries over the streaming world state.
//!
//! # Invariants
//! - Tools never mutate the world; everything here is derived.

pub mod inspector;

pub use inspector::{ChunkInfo, WorldInspector, WorldSummary};

pub fn crate_info() -> &'static str {
    "hexspace-tools v0.1.0"
}
