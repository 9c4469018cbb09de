//! Engine composition: wires the world map, generation queue, proximity
//! policy, floating origin, and layout generator behind a single `tick`.
//!
//! # Invariants
//! - Per frame: origin rebase, then proximity, then at most one queue
//!   budget window, then layout over completions, then renderer sync.
//! - All state is owned here and mutated from the caller's thread only.

mod engine;

pub use engine::{HexEngine, TickSummary};

pub fn crate_info() -> &'static str {
    "hexspace-engine v0.1.0"
}
