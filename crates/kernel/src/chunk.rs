use crate::tile::{RenderHandle, Tile, TileKind, TileStats};
use hexspace_hex::{chunk_neighbors, hex_to_world, AxialHex};
use std::collections::HashMap;

/// Tiles appended per grid construction step.
pub const GRID_BATCH: usize = 150;
/// Tiles published into the spatial index per index step.
pub const INDEX_BATCH: usize = 200;

/// Errors from chunk tile mutations.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("tile kinds of chunk {center} are frozen")]
    KindsFrozen { center: AxialHex },
    #[error("chunk {center} holds no tile at {hex}")]
    UnknownTile { center: AxialHex, hex: AxialHex },
}

/// A hexagonal patch of tiles around a fixed packing-lattice center.
///
/// Construction is incremental: a chunk starts as an empty placeholder, fills
/// its tile grid in batches, computes its packing neighbors, and is published
/// into the spatial index — all driven externally by the generation queue.
/// `initialized` flips once the grid and neighbors are complete;
/// `tiles_generated` flips once every tile kind is assigned and is monotonic
/// except under force-recompute.
#[derive(Debug)]
pub struct Chunk {
    center: AxialHex,
    center_world: (f64, f64),
    tiles: Vec<Tile>,
    slots: HashMap<AxialHex, usize>,
    neighbors: [AxialHex; 6],
    enabled: bool,
    tiles_generated: bool,
    initialized: bool,
}

impl Chunk {
    /// Create an empty placeholder. Present in the world map so concurrent
    /// proximity checks observe it, but not yet usable.
    pub fn placeholder(center: AxialHex, hex_size: f64) -> Self {
        Self {
            center,
            center_world: hex_to_world(center, hex_size),
            tiles: Vec::new(),
            slots: HashMap::new(),
            neighbors: [center; 6],
            enabled: true,
            tiles_generated: false,
            initialized: false,
        }
    }

    pub fn center(&self) -> AxialHex {
        self.center
    }

    pub fn center_world(&self) -> (f64, f64) {
        self.center_world
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn tiles_generated(&self) -> bool {
        self.tiles_generated
    }

    /// Packing-neighbor chunk centers. Valid once `is_initialized()`.
    pub fn neighbors(&self) -> &[AxialHex; 6] {
        &self.neighbors
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn tile(&self, hex: AxialHex) -> Option<&Tile> {
        self.slots.get(&hex).map(|&i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, hex: AxialHex) -> Option<&mut Tile> {
        self.slots.get(&hex).map(|&i| &mut self.tiles[i])
    }

    pub fn contains(&self, hex: AxialHex) -> bool {
        self.slots.contains_key(&hex)
    }

    /// Grid phase: append a batch of tiles, all ungenerated and enabled.
    pub fn append_tiles(&mut self, hexes: &[AxialHex]) {
        self.tiles.reserve(hexes.len());
        for &hex in hexes {
            let slot = self.tiles.len();
            self.tiles.push(Tile::ungenerated(hex));
            self.slots.insert(hex, slot);
        }
    }

    /// Neighbors phase: compute the six packing neighbors once.
    pub fn compute_neighbors(&mut self, rings: i32) {
        self.neighbors = chunk_neighbors(self.center, rings);
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Mirror the enabled flag onto every tile, notifying the renderer for
    /// each tile that carries an instance.
    pub fn set_enabled(&mut self, enabled: bool, mut on_instance: impl FnMut(RenderHandle, bool)) {
        self.enabled = enabled;
        for tile in &mut self.tiles {
            tile.enabled = enabled;
            if let Some(handle) = tile.instance {
                on_instance(handle, enabled);
            }
        }
    }

    /// Assign a tile kind. Legal while kinds are unfrozen; once
    /// `tiles_generated` is set, only idempotent rewrites are accepted.
    pub fn set_tile_kind(&mut self, hex: AxialHex, kind: TileKind) -> Result<(), ChunkError> {
        let center = self.center;
        let frozen = self.tiles_generated;
        let tile = self
            .tile_mut(hex)
            .ok_or(ChunkError::UnknownTile { center, hex })?;
        if tile.kind == Some(kind) {
            return Ok(());
        }
        if frozen {
            return Err(ChunkError::KindsFrozen { center });
        }
        tile.kind = Some(kind);
        Ok(())
    }

    pub fn has_all_kinds_assigned(&self) -> bool {
        self.tiles.iter().all(|t| t.kind.is_some())
    }

    /// Freeze tile kinds after a completed layout pass.
    pub fn mark_generated(&mut self) {
        self.tiles_generated = true;
    }

    /// Unfreeze for a force-recompute run. The only legal path back from
    /// `tiles_generated`.
    pub fn clear_generated(&mut self) {
        self.tiles_generated = false;
    }

    pub fn stats(&self) -> TileStats {
        TileStats::tally(self.tiles.iter())
    }
}
