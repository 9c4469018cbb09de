use crate::chunk::Chunk;
use hexspace_hex::AxialHex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Owns every chunk, keyed by chunk-center hex, plus the tile -> chunk
/// spatial index.
///
/// A chunk is present iff it has been enqueued at least once; it may still be
/// an uninitialized placeholder. Index entries are first-writer-wins on
/// boundary hexes shared by adjacent chunks.
#[derive(Debug, Default)]
pub struct WorldMap {
    chunks: HashMap<AxialHex, Chunk>,
    tile_index: HashMap<AxialHex, AxialHex>,
}

impl WorldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn index_len(&self) -> usize {
        self.tile_index.len()
    }

    pub fn contains(&self, center: AxialHex) -> bool {
        self.chunks.contains_key(&center)
    }

    pub fn get(&self, center: AxialHex) -> Option<&Chunk> {
        self.chunks.get(&center)
    }

    pub fn get_mut(&mut self, center: AxialHex) -> Option<&mut Chunk> {
        self.chunks.get_mut(&center)
    }

    /// Insert a placeholder chunk so concurrent proximity checks see it.
    pub fn add_placeholder(&mut self, chunk: Chunk) {
        self.chunks.insert(chunk.center(), chunk);
    }

    pub fn centers(&self) -> impl Iterator<Item = AxialHex> + '_ {
        self.chunks.keys().copied()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn chunks_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
        self.chunks.values_mut()
    }

    pub fn enabled_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values().filter(|c| c.is_enabled())
    }

    /// Index phase of chunk construction: publish a batch of the chunk's tile
    /// hexes into the spatial index, skipping hexes another chunk already
    /// owns. Returns the number of tiles visited, 0 once the chunk is fully
    /// published.
    pub fn index_chunk_tiles(&mut self, center: AxialHex, start: usize, max: usize) -> usize {
        let Some(chunk) = self.chunks.get(&center) else {
            return 0;
        };
        let hexes: Vec<AxialHex> = chunk
            .tiles()
            .skip(start)
            .take(max)
            .map(|t| t.hex)
            .collect();
        for hex in &hexes {
            self.tile_index.entry(*hex).or_insert(center);
        }
        hexes.len()
    }

    /// Resolve the owning chunk of a tile in O(1) via the spatial index.
    ///
    /// A hit is verified against the chunk boundary; a stale entry (pointing
    /// at a removed chunk or outside its radius) is evicted and `None` is
    /// returned so the caller can fall back to a scan.
    pub fn chunk_for_tile_fast(&mut self, tile_hex: AxialHex, rings: i32) -> Option<AxialHex> {
        let center = *self.tile_index.get(&tile_hex)?;
        let valid = self
            .chunks
            .get(&center)
            .is_some_and(|c| tile_hex.distance(c.center()) <= rings);
        if !valid {
            tracing::debug!(%tile_hex, %center, "evicting stale tile index entry");
            self.tile_index.remove(&tile_hex);
            return None;
        }
        Some(center)
    }

    /// Fallback linear scan for a tile's chunk, used while the index is cold.
    ///
    /// An exact chunk-center match wins outright; otherwise the chunk whose
    /// center is closest in cube distance, within the chunk radius.
    pub fn chunk_for_tile_scan(&self, tile_hex: AxialHex, rings: i32) -> Option<AxialHex> {
        let mut closest: Option<(AxialHex, i32)> = None;
        for center in self.chunks.keys() {
            let distance = tile_hex.distance(*center);
            if distance == 0 {
                return Some(*center);
            }
            if distance <= rings && closest.map_or(true, |(_, best)| distance < best) {
                closest = Some((*center, distance));
            }
        }
        closest.map(|(center, _)| center)
    }

    /// Remove a chunk and every spatial-index entry it owns, atomically.
    /// Reserved for explicit reset; the streaming policy only disables.
    pub fn remove(&mut self, center: AxialHex) -> Option<Chunk> {
        let chunk = self.chunks.remove(&center)?;
        self.tile_index.retain(|_, owner| *owner != center);
        Some(chunk)
    }

    /// Canonical hash of all generated tile kinds, keyed by the spatial
    /// index. Two identically seeded worlds hash identically.
    pub fn state_hash(&self) -> u64 {
        let mut entries: Vec<(AxialHex, u8)> = Vec::with_capacity(self.tile_index.len());
        for (hex, center) in &self.tile_index {
            let kind = self
                .chunks
                .get(center)
                .and_then(|c| c.tile(*hex))
                .and_then(|t| t.kind);
            if let Some(kind) = kind {
                entries.push((*hex, kind.tag()));
            }
        }
        entries.sort();

        let mut hasher = Sha256::new();
        for (hex, tag) in entries {
            hasher.update(hex.q.to_le_bytes());
            hasher.update(hex.r.to_le_bytes());
            hasher.update([tag]);
        }
        let digest = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(prefix)
    }
}
