use hexspace_hex::AxialHex;
use hexspace_kernel::{TileStats, WorldMap};

/// World inspector for developer tooling.
///
/// Read-only queries against the streaming world state for debugging,
/// profiling, and development UI.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(map: &WorldMap) -> WorldSummary {
        let mut initialized = 0;
        let mut generated = 0;
        let mut enabled = 0;
        let mut tiles = 0;
        for chunk in map.chunks() {
            if chunk.is_initialized() {
                initialized += 1;
            }
            if chunk.tiles_generated() {
                generated += 1;
            }
            if chunk.is_enabled() {
                enabled += 1;
            }
            tiles += chunk.tile_count();
        }
        WorldSummary {
            chunks: map.chunk_count(),
            initialized,
            generated,
            enabled,
            tiles,
            index_entries: map.index_len(),
            state_hash: map.state_hash(),
        }
    }

    /// Inspect a single chunk by center.
    pub fn inspect_chunk(map: &WorldMap, center: AxialHex) -> Option<ChunkInfo> {
        map.get(center).map(|chunk| ChunkInfo {
            center,
            tiles: chunk.tile_count(),
            enabled: chunk.is_enabled(),
            initialized: chunk.is_initialized(),
            generated: chunk.tiles_generated(),
            stats: chunk.stats(),
        })
    }

    /// All chunk centers, sorted for stable output.
    pub fn list_chunks(map: &WorldMap) -> Vec<AxialHex> {
        let mut centers: Vec<AxialHex> = map.centers().collect();
        centers.sort();
        centers
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone)]
pub struct WorldSummary {
    pub chunks: usize,
    pub initialized: usize,
    pub generated: usize,
    pub enabled: usize,
    pub tiles: usize,
    pub index_entries: usize,
    pub state_hash: u64,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: chunks={} initialized={} generated={} enabled={} tiles={} index={} hash={:#018x}",
            self.chunks,
            self.initialized,
            self.generated,
            self.enabled,
            self.tiles,
            self.index_entries,
            self.state_hash,
        )
    }
}

/// Detailed info about a single chunk.
#[derive(Debug, Clone)]
pub struct ChunkInfo {
    pub center: AxialHex,
    pub tiles: usize,
    pub enabled: bool,
    pub initialized: bool,
    pub generated: bool,
    pub stats: TileStats,
}

impl std::fmt::Display for ChunkInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk {} tiles={} enabled={} initialized={} generated={} [{}]",
            self.center, self.tiles, self.enabled, self.initialized, self.generated, self.stats,
        )
    }
}
