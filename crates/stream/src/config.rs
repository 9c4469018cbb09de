use serde::{Deserialize, Serialize};

/// Reference model depth used to derive the default hex size.
const DEFAULT_MODEL_DEPTH: f64 = 20.0;

/// Engine configuration. Every knob is optional at the call site; defaults
/// follow the shipped tuning. Validated once at construction; out-of-range
/// values are rejected, never clamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Chunk radius in hex rings; a world-wide constant per session.
    pub chunk_rings: i32,
    /// Hex center-to-vertex distance in world units.
    pub hex_size: f64,
    /// Cooperative queue budget per frame, milliseconds.
    pub queue_frame_budget_ms: f64,
    /// Proximity check cadence, relaxed (frames).
    pub check_interval_frames: u64,
    /// Proximity check cadence near a chunk border (frames).
    pub border_check_interval_frames: u64,
    /// Disable chunks beyond this multiple of the chunk radius (chunk-center
    /// hex distance).
    pub disable_radius_chunks: f64,
    /// Preload the nearest neighbor within `k * rings * hex_size * 1.5`
    /// world distance.
    pub preload_radius_chunks: f64,
    /// World distance the avatar may drift from the origin before a rebase.
    pub floating_origin_threshold: f32,
    /// Voronoi seed counts per biome.
    pub voronoi_forest_seeds: usize,
    pub voronoi_water_seeds: usize,
    pub voronoi_grass_seeds: usize,
    /// Road target as a fraction of passable hexes.
    pub road_density_ratio: f64,
    /// Road seed count as a fraction of the road target.
    pub road_seed_ratio: f64,
    /// Building targets as fractions of road-adjacent candidates.
    pub building_density_sparse: f64,
    pub building_density_medium: f64,
    pub building_density_dense: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_rings: 10,
            hex_size: DEFAULT_MODEL_DEPTH / 3.0,
            queue_frame_budget_ms: 5.0,
            check_interval_frames: 20,
            border_check_interval_frames: 5,
            disable_radius_chunks: 4.0,
            preload_radius_chunks: 2.5,
            floating_origin_threshold: 1000.0,
            voronoi_forest_seeds: 4,
            voronoi_water_seeds: 3,
            voronoi_grass_seeds: 6,
            road_density_ratio: 0.10,
            road_seed_ratio: 0.25,
            building_density_sparse: 0.05,
            building_density_medium: 0.10,
            building_density_dense: 0.15,
        }
    }
}

/// Rejected configuration values, surfaced at construction time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("config key `{key}` out of range: {value} (expected {expected})")]
    OutOfRange {
        key: &'static str,
        value: f64,
        expected: &'static str,
    },
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn reject(key: &'static str, value: f64, expected: &'static str) -> ConfigError {
            ConfigError::OutOfRange {
                key,
                value,
                expected,
            }
        }

        if self.chunk_rings < 0 {
            return Err(reject("chunk_rings", self.chunk_rings as f64, ">= 0"));
        }
        if !(self.hex_size > 0.0) {
            return Err(reject("hex_size", self.hex_size, "> 0"));
        }
        if !(self.queue_frame_budget_ms > 0.0) {
            return Err(reject(
                "queue_frame_budget_ms",
                self.queue_frame_budget_ms,
                "> 0",
            ));
        }
        if self.check_interval_frames == 0 {
            return Err(reject("check_interval_frames", 0.0, ">= 1"));
        }
        if self.border_check_interval_frames == 0
            || self.border_check_interval_frames > self.check_interval_frames
        {
            return Err(reject(
                "border_check_interval_frames",
                self.border_check_interval_frames as f64,
                "1..=check_interval_frames",
            ));
        }
        if !(self.disable_radius_chunks > 0.0) {
            return Err(reject(
                "disable_radius_chunks",
                self.disable_radius_chunks,
                "> 0",
            ));
        }
        if !(self.preload_radius_chunks > 0.0)
            || self.preload_radius_chunks > self.disable_radius_chunks
        {
            return Err(reject(
                "preload_radius_chunks",
                self.preload_radius_chunks,
                "0 < k <= disable_radius_chunks",
            ));
        }
        if !(self.floating_origin_threshold > 0.0) {
            return Err(reject(
                "floating_origin_threshold",
                self.floating_origin_threshold as f64,
                "> 0",
            ));
        }
        for (key, value) in [
            ("road_density_ratio", self.road_density_ratio),
            ("road_seed_ratio", self.road_seed_ratio),
            ("building_density_sparse", self.building_density_sparse),
            ("building_density_medium", self.building_density_medium),
            ("building_density_dense", self.building_density_dense),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(reject(key, value, "0..=1"));
            }
        }
        Ok(())
    }
}
