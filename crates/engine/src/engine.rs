use glam::Vec3;
use hexspace_hex::AxialHex;
use hexspace_kernel::{RenderHandle, TileKind, WorldMap};
use hexspace_layout::{LayoutConstraints, LayoutError, LayoutGenerator, LayoutOutcome, LayoutParams};
use hexspace_render::{tile_world_position, TileRenderer};
use hexspace_stream::{
    ConfigError, EngineConfig, FloatingOrigin, GenerationQueue, ProximityController, QueueEvent,
    SystemClock,
};
use std::sync::Arc;

/// What one engine tick did, for callers that surface streaming state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickSummary {
    pub tick: u64,
    pub rebased: bool,
    pub current_tile: AxialHex,
    pub current_chunk: Option<AxialHex>,
    pub chunks_completed: usize,
    pub chunks_failed: usize,
    pub layout: Option<LayoutOutcome>,
    pub render_synced: bool,
}

/// The assembled streaming world engine.
///
/// Owns every core component and runs the per-frame ordering: floating
/// origin, avatar tile resolution, proximity policy, one generation-queue
/// budget window, layout over freshly completed chunks, renderer sync.
pub struct HexEngine<R: TileRenderer> {
    config: EngineConfig,
    map: WorldMap,
    queue: GenerationQueue,
    proximity: ProximityController,
    origin: FloatingOrigin,
    generator: LayoutGenerator,
    renderer: R,
    tick: u64,
}

impl<R: TileRenderer> HexEngine<R> {
    /// Build an engine. The config is validated here; the origin chunk is
    /// enqueued so the world has somewhere to start.
    pub fn new(config: EngineConfig, seed: u64, renderer: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut map = WorldMap::new();
        let mut queue = GenerationQueue::new(&config, Arc::new(SystemClock::new()));
        queue.enqueue(AxialHex::ZERO, 0, &mut map);

        let generator = LayoutGenerator::new(layout_params(&config), seed);
        let proximity = ProximityController::new(&config);
        let origin = FloatingOrigin::new(config.floating_origin_threshold);
        Ok(Self {
            config,
            map,
            queue,
            proximity,
            origin,
            generator,
            renderer,
            tick: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn map(&self) -> &WorldMap {
        &self.map
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn origin(&self) -> &FloatingOrigin {
        &self.origin
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn current_chunk(&self) -> Option<AxialHex> {
        self.proximity.current_chunk()
    }

    pub fn state_hash(&self) -> u64 {
        self.map.state_hash()
    }

    pub fn constraints(&self) -> &LayoutConstraints {
        self.generator.constraints()
    }

    pub fn set_constraints(&mut self, constraints: LayoutConstraints) {
        self.generator.set_constraints(constraints);
    }

    /// Parse a free-text prompt into layout constraints for future runs.
    pub fn set_constraints_from_prompt(&mut self, prompt: &str) {
        self.generator.set_constraints(LayoutConstraints::parse(prompt));
    }

    /// Register a scene position (mesh, positional light) for floating-origin
    /// rebasing.
    pub fn register_scene_mesh(&mut self, handle: RenderHandle, position: Vec3) {
        self.origin.register_scene_position(handle, position);
    }

    /// Track a renderer-driven move of a registered scene mesh.
    pub fn move_scene_mesh(&mut self, handle: RenderHandle, delta: Vec3) {
        self.origin.move_scene_position(handle, delta);
    }

    /// Advance the world one frame. `avatar_local` is the avatar position as
    /// reported by the renderer (mirrored x).
    pub fn tick(&mut self, avatar_local: Vec3) -> TickSummary {
        self.tick += 1;
        let hex_size = self.config.hex_size;
        let avatar = FloatingOrigin::engine_frame(avatar_local);

        // Floating origin first, so everything downstream sees true hexes.
        let rebased = match self.origin.maybe_rebase(avatar, hex_size) {
            Some(offset) => {
                for handle in self.origin.scene_handles() {
                    self.renderer.move_instance(handle, -offset);
                }
                true
            }
            None => false,
        };

        let current_tile = self.origin.true_hex(avatar, hex_size);
        let avatar_xz = self.origin.true_world_xz(avatar, hex_size);

        let proximity = self.proximity.update(
            current_tile,
            avatar_xz,
            &mut self.map,
            &mut self.queue,
            &mut |handle, enabled| self.renderer.set_instance_enabled(handle, enabled),
        );

        let _ = self.queue.process_one_frame(&mut self.map);
        let mut chunks_completed = 0;
        let mut chunks_failed = 0;
        for event in self.queue.drain_events() {
            match event {
                QueueEvent::Completed { .. } => chunks_completed += 1,
                QueueEvent::Failed { center, error } => {
                    chunks_failed += 1;
                    tracing::warn!(%center, %error, "chunk generation rejected");
                }
            }
        }

        // Newly initialized chunks get their tiles on the same frame.
        let layout = if chunks_completed > 0 {
            match self.generator.generate(&mut self.map) {
                Ok(outcome) => Some(outcome),
                Err(error) => {
                    tracing::warn!(%error, "layout run failed, chunks stay ungenerated");
                    None
                }
            }
        } else {
            None
        };

        let render_synced = proximity.render_sync || layout.is_some();
        if render_synced {
            self.sync_renderer();
        }

        TickSummary {
            tick: self.tick,
            rebased,
            current_tile,
            current_chunk: proximity.current_chunk,
            chunks_completed,
            chunks_failed,
            layout,
            render_synced,
        }
    }

    /// Re-run the layout pipeline over every enabled chunk with fresh
    /// constraints, rebuilding the affected instances.
    pub fn force_recompute(&mut self) -> Result<LayoutOutcome, LayoutError> {
        let centers: Vec<AxialHex> = self.map.centers().collect();
        for center in centers {
            let Some(chunk) = self.map.get_mut(center) else {
                continue;
            };
            if !chunk.is_enabled() {
                continue;
            }
            let handles: Vec<(AxialHex, RenderHandle)> = chunk
                .tiles()
                .filter_map(|t| t.instance.map(|h| (t.hex, h)))
                .collect();
            for (hex, handle) in handles {
                self.renderer.dispose_instance(handle);
                if let Some(tile) = self.map.get_mut(center).and_then(|c| c.tile_mut(hex)) {
                    tile.instance = None;
                }
            }
        }
        let outcome = self.generator.force_recompute(&mut self.map)?;
        self.sync_renderer();
        Ok(outcome)
    }

    /// Explicit world reset: reject queued work, dispose every instance, and
    /// drop all chunks, then re-bootstrap the origin chunk.
    pub fn reset(&mut self) {
        self.queue.clear();
        for event in self.queue.drain_events() {
            if let QueueEvent::Failed { center, error } = event {
                tracing::debug!(%center, %error, "task rejected by reset");
            }
        }
        let centers: Vec<AxialHex> = self.map.centers().collect();
        for center in centers {
            if let Some(chunk) = self.map.remove(center) {
                for tile in chunk.tiles() {
                    if let Some(handle) = tile.instance {
                        self.renderer.dispose_instance(handle);
                    }
                }
            }
        }
        self.queue.enqueue(AxialHex::ZERO, 0, &mut self.map);
    }

    /// Create instances for enabled, generated tiles that lack one.
    fn sync_renderer(&mut self) {
        let hex_size = self.config.hex_size;
        let centers: Vec<AxialHex> = self.map.centers().collect();
        for center in centers {
            let Some(chunk) = self.map.get(center) else {
                continue;
            };
            if !chunk.is_enabled() {
                continue;
            }
            let pending: Vec<(AxialHex, TileKind)> = chunk
                .tiles()
                .filter_map(|t| match (t.kind, t.instance) {
                    (Some(kind), None) => Some((t.hex, kind)),
                    _ => None,
                })
                .collect();
            for (hex, kind) in pending {
                let handle = self
                    .renderer
                    .create_instance(kind, tile_world_position(hex, hex_size));
                if let Some(tile) = self.map.get_mut(center).and_then(|c| c.tile_mut(hex)) {
                    tile.instance = Some(handle);
                }
            }
        }
    }
}

fn layout_params(config: &EngineConfig) -> LayoutParams {
    LayoutParams {
        chunk_rings: config.chunk_rings,
        forest_seeds: config.voronoi_forest_seeds,
        water_seeds: config.voronoi_water_seeds,
        grass_seeds: config.voronoi_grass_seeds,
        road_density_ratio: config.road_density_ratio,
        road_seed_ratio: config.road_seed_ratio,
        building_density_sparse: config.building_density_sparse,
        building_density_medium: config.building_density_medium,
        building_density_dense: config.building_density_dense,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexspace_hex::chunk_neighbors;
    use hexspace_layout::BuildingDensity;
    use hexspace_render::RecordingRenderer;

    fn engine(rings: i32, hex_size: f64) -> HexEngine<RecordingRenderer> {
        let config = EngineConfig {
            chunk_rings: rings,
            hex_size,
            check_interval_frames: 1,
            border_check_interval_frames: 1,
            ..EngineConfig::default()
        };
        HexEngine::new(config, 42, RecordingRenderer::new()).unwrap()
    }

    fn settle(engine: &mut HexEngine<RecordingRenderer>, avatar: Vec3, frames: usize) {
        for _ in 0..frames {
            engine.tick(avatar);
        }
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = EngineConfig {
            hex_size: 0.0,
            ..EngineConfig::default()
        };
        assert!(HexEngine::new(config, 0, RecordingRenderer::new()).is_err());
    }

    #[test]
    fn origin_chunk_streams_in_and_renders() {
        let mut engine = engine(2, 1.0);
        settle(&mut engine, Vec3::ZERO, 10);

        let chunk = engine.map().get(AxialHex::ZERO).expect("origin chunk");
        assert!(chunk.is_initialized());
        assert!(chunk.tiles_generated());
        assert!(chunk.has_all_kinds_assigned());
        assert_eq!(engine.renderer().live_instances(), 19);
    }

    #[test]
    fn avatar_near_border_preloads_neighbor() {
        let mut engine = engine(1, 1.0);
        settle(&mut engine, Vec3::ZERO, 5);

        // Renderer-local x is mirrored; local (-0.9, 0) is engine (0.9, 0),
        // which resolves to tile (1, 0).
        let avatar = Vec3::new(-0.9, 0.0, 0.0);
        let summary = engine.tick(avatar);
        assert_eq!(summary.current_tile, AxialHex::new(1, 0));

        settle(&mut engine, avatar, 10);
        let neighbors = chunk_neighbors(AxialHex::ZERO, 1);
        let initialized_neighbor = neighbors
            .iter()
            .any(|n| engine.map().get(*n).is_some_and(|c| c.is_initialized()));
        assert!(initialized_neighbor, "no packing neighbor streamed in");
    }

    #[test]
    fn idle_ticks_leave_state_hash_stable() {
        let mut engine = engine(2, 1.0);
        settle(&mut engine, Vec3::ZERO, 10);
        let hash = engine.state_hash();
        settle(&mut engine, Vec3::ZERO, 10);
        assert_eq!(engine.state_hash(), hash);
    }

    #[test]
    fn rebase_moves_registered_meshes() {
        let config = EngineConfig {
            chunk_rings: 1,
            hex_size: 1.0,
            floating_origin_threshold: 100.0,
            check_interval_frames: 1,
            border_check_interval_frames: 1,
            ..EngineConfig::default()
        };
        let mut engine = HexEngine::new(config, 1, RecordingRenderer::new()).unwrap();

        let mesh_pos = Vec3::new(5.0, 0.0, 0.0);
        let handle = engine
            .renderer_mut()
            .create_instance(TileKind::Grass, mesh_pos);
        engine.register_scene_mesh(handle, mesh_pos);

        // Walk past the threshold in renderer-local space (engine x flips).
        let summary = engine.tick(Vec3::new(-150.0, 0.0, 0.0));
        assert!(summary.rebased);
        assert_ne!(engine.origin().world_hex_offset(), AxialHex::ZERO);
        let record = engine.renderer().instance(handle).unwrap();
        assert_eq!(record.position, Vec3::new(5.0 - 150.0, 0.0, 0.0));
    }

    #[test]
    fn force_recompute_rewrites_instances() {
        let mut engine = engine(2, 1.0);
        settle(&mut engine, Vec3::ZERO, 10);
        let before = engine.renderer().live_instances();
        assert!(before > 0);

        engine.set_constraints(LayoutConstraints {
            building_density: BuildingDensity::Dense,
            ..LayoutConstraints::default()
        });
        engine.force_recompute().unwrap();
        assert_eq!(engine.renderer().live_instances(), before);
        assert!(engine.renderer().disposed() >= before);
        assert!(engine.map().get(AxialHex::ZERO).unwrap().tiles_generated());
    }

    #[test]
    fn reset_drops_world_and_requeues_origin() {
        let mut engine = engine(1, 1.0);
        settle(&mut engine, Vec3::ZERO, 5);
        assert!(engine.renderer().live_instances() > 0);

        engine.reset();
        assert_eq!(engine.renderer().live_instances(), 0);
        assert_eq!(engine.map().index_len(), 0);
        assert!(engine.map().contains(AxialHex::ZERO));
        assert!(!engine.map().get(AxialHex::ZERO).unwrap().is_initialized());

        settle(&mut engine, Vec3::ZERO, 5);
        assert!(engine.map().get(AxialHex::ZERO).unwrap().tiles_generated());
    }
}
