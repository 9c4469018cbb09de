use crate::config::EngineConfig;
use crate::queue::GenerationQueue;
use hexspace_hex::{chunk_neighbors, hex_to_world, AxialHex};
use hexspace_kernel::{RenderHandle, WorldMap};

/// Priority used for preloaded neighbor chunks.
const PRELOAD_PRIORITY: i32 = 100;

/// Cache key for the disable pass: nothing relevant changed while the
/// current chunk, the radius, and the chunk population are stable.
type DisableKey = (AxialHex, i32, usize);

/// What one proximity tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProximityReport {
    /// False when the tick was skipped by the check cadence.
    pub checked: bool,
    pub current_chunk: Option<AxialHex>,
    pub chunk_changed: bool,
    pub disabled: usize,
    pub enabled: usize,
    /// Neighbor chunk enqueued for preload this tick, if any.
    pub preloaded: Option<AxialHex>,
    /// True when the renderer should re-sync after this tick.
    pub render_sync: bool,
}

/// Per-tick streaming policy around the avatar's current tile.
///
/// Decides which chunks to enqueue, enable, or disable. The disable threshold
/// (`disable_radius_chunks * rings` in chunk-center hex distance) sits well
/// outside the preload threshold (`preload_radius_chunks * rings * hex_size
/// * 1.5` in world distance), so chunks materialize before the avatar crosses
/// into them and stay live long after, without flapping at borders.
pub struct ProximityController {
    rings: i32,
    hex_size: f64,
    check_interval: u64,
    border_check_interval: u64,
    disable_radius_chunks: f64,
    preload_radius_chunks: f64,
    frame: u64,
    last_tile: Option<AxialHex>,
    current_chunk: Option<AxialHex>,
    disable_cache: Option<DisableKey>,
}

impl ProximityController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            rings: config.chunk_rings,
            hex_size: config.hex_size,
            check_interval: config.check_interval_frames,
            border_check_interval: config.border_check_interval_frames,
            disable_radius_chunks: config.disable_radius_chunks,
            preload_radius_chunks: config.preload_radius_chunks,
            frame: 0,
            last_tile: None,
            current_chunk: None,
            disable_cache: None,
        }
    }

    pub fn current_chunk(&self) -> Option<AxialHex> {
        self.current_chunk
    }

    /// Run one tick of the policy.
    ///
    /// `avatar_world` is the avatar's true (offset-adjusted) world position
    /// on the XZ plane; `on_instance` forwards enable/disable toggles to the
    /// renderer for tiles that carry instances.
    pub fn update(
        &mut self,
        current_tile: AxialHex,
        avatar_world: (f64, f64),
        map: &mut WorldMap,
        queue: &mut GenerationQueue,
        on_instance: &mut dyn FnMut(RenderHandle, bool),
    ) -> ProximityReport {
        let mut report = ProximityReport {
            current_chunk: self.current_chunk,
            ..ProximityReport::default()
        };

        let interval = if self.near_border() {
            self.border_check_interval
        } else {
            self.check_interval
        };
        let due = self.frame % interval == 0;
        self.frame += 1;
        if !due {
            return report;
        }
        report.checked = true;
        self.last_tile = Some(current_tile);

        // P1: resolve the chunk under the avatar, index first, scan fallback.
        let resolved = map
            .chunk_for_tile_fast(current_tile, self.rings)
            .or_else(|| map.chunk_for_tile_scan(current_tile, self.rings));
        if resolved != self.current_chunk {
            tracing::info!(
                from = ?self.current_chunk,
                to = ?resolved,
                %current_tile,
                "current chunk changed"
            );
            report.chunk_changed = true;
            self.current_chunk = resolved;
        }
        report.current_chunk = resolved;

        let Some(current) = resolved else {
            return report;
        };

        // P2: enable/disable by chunk-center distance.
        let key: DisableKey = (current, self.rings, map.chunk_count());
        if self.disable_cache != Some(key) {
            let max_distance = (self.disable_radius_chunks * self.rings as f64).floor() as i32;
            let centers: Vec<AxialHex> = map.centers().collect();
            for center in centers {
                let distance = current.distance(center);
                let Some(chunk) = map.get_mut(center) else {
                    continue;
                };
                if distance > max_distance && chunk.is_enabled() {
                    chunk.set_enabled(false, &mut *on_instance);
                    report.disabled += 1;
                    tracing::debug!(%center, distance, "chunk disabled");
                } else if distance <= max_distance && !chunk.is_enabled() {
                    chunk.set_enabled(true, &mut *on_instance);
                    report.enabled += 1;
                    tracing::debug!(%center, distance, "chunk re-enabled");
                }
            }
            self.disable_cache = Some((current, self.rings, map.chunk_count()));
        }

        // P3: preload the packing neighbor nearest to the avatar.
        let neighbors = match map.get(current) {
            Some(chunk) if chunk.is_initialized() => *chunk.neighbors(),
            _ => chunk_neighbors(current, self.rings),
        };
        let nearest = neighbors.into_iter().min_by(|a, b| {
            self.world_distance_sq(*a, avatar_world)
                .total_cmp(&self.world_distance_sq(*b, avatar_world))
        });
        if let Some(neighbor) = nearest {
            let distance = self.world_distance_sq(neighbor, avatar_world).sqrt();
            let threshold = self.preload_radius_chunks * self.rings as f64 * self.hex_size * 1.5;
            if distance < threshold {
                enum Preload {
                    Enqueue,
                    Reenable,
                    Nothing,
                }
                let action = match map.get(neighbor) {
                    None => Preload::Enqueue,
                    Some(chunk) if !chunk.is_initialized() && !queue.is_queued(neighbor) => {
                        Preload::Enqueue
                    }
                    Some(chunk) if chunk.is_initialized() && !chunk.is_enabled() => {
                        Preload::Reenable
                    }
                    Some(_) => Preload::Nothing,
                };
                match action {
                    Preload::Enqueue => {
                        queue.enqueue(neighbor, PRELOAD_PRIORITY, map);
                        report.preloaded = Some(neighbor);
                        tracing::debug!(%neighbor, distance, "preloading neighbor chunk");
                    }
                    Preload::Reenable => {
                        if let Some(chunk) = map.get_mut(neighbor) {
                            chunk.set_enabled(true, &mut *on_instance);
                            report.enabled += 1;
                        }
                    }
                    Preload::Nothing => {}
                }
            }
        }

        // P4: anything that changed state warrants a renderer re-sync.
        report.render_sync = report.chunk_changed
            || report.disabled > 0
            || report.enabled > 0
            || report.preloaded.is_some();
        report
    }

    fn world_distance_sq(&self, hex: AxialHex, avatar_world: (f64, f64)) -> f64 {
        let (x, z) = hex_to_world(hex, self.hex_size);
        let dx = x - avatar_world.0;
        let dz = z - avatar_world.1;
        dx * dx + dz * dz
    }

    /// The avatar sat within one ring of its chunk boundary at the last
    /// check, so the cadence tightens.
    fn near_border(&self) -> bool {
        match (self.last_tile, self.current_chunk) {
            (Some(tile), Some(chunk)) => tile.distance(chunk) >= (self.rings - 1).max(0),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::queue::FrameOutcome;
    use hexspace_hex::world_to_hex;
    use std::sync::Arc;

    fn config(rings: i32, hex_size: f64) -> EngineConfig {
        EngineConfig {
            chunk_rings: rings,
            hex_size,
            check_interval_frames: 1,
            border_check_interval_frames: 1,
            ..EngineConfig::default()
        }
    }

    fn queue(config: &EngineConfig) -> GenerationQueue {
        GenerationQueue::new(config, Arc::new(ManualClock::new()))
    }

    fn build_chunk(queue: &mut GenerationQueue, map: &mut WorldMap, center: AxialHex) {
        queue.enqueue(center, 0, map);
        while queue.process_one_frame(map) == FrameOutcome::MorePending {}
        queue.drain_events();
        assert!(map.get(center).unwrap().is_initialized());
    }

    fn noop_instance() -> impl FnMut(RenderHandle, bool) {
        |_, _| {}
    }

    #[test]
    fn resolves_current_chunk_and_logs_change() {
        let config = config(1, 1.0);
        let mut map = WorldMap::new();
        let mut q = queue(&config);
        build_chunk(&mut q, &mut map, AxialHex::ZERO);

        let mut ctl = ProximityController::new(&config);
        let report = ctl.update(
            AxialHex::ZERO,
            (0.0, 0.0),
            &mut map,
            &mut q,
            &mut noop_instance(),
        );
        assert!(report.checked);
        assert_eq!(report.current_chunk, Some(AxialHex::ZERO));
        assert!(report.chunk_changed);
    }

    #[test]
    fn preloads_nearest_neighbor_of_origin() {
        // Avatar at (0.9, 0) with unit hexes: current tile (1, 0), nearest
        // packing neighbor of the origin chunk gets enqueued at priority 100.
        let config = config(1, 1.0);
        let mut map = WorldMap::new();
        let mut q = queue(&config);
        build_chunk(&mut q, &mut map, AxialHex::ZERO);

        let tile = world_to_hex(0.9, 0.0, 1.0);
        assert_eq!(tile, AxialHex::new(1, 0));

        let mut ctl = ProximityController::new(&config);
        let report = ctl.update(tile, (0.9, 0.0), &mut map, &mut q, &mut noop_instance());
        let neighbor = report.preloaded.expect("neighbor preloaded");
        assert!(chunk_neighbors(AxialHex::ZERO, 1).contains(&neighbor));
        assert!(q.is_queued(neighbor));
        assert!(map.contains(neighbor));

        // The preloaded chunk initializes within a few queue frames.
        let mut frames = 0;
        while q.process_one_frame(&mut map) == FrameOutcome::MorePending {
            frames += 1;
            assert!(frames < 10);
        }
        assert!(map.get(neighbor).unwrap().is_initialized());
    }

    #[test]
    fn disables_distant_chunks_in_one_pass() {
        let config = config(1, 1.0);
        let mut map = WorldMap::new();
        let mut q = queue(&config);
        // Chunks at the origin, nearby, and far beyond 4 * rings.
        build_chunk(&mut q, &mut map, AxialHex::ZERO);
        let near = chunk_neighbors(AxialHex::ZERO, 1)[0];
        build_chunk(&mut q, &mut map, near);
        let far = AxialHex::new(100, 0);
        build_chunk(&mut q, &mut map, far);

        let mut ctl = ProximityController::new(&config);
        let report = ctl.update(
            AxialHex::ZERO,
            (0.0, 0.0),
            &mut map,
            &mut q,
            &mut noop_instance(),
        );
        assert_eq!(report.disabled, 1);
        assert!(!map.get(far).unwrap().is_enabled());
        assert!(map.get(AxialHex::ZERO).unwrap().is_enabled());
        assert!(map.get(near).unwrap().is_enabled());
        assert!(report.render_sync);
    }

    #[test]
    fn reenables_chunks_back_in_range() {
        let config = config(1, 1.0);
        let mut map = WorldMap::new();
        let mut q = queue(&config);
        build_chunk(&mut q, &mut map, AxialHex::ZERO);
        let far = AxialHex::new(100, 0);
        build_chunk(&mut q, &mut map, far);

        let mut ctl = ProximityController::new(&config);
        ctl.update(
            AxialHex::ZERO,
            (0.0, 0.0),
            &mut map,
            &mut q,
            &mut noop_instance(),
        );
        assert!(!map.get(far).unwrap().is_enabled());

        // Jump next to the far chunk; it re-enables, the origin disables.
        let report = ctl.update(far, (0.0, 0.0), &mut map, &mut q, &mut noop_instance());
        assert!(map.get(far).unwrap().is_enabled());
        assert!(!map.get(AxialHex::ZERO).unwrap().is_enabled());
        assert!(report.enabled >= 1);
        assert!(report.disabled >= 1);
    }

    #[test]
    fn stable_tick_changes_nothing() {
        // Monotone enable: with the current chunk unchanged and no queue
        // activity, repeated ticks flip no enabled flags.
        let config = config(2, 1.0);
        let mut map = WorldMap::new();
        let mut q = queue(&config);
        build_chunk(&mut q, &mut map, AxialHex::ZERO);

        let mut ctl = ProximityController::new(&config);
        ctl.update(
            AxialHex::ZERO,
            (0.0, 0.0),
            &mut map,
            &mut q,
            &mut noop_instance(),
        );
        let report = ctl.update(
            AxialHex::ZERO,
            (0.0, 0.0),
            &mut map,
            &mut q,
            &mut noop_instance(),
        );
        assert!(!report.chunk_changed);
        assert_eq!(report.disabled, 0);
        assert_eq!(report.enabled, 0);
    }

    #[test]
    fn cadence_skips_off_interval_frames() {
        let config = EngineConfig {
            check_interval_frames: 20,
            border_check_interval_frames: 5,
            chunk_rings: 4,
            hex_size: 1.0,
            ..EngineConfig::default()
        };
        let mut map = WorldMap::new();
        let mut q = queue(&config);
        build_chunk(&mut q, &mut map, AxialHex::ZERO);

        let mut ctl = ProximityController::new(&config);
        let first = ctl.update(
            AxialHex::ZERO,
            (0.0, 0.0),
            &mut map,
            &mut q,
            &mut noop_instance(),
        );
        assert!(first.checked);
        for _ in 0..19 {
            let report = ctl.update(
                AxialHex::ZERO,
                (0.0, 0.0),
                &mut map,
                &mut q,
                &mut noop_instance(),
            );
            assert!(!report.checked);
        }
        let wrapped = ctl.update(
            AxialHex::ZERO,
            (0.0, 0.0),
            &mut map,
            &mut q,
            &mut noop_instance(),
        );
        assert!(wrapped.checked);
    }

    #[test]
    fn border_tightens_cadence() {
        let config = EngineConfig {
            check_interval_frames: 20,
            border_check_interval_frames: 5,
            chunk_rings: 4,
            hex_size: 1.0,
            ..EngineConfig::default()
        };
        let mut map = WorldMap::new();
        let mut q = queue(&config);
        build_chunk(&mut q, &mut map, AxialHex::ZERO);

        let mut ctl = ProximityController::new(&config);
        // First check lands on a border tile (distance rings - 1 from center).
        let border_tile = AxialHex::new(3, 0);
        ctl.update(
            border_tile,
            (0.0, 0.0),
            &mut map,
            &mut q,
            &mut noop_instance(),
        );
        // With the tight cadence the next check is due at frame 5, not 20.
        let mut checked_at = None;
        for frame in 1..20 {
            let report = ctl.update(
                border_tile,
                (0.0, 0.0),
                &mut map,
                &mut q,
                &mut noop_instance(),
            );
            if report.checked {
                checked_at = Some(frame);
                break;
            }
        }
        assert_eq!(checked_at, Some(5));
    }
}
