use glam::Vec3;
use hexspace_hex::{hex_to_world, world_to_hex, AxialHex};
use hexspace_kernel::RenderHandle;
use std::collections::HashMap;

/// Floating-origin rebaser.
///
/// Keeps the magnitude of live scene coordinates bounded: when the avatar
/// drifts more than `threshold` from the current origin, every registered
/// scene position shifts back by the drift and the drift's hex equivalent is
/// accumulated into `world_hex_offset`. The avatar's true world hex is always
/// `local_hex + world_hex_offset`.
///
/// All positions here are engine-frame. The renderer reports avatar
/// coordinates with a mirrored x axis; [`FloatingOrigin::engine_frame`]
/// applies the `-local_x` convention exactly once, at that boundary.
pub struct FloatingOrigin {
    origin_world: Vec3,
    world_hex_offset: AxialHex,
    threshold: f32,
    scene: HashMap<RenderHandle, Vec3>,
}

impl FloatingOrigin {
    pub fn new(threshold: f32) -> Self {
        Self {
            origin_world: Vec3::ZERO,
            world_hex_offset: AxialHex::ZERO,
            threshold,
            scene: HashMap::new(),
        }
    }

    /// Convert a renderer-local avatar position to the engine frame.
    pub fn engine_frame(local: Vec3) -> Vec3 {
        Vec3::new(-local.x, local.y, local.z)
    }

    pub fn origin_world(&self) -> Vec3 {
        self.origin_world
    }

    pub fn world_hex_offset(&self) -> AxialHex {
        self.world_hex_offset
    }

    /// Register a scene position (mesh, positional light) to be shifted on
    /// every rebase.
    pub fn register_scene_position(&mut self, handle: RenderHandle, position: Vec3) {
        self.scene.insert(handle, position);
    }

    pub fn unregister_scene_position(&mut self, handle: RenderHandle) {
        self.scene.remove(&handle);
    }

    /// Apply a renderer-driven move to a registered scene position.
    pub fn move_scene_position(&mut self, handle: RenderHandle, delta: Vec3) {
        if let Some(position) = self.scene.get_mut(&handle) {
            *position += delta;
        }
    }

    pub fn scene_position(&self, handle: RenderHandle) -> Option<Vec3> {
        self.scene.get(&handle).copied()
    }

    /// Handles of every registered scene position.
    pub fn scene_handles(&self) -> Vec<RenderHandle> {
        self.scene.keys().copied().collect()
    }

    /// Rebase if the avatar has drifted beyond the threshold. Returns the
    /// offset subtracted from every registered scene position, if any.
    pub fn maybe_rebase(&mut self, avatar_world: Vec3, hex_size: f64) -> Option<Vec3> {
        let offset = avatar_world - self.origin_world;
        if offset.length() <= self.threshold {
            return None;
        }

        let hex_delta = world_to_hex(offset.x as f64, offset.z as f64, hex_size);
        self.world_hex_offset = self.world_hex_offset + hex_delta;
        for position in self.scene.values_mut() {
            *position -= offset;
        }
        self.origin_world = avatar_world;
        tracing::info!(
            offset = ?offset,
            %hex_delta,
            world_hex_offset = %self.world_hex_offset,
            "floating origin rebased"
        );
        Some(offset)
    }

    /// The avatar's position relative to the current origin.
    pub fn local_offset(&self, avatar_world: Vec3) -> Vec3 {
        avatar_world - self.origin_world
    }

    /// The avatar's true world hex: local hex plus the accumulated offset.
    pub fn true_hex(&self, avatar_world: Vec3, hex_size: f64) -> AxialHex {
        let local = self.local_offset(avatar_world);
        world_to_hex(local.x as f64, local.z as f64, hex_size) + self.world_hex_offset
    }

    /// The avatar's true world XZ position, offset-adjusted. Used for
    /// world-distance comparisons against chunk centers.
    pub fn true_world_xz(&self, avatar_world: Vec3, hex_size: f64) -> (f64, f64) {
        let local = self.local_offset(avatar_world);
        let (ox, oz) = hex_to_world(self.world_hex_offset, hex_size);
        (ox + local.x as f64, oz + local.z as f64)
    }
}
