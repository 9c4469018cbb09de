use glam::Vec3;
use hexspace_hex::{hex_to_world, AxialHex};
use hexspace_kernel::{RenderHandle, TileKind};
use std::collections::HashMap;

/// World position of a tile's instance, on the y = 0 plane.
pub fn tile_world_position(hex: AxialHex, hex_size: f64) -> Vec3 {
    let (x, z) = hex_to_world(hex, hex_size);
    Vec3::new(x as f32, 0.0, z as f32)
}

/// Renderer-agnostic tile instancing interface. One implementation per
/// rendering backend.
///
/// The renderer owns instance lifetimes; the core only stores the opaque
/// handles. It never mutates world truth — tile kinds and enabled flags are
/// kernel-owned.
pub trait TileRenderer {
    /// Instantiate a tile mesh of the given kind. Returns the opaque handle
    /// the core stores on the tile.
    fn create_instance(&mut self, kind: TileKind, position: Vec3) -> RenderHandle;

    /// Shift an instance, used by floating-origin rebases.
    fn move_instance(&mut self, handle: RenderHandle, delta: Vec3);

    /// Show or hide an instance without disposing it.
    fn set_instance_enabled(&mut self, handle: RenderHandle, enabled: bool);

    /// Dispose an instance; the handle becomes dangling for the renderer.
    fn dispose_instance(&mut self, handle: RenderHandle);
}

/// Recorded state of one instance in the [`RecordingRenderer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceRecord {
    pub kind: TileKind,
    pub position: Vec3,
    pub enabled: bool,
}

/// In-memory renderer backend — workaround for a GPU backend. Records every
/// instancing operation so CLI output and tests can observe what a real
/// renderer would have drawn.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    instances: HashMap<RenderHandle, InstanceRecord>,
    created: usize,
    disposed: usize,
    moved: usize,
    toggled: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instance(&self, handle: RenderHandle) -> Option<&InstanceRecord> {
        self.instances.get(&handle)
    }

    pub fn live_instances(&self) -> usize {
        self.instances.len()
    }

    pub fn enabled_instances(&self) -> usize {
        self.instances.values().filter(|i| i.enabled).count()
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn disposed(&self) -> usize {
        self.disposed
    }

    pub fn moved(&self) -> usize {
        self.moved
    }

    pub fn toggled(&self) -> usize {
        self.toggled
    }
}

impl TileRenderer for RecordingRenderer {
    fn create_instance(&mut self, kind: TileKind, position: Vec3) -> RenderHandle {
        let handle = RenderHandle::new();
        self.instances.insert(
            handle,
            InstanceRecord {
                kind,
                position,
                enabled: true,
            },
        );
        self.created += 1;
        handle
    }

    fn move_instance(&mut self, handle: RenderHandle, delta: Vec3) {
        if let Some(record) = self.instances.get_mut(&handle) {
            record.position += delta;
            self.moved += 1;
        }
    }

    fn set_instance_enabled(&mut self, handle: RenderHandle, enabled: bool) {
        if let Some(record) = self.instances.get_mut(&handle) {
            record.enabled = enabled;
            self.toggled += 1;
        }
    }

    fn dispose_instance(&mut self, handle: RenderHandle) {
        if self.instances.remove(&handle).is_some() {
            self.disposed += 1;
        }
    }
}
