use hexspace_hex::AxialHex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The closed set of tile kinds a generated hex can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Grass,
    Building,
    Road,
    Forest,
    Water,
}

impl TileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grass => "grass",
            Self::Building => "building",
            Self::Road => "road",
            Self::Forest => "forest",
            Self::Water => "water",
        }
    }

    /// Stable byte tag used for canonical state hashing.
    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::Grass => 0,
            Self::Building => 1,
            Self::Road => 2,
            Self::Forest => 3,
            Self::Water => 4,
        }
    }
}

impl std::fmt::Display for TileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a renderer-owned tile instance.
///
/// The core only stores and clears it; creation and disposal belong to the
/// rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderHandle(pub Uuid);

impl RenderHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RenderHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// A single hex tile inside a chunk. `hex` is the world coordinate, not
/// chunk-local.
#[derive(Debug, Clone)]
pub struct Tile {
    pub hex: AxialHex,
    pub kind: Option<TileKind>,
    pub enabled: bool,
    pub instance: Option<RenderHandle>,
}

impl Tile {
    pub fn ungenerated(hex: AxialHex) -> Self {
        Self {
            hex,
            kind: None,
            enabled: true,
            instance: None,
        }
    }
}

/// Per-kind tile counts for inspection and CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileStats {
    pub grass: usize,
    pub building: usize,
    pub road: usize,
    pub forest: usize,
    pub water: usize,
    pub unassigned: usize,
}

impl TileStats {
    pub fn tally<'a>(tiles: impl Iterator<Item = &'a Tile>) -> Self {
        let mut stats = Self::default();
        for tile in tiles {
            match tile.kind {
                Some(TileKind::Grass) => stats.grass += 1,
                Some(TileKind::Building) => stats.building += 1,
                Some(TileKind::Road) => stats.road += 1,
                Some(TileKind::Forest) => stats.forest += 1,
                Some(TileKind::Water) => stats.water += 1,
                None => stats.unassigned += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.grass + self.building + self.road + self.forest + self.water + self.unassigned
    }
}

impl std::fmt::Display for TileStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "grass={} building={} road={} forest={} water={} unassigned={} total={}",
            self.grass,
            self.building,
            self.road,
            self.forest,
            self.water,
            self.unassigned,
            self.total()
        )
    }
}
