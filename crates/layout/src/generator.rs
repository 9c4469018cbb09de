use crate::constraints::{BuildingDensity, Clustering, LayoutConstraints};
use crate::roads::grow_network;
use crate::voronoi::{assign_biomes, pick_seeds};
use hexspace_hex::AxialHex;
use hexspace_kernel::{TileKind, WorldMap};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// Grass ratio at which the configured grass seed count applies unscaled.
const BASELINE_GRASS_RATIO: f64 = 0.3;

/// Tuning for the layout pipeline. Defaults follow the shipped world tuning.
#[derive(Debug, Clone)]
pub struct LayoutParams {
    pub chunk_rings: i32,
    pub forest_seeds: usize,
    pub water_seeds: usize,
    pub grass_seeds: usize,
    pub road_density_ratio: f64,
    pub road_seed_ratio: f64,
    pub building_density_sparse: f64,
    pub building_density_medium: f64,
    pub building_density_dense: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            chunk_rings: 10,
            forest_seeds: 4,
            water_seeds: 3,
            grass_seeds: 6,
            road_density_ratio: 0.10,
            road_seed_ratio: 0.25,
            building_density_sparse: 0.05,
            building_density_medium: 0.10,
            building_density_dense: 0.15,
        }
    }
}

impl LayoutParams {
    fn building_ratio(&self, density: BuildingDensity) -> f64 {
        match density {
            BuildingDensity::Sparse => self.building_density_sparse,
            BuildingDensity::Medium => self.building_density_medium,
            BuildingDensity::Dense => self.building_density_dense,
        }
    }
}

/// What one layout run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutOutcome {
    pub chunks: usize,
    pub tiles: usize,
    pub roads: usize,
    pub buildings: usize,
    pub dropped_road_seeds: usize,
}

/// Caller-visible layout failures. A failed run commits nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout union contains no passable terrain")]
    NoPassableTerrain,
}

/// The constraint-based layout pipeline: Voronoi biomes, growing-tree roads,
/// road-adjacent buildings, grass fill, then a single commit.
///
/// Each run derives its RNG from the construction seed and the union
/// content, so re-running over the same chunks reproduces the same terrain
/// and roads regardless of what was generated in between.
pub struct LayoutGenerator {
    params: LayoutParams,
    constraints: LayoutConstraints,
    seed: u64,
}

impl LayoutGenerator {
    pub fn new(params: LayoutParams, seed: u64) -> Self {
        Self {
            params,
            constraints: LayoutConstraints::default(),
            seed,
        }
    }

    pub fn constraints(&self) -> &LayoutConstraints {
        &self.constraints
    }

    pub fn set_constraints(&mut self, constraints: LayoutConstraints) {
        self.constraints = constraints;
    }

    /// Generate tile kinds for every enabled, initialized chunk that has not
    /// been generated yet. A no-op when there is nothing to do.
    pub fn generate(&mut self, map: &mut WorldMap) -> Result<LayoutOutcome, LayoutError> {
        let mut targets: Vec<AxialHex> = map
            .chunks()
            .filter(|c| c.is_enabled() && c.is_initialized() && !c.tiles_generated())
            .map(|c| c.center())
            .collect();
        targets.sort();
        if targets.is_empty() {
            return Ok(LayoutOutcome::default());
        }
        self.run(map, &targets)
    }

    /// Clear `tiles_generated` across all enabled chunks and re-run the
    /// pipeline. The only legal mutation of tile kinds after generation.
    pub fn force_recompute(&mut self, map: &mut WorldMap) -> Result<LayoutOutcome, LayoutError> {
        for chunk in map.chunks_mut() {
            if chunk.is_enabled() {
                chunk.clear_generated();
            }
        }
        self.generate(map)
    }

    fn run(&mut self, map: &mut WorldMap, targets: &[AxialHex]) -> Result<LayoutOutcome, LayoutError> {
        let _span = tracing::info_span!("layout_run", chunks = targets.len()).entered();

        // Union of target chunk tiles, first-seen order for determinism.
        let mut union: Vec<AxialHex> = Vec::new();
        let mut in_union = HashSet::new();
        for &center in targets {
            if let Some(chunk) = map.get(center) {
                for tile in chunk.tiles() {
                    if in_union.insert(tile.hex) {
                        union.push(tile.hex);
                    }
                }
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.run_seed(&union));

        // Step A: Voronoi biomes.
        let grass_seeds = ((self.params.grass_seeds as f64)
            * (self.constraints.grass_ratio / BASELINE_GRASS_RATIO))
            .round() as usize;
        let seeds = pick_seeds(
            &union,
            self.params.forest_seeds,
            self.params.water_seeds,
            grass_seeds,
            &mut rng,
        );
        let biomes = assign_biomes(&union, &seeds);

        // Step B: passable terrain.
        let passable: Vec<AxialHex> = union
            .iter()
            .copied()
            .filter(|h| {
                matches!(
                    biomes.get(h).copied(),
                    Some(TileKind::Grass | TileKind::Forest)
                )
            })
            .collect();
        if passable.is_empty() {
            tracing::warn!("layout union has no passable terrain, nothing committed");
            return Err(LayoutError::NoPassableTerrain);
        }

        // Step C: growing-tree road network.
        let road_target = (self.params.road_density_ratio * passable.len() as f64).floor() as usize;
        let seed_count = (self.params.road_seed_ratio * road_target as f64).ceil() as usize;
        let network = grow_network(&passable, road_target, seed_count, &mut rng);
        let dropped_road_seeds = network.dropped_seeds;
        let roads = network.len();
        let road_set = network.into_set();

        // Step D: buildings on road-adjacent passable hexes.
        let buildings = self.place_buildings(&passable, &road_set, &mut rng);

        // Steps E + F: resolve every union hex to a final kind and commit.
        let mut committed_tiles = 0usize;
        for &hex in &union {
            let computed = if road_set.contains(&hex) {
                TileKind::Road
            } else if buildings.contains(&hex) {
                TileKind::Building
            } else {
                biomes.get(&hex).copied().unwrap_or(TileKind::Grass)
            };

            // The index owner is authoritative: a boundary hex already frozen
            // by an earlier generation keeps its kind.
            let owner = map.chunk_for_tile_fast(hex, self.params.chunk_rings);
            let final_kind = match owner.and_then(|o| map.get(o)) {
                Some(chunk) if chunk.tiles_generated() => chunk
                    .tile(hex)
                    .and_then(|t| t.kind)
                    .unwrap_or(computed),
                _ => computed,
            };

            if let Some(owner) = owner {
                if let Some(chunk) = map.get_mut(owner) {
                    // Frozen owners already hold `final_kind`; the write is
                    // idempotent there.
                    let _ = chunk.set_tile_kind(hex, final_kind);
                }
            }
            for &center in targets {
                if Some(center) == owner {
                    continue;
                }
                if let Some(chunk) = map.get_mut(center) {
                    if chunk.contains(hex) {
                        let _ = chunk.set_tile_kind(hex, final_kind);
                    }
                }
            }
            committed_tiles += 1;
        }

        for &center in targets {
            if let Some(chunk) = map.get_mut(center) {
                debug_assert!(chunk.has_all_kinds_assigned());
                chunk.mark_generated();
            }
        }

        tracing::info!(
            chunks = targets.len(),
            tiles = committed_tiles,
            roads,
            buildings = buildings.len(),
            dropped_road_seeds,
            "layout committed"
        );
        Ok(LayoutOutcome {
            chunks: targets.len(),
            tiles: committed_tiles,
            roads,
            buildings: buildings.len(),
            dropped_road_seeds,
        })
    }

    /// Shuffle road-adjacent candidates, order them by the clustering policy,
    /// and place up to the density target, re-verifying adjacency at
    /// placement time.
    fn place_buildings(
        &self,
        passable: &[AxialHex],
        road_set: &HashSet<AxialHex>,
        rng: &mut ChaCha8Rng,
    ) -> HashSet<AxialHex> {
        let mut candidates: Vec<AxialHex> = passable
            .iter()
            .copied()
            .filter(|h| !road_set.contains(h))
            .filter(|h| h.neighbors().iter().any(|n| road_set.contains(n)))
            .collect();
        candidates.shuffle(rng);

        let ratio = self.params.building_ratio(self.constraints.building_density);
        let target = (ratio * candidates.len() as f64).floor() as usize;

        let mut placed: HashSet<AxialHex> = HashSet::new();
        let mut placed_order: Vec<AxialHex> = Vec::new();
        while placed.len() < target {
            let next = match self.constraints.clustering {
                Clustering::Clustered => {
                    // Prefer the candidate nearest the previous placement.
                    let anchor = placed_order.last().copied();
                    let best = candidates
                        .iter()
                        .enumerate()
                        .filter(|(_, h)| !placed.contains(*h))
                        .min_by_key(|(i, h)| {
                            (anchor.map_or(0, |a| a.distance(**h)), *i)
                        })
                        .map(|(i, _)| i);
                    match best {
                        Some(i) => candidates[i],
                        None => break,
                    }
                }
                Clustering::Distributed | Clustering::Random => {
                    let spaced = self.constraints.clustering == Clustering::Distributed;
                    let pick = candidates.iter().copied().find(|h| {
                        !placed.contains(h)
                            && (!spaced || !h.neighbors().iter().any(|n| placed.contains(n)))
                    });
                    match pick {
                        Some(h) => h,
                        None => break,
                    }
                }
            };
            // Re-verify at placement time.
            if road_set.contains(&next) || !next.neighbors().iter().any(|n| road_set.contains(n)) {
                break;
            }
            placed.insert(next);
            placed_order.push(next);
        }
        placed
    }

    /// Per-run RNG seed: the construction seed folded with the union
    /// content, so identical unions replay identically.
    fn run_seed(&self, union: &[AxialHex]) -> u64 {
        let mut acc = self.seed;
        for hex in union {
            acc = acc
                .wrapping_mul(31)
                .wrapping_add((hex.q as u64).wrapping_mul(17).wrapping_add(hex.r as u64));
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexspace_kernel::{Chunk, TileStats, GRID_BATCH};
    use hexspace_hex::{chunk_neighbors, CubeHex};
    use std::collections::VecDeque;

    fn build_chunk(map: &mut WorldMap, center: AxialHex, rings: i32) {
        let mut chunk = Chunk::placeholder(center, 1.0);
        let coords: Vec<AxialHex> = center
            .to_cube()
            .grid(rings)
            .into_iter()
            .map(CubeHex::to_axial)
            .collect();
        for batch in coords.chunks(GRID_BATCH) {
            chunk.append_tiles(batch);
        }
        chunk.compute_neighbors(rings);
        chunk.mark_initialized();
        map.add_placeholder(chunk);
        let mut cursor = 0;
        loop {
            let n = map.index_chunk_tiles(center, cursor, 200);
            if n == 0 {
                break;
            }
            cursor += n;
        }
    }

    fn params(rings: i32) -> LayoutParams {
        LayoutParams {
            chunk_rings: rings,
            ..LayoutParams::default()
        }
    }

    fn world_stats(map: &WorldMap) -> TileStats {
        TileStats::tally(map.chunks().flat_map(|c| c.tiles()))
    }

    fn road_hexes(map: &WorldMap) -> HashSet<AxialHex> {
        let mut roads = HashSet::new();
        for chunk in map.chunks() {
            for tile in chunk.tiles() {
                if tile.kind == Some(TileKind::Road) {
                    roads.insert(tile.hex);
                }
            }
        }
        roads
    }

    fn roads_connected(map: &WorldMap) -> bool {
        let roads = road_hexes(map);
        let Some(&first) = roads.iter().next() else {
            return true;
        };
        let mut visited = HashSet::from([first]);
        let mut frontier = VecDeque::from([first]);
        while let Some(hex) = frontier.pop_front() {
            for n in hex.neighbors() {
                if roads.contains(&n) && visited.insert(n) {
                    frontier.push_back(n);
                }
            }
        }
        visited.len() == roads.len()
    }

    #[test]
    fn single_chunk_generates_every_tile() {
        let mut map = WorldMap::new();
        build_chunk(&mut map, AxialHex::ZERO, 5);
        let mut generator = LayoutGenerator::new(params(5), 42);

        let outcome = generator.generate(&mut map).unwrap();
        assert_eq!(outcome.chunks, 1);
        assert_eq!(outcome.tiles, 91);

        let chunk = map.get(AxialHex::ZERO).unwrap();
        assert!(chunk.tiles_generated());
        assert!(chunk.has_all_kinds_assigned());
        assert_eq!(world_stats(&map).unassigned, 0);
    }

    #[test]
    fn roads_form_one_connected_component() {
        // Scenario: a union of two adjacent chunks, roads BFS-connected.
        let rings = 4;
        let mut map = WorldMap::new();
        build_chunk(&mut map, AxialHex::ZERO, rings);
        build_chunk(&mut map, chunk_neighbors(AxialHex::ZERO, rings)[0], rings);

        let mut generator = LayoutGenerator::new(params(rings), 7);
        let outcome = generator.generate(&mut map).unwrap();
        assert!(outcome.roads > 0);
        assert!(roads_connected(&map));
    }

    #[test]
    fn second_generate_is_a_no_op() {
        let mut map = WorldMap::new();
        build_chunk(&mut map, AxialHex::ZERO, 4);
        let mut generator = LayoutGenerator::new(params(4), 9);

        generator.generate(&mut map).unwrap();
        let hash = map.state_hash();
        let outcome = generator.generate(&mut map).unwrap();
        assert_eq!(outcome, LayoutOutcome::default());
        assert_eq!(map.state_hash(), hash);
    }

    #[test]
    fn same_seed_reproduces_identical_worlds() {
        let build = |seed| {
            let mut map = WorldMap::new();
            build_chunk(&mut map, AxialHex::ZERO, 4);
            let mut generator = LayoutGenerator::new(params(4), seed);
            generator.generate(&mut map).unwrap();
            map.state_hash()
        };
        assert_eq!(build(5), build(5));
        assert_ne!(build(5), build(6));
    }

    #[test]
    fn force_recompute_changes_density_not_roads() {
        let rings = 5;
        let mut map = WorldMap::new();
        build_chunk(&mut map, AxialHex::ZERO, rings);
        build_chunk(&mut map, chunk_neighbors(AxialHex::ZERO, rings)[0], rings);

        let mut generator = LayoutGenerator::new(params(rings), 21);
        generator.set_constraints(LayoutConstraints {
            building_density: BuildingDensity::Sparse,
            ..LayoutConstraints::default()
        });
        let sparse = generator.generate(&mut map).unwrap();

        generator.set_constraints(LayoutConstraints {
            building_density: BuildingDensity::Dense,
            ..LayoutConstraints::default()
        });
        let dense = generator.force_recompute(&mut map).unwrap();

        // Same union and run seed: identical roads, three times the target
        // building count (both floored from the same candidate pool).
        assert_eq!(sparse.roads, dense.roads);
        assert!(dense.buildings >= sparse.buildings);
        assert!(map.get(AxialHex::ZERO).unwrap().tiles_generated());
    }

    #[test]
    fn all_water_union_fails_cleanly() {
        let mut map = WorldMap::new();
        build_chunk(&mut map, AxialHex::ZERO, 3);
        let all_water = LayoutParams {
            forest_seeds: 0,
            water_seeds: 3,
            grass_seeds: 0,
            chunk_rings: 3,
            ..LayoutParams::default()
        };
        let mut generator = LayoutGenerator::new(all_water, 1);
        generator.set_constraints(LayoutConstraints {
            grass_ratio: 0.0,
            ..LayoutConstraints::default()
        });

        assert_eq!(
            generator.generate(&mut map),
            Err(LayoutError::NoPassableTerrain)
        );
        let chunk = map.get(AxialHex::ZERO).unwrap();
        assert!(!chunk.tiles_generated());
        assert!(chunk.tiles().all(|t| t.kind.is_none()));
    }

    #[test]
    fn buildings_touch_roads() {
        let mut map = WorldMap::new();
        build_chunk(&mut map, AxialHex::ZERO, 5);
        let mut generator = LayoutGenerator::new(params(5), 3);
        generator.generate(&mut map).unwrap();

        let roads = road_hexes(&map);
        for chunk in map.chunks() {
            for tile in chunk.tiles() {
                if tile.kind == Some(TileKind::Building) {
                    assert!(
                        tile.hex.neighbors().iter().any(|n| roads.contains(n)),
                        "building at {} has no adjacent road",
                        tile.hex
                    );
                }
            }
        }
    }

    #[test]
    fn generation_never_overwrites_frozen_boundary_tiles() {
        let rings = 3;
        let a = AxialHex::ZERO;
        let b = chunk_neighbors(a, rings)[0];

        let mut map = WorldMap::new();
        build_chunk(&mut map, a, rings);
        let mut generator = LayoutGenerator::new(params(rings), 11);
        generator.generate(&mut map).unwrap();
        let hash_after_a = map.state_hash();

        // Record `a`'s kinds, then generate the adjacent chunk.
        let a_kinds: Vec<(AxialHex, Option<TileKind>)> = map
            .get(a)
            .unwrap()
            .tiles()
            .map(|t| (t.hex, t.kind))
            .collect();
        build_chunk(&mut map, b, rings);
        generator.generate(&mut map).unwrap();

        let chunk_a = map.get(a).unwrap();
        for (hex, kind) in a_kinds {
            assert_eq!(chunk_a.tile(hex).unwrap().kind, kind);
        }
        // Index ownership (and thus the hash over it) for `a`'s tiles is
        // untouched; only `b`'s new tiles were added.
        assert_ne!(map.state_hash(), hash_after_a);
    }
}
