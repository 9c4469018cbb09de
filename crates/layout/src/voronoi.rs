use hexspace_hex::AxialHex;
use hexspace_kernel::TileKind;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// A biome seed: every hex adopts the kind of its nearest seed.
#[derive(Debug, Clone, Copy)]
pub struct BiomeSeed {
    pub hex: AxialHex,
    pub kind: TileKind,
}

/// Pick biome seeds uniformly from the union, in declaration order: forest,
/// then water, then grass. Declaration order is also the tie-break when a hex
/// is equidistant from several seeds.
pub fn pick_seeds(
    union: &[AxialHex],
    forest: usize,
    water: usize,
    grass: usize,
    rng: &mut impl Rng,
) -> Vec<BiomeSeed> {
    let mut seeds = Vec::with_capacity(forest + water + grass);
    for (count, kind) in [
        (forest, TileKind::Forest),
        (water, TileKind::Water),
        (grass, TileKind::Grass),
    ] {
        for _ in 0..count {
            if let Some(&hex) = union.choose(rng) {
                seeds.push(BiomeSeed { hex, kind });
            }
        }
    }
    seeds
}

/// Assign every union hex the kind of its cube-distance-nearest seed.
/// With no seeds the map is empty and every hex stays unassigned.
pub fn assign_biomes(union: &[AxialHex], seeds: &[BiomeSeed]) -> HashMap<AxialHex, TileKind> {
    let mut biomes = HashMap::with_capacity(union.len());
    if seeds.is_empty() {
        return biomes;
    }
    for &hex in union {
        let mut best = seeds[0];
        let mut best_distance = hex.distance(best.hex);
        for seed in &seeds[1..] {
            let distance = hex.distance(seed.hex);
            if distance < best_distance {
                best = *seed;
                best_distance = distance;
            }
        }
        biomes.insert(hex, best.kind);
    }
    biomes
}
