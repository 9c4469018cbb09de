use crate::astar::hex_astar;
use hexspace_hex::AxialHex;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// A grown road network. `hexes` preserves insertion order for deterministic
/// iteration; `set` backs membership checks.
#[derive(Debug, Default)]
pub struct RoadNetwork {
    hexes: Vec<AxialHex>,
    set: HashSet<AxialHex>,
    pub dropped_seeds: usize,
}

impl RoadNetwork {
    pub fn len(&self) -> usize {
        self.hexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hexes.is_empty()
    }

    pub fn contains(&self, hex: AxialHex) -> bool {
        self.set.contains(&hex)
    }

    pub fn hexes(&self) -> &[AxialHex] {
        &self.hexes
    }

    pub fn into_set(self) -> HashSet<AxialHex> {
        self.set
    }

    fn insert(&mut self, hex: AxialHex) {
        if self.set.insert(hex) {
            self.hexes.push(hex);
        }
    }
}

/// Grow a connected road network over passable terrain.
///
/// Seed points are joined to the existing network with A* paths, so the
/// network is a single connected component by construction; unreachable
/// seeds are dropped with a warning. The network then expands one adjacent
/// hex at a time until it reaches `target` or runs out of frontier.
pub fn grow_network(
    passable: &[AxialHex],
    target: usize,
    seed_count: usize,
    rng: &mut impl Rng,
) -> RoadNetwork {
    let mut network = RoadNetwork::default();
    if passable.is_empty() || target == 0 || seed_count == 0 {
        return network;
    }
    let passable_set: HashSet<AxialHex> = passable.iter().copied().collect();

    let mut shuffled = passable.to_vec();
    shuffled.shuffle(rng);
    let seeds: Vec<AxialHex> = shuffled.iter().take(seed_count).copied().collect();

    network.insert(seeds[0]);
    for &seed in &seeds[1..] {
        if network.contains(seed) {
            continue;
        }
        let nearest = nearest_in_network(&network, seed);
        match hex_astar(nearest, seed, &passable_set) {
            Some(path) => {
                for hex in path {
                    network.insert(hex);
                }
            }
            None => {
                network.dropped_seeds += 1;
                tracing::warn!(%seed, %nearest, "road seed unreachable, dropped");
            }
        }
    }

    // Expansion: append one shuffled frontier hex at a time, keeping the
    // component connected.
    while network.len() < target {
        let mut frontier = Vec::new();
        let mut seen = HashSet::new();
        for &hex in network.hexes() {
            for neighbor in hex.neighbors() {
                if passable_set.contains(&neighbor)
                    && !network.contains(neighbor)
                    && seen.insert(neighbor)
                {
                    frontier.push(neighbor);
                }
            }
        }
        if frontier.is_empty() {
            break;
        }
        frontier.shuffle(rng);
        network.insert(frontier[0]);
    }

    network
}

fn nearest_in_network(network: &RoadNetwork, to: AxialHex) -> AxialHex {
    let mut best = network.hexes()[0];
    let mut best_distance = best.distance(to);
    for &hex in &network.hexes()[1..] {
        let distance = hex.distance(to);
        if distance < best_distance {
            best = hex;
            best_distance = distance;
        }
    }
    best
}
