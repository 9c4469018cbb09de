use hexspace_hex::AxialHex;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Open-set entry, ordered so the heap pops the lowest `f`, breaking ties by
/// lower heuristic, then by coordinate for determinism.
#[derive(Debug, PartialEq, Eq)]
struct OpenNode {
    f: i32,
    h: i32,
    hex: AxialHex,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.hex.cmp(&self.hex))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* over the 6-neighbor hex graph with unit step cost and cube-distance
/// heuristic. Returns the full path including both endpoints, or `None` when
/// the goal is unreachable within `walkable`.
pub fn hex_astar(
    start: AxialHex,
    goal: AxialHex,
    walkable: &HashSet<AxialHex>,
) -> Option<Vec<AxialHex>> {
    if !walkable.contains(&start) || !walkable.contains(&goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut open = BinaryHeap::new();
    let mut closed: HashSet<AxialHex> = HashSet::new();
    let mut g_scores: HashMap<AxialHex, i32> = HashMap::new();
    let mut parents: HashMap<AxialHex, AxialHex> = HashMap::new();

    let h_start = start.distance(goal);
    open.push(OpenNode {
        f: h_start,
        h: h_start,
        hex: start,
    });
    g_scores.insert(start, 0);

    while let Some(current) = open.pop() {
        if closed.contains(&current.hex) {
            continue;
        }
        closed.insert(current.hex);

        if current.hex == goal {
            let mut path = vec![goal];
            let mut cursor = goal;
            while let Some(&parent) = parents.get(&cursor) {
                path.push(parent);
                cursor = parent;
            }
            path.reverse();
            return Some(path);
        }

        let g = g_scores[&current.hex];
        for neighbor in current.hex.neighbors() {
            if !walkable.contains(&neighbor) || closed.contains(&neighbor) {
                continue;
            }
            let tentative = g + 1;
            if tentative < g_scores.get(&neighbor).copied().unwrap_or(i32::MAX) {
                g_scores.insert(neighbor, tentative);
                parents.insert(neighbor, current.hex);
                let h = neighbor.distance(goal);
                open.push(OpenNode {
                    f: tentative + h,
                    h,
                    hex: neighbor,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexspace_hex::CubeHex;

    fn disc(radius: i32) -> HashSet<AxialHex> {
        AxialHex::ZERO
            .to_cube()
            .grid(radius)
            .into_iter()
            .map(CubeHex::to_axial)
            .collect()
    }

    #[test]
    fn trivial_path_is_single_node() {
        let walkable = disc(2);
        assert_eq!(
            hex_astar(AxialHex::ZERO, AxialHex::ZERO, &walkable),
            Some(vec![AxialHex::ZERO])
        );
    }

    #[test]
    fn straight_line_has_distance_plus_one_nodes() {
        let walkable = disc(5);
        let goal = AxialHex::new(4, 0);
        let path = hex_astar(AxialHex::ZERO, goal, &walkable).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&AxialHex::ZERO));
        assert_eq!(path.last(), Some(&goal));
    }

    #[test]
    fn path_steps_are_adjacent_and_walkable() {
        let mut walkable = disc(4);
        // Carve a wall through the middle, leaving one gap.
        for r in -4..=4 {
            let hex = AxialHex::new(1, r);
            if r != 3 {
                walkable.remove(&hex);
            }
        }
        let goal = AxialHex::new(3, -1);
        let path = hex_astar(AxialHex::new(-2, 0), goal, &walkable).unwrap();
        for pair in path.windows(2) {
            assert_eq!(pair[0].distance(pair[1]), 1);
        }
        assert!(path.iter().all(|h| walkable.contains(h)));
        assert!(path.contains(&AxialHex::new(1, 3)), "must pass the gap");
    }

    #[test]
    fn unreachable_goal_returns_none() {
        let mut walkable = disc(3);
        // Fully sever the goal from the rest.
        let goal = AxialHex::new(3, 0);
        for n in goal.neighbors() {
            walkable.remove(&n);
        }
        assert_eq!(hex_astar(AxialHex::ZERO, goal, &walkable), None);
    }

    #[test]
    fn endpoints_must_be_walkable() {
        let walkable = disc(2);
        assert_eq!(
            hex_astar(AxialHex::new(10, 0), AxialHex::ZERO, &walkable),
            None
        );
        assert_eq!(
            hex_astar(AxialHex::ZERO, AxialHex::new(10, 0), &walkable),
            None
        );
    }
}
