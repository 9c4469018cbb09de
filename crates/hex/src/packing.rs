use crate::axial::AxialHex;

/// The six packing-neighbor chunk centers of a chunk with the given radius.
///
/// The base offset vector is `(1, 0)` for radius 0, otherwise
/// `(rings, rings + 1)`. The base is pre-rotated by four clockwise 60-degree
/// steps to align with the grid orientation, then rotated six more times to
/// emit one neighbor per direction. Adjacent chunk outlines touch without
/// gaps; inter-center distance is `2 * rings + 1` (1 for rings = 0).
pub fn chunk_neighbors(center: AxialHex, rings: i32) -> [AxialHex; 6] {
    let base = if rings == 0 {
        AxialHex::new(1, 0)
    } else {
        AxialHex::new(rings, rings + 1)
    };

    let mut offset = base;
    for _ in 0..4 {
        offset = offset.rotate_cw();
    }

    let mut neighbors = [AxialHex::ZERO; 6];
    for slot in &mut neighbors {
        *slot = center + offset;
        offset = offset.rotate_cw();
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_grid_neighbor_set() {
        // Radius-2 chunk at the origin: the packing lattice fixed by the
        // four-step pre-rotation.
        let expected: HashSet<AxialHex> = [
            AxialHex::new(2, 3),
            AxialHex::new(-3, 5),
            AxialHex::new(-5, 2),
            AxialHex::new(-2, -3),
            AxialHex::new(3, -5),
            AxialHex::new(5, -2),
        ]
        .into_iter()
        .collect();

        let got: HashSet<AxialHex> = chunk_neighbors(AxialHex::ZERO, 2).into_iter().collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn neighbor_distance_is_two_rings_plus_one() {
        for rings in 1..=10 {
            let center = AxialHex::new(7, -3);
            for n in chunk_neighbors(center, rings) {
                assert_eq!(center.distance(n), 2 * rings + 1, "rings = {rings}");
            }
        }
    }

    #[test]
    fn radius_zero_neighbors_at_distance_one() {
        let neighbors = chunk_neighbors(AxialHex::ZERO, 0);
        for n in neighbors {
            assert_eq!(AxialHex::ZERO.distance(n), 1);
        }
        let unique: HashSet<_> = neighbors.into_iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn neighbors_are_distinct_and_translate_with_center() {
        let at_origin = chunk_neighbors(AxialHex::ZERO, 3);
        let shifted = chunk_neighbors(AxialHex::new(10, -4), 3);
        for (a, b) in at_origin.iter().zip(shifted.iter()) {
            assert_eq!(*a + AxialHex::new(10, -4), *b);
        }
        let unique: HashSet<_> = at_origin.into_iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn neighbor_lattice_closes_under_opposites() {
        // Walking to a neighbor and back lands on the starting center.
        let center = AxialHex::ZERO;
        for n in chunk_neighbors(center, 4) {
            let back = chunk_neighbors(n, 4);
            assert!(back.contains(&center), "no return edge from {n}");
        }
    }
}
