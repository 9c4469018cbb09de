use crate::axial::AxialHex;

/// Convert an axial hex to a pointy-top world position `(x, z)`.
///
/// `size` is the center-to-vertex distance in world units.
pub fn hex_to_world(hex: AxialHex, size: f64) -> (f64, f64) {
    let sqrt3 = 3.0_f64.sqrt();
    let q = hex.q as f64;
    let r = hex.r as f64;
    let x = size * (sqrt3 * q + sqrt3 / 2.0 * r);
    let z = size * (1.5 * r);
    (x, z)
}

/// Convert a world position `(x, z)` to the containing hex.
///
/// Computes fractional axial coordinates and rounds in cube space: each
/// component is rounded to the nearest integer, then the component with the
/// largest rounding error is reset so `q + r + s = 0` holds.
pub fn world_to_hex(x: f64, z: f64, size: f64) -> AxialHex {
    let sqrt3 = 3.0_f64.sqrt();
    let qf = (sqrt3 / 3.0 * x - z / 3.0) / size;
    let rf = (2.0 / 3.0 * z) / size;
    let sf = -qf - rf;

    let mut q = qf.round();
    let mut r = rf.round();
    let mut s = sf.round();

    let dq = (q - qf).abs();
    let dr = (r - rf).abs();
    let ds = (s - sf).abs();

    if dq > dr && dq > ds {
        q = -r - s;
    } else if dr > ds {
        r = -q - s;
    } else {
        s = -q - r;
    }
    debug_assert_eq!(q as i32 + r as i32 + s as i32, 0);

    AxialHex::new(q as i32, r as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_origin() {
        assert_eq!(hex_to_world(AxialHex::ZERO, 6.0), (0.0, 0.0));
        assert_eq!(world_to_hex(0.0, 0.0, 6.0), AxialHex::ZERO);
    }

    #[test]
    fn round_trip_on_hex_centers() {
        let size = 20.0 / 3.0;
        for q in -10..=10 {
            for r in -10..=10 {
                let hex = AxialHex::new(q, r);
                let (x, z) = hex_to_world(hex, size);
                assert_eq!(world_to_hex(x, z, size), hex, "round trip failed at {hex}");
            }
        }
    }

    #[test]
    fn rounding_resolves_near_centers() {
        let size = 1.0;
        let (x, z) = hex_to_world(AxialHex::new(3, -2), size);
        // Small perturbations stay inside the same hex.
        assert_eq!(world_to_hex(x + 0.2, z - 0.2, size), AxialHex::new(3, -2));
        assert_eq!(world_to_hex(x - 0.2, z + 0.2, size), AxialHex::new(3, -2));
    }

    #[test]
    fn unit_size_resolves_adjacent_hex() {
        // An avatar at (0.9, 0.0) with size 1 sits in hex (1, 0).
        assert_eq!(world_to_hex(0.9, 0.0, 1.0), AxialHex::new(1, 0));
    }

    #[test]
    fn scales_linearly_with_size() {
        let hex = AxialHex::new(2, 1);
        let (x1, z1) = hex_to_world(hex, 1.0);
        let (x4, z4) = hex_to_world(hex, 4.0);
        assert!((x4 - 4.0 * x1).abs() < 1e-12);
        assert!((z4 - 4.0 * z1).abs() < 1e-12);
    }
}
