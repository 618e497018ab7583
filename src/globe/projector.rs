//! Latitude/longitude to screen projection on the rotating sphere

/// Fraction of the radius behind the limb that still counts as visible.
/// Keeps markers from popping at the horizon.
const LIMB_TOLERANCE: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub x: f32,
    pub y: f32,
    /// Signed depth proxy, positive towards the viewer
    pub z: f32,
    pub visible: bool,
}

/// Project a coordinate in degrees for a rotation in radians.
///
/// Total over all inputs: out-of-range lat/lng simply wrap around the sphere.
pub fn project(lat: f32, lng: f32, rotation: f32, center_x: f32, center_y: f32, radius: f32) -> Projection {
    let phi = (90.0 - lat).to_radians();
    let theta = (lng + 180.0 + rotation.to_degrees()).to_radians();

    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    let x = center_x + radius * sin_phi * cos_theta;
    let y = center_y - radius * cos_phi;
    let z = radius * sin_phi * sin_theta;

    Projection {
        x,
        y,
        z,
        visible: z > -radius * LIMB_TOLERANCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn north_pole_maps_to_top_for_any_rotation() {
        for rotation in [0.0, 0.5, 1.0, 3.0, 6.0] {
            for lng in [-180.0, -45.0, 0.0, 120.0] {
                let p = project(90.0, lng, rotation, 100.0, 100.0, 50.0);
                assert!((p.y - 50.0).abs() < EPS, "y={} at lng={lng} rot={rotation}", p.y);
            }
        }
    }

    #[test]
    fn equator_prime_meridian_at_rest() {
        let p = project(0.0, 0.0, 0.0, 100.0, 100.0, 50.0);
        assert!((p.x - 50.0).abs() < EPS);
        assert!((p.y - 100.0).abs() < EPS);
        assert!(p.z.abs() < EPS);
        assert!(p.visible);
    }

    #[test]
    fn far_side_is_culled() {
        // theta = 270 degrees puts the point straight behind the sphere
        let p = project(0.0, 90.0, 0.0, 0.0, 0.0, 50.0);
        assert!((p.z + 50.0).abs() < EPS);
        assert!(!p.visible);
    }

    #[test]
    fn slightly_past_limb_stays_visible() {
        // theta = 190 degrees: z = -r*sin(10deg) ~ -0.17r, above the -0.3r cutoff
        let p = project(0.0, 10.0, 0.0, 0.0, 0.0, 50.0);
        assert!(p.z < 0.0);
        assert!(p.visible);
    }

    #[test]
    fn rotation_shifts_longitude() {
        let quarter = std::f32::consts::FRAC_PI_2;
        let rotated = project(0.0, 0.0, quarter, 0.0, 0.0, 50.0);
        let shifted = project(0.0, 90.0, 0.0, 0.0, 0.0, 50.0);
        assert!((rotated.x - shifted.x).abs() < EPS);
        assert!((rotated.z - shifted.z).abs() < EPS);
    }

    #[test]
    fn out_of_range_input_is_finite() {
        let p = project(400.0, -1000.0, 12.0, 10.0, 10.0, 5.0);
        assert!(p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
    }
}
