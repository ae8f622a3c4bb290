//! Pure numeric helpers shared by the mesh and terrain builders.
//!
//! Everything here works on plain `f32` / glam values and carries no grid
//! state, so each helper is tested in isolation.

use std::f32::consts::PI;

use glam::{Quat, Vec2, Vec3};

use crate::hex::corner_offset_2d;

/// Drops the height of a world position: `(x, y, z) -> (x, z)`
pub fn to_map2d(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Shortest distance from `point` to the segment `a`-`b`.
///
/// A zero-length segment degenerates to point distance.
pub fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Cosine smoothstep on `[0, 1]`: `0.5 - 0.5 * cos(pi * x)`
pub fn cosine_smoothstep(x: f32) -> f32 {
    0.5 - 0.5 * (PI * x.clamp(0.0, 1.0)).cos()
}

/// Sine ease-in-out of a linear parameter
pub fn smooth_lerp(t: f32) -> f32 {
    0.5 + (PI * (t.clamp(0.0, 1.0) - 0.5)).sin() * 0.5
}

/// Clamped inverse lerp. Returns 0 for an empty range.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Rescales Perlin output (nominally `[-1, 1]`) onto `[lo, hi]`.
/// Not clamped: noise can overshoot its nominal range slightly.
///
/// ```
/// # use hexstrat_core::math::map_noise_to_range;
/// // Mountain relief between the peak height and the mountain height
/// assert_eq!(map_noise_to_range(-1.0, 0.4, 0.8), 0.4);
/// assert!((map_noise_to_range(1.0, 0.4, 0.8) - 0.8).abs() < 1e-6);
/// assert!((map_noise_to_range(0.0, 0.4, 0.8) - 0.6).abs() < 1e-6);
/// ```
pub fn map_noise_to_range(noise: f64, lo: f32, hi: f32) -> f32 {
    let t = noise as f32 * 0.5 + 0.5;
    lo + (hi - lo) * t
}

/// Unit normal of triangle `a b c`. Mesh triangles face +Y.
/// Collinear corners give `Vec3::ZERO`.
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Rotates `v` about +Y by a bearing in degrees (clockwise seen from above)
pub fn rotate_azimuth(v: Vec3, degrees: f32) -> Vec3 {
    Quat::from_rotation_y(degrees.to_radians()) * v
}

/// Distance from a point (relative to a cell center) to the nearest cell edge.
///
/// The edge is picked by the point's bearing, so this is only meaningful for
/// points inside or near the cell.
pub fn hexagon_space_distance(sample: Vec2) -> f32 {
    let bearing = sample.x.atan2(sample.y).to_degrees().rem_euclid(360.0);
    let edge = (bearing / 60.0).floor() as i32;
    distance_to_segment(sample, corner_offset_2d(edge), corner_offset_2d(edge + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::CIRCUMRADIUS;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_segment_distance_perpendicular() {
        let d = distance_to_segment(Vec2::new(0.5, 2.0), Vec2::ZERO, Vec2::new(1.0, 0.0));
        assert!((d - 2.0).abs() < EPS);
    }

    #[test]
    fn test_segment_distance_past_endpoint() {
        let d = distance_to_segment(Vec2::new(4.0, 4.0), Vec2::ZERO, Vec2::new(1.0, 0.0));
        assert!((d - 5.0).abs() < EPS);
    }

    #[test]
    fn test_segment_distance_degenerate() {
        let p = Vec2::new(1.0, 1.0);
        let d = distance_to_segment(Vec2::new(4.0, 5.0), p, p);
        assert!((d - 5.0).abs() < EPS);
    }

    #[test]
    fn test_cosine_smoothstep_endpoints() {
        assert!(cosine_smoothstep(0.0).abs() < EPS);
        assert!((cosine_smoothstep(1.0) - 1.0).abs() < EPS);
        assert!((cosine_smoothstep(0.5) - 0.5).abs() < EPS);
        assert!(cosine_smoothstep(-3.0).abs() < EPS);
        assert!((cosine_smoothstep(7.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_cosine_smoothstep_monotonic() {
        let mut last = 0.0;
        for i in 1..=20 {
            let v = cosine_smoothstep(i as f32 / 20.0);
            assert!(v > last);
            last = v;
        }
    }

    #[test]
    fn test_smooth_lerp() {
        assert!(smooth_lerp(0.0).abs() < EPS);
        assert!((smooth_lerp(0.5) - 0.5).abs() < EPS);
        assert!((smooth_lerp(1.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_inverse_lerp() {
        assert_eq!(inverse_lerp(-1.0, 1.0, 0.0), 0.5);
        assert_eq!(inverse_lerp(-1.0, 1.0, 3.0), 1.0);
        assert_eq!(inverse_lerp(-1.0, 1.0, -3.0), 0.0);
        assert_eq!(inverse_lerp(2.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn test_map_noise_to_range() {
        assert_eq!(map_noise_to_range(-1.0, 0.0, 1.0), 0.0);
        assert_eq!(map_noise_to_range(1.0, 0.0, 1.0), 1.0);
        assert_eq!(map_noise_to_range(0.0, -1.0, 1.0), 0.0);
        // Overshoot passes through
        assert!(map_noise_to_range(1.2, 0.0, 1.0) > 1.0);
    }

    #[test]
    fn test_triangle_normal_up() {
        // Clockwise from above (+Z then +X) faces +Y
        let n = triangle_normal(Vec3::ZERO, Vec3::Z, Vec3::X);
        assert!((n - Vec3::Y).length() < EPS);
        let n = triangle_normal(Vec3::ZERO, Vec3::X, Vec3::Z);
        assert!((n + Vec3::Y).length() < EPS);
    }

    #[test]
    fn test_triangle_normal_degenerate() {
        let n = triangle_normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert_eq!(n, Vec3::ZERO);
    }

    #[test]
    fn test_to_map2d_drops_height() {
        assert_eq!(to_map2d(Vec3::new(1.5, 7.0, -2.0)), Vec2::new(1.5, -2.0));
    }

    #[test]
    fn test_rotate_azimuth_clockwise() {
        let v = rotate_azimuth(Vec3::Z, 90.0);
        assert!((v - Vec3::X).length() < EPS);
        let v = rotate_azimuth(Vec3::Z, -90.0);
        assert!((v + Vec3::X).length() < EPS);
        let v = rotate_azimuth(Vec3::Z * CIRCUMRADIUS, 60.0);
        assert!((v - crate::hex::corner_offset(1)).length() < EPS);
    }

    #[test]
    fn test_hexagon_space_distance() {
        // Center is one apothem (0.5) from every edge
        assert!((hexagon_space_distance(Vec2::ZERO) - 0.5).abs() < EPS);
        // On an edge midpoint
        let mid = (corner_offset_2d(2) + corner_offset_2d(3)) * 0.5;
        assert!(hexagon_space_distance(mid) < EPS);
        // Halfway to the north-east edge
        let half = (corner_offset_2d(1) + corner_offset_2d(2)) * 0.25;
        assert!((hexagon_space_distance(half) - 0.25).abs() < EPS);
    }

    #[test]
    fn test_hexagon_space_distance_is_nearest_edge() {
        for i in 0..40 {
            let angle = (i as f32 * 37.0).to_radians();
            let radius = 0.45 * (i % 9) as f32 / 8.0;
            let p = Vec2::new(angle.sin(), angle.cos()) * radius;
            let nearest = (0..6)
                .map(|e| distance_to_segment(p, corner_offset_2d(e), corner_offset_2d(e + 1)))
                .fold(f32::INFINITY, f32::min);
            assert!((hexagon_space_distance(p) - nearest).abs() < EPS, "{p:?}");
        }
    }
}
