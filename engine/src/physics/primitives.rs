//! Closest-point primitives
//!
//! Allocation-free geometric helpers shared by the shape queries. Everything
//! here works in a shape's local space and knows nothing about frames.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

/// Lengths below this are treated as zero.
pub const GEOMETRY_EPSILON: f32 = 1e-6;

const ELLIPSOID_ITERATIONS: usize = 64;

/// Nearest point to `p` on the segment `a..b`.
///
/// A zero-length segment collapses to `a`.
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < GEOMETRY_EPSILON * GEOMETRY_EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Whether the triangle has (near) zero area.
pub fn triangle_is_degenerate(a: Vec3, b: Vec3, c: Vec3) -> bool {
    (b - a).cross(c - a).length_squared() < GEOMETRY_EPSILON * GEOMETRY_EPSILON
}

/// Nearest point to `p` on triangle `abc` (Voronoi region walk).
///
/// # Returns
/// `None` for degenerate triangles or non-finite results.
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
    if triangle_is_degenerate(a, b, c) {
        return None;
    }

    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return Some(a);
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return Some(b);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return finite(a + ab * v);
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return Some(c);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return finite(a + ac * w);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return finite(b + (c - b) * w);
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    finite(a + ab * v + ac * w)
}

/// Unit normal of triangle `abc` using the `(b - a) x (c - a)` winding.
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
    (b - a).cross(c - a).try_normalize()
}

#[inline]
pub fn finite(p: Vec3) -> Option<Vec3> {
    p.is_finite().then_some(p)
}

/// Any unit vector perpendicular to `v`.
pub fn any_perpendicular(v: Vec3) -> Vec3 {
    let candidate = if v.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    v.cross(candidate).try_normalize().unwrap_or(Vec3::Z)
}

/// Nearest point on the surface of an axis-aligned ellipsoid.
///
/// Solves for the Lagrange parameter `t` of the projection
/// `x_i = e_i^2 y_i / (t + e_i^2)` by bisection, which is robust for points
/// both outside and inside. Falls back to radial scaling in the degenerate
/// interior case where the root sits on the boundary of the search range.
pub fn nearest_on_ellipsoid(p: Vec3, radii: Vec3) -> Vec3 {
    let e = radii;
    if e.min_element() <= GEOMETRY_EPSILON {
        // Flattened ellipsoid: the solid is (at most) a disc or segment.
        return p.clamp(-e, e);
    }

    let sign = Vec3::new(sign_of(p.x), sign_of(p.y), sign_of(p.z));
    let y = p.abs();
    let scaled = y / e;
    let k = scaled.length_squared();

    if k < GEOMETRY_EPSILON {
        // Centre: the nearest surface point is the end of the shortest axis.
        let mut out = Vec3::ZERO;
        let axis = min_axis(e);
        out[axis] = e[axis];
        return out;
    }

    let e2 = e * e;
    let f = |t: f32| -> f32 {
        let q = e * y / (Vec3::splat(t) + e2);
        q.length_squared() - 1.0
    };

    let (mut lo, mut hi) = if k > 1.0 {
        (0.0, e.max_element() * y.length() + e2.max_element())
    } else {
        let lower = -e2.min_element() * (1.0 - 1e-5);
        if f(lower) < 0.0 {
            return p / k.sqrt();
        }
        (lower, 0.0)
    };

    for _ in 0..ELLIPSOID_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if f(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let t = 0.5 * (lo + hi);
    let x = e2 * y / (Vec3::splat(t) + e2);
    let result = x * sign;
    if result.is_finite() {
        result
    } else {
        p / k.sqrt()
    }
}

#[inline]
fn sign_of(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

fn min_axis(v: Vec3) -> usize {
    if v.x <= v.y && v.x <= v.z {
        0
    } else if v.y <= v.z {
        1
    } else {
        2
    }
}

/// Wrap an angle in radians into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle.rem_euclid(TAU);
    if a > PI {
        a -= TAU;
    }
    a
}

/// Project a 2D point onto a disc annulus `inner..=outer` around the origin.
pub fn clamp_to_annulus(p: Vec2, inner: f32, outer: f32) -> Vec2 {
    let len = p.length();
    let dir = if len > GEOMETRY_EPSILON { p / len } else { Vec2::X };
    dir * len.clamp(inner, outer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_clamps_to_endpoints() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 0.0, 0.0);
        assert_eq!(closest_point_on_segment(Vec3::new(-5.0, 1.0, 0.0), a, b), a);
        assert_eq!(closest_point_on_segment(Vec3::new(15.0, 1.0, 0.0), a, b), b);
        let mid = closest_point_on_segment(Vec3::new(4.0, 3.0, 0.0), a, b);
        assert!((mid - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_length_segment_collapses_to_start() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(closest_point_on_segment(Vec3::ZERO, a, a), a);
    }

    #[test]
    fn test_triangle_interior_projection() {
        let a = Vec3::ZERO;
        let b = Vec3::new(4.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 4.0, 0.0);
        let p = closest_point_on_triangle(Vec3::new(1.0, 1.0, 5.0), a, b, c).unwrap();
        assert!((p - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_triangle_edge_region() {
        let a = Vec3::ZERO;
        let b = Vec3::new(4.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 4.0, 0.0);
        let p = closest_point_on_triangle(Vec3::new(2.0, -3.0, 0.0), a, b, c).unwrap();
        assert!((p - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_degenerate_triangle_is_skipped() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        assert!(closest_point_on_triangle(Vec3::Z, a, b, b * 2.0).is_none());
        assert!(closest_point_on_triangle(Vec3::Z, a, a, b).is_none());
    }

    #[test]
    fn test_ellipsoid_matches_sphere_when_radii_equal() {
        let p = nearest_on_ellipsoid(Vec3::new(3.0, 4.0, 0.0), Vec3::splat(2.0));
        assert!((p - Vec3::new(1.2, 1.6, 0.0)).length() < 1e-3, "got {:?}", p);
    }

    #[test]
    fn test_ellipsoid_on_axis_point() {
        let radii = Vec3::new(5.0, 2.0, 1.0);
        let outside = nearest_on_ellipsoid(Vec3::new(9.0, 0.0, 0.0), radii);
        assert!((outside - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-3, "got {:?}", outside);

        let inside = nearest_on_ellipsoid(Vec3::new(0.0, 0.0, 0.5), radii);
        assert!((inside - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-3, "got {:?}", inside);
    }

    #[test]
    fn test_ellipsoid_result_lies_on_surface() {
        let radii = Vec3::new(6.0, 3.0, 2.0);
        let p = nearest_on_ellipsoid(Vec3::new(4.0, 5.0, -3.0), radii);
        let level = (p / radii).length_squared();
        assert!((level - 1.0).abs() < 1e-3, "level {}", level);
    }

    #[test]
    fn test_wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-0.5 * PI) + 0.5 * PI).abs() < 1e-5);
    }
}
