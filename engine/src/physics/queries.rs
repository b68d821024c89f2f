//! Shape queries
//!
//! One dispatch per operation over the closed [`Shape`] set:
//!
//! - [`nearest_point`] - nearest point on the shape's surface
//! - [`contains`] - strict interior test
//! - [`overlaps`] - does a sphere touch the solid
//! - [`push_out`] - minimal translation that separates a sphere from the solid
//!
//! Queries take world-space input and a [`Frame`]; the point is moved into
//! the frame's local space, evaluated there and the result moved back.
//! Any non-finite intermediate result is reported as "no contact".

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use tracing::warn;

use super::primitives::{
    GEOMETRY_EPSILON, any_perpendicular, clamp_to_annulus, closest_point_on_segment,
    closest_point_on_triangle, finite, nearest_on_ellipsoid, triangle_normal, wrap_angle,
};
use super::shape::{
    BowlShape, CapsuleShape, PlaneShape, PolyWireShape, RoundedCubeShape, Shape, TorusShape,
    TriangleMeshShape, WedgeShape,
};
use super::types::Frame;

/// Penetration shallower than this is left alone, which keeps
/// [`push_out`] idempotent under floating point noise.
pub const PUSH_EPSILON: f32 = 1e-4;

/// Upper bound on wire separation sweeps; sharp joints converge well within it.
const MAX_WIRE_SWEEPS: usize = 32;

/// A single separation applied by a push-out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Nearest surface point (world space).
    pub point: Vec3,
    /// Unit direction from the sphere centre toward `point` after separation.
    pub direction: Vec3,
    /// Distance the centre was moved.
    pub depth: f32,
}

impl Contact {
    /// Outward surface normal at the contact (points toward the sphere).
    #[inline]
    pub fn normal(&self) -> Vec3 {
        -self.direction
    }
}

// ============================================================================
// PUBLIC WORLD-SPACE QUERIES
// ============================================================================

/// Nearest point on the surface of `shape` placed at `frame`.
///
/// Returns `None` when the shape has no valid surface point for this query
/// (every triangle degenerate, non-finite math).
pub fn nearest_point(shape: &Shape, frame: &Frame, query: Vec3) -> Option<Vec3> {
    let local = frame.to_local(query);
    let surface = nearest_surface_local(shape, local)?;
    finite(frame.to_world(surface))
}

/// Whether `point` is strictly inside the solid.
pub fn contains(shape: &Shape, frame: &Frame, point: Vec3) -> bool {
    contains_local(shape, frame.to_local(point))
}

/// Whether a sphere touches or penetrates the solid.
pub fn overlaps(shape: &Shape, frame: &Frame, center: Vec3, radius: f32) -> bool {
    let local = frame.to_local(center);
    if contains_local(shape, local) {
        return true;
    }
    match nearest_surface_local(shape, local) {
        Some(surface) => surface.distance_squared(local) < radius * radius,
        None => false,
    }
}

/// Move `center` minimally so the sphere no longer penetrates the solid.
///
/// Returns whether a correction was applied.
pub fn push_out(shape: &Shape, frame: &Frame, center: &mut Vec3, radius: f32) -> bool {
    push_out_with(shape, frame, center, radius, |_| {})
}

/// [`push_out`] that reports every separation through `on_contact`.
///
/// Triangle meshes and wires separate against each piece in turn and may
/// report several contacts; every other shape reports at most one.
pub fn push_out_with(
    shape: &Shape,
    frame: &Frame,
    center: &mut Vec3,
    radius: f32,
    mut on_contact: impl FnMut(Contact),
) -> bool {
    match shape {
        Shape::TriangleMesh(mesh) => return push_out_mesh(mesh, frame, center, radius, &mut on_contact),
        Shape::PolyWire(wire) => return push_out_wire(wire, frame, center, radius, &mut on_contact),
        _ => {}
    }

    let local = frame.to_local(*center);
    let Some(surface) = nearest_surface_local(shape, local) else {
        return false;
    };
    let inside = contains_local(shape, local);
    let Some((new_local, direction, depth)) =
        separate_from_point(local, surface, radius, inside, || fallback_normal(shape, local))
    else {
        return false;
    };

    let new_center = frame.to_world(new_local);
    if !new_center.is_finite() {
        warn!(shape = ?shape.kind(), center = ?*center, "discarded non-finite push-out");
        return false;
    }
    *center = new_center;
    on_contact(Contact {
        point: frame.to_world(surface),
        direction: frame.vector_to_world(direction),
        depth,
    });
    true
}

// ============================================================================
// SEPARATION
// ============================================================================

/// Separate a sphere from a single surface point.
///
/// `inside` says whether the centre is inside the solid, in which case the
/// centre is carried through the surface. Returns the new centre, the unit
/// direction from the new centre to the surface point and the depth.
fn separate_from_point(
    center: Vec3,
    surface: Vec3,
    radius: f32,
    inside: bool,
    fallback_outward: impl FnOnce() -> Vec3,
) -> Option<(Vec3, Vec3, f32)> {
    let offset = surface - center;
    let dist = offset.length();

    let (outward, depth) = if inside {
        let outward = if dist > GEOMETRY_EPSILON { offset / dist } else { fallback_outward() };
        (outward, dist + radius)
    } else {
        if dist >= radius - PUSH_EPSILON {
            return None;
        }
        let outward = if dist > GEOMETRY_EPSILON { -offset / dist } else { fallback_outward() };
        (outward, radius - dist)
    };

    let new_center = surface + outward * radius;
    new_center.is_finite().then_some((new_center, -outward, depth))
}

/// Outward direction used when the centre sits exactly on the surface.
fn fallback_normal(shape: &Shape, local: Vec3) -> Vec3 {
    match shape {
        Shape::Sphere(_) | Shape::Ellipsoid(_) | Shape::RoundedCube(_) => {
            local.try_normalize().unwrap_or(Vec3::Z)
        }
        _ => Vec3::Z,
    }
}

/// Push out of every segment capsule, repeating until a full sweep moves
/// nothing, since leaving one segment near a joint can enter the next.
fn push_out_wire(
    wire: &PolyWireShape,
    frame: &Frame,
    center: &mut Vec3,
    radius: f32,
    on_contact: &mut impl FnMut(Contact),
) -> bool {
    let mut local = frame.to_local(*center);
    let mut pushed = false;

    for _ in 0..MAX_WIRE_SWEEPS {
        let mut moved = false;
        for (a, b) in wire_segments(wire) {
            let bone = closest_point_on_segment(local, a, b);
            let offset = local - bone;
            let outward = offset.try_normalize().unwrap_or_else(|| any_perpendicular(b - a));
            let surface = bone + outward * wire.radius;
            let inside = offset.length_squared() < wire.radius * wire.radius;
            let Some((new_local, direction, depth)) =
                separate_from_point(local, surface, radius, inside, || outward)
            else {
                continue;
            };
            local = new_local;
            moved = true;
            on_contact(Contact {
                point: frame.to_world(surface),
                direction: frame.vector_to_world(direction),
                depth,
            });
        }
        if !moved {
            break;
        }
        pushed = true;
    }

    if pushed {
        let world = frame.to_world(local);
        if !world.is_finite() {
            warn!(center = ?*center, "discarded non-finite wire push-out");
            return false;
        }
        *center = world;
    }
    pushed
}

fn push_out_mesh(
    mesh: &TriangleMeshShape,
    frame: &Frame,
    center: &mut Vec3,
    radius: f32,
    on_contact: &mut impl FnMut(Contact),
) -> bool {
    let mut local = frame.to_local(*center);
    let mut pushed = false;

    for tri in 0..mesh.triangle_count() {
        let Some([a, b, c]) = mesh.triangle(tri) else {
            continue;
        };
        let Some(surface) = closest_point_on_triangle(local, a, b, c) else {
            continue;
        };
        let fallback = || {
            let n = triangle_normal(a, b, c).unwrap_or(Vec3::Z);
            if n.dot(local - a) < 0.0 { -n } else { n }
        };
        let Some((new_local, direction, depth)) =
            separate_from_point(local, surface, radius, false, fallback)
        else {
            continue;
        };
        local = new_local;
        pushed = true;
        on_contact(Contact {
            point: frame.to_world(surface),
            direction: frame.vector_to_world(direction),
            depth,
        });
    }

    if pushed {
        let world = frame.to_world(local);
        if !world.is_finite() {
            warn!(center = ?*center, "discarded non-finite mesh push-out");
            return false;
        }
        *center = world;
    }
    pushed
}

// ============================================================================
// LOCAL-SPACE DISPATCH
// ============================================================================

pub(crate) fn nearest_surface_local(shape: &Shape, p: Vec3) -> Option<Vec3> {
    let result = match shape {
        Shape::Plane(plane) => nearest_on_plane(plane, p),
        Shape::Sphere(s) => p.try_normalize().unwrap_or(Vec3::Z) * s.radius,
        Shape::Capsule(c) => nearest_on_capsule(c, p),
        Shape::Ellipsoid(e) => nearest_on_ellipsoid(p, e.radii),
        Shape::RoundedCube(cube) => nearest_on_rounded_cube(cube, p),
        Shape::Torus(torus) => nearest_on_torus(torus, p),
        Shape::Bowl(bowl) => nearest_on_bowl(bowl, p),
        Shape::PolyWire(wire) => return nearest_on_wire(wire, p),
        Shape::Wedge(wedge) => return nearest_on_wedge(wedge, p),
        Shape::TriangleMesh(mesh) => return nearest_on_mesh(mesh, p),
    };
    finite(result)
}

pub(crate) fn contains_local(shape: &Shape, p: Vec3) -> bool {
    match shape {
        Shape::Plane(plane) => {
            plane.height > 0.0
                && p.x.abs() < plane.half_length
                && p.y.abs() < plane.half_width
                && p.z > 0.0
                && p.z < plane.height
        }
        Shape::Sphere(s) => p.length_squared() < s.radius * s.radius,
        Shape::Capsule(c) => closest_point_on_segment(p, c.start, c.end).distance_squared(p) < c.radius * c.radius,
        Shape::Ellipsoid(e) => {
            e.radii.min_element() > GEOMETRY_EPSILON && (p / e.radii).length_squared() < 1.0
        }
        Shape::RoundedCube(cube) => {
            let inner = cube.half_extents() - Vec3::splat(cube.edge_radius());
            let q = p.clamp(-inner, inner);
            let r = cube.edge_radius();
            if q == p {
                let half = cube.half_extents();
                p.abs().cmplt(half).all()
            } else {
                q.distance_squared(p) < r * r
            }
        }
        Shape::Torus(torus) => {
            let ring = ring_point(p, torus.ring_radius());
            ring.distance_squared(p) < torus.tube_radius * torus.tube_radius
        }
        Shape::Bowl(bowl) => {
            let d = p.length();
            p.z < 0.0 && d < bowl.radius && d > bowl.inner_radius()
        }
        Shape::PolyWire(wire) => wire_segments(wire).any(|(a, b)| {
            closest_point_on_segment(p, a, b).distance_squared(p) < wire.radius * wire.radius
        }),
        Shape::Wedge(wedge) => WedgeFrame::new(wedge).is_some_and(|frame| frame.contains(p)),
        // Open triangle soup has no interior.
        Shape::TriangleMesh(_) => false,
    }
}

// ============================================================================
// PER-SHAPE NEAREST POINT
// ============================================================================

fn nearest_on_plane(plane: &PlaneShape, p: Vec3) -> Vec3 {
    let min = Vec3::new(-plane.half_length, -plane.half_width, 0.0);
    let max = Vec3::new(plane.half_length, plane.half_width, plane.height);
    let clamped = p.clamp(min, max);
    if clamped != p || plane.height <= 0.0 {
        return clamped;
    }

    // Inside the slab: snap to the closest face.
    let distances = [
        (p.x - min.x, Vec3::new(min.x, p.y, p.z)),
        (max.x - p.x, Vec3::new(max.x, p.y, p.z)),
        (p.y - min.y, Vec3::new(p.x, min.y, p.z)),
        (max.y - p.y, Vec3::new(p.x, max.y, p.z)),
        (p.z - min.z, Vec3::new(p.x, p.y, min.z)),
        (max.z - p.z, Vec3::new(p.x, p.y, max.z)),
    ];
    nearest_candidate(distances)
}

fn nearest_on_capsule(capsule: &CapsuleShape, p: Vec3) -> Vec3 {
    let bone = closest_point_on_segment(p, capsule.start, capsule.end);
    let dir = (p - bone)
        .try_normalize()
        .unwrap_or_else(|| any_perpendicular(capsule.end - capsule.start));
    bone + dir * capsule.radius
}

fn nearest_on_rounded_cube(cube: &RoundedCubeShape, p: Vec3) -> Vec3 {
    let half = cube.half_extents();
    let r = cube.edge_radius();
    let inner = half - Vec3::splat(r);
    let q = p.clamp(-inner, inner);

    if q != p {
        let d = p - q;
        return match d.try_normalize() {
            Some(n) => q + n * r,
            None => q,
        };
    }

    // Inside the inner box: nearest flat face.
    let faces = [
        (half.x - p.x.abs(), Vec3::new(half.x.copysign(p.x), p.y, p.z)),
        (half.y - p.y.abs(), Vec3::new(p.x, half.y.copysign(p.y), p.z)),
        (half.z - p.z.abs(), Vec3::new(p.x, p.y, half.z.copysign(p.z))),
    ];
    nearest_candidate(faces)
}

/// Nearest point on the circle of `radius` around local Z through the origin plane.
fn ring_point(p: Vec3, radius: f32) -> Vec3 {
    let radial = Vec2::new(p.x, p.y).try_normalize().unwrap_or(Vec2::X);
    Vec3::new(radial.x, radial.y, 0.0) * radius
}

/// Nearest point on the torus's central circle.
pub(crate) fn torus_ring_point(torus: &TorusShape, p: Vec3) -> Vec3 {
    ring_point(p, torus.ring_radius())
}

fn nearest_on_torus(torus: &TorusShape, p: Vec3) -> Vec3 {
    let ring = torus_ring_point(torus, p);
    let dir = (p - ring)
        .try_normalize()
        .unwrap_or_else(|| ring.try_normalize().unwrap_or(Vec3::X));
    ring + dir * torus.tube_radius
}

/// Nearest point on a hemispherical shell edge of `radius`, below z = 0.
fn bowl_shell_point(p: Vec3, radius: f32) -> Vec3 {
    let on_sphere = p.try_normalize().unwrap_or(-Vec3::Z) * radius;
    if on_sphere.z > 0.0 {
        ring_point(p, radius)
    } else {
        on_sphere
    }
}

fn nearest_on_bowl(bowl: &BowlShape, p: Vec3) -> Vec3 {
    let outer = bowl_shell_point(p, bowl.radius);
    let inner = bowl_shell_point(p, bowl.inner_radius());
    let lip_2d = clamp_to_annulus(Vec2::new(p.x, p.y), bowl.inner_radius(), bowl.radius);
    let lip = Vec3::new(lip_2d.x, lip_2d.y, 0.0);

    nearest_candidate([outer, inner, lip].map(|c| (c.distance_squared(p), c)))
}

fn wire_segments(wire: &PolyWireShape) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
    wire.joints
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .filter(|(a, b)| a.distance_squared(*b) > GEOMETRY_EPSILON * GEOMETRY_EPSILON)
}

/// Nearest point on the bone polyline of a wire.
pub(crate) fn wire_bone_point(wire: &PolyWireShape, p: Vec3) -> Option<Vec3> {
    wire_segments(wire)
        .map(|(a, b)| closest_point_on_segment(p, a, b))
        .min_by(|x, y| x.distance_squared(p).total_cmp(&y.distance_squared(p)))
}

fn nearest_on_wire(wire: &PolyWireShape, p: Vec3) -> Option<Vec3> {
    // Coincident joints are dropped; a wire of only coincident joints has no surface.
    let (segment, bone) = wire_segments(wire)
        .map(|(a, b)| ((a, b), closest_point_on_segment(p, a, b)))
        .min_by(|x, y| x.1.distance_squared(p).total_cmp(&y.1.distance_squared(p)))?;
    let dir = (p - bone)
        .try_normalize()
        .unwrap_or_else(|| any_perpendicular(segment.1 - segment.0));
    finite(bone + dir * wire.radius)
}

fn nearest_on_mesh(mesh: &TriangleMeshShape, p: Vec3) -> Option<Vec3> {
    (0..mesh.triangle_count())
        .filter_map(|tri| {
            let [a, b, c] = mesh.triangle(tri)?;
            closest_point_on_triangle(p, a, b, c)
        })
        .min_by(|x, y| x.distance_squared(p).total_cmp(&y.distance_squared(p)))
}

fn nearest_on_wedge(wedge: &WedgeShape, p: Vec3) -> Option<Vec3> {
    let frame = WedgeFrame::new(wedge)?;
    finite(frame.nearest_surface(p))
}

fn nearest_candidate<const N: usize>(candidates: [(f32, Vec3); N]) -> Vec3 {
    candidates
        .into_iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, p)| p)
        .unwrap_or(Vec3::ZERO)
}

// ============================================================================
// WEDGE
// ============================================================================

/// Cylindrical coordinates around a wedge bone.
struct WedgeFrame {
    start: Vec3,
    axis: Vec3,
    length: f32,
    u: Vec3,
    v: Vec3,
    radius: f32,
    heading: f32,
    half_aperture: f32,
}

/// A point in wedge cylindrical coordinates.
struct WedgePoint {
    along: f32,
    rho: f32,
    /// Signed angle from the wedge heading.
    delta: f32,
}

impl WedgeFrame {
    fn new(wedge: &WedgeShape) -> Option<Self> {
        let bone = wedge.end - wedge.start;
        let length = bone.length();
        if length < GEOMETRY_EPSILON {
            return None;
        }
        let axis = bone / length;
        let reference = if axis.dot(Vec3::X).abs() < 0.99 { Vec3::X } else { Vec3::Z };
        let u = (reference - axis * reference.dot(axis)).try_normalize()?;
        let v = axis.cross(u);
        Some(Self {
            start: wedge.start,
            axis,
            length,
            u,
            v,
            radius: wedge.radius,
            heading: wedge.heading_deg.to_radians(),
            half_aperture: (wedge.aperture_deg.to_radians() * 0.5).min(PI),
        })
    }

    fn full_turn(&self) -> bool {
        self.half_aperture >= PI - GEOMETRY_EPSILON
    }

    fn decompose(&self, p: Vec3) -> WedgePoint {
        let rel = p - self.start;
        let along = rel.dot(self.axis);
        let x = rel.dot(self.u);
        let y = rel.dot(self.v);
        WedgePoint {
            along,
            rho: x.hypot(y),
            delta: wrap_angle(y.atan2(x) - self.heading),
        }
    }

    fn compose(&self, along: f32, rho: f32, delta: f32) -> Vec3 {
        let angle = self.heading + delta;
        self.start + self.axis * along + (self.u * angle.cos() + self.v * angle.sin()) * rho
    }

    fn contains(&self, p: Vec3) -> bool {
        let w = self.decompose(p);
        w.along > 0.0
            && w.along < self.length
            && w.rho < self.radius
            && (self.full_turn() || w.delta.abs() < self.half_aperture)
    }

    /// Nearest point on the solid; equals `p` when `p` is inside.
    fn clamp(&self, p: Vec3) -> Vec3 {
        let w = self.decompose(p);
        let along = w.along.clamp(0.0, self.length);
        if self.full_turn() || w.delta.abs() <= self.half_aperture {
            return self.compose(along, w.rho.min(self.radius), w.delta);
        }
        let edge = self.half_aperture.copysign(w.delta);
        let projected = (w.rho * (w.delta - edge).cos()).clamp(0.0, self.radius);
        self.compose(along, projected, edge)
    }

    fn nearest_surface(&self, p: Vec3) -> Vec3 {
        if !self.contains(p) {
            return self.clamp(p);
        }
        let w = self.decompose(p);
        let mut candidates = [
            (self.radius - w.rho, self.compose(w.along, self.radius, w.delta)),
            (w.along, self.compose(0.0, w.rho, w.delta)),
            (self.length - w.along, self.compose(self.length, w.rho, w.delta)),
            (f32::INFINITY, p),
            (f32::INFINITY, p),
        ];
        if !self.full_turn() {
            for (slot, edge) in [self.half_aperture, -self.half_aperture].into_iter().enumerate() {
                let gap = w.delta - edge;
                candidates[3 + slot] = (
                    (w.rho * gap.sin()).abs(),
                    self.compose(w.along, w.rho * gap.cos(), edge),
                );
            }
        }
        nearest_candidate(candidates)
    }
}

/// Nearest point on a wedge's bone segment, used by wedge fields.
pub(crate) fn wedge_bone_point(wedge: &WedgeShape, p: Vec3) -> Vec3 {
    closest_point_on_segment(p, wedge.start, wedge.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::shape::TriangleMeshShape;

    const EPS: f32 = 1e-3;

    fn at_origin() -> Frame {
        Frame::IDENTITY
    }

    #[test]
    fn test_sphere_nearest_point_and_overlap() {
        let shape = Shape::sphere(5.0);
        let p = nearest_point(&shape, &at_origin(), Vec3::new(10.0, 0.0, 0.0)).unwrap();
        assert!((p - Vec3::new(5.0, 0.0, 0.0)).length() < EPS);
        assert!(overlaps(&shape, &at_origin(), Vec3::new(5.5, 0.0, 0.0), 1.0));
        assert!(!overlaps(&shape, &at_origin(), Vec3::new(6.5, 0.0, 0.0), 1.0));
    }

    #[test]
    fn test_sphere_push_out_moves_center_to_radius() {
        let shape = Shape::sphere(5.0);
        let mut center = Vec3::new(0.0, 0.0, 5.5);
        assert!(push_out(&shape, &at_origin(), &mut center, 1.0));
        assert!((center - Vec3::new(0.0, 0.0, 6.0)).length() < EPS, "got {:?}", center);
    }

    #[test]
    fn test_push_out_from_inside_crosses_surface() {
        let shape = Shape::sphere(5.0);
        let mut center = Vec3::new(0.0, 4.0, 0.0);
        let mut contact = None;
        assert!(push_out_with(&shape, &at_origin(), &mut center, 1.0, |c| contact = Some(c)));
        assert!((center - Vec3::new(0.0, 6.0, 0.0)).length() < EPS, "got {:?}", center);
        let contact = contact.unwrap();
        assert!((contact.depth - 2.0).abs() < EPS);
        assert!((contact.direction + Vec3::Y).length() < EPS);
    }

    #[test]
    fn test_plane_is_finite_rectangle() {
        let shape = Shape::plane(5.0, 5.0, 0.0);
        let p = nearest_point(&shape, &at_origin(), Vec3::new(9.0, 1.0, 2.0)).unwrap();
        assert!((p - Vec3::new(5.0, 1.0, 0.0)).length() < EPS);
        assert!(!contains(&shape, &at_origin(), Vec3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_plane_slab_contains_interior() {
        let shape = Shape::plane(5.0, 5.0, 3.0);
        assert!(contains(&shape, &at_origin(), Vec3::new(1.0, 1.0, 2.0)));
        assert!(!contains(&shape, &at_origin(), Vec3::new(1.0, 1.0, 3.5)));
    }

    #[test]
    fn test_capsule_nearest_point_uses_bone() {
        let shape = Shape::capsule(1.0, Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 3.0));
        let p = nearest_point(&shape, &at_origin(), Vec3::new(4.0, 0.0, 1.0)).unwrap();
        assert!((p - Vec3::new(1.0, 0.0, 1.0)).length() < EPS);
        let cap = nearest_point(&shape, &at_origin(), Vec3::new(0.0, 0.0, 10.0)).unwrap();
        assert!((cap - Vec3::new(0.0, 0.0, 4.0)).length() < EPS);
    }

    #[test]
    fn test_rounded_cube_faces_and_corners() {
        let sharp = Shape::rounded_cube(4.0, 4.0, 4.0, 0.0);
        let face = nearest_point(&sharp, &at_origin(), Vec3::new(5.0, 0.5, 0.0)).unwrap();
        assert!((face - Vec3::new(2.0, 0.5, 0.0)).length() < EPS);

        let round = Shape::rounded_cube(4.0, 4.0, 4.0, 0.5);
        let corner = nearest_point(&round, &at_origin(), Vec3::splat(10.0)).unwrap();
        let expected = Vec3::ONE + Vec3::ONE.normalize();
        assert!((corner - expected).length() < EPS, "got {:?}", corner);
    }

    #[test]
    fn test_rounded_cube_inside_snaps_to_nearest_face() {
        let cube = Shape::rounded_cube(4.0, 6.0, 2.0, 0.0);
        assert!(contains(&cube, &at_origin(), Vec3::new(0.0, 0.0, 0.5)));
        let p = nearest_point(&cube, &at_origin(), Vec3::new(0.0, 0.0, 0.5)).unwrap();
        assert!((p - Vec3::new(0.0, 0.0, 1.0)).length() < EPS);
    }

    #[test]
    fn test_torus_two_stage_projection() {
        let torus = Shape::torus(1.0, 4.0);
        let p = nearest_point(&torus, &at_origin(), Vec3::new(8.0, 0.0, 0.0)).unwrap();
        assert!((p - Vec3::new(6.0, 0.0, 0.0)).length() < EPS);
        let above = nearest_point(&torus, &at_origin(), Vec3::new(0.0, 5.0, 3.0)).unwrap();
        assert!((above - Vec3::new(0.0, 5.0, 1.0)).length() < EPS);
        assert!(contains(&torus, &at_origin(), Vec3::new(5.0, 0.0, 0.5)));
        assert!(!contains(&torus, &at_origin(), Vec3::ZERO));
    }

    #[test]
    fn test_bowl_picks_inner_outer_and_rim() {
        let bowl = Shape::bowl(10.0, 1.0);
        let inside_cup = nearest_point(&bowl, &at_origin(), Vec3::new(0.0, 0.0, -5.0)).unwrap();
        assert!((inside_cup - Vec3::new(0.0, 0.0, -9.0)).length() < EPS);

        let below = nearest_point(&bowl, &at_origin(), Vec3::new(0.0, 0.0, -15.0)).unwrap();
        assert!((below - Vec3::new(0.0, 0.0, -10.0)).length() < EPS);

        let on_rim = nearest_point(&bowl, &at_origin(), Vec3::new(9.5, 0.0, 2.0)).unwrap();
        assert!((on_rim - Vec3::new(9.5, 0.0, 0.0)).length() < EPS, "got {:?}", on_rim);
    }

    #[test]
    fn test_wire_skips_coincident_joints() {
        let wire = Shape::wire(
            0.5,
            vec![Vec3::ZERO, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 0.0)],
        );
        let p = nearest_point(&wire, &at_origin(), Vec3::new(12.0, 5.0, 0.0)).unwrap();
        assert!((p - Vec3::new(10.5, 5.0, 0.0)).length() < EPS);

        let collapsed = Shape::wire(0.5, vec![Vec3::ONE, Vec3::ONE]);
        assert!(nearest_point(&collapsed, &at_origin(), Vec3::ZERO).is_none());
    }

    #[test]
    fn test_wire_joint_push_out_clears_both_segments() {
        let wire = Shape::wire(
            1.0,
            vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 0.0)],
        );
        let frame = at_origin();
        let mut center = Vec3::new(8.8, 1.6, 0.0);
        let mut contacts = 0;
        assert!(push_out_with(&wire, &frame, &mut center, 1.0, |_| contacts += 1));
        assert!((center - Vec3::new(8.0, 2.0, 0.0)).length() < EPS, "got {:?}", center);
        assert_eq!(contacts, 2);

        let settled = center;
        assert!(!push_out(&wire, &frame, &mut center, 1.0));
        assert_eq!(center, settled);
    }

    #[test]
    fn test_wedge_contains_only_inside_aperture() {
        let wedge = Shape::wedge(5.0, Vec3::new(0.0, -5.0, 0.0), Vec3::new(0.0, 5.0, 0.0), 0.0, 90.0);
        let frame = at_origin();
        // Heading 0 points along local +X around a Y bone.
        assert!(contains(&wedge, &frame, Vec3::new(2.0, 0.0, 0.0)));
        assert!(!contains(&wedge, &frame, Vec3::new(-2.0, 0.0, 0.0)));
        let p = nearest_point(&wedge, &frame, Vec3::new(8.0, 0.0, 0.0)).unwrap();
        assert!((p - Vec3::new(5.0, 0.0, 0.0)).length() < EPS, "got {:?}", p);
    }

    #[test]
    fn test_mesh_push_out_per_triangle() {
        let mesh = TriangleMeshShape::new(
            vec![
                Vec3::new(-5.0, -5.0, 0.0),
                Vec3::new(5.0, -5.0, 0.0),
                Vec3::new(5.0, 5.0, 0.0),
                Vec3::new(-5.0, 5.0, 0.0),
            ],
            vec![0u32, 1, 2, 0, 2, 3, 0, 0, 1],
        );
        let shape = Shape::TriangleMesh(mesh);
        let mut center = Vec3::new(1.0, 1.0, 0.5);
        let mut contacts = 0;
        assert!(push_out_with(&shape, &at_origin(), &mut center, 1.0, |_| contacts += 1));
        assert!((center.z - 1.0).abs() < EPS, "got {:?}", center);
        assert_eq!(contacts, 1);
    }

    #[test]
    fn test_push_out_respects_frame() {
        let frame = Frame::from_yaw_pitch_roll(Vec3::new(0.0, 0.0, 10.0), 0.0, 0.0, 180.0);
        let shape = Shape::plane(5.0, 5.0, 0.0);
        // Rolled upside down: the plane's local +Z is world -Z.
        let mut center = Vec3::new(0.0, 0.0, 9.5);
        assert!(push_out(&shape, &frame, &mut center, 1.0));
        assert!((center.z - 9.0).abs() < EPS, "got {:?}", center);
    }

    #[test]
    fn test_second_push_out_is_noop() {
        let shape = Shape::ellipsoid(Vec3::new(6.0, 3.0, 2.0));
        let mut center = Vec3::new(1.0, 2.0, 1.5);
        assert!(push_out(&shape, &at_origin(), &mut center, 1.0));
        let after_first = center;
        assert!(!push_out(&shape, &at_origin(), &mut center, 1.0));
        assert_eq!(center, after_first);
    }
}
