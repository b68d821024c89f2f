//! Gravity fields
//!
//! A field is an attraction volume owned by one attractor. It carries its
//! own containment [`Shape`] (usually the collision shape grown by a margin)
//! and a copy of whatever geometry its pull direction needs, so no field
//! ever has to reach back into its attractor's shape. Only the pull
//! *target* comes from the attractor, passed in as a capability.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::physics::primitives::closest_point_on_segment;
use crate::physics::queries;
use crate::physics::{Frame, Shape};

use super::attractor::AttractorHandle;

/// Opaque index of a gravity field inside its [`crate::world::Level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldHandle(pub(crate) u32);

impl FieldHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a field turns "actor is inside me" into a gravity direction.
///
/// Vectors are in the field's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PullMode {
    /// Straight along the field's local -Z, keeping gravity perpendicular to a slab.
    LocalDown,
    /// Toward the field origin.
    TowardCenter,
    /// Toward the nearest point on a bone segment.
    TowardSegment { start: Vec3, end: Vec3 },
    /// Toward the nearest point on a circle of `radius` around local Z.
    TowardRing { radius: f32 },
    /// Down while above the rim plane; inside the cup toward the centre,
    /// or away from it within `inner_radius` so the actor sticks to the
    /// inner shell.
    Bowl { inner_radius: f32 },
    /// Toward the attractor's nearest collision-surface point.
    TowardSurface,
}

impl PullMode {
    /// Natural pull mode for a field whose containment shape is `shape`.
    pub fn for_shape(shape: &Shape) -> Self {
        match shape {
            Shape::Plane(_) => Self::LocalDown,
            Shape::Sphere(_) => Self::TowardCenter,
            Shape::Capsule(c) => Self::TowardSegment {
                start: c.start,
                end: c.end,
            },
            Shape::Wedge(w) => Self::TowardSegment {
                start: w.start,
                end: w.end,
            },
            Shape::Torus(t) => Self::TowardRing {
                radius: t.ring_radius(),
            },
            _ => Self::TowardSurface,
        }
    }
}

/// Result of a field claiming the actor this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityPull {
    pub field: FieldHandle,
    /// Nearest point on the owning attractor's collision surface.
    pub target: Vec3,
    pub vector: Vec3,
}

#[derive(Debug, Clone)]
pub struct GravityField {
    pub(crate) handle: FieldHandle,
    pub(crate) attractor: AttractorHandle,
    pub(crate) shape: Shape,
    /// Attractor frame shifted by the field's local offset.
    pub(crate) frame: Frame,
    pub(crate) offset: Vec3,
    pub(crate) force: f32,
    pub(crate) pull: PullMode,
}

impl GravityField {
    pub fn handle(&self) -> FieldHandle {
        self.handle
    }

    pub fn attractor(&self) -> AttractorHandle {
        self.attractor
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn force(&self) -> f32 {
        self.force
    }

    pub fn pull_mode(&self) -> PullMode {
        self.pull
    }

    /// Whether a sphere is within this field's volume.
    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        queries::overlaps(&self.shape, &self.frame, center, radius)
    }

    /// Evaluate the field against an actor sphere.
    ///
    /// `nearest_on_surface` answers "nearest point on the owning attractor's
    /// collision shape". Returns `None` when the sphere is outside the field
    /// or any part of the computation is degenerate.
    pub fn evaluate(
        &self,
        center: Vec3,
        radius: f32,
        nearest_on_surface: impl FnOnce(Vec3) -> Option<Vec3>,
    ) -> Option<GravityPull> {
        if !self.contains_sphere(center, radius) {
            return None;
        }
        let target = nearest_on_surface(center)?;
        let direction = self.pull_direction(center, target)?;
        let vector = direction * self.force;
        vector.is_finite().then_some(GravityPull {
            field: self.handle,
            target,
            vector,
        })
    }

    fn pull_direction(&self, center: Vec3, target: Vec3) -> Option<Vec3> {
        let frame = &self.frame;
        let toward = match self.pull {
            PullMode::LocalDown => -frame.up(),
            PullMode::TowardCenter => frame.position - center,
            PullMode::TowardSegment { start, end } => {
                let local = frame.to_local(center);
                frame.to_world(closest_point_on_segment(local, start, end)) - center
            }
            PullMode::TowardRing { radius } => {
                let local = frame.to_local(center);
                let ring = glam::Vec2::new(local.x, local.y)
                    .try_normalize()
                    .unwrap_or(glam::Vec2::X)
                    * radius;
                frame.to_world(Vec3::new(ring.x, ring.y, 0.0)) - center
            }
            PullMode::Bowl { inner_radius } => {
                let local = frame.to_local(center);
                if local.z > 0.0 {
                    -frame.up()
                } else if local.length() <= inner_radius {
                    center - frame.position
                } else {
                    frame.position - center
                }
            }
            PullMode::TowardSurface => target - center,
        };
        toward.try_normalize()
    }
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// Prefab field layouts authored alongside their meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefabPreset {
    /// Sphere field lifted above the spout.
    Teapot,
    /// Wedge field along the station's underside.
    SkyStation,
    /// Plain sphere field.
    Mountain,
    /// 49 x 49 slab field.
    Fortress,
}

/// Optional gravity-field part of an attractor descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDesc {
    /// Grow the collision shape by `margin` to get the field volume.
    Margin {
        margin: f32,
        force: f32,
        #[serde(default)]
        offset: Vec3,
    },
    /// Explicit containment shape; pull mode defaults to the shape's natural one.
    Shape {
        shape: Shape,
        force: f32,
        #[serde(default)]
        offset: Vec3,
        #[serde(default)]
        pull: Option<PullMode>,
    },
    /// Prefab preset. `extent` is the radius (or slab height for the fortress).
    Preset {
        preset: PrefabPreset,
        extent: f32,
        force: f32,
    },
}

impl FieldDesc {
    pub fn force(&self) -> f32 {
        match self {
            Self::Margin { force, .. } | Self::Shape { force, .. } | Self::Preset { force, .. } => *force,
        }
    }

    /// Resolve into (containment shape, local offset, pull mode).
    ///
    /// `collision` is the attractor's shape after any prefab scaling; `scale`
    /// is the prefab scale (1 for primitives).
    pub(crate) fn resolve(&self, collision: &Shape, scale: f32) -> (Shape, Vec3, PullMode) {
        match self {
            Self::Margin { margin, offset, .. } => {
                let (shape, extra_offset, pull) = grown_field(collision, *margin);
                (shape, *offset + extra_offset, pull)
            }
            Self::Shape {
                shape, offset, pull, ..
            } => (shape.clone(), *offset, pull.unwrap_or_else(|| PullMode::for_shape(shape))),
            Self::Preset { preset, extent, .. } => preset_field(*preset, *extent, scale),
        }
    }
}

/// Field volume for a collision shape grown by `g`.
fn grown_field(collision: &Shape, g: f32) -> (Shape, Vec3, PullMode) {
    let shape = match collision {
        Shape::Plane(p) => Shape::plane(p.half_length, p.half_width, p.height + g),
        Shape::Sphere(s) => Shape::sphere(s.radius + g),
        Shape::Capsule(c) => Shape::capsule(c.radius + g, c.start, c.end),
        Shape::Ellipsoid(e) => Shape::ellipsoid(e.radii + Vec3::splat(g)),
        Shape::RoundedCube(r) => {
            Shape::rounded_cube(r.length + 2.0 * g, r.width + 2.0 * g, r.height + 2.0 * g, r.roundedness)
        }
        Shape::Torus(t) => Shape::torus(t.tube_radius + g, (t.hole_radius - g).max(0.0)),
        Shape::Bowl(b) => {
            let shape = Shape::capsule(b.radius + g, Vec3::ZERO, Vec3::new(0.0, 0.0, g));
            return (
                shape,
                Vec3::ZERO,
                PullMode::Bowl {
                    inner_radius: b.inner_radius(),
                },
            );
        }
        Shape::PolyWire(w) => Shape::wire(w.radius + g, w.joints.clone()),
        Shape::Wedge(w) => Shape::wedge(w.radius + g, w.start, w.end, w.heading_deg, w.aperture_deg),
        Shape::TriangleMesh(m) => {
            let (center, radius) = m.bounding_sphere();
            return (Shape::sphere(radius + g), center, PullMode::TowardCenter);
        }
    };
    let pull = match collision {
        // The grown torus keeps pulling toward the original tube centre line.
        Shape::Torus(t) => PullMode::TowardRing {
            radius: t.ring_radius(),
        },
        Shape::Ellipsoid(_) | Shape::RoundedCube(_) | Shape::PolyWire(_) => PullMode::TowardSurface,
        _ => PullMode::for_shape(&shape),
    };
    (shape, Vec3::ZERO, pull)
}

fn preset_field(preset: PrefabPreset, extent: f32, scale: f32) -> (Shape, Vec3, PullMode) {
    match preset {
        PrefabPreset::Teapot => (Shape::sphere(extent), Vec3::new(0.0, 0.0, 6.5), PullMode::TowardCenter),
        PrefabPreset::Mountain => (Shape::sphere(extent), Vec3::ZERO, PullMode::TowardCenter),
        PrefabPreset::Fortress => (Shape::plane(49.0, 49.0, extent), Vec3::ZERO, PullMode::LocalDown),
        PrefabPreset::SkyStation => {
            let start = Vec3::new(-12.5, -25.5, -18.0) * scale;
            let end = Vec3::new(-12.5, 26.5, -18.0) * scale;
            let shape = Shape::wedge(extent, start, end, 45.0, 80.0);
            (shape, Vec3::ZERO, PullMode::TowardSegment { start, end })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(shape: Shape, pull: PullMode, force: f32) -> GravityField {
        GravityField {
            handle: FieldHandle(0),
            attractor: AttractorHandle(0),
            shape,
            frame: Frame::IDENTITY,
            offset: Vec3::ZERO,
            force,
            pull,
        }
    }

    #[test]
    fn test_plane_field_pulls_along_local_down() {
        let f = field(Shape::plane(5.0, 5.0, 3.0), PullMode::LocalDown, 100.0);
        let pull = f
            .evaluate(Vec3::new(3.0, 1.0, 2.0), 1.0, |p| Some(Vec3::new(p.x, p.y, 0.0)))
            .unwrap();
        assert!((pull.vector - Vec3::new(0.0, 0.0, -100.0)).length() < 1e-4);
        assert!((pull.target - Vec3::new(3.0, 1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_torus_field_pulls_toward_ring_not_tube() {
        let f = field(Shape::torus(3.0, 2.0), PullMode::TowardRing { radius: 5.0 }, 10.0);
        let pull = f.evaluate(Vec3::new(5.0, 0.0, 2.0), 0.0, |p| Some(p)).unwrap();
        assert!((pull.vector - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-4, "got {:?}", pull.vector);
    }

    #[test]
    fn test_bowl_field_switches_direction_by_region() {
        let f = field(
            Shape::capsule(12.0, Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0)),
            PullMode::Bowl { inner_radius: 9.0 },
            1.0,
        );
        let above = f.evaluate(Vec3::new(3.0, 0.0, 1.0), 0.0, Some).unwrap();
        assert!((above.vector + Vec3::Z).length() < 1e-4);

        let in_cup = f.evaluate(Vec3::new(0.0, 0.0, -5.0), 0.0, Some).unwrap();
        assert!((in_cup.vector + Vec3::Z).length() < 1e-4, "inside the inner radius pulls away from centre");

        let outside_shell = f.evaluate(Vec3::new(0.0, 0.0, -11.0), 0.0, Some).unwrap();
        assert!((outside_shell.vector - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_no_pull_outside_volume_or_without_target() {
        let f = field(Shape::sphere(5.0), PullMode::TowardCenter, 1.0);
        assert!(f.evaluate(Vec3::new(7.0, 0.0, 0.0), 1.0, Some).is_none());
        assert!(f.evaluate(Vec3::new(4.0, 0.0, 0.0), 1.0, |_| None).is_none());
    }

    #[test]
    fn test_margin_growth_per_shape() {
        let (shape, _, pull) = FieldDesc::Margin {
            margin: 4.0,
            force: 1.0,
            offset: Vec3::ZERO,
        }
        .resolve(&Shape::torus(2.0, 5.0), 1.0);
        assert_eq!(shape, Shape::torus(6.0, 1.0));
        assert_eq!(pull, PullMode::TowardRing { radius: 7.0 });

        let (bowl_field, _, bowl_pull) = grown_field(&Shape::bowl(10.0, 1.0), 3.0);
        assert!(matches!(bowl_field, Shape::Capsule(c) if (c.radius - 13.0).abs() < 1e-6));
        assert_eq!(bowl_pull, PullMode::Bowl { inner_radius: 9.0 });
    }

    #[test]
    fn test_sky_station_preset_scales_bone() {
        let (shape, _, pull) = preset_field(PrefabPreset::SkyStation, 30.0, 2.0);
        match shape {
            Shape::Wedge(w) => {
                assert_eq!(w.start, Vec3::new(-25.0, -51.0, -36.0));
                assert_eq!(w.aperture_deg, 80.0);
            }
            other => panic!("expected wedge, got {:?}", other),
        }
        assert!(matches!(pull, PullMode::TowardSegment { .. }));
    }
}
