//! Shape variants
//!
//! Every attractor (and every gravity field) is one of a closed set of solid
//! primitives. Parameters are expressed in the owning frame's local space;
//! see [`crate::physics::queries`] for the operations on them.

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::LevelError;

/// Finite rectangle in local XY extruded from z = 0 up to `height`.
///
/// With `height == 0` this is a thin double-sided rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneShape {
    pub half_length: f32,
    pub half_width: f32,
    #[serde(default)]
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereShape {
    pub radius: f32,
}

/// Swept sphere around the bone segment `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsuleShape {
    pub radius: f32,
    pub start: Vec3,
    pub end: Vec3,
}

/// Axis-aligned ellipsoid with semi-axes `radii`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipsoidShape {
    pub radii: Vec3,
}

/// Box of full dimensions `length x width x height` centred on the origin.
///
/// `roundedness` scales the edge radius from 0 (sharp) to 1 (the smallest
/// half extent, so a cube becomes a sphere).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundedCubeShape {
    pub length: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub roundedness: f32,
}

impl RoundedCubeShape {
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height) * 0.5
    }

    pub fn edge_radius(&self) -> f32 {
        self.half_extents().min_element() * self.roundedness
    }
}

/// Ring around local Z. The tube centre circle has radius `hole + tube`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TorusShape {
    pub tube_radius: f32,
    pub hole_radius: f32,
}

impl TorusShape {
    #[inline]
    pub fn ring_radius(&self) -> f32 {
        self.hole_radius + self.tube_radius
    }
}

/// Hemispherical shell below z = 0, open toward +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BowlShape {
    pub radius: f32,
    pub thickness: f32,
}

impl BowlShape {
    #[inline]
    pub fn inner_radius(&self) -> f32 {
        (self.radius - self.thickness).max(0.0)
    }
}

/// Chain of capsules through consecutive joints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyWireShape {
    pub radius: f32,
    pub joints: Vec<Vec3>,
}

/// Slice of a cylinder around the bone `start..end`.
///
/// The slice is centred on `heading_deg`, measured around the bone axis
/// from the local +X direction (or +Z when the bone runs along X), and
/// spans `aperture_deg` in total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WedgeShape {
    pub radius: f32,
    pub start: Vec3,
    pub end: Vec3,
    pub heading_deg: f32,
    pub aperture_deg: f32,
}

/// Indexed triangle soup. Vertex and index buffers are shared between
/// clones, so several prefabs can reference one mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMeshShape {
    pub vertices: Arc<[Vec3]>,
    pub indices: Arc<[u32]>,
}

impl TriangleMeshShape {
    pub fn new(vertices: impl Into<Arc<[Vec3]>>, indices: impl Into<Arc<[u32]>>) -> Self {
        Self {
            vertices: vertices.into(),
            indices: indices.into(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangle corners, or `None` when an index is out of range.
    pub fn triangle(&self, tri: usize) -> Option<[Vec3; 3]> {
        let base = tri * 3;
        let ia = *self.indices.get(base)? as usize;
        let ib = *self.indices.get(base + 1)? as usize;
        let ic = *self.indices.get(base + 2)? as usize;
        if ia == ib || ib == ic || ia == ic {
            return None;
        }
        Some([
            *self.vertices.get(ia)?,
            *self.vertices.get(ib)?,
            *self.vertices.get(ic)?,
        ])
    }

    /// Copy of this mesh with every vertex multiplied by `scale`.
    pub fn scaled(&self, scale: f32) -> Self {
        let vertices: Vec<Vec3> = self.vertices.iter().map(|v| *v * scale).collect();
        Self {
            vertices: vertices.into(),
            indices: Arc::clone(&self.indices),
        }
    }

    /// Centre and radius of a sphere enclosing every vertex.
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        if self.vertices.is_empty() {
            return (Vec3::ZERO, 0.0);
        }
        let (min, max) = self
            .vertices
            .iter()
            .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        let center = (min + max) * 0.5;
        let radius = self
            .vertices
            .iter()
            .map(|v| v.distance(center))
            .fold(0.0, f32::max);
        (center, radius)
    }
}

/// Closed set of solid primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Plane(PlaneShape),
    Sphere(SphereShape),
    Capsule(CapsuleShape),
    Ellipsoid(EllipsoidShape),
    RoundedCube(RoundedCubeShape),
    Torus(TorusShape),
    Bowl(BowlShape),
    PolyWire(PolyWireShape),
    Wedge(WedgeShape),
    TriangleMesh(TriangleMeshShape),
}

/// Discriminant of [`Shape`], handy for logging and field policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Plane,
    Sphere,
    Capsule,
    Ellipsoid,
    RoundedCube,
    Torus,
    Bowl,
    PolyWire,
    Wedge,
    TriangleMesh,
}

impl Shape {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere(SphereShape { radius })
    }

    pub fn plane(half_length: f32, half_width: f32, height: f32) -> Self {
        Self::Plane(PlaneShape {
            half_length,
            half_width,
            height,
        })
    }

    pub fn capsule(radius: f32, start: Vec3, end: Vec3) -> Self {
        Self::Capsule(CapsuleShape { radius, start, end })
    }

    pub fn ellipsoid(radii: Vec3) -> Self {
        Self::Ellipsoid(EllipsoidShape { radii })
    }

    pub fn rounded_cube(length: f32, width: f32, height: f32, roundedness: f32) -> Self {
        Self::RoundedCube(RoundedCubeShape {
            length,
            width,
            height,
            roundedness,
        })
    }

    pub fn torus(tube_radius: f32, hole_radius: f32) -> Self {
        Self::Torus(TorusShape {
            tube_radius,
            hole_radius,
        })
    }

    pub fn bowl(radius: f32, thickness: f32) -> Self {
        Self::Bowl(BowlShape { radius, thickness })
    }

    pub fn wire(radius: f32, joints: Vec<Vec3>) -> Self {
        Self::PolyWire(PolyWireShape { radius, joints })
    }

    pub fn wedge(radius: f32, start: Vec3, end: Vec3, heading_deg: f32, aperture_deg: f32) -> Self {
        Self::Wedge(WedgeShape {
            radius,
            start,
            end,
            heading_deg,
            aperture_deg,
        })
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Plane(_) => ShapeKind::Plane,
            Self::Sphere(_) => ShapeKind::Sphere,
            Self::Capsule(_) => ShapeKind::Capsule,
            Self::Ellipsoid(_) => ShapeKind::Ellipsoid,
            Self::RoundedCube(_) => ShapeKind::RoundedCube,
            Self::Torus(_) => ShapeKind::Torus,
            Self::Bowl(_) => ShapeKind::Bowl,
            Self::PolyWire(_) => ShapeKind::PolyWire,
            Self::Wedge(_) => ShapeKind::Wedge,
            Self::TriangleMesh(_) => ShapeKind::TriangleMesh,
        }
    }

    /// Check the parameter invariants of this shape.
    ///
    /// `index` is the attractor index reported in the error.
    pub fn validate(&self, index: usize) -> Result<(), LevelError> {
        let non_negative = |field: &'static str, value: f32| -> Result<(), LevelError> {
            if !value.is_finite() {
                Err(LevelError::NonFinite { index, field })
            } else if value < 0.0 {
                Err(LevelError::NegativeParameter { index, field, value })
            } else {
                Ok(())
            }
        };
        let finite = |field: &'static str, v: Vec3| -> Result<(), LevelError> {
            if v.is_finite() {
                Ok(())
            } else {
                Err(LevelError::NonFinite { index, field })
            }
        };

        match self {
            Self::Plane(p) => {
                non_negative("half_length", p.half_length)?;
                non_negative("half_width", p.half_width)?;
                non_negative("height", p.height)
            }
            Self::Sphere(s) => non_negative("radius", s.radius),
            Self::Capsule(c) => {
                non_negative("radius", c.radius)?;
                finite("start", c.start)?;
                finite("end", c.end)
            }
            Self::Ellipsoid(e) => {
                non_negative("radii.x", e.radii.x)?;
                non_negative("radii.y", e.radii.y)?;
                non_negative("radii.z", e.radii.z)
            }
            Self::RoundedCube(r) => {
                non_negative("length", r.length)?;
                non_negative("width", r.width)?;
                non_negative("height", r.height)?;
                if !(0.0..=1.0).contains(&r.roundedness) {
                    return Err(LevelError::RoundednessOutOfRange {
                        index,
                        value: r.roundedness,
                    });
                }
                Ok(())
            }
            Self::Torus(t) => {
                non_negative("tube_radius", t.tube_radius)?;
                non_negative("hole_radius", t.hole_radius)
            }
            Self::Bowl(b) => {
                non_negative("radius", b.radius)?;
                non_negative("thickness", b.thickness)
            }
            Self::PolyWire(w) => {
                non_negative("radius", w.radius)?;
                if w.joints.len() < 2 {
                    return Err(LevelError::TooFewJoints {
                        index,
                        count: w.joints.len(),
                    });
                }
                w.joints.iter().try_for_each(|j| finite("joints", *j))
            }
            Self::Wedge(w) => {
                non_negative("radius", w.radius)?;
                non_negative("aperture_deg", w.aperture_deg)?;
                finite("start", w.start)?;
                finite("end", w.end)?;
                if w.heading_deg.is_finite() {
                    Ok(())
                } else {
                    Err(LevelError::NonFinite {
                        index,
                        field: "heading_deg",
                    })
                }
            }
            Self::TriangleMesh(m) => {
                if m.indices.len() % 3 != 0 {
                    return Err(LevelError::RaggedIndices {
                        index,
                        count: m.indices.len(),
                    });
                }
                if let Some(&vertex) = m.indices.iter().find(|&&i| i as usize >= m.vertices.len()) {
                    return Err(LevelError::IndexOutOfRange {
                        index,
                        vertex,
                        vertex_count: m.vertices.len(),
                    });
                }
                m.vertices.iter().try_for_each(|v| finite("vertices", *v))
            }
        }
    }
}
