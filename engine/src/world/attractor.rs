//! Attractors
//!
//! A positioned, oriented solid the actor collides with and may be pulled
//! toward. Attractors are built once by [`crate::world::LevelBuilder`] and
//! never move afterwards.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::physics::queries::{self, Contact};
use crate::physics::{Frame, Shape};

use super::field::FieldHandle;

/// Opaque index of an attractor inside its [`crate::world::Level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttractorHandle(pub(crate) u32);

impl AttractorHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Sphere enclosing an attractor, in its local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CullSphere {
    pub center: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone)]
pub struct Attractor {
    pub(crate) name: Option<String>,
    pub(crate) frame: Frame,
    pub(crate) shape: Shape,
    pub(crate) field: Option<FieldHandle>,
    pub(crate) cull: Option<CullSphere>,
}

impl Attractor {
    pub(crate) fn new(name: Option<String>, frame: Frame, shape: Shape) -> Self {
        let cull = match &shape {
            Shape::TriangleMesh(mesh) => {
                let (center, radius) = mesh.bounding_sphere();
                Some(CullSphere { center, radius })
            }
            _ => None,
        };
        Self {
            name,
            frame,
            shape,
            field: None,
            cull,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn field(&self) -> Option<FieldHandle> {
        self.field
    }

    /// Nearest point on the collision surface; `None` means "no contact".
    pub fn nearest_point(&self, query: Vec3) -> Option<Vec3> {
        queries::nearest_point(&self.shape, &self.frame, query)
    }

    pub fn overlaps(&self, center: Vec3, radius: f32) -> bool {
        !self.culled(center, radius) && queries::overlaps(&self.shape, &self.frame, center, radius)
    }

    /// Separate a sphere from this attractor, reporting each contact.
    pub fn push_out_with(&self, center: &mut Vec3, radius: f32, on_contact: impl FnMut(Contact)) -> bool {
        if self.culled(*center, radius) {
            return false;
        }
        queries::push_out_with(&self.shape, &self.frame, center, radius, on_contact)
    }

    /// Cheap bounding-sphere rejection for triangle meshes.
    fn culled(&self, center: Vec3, radius: f32) -> bool {
        match self.cull {
            Some(cull) => {
                let reach = cull.radius + radius;
                self.frame.to_local(center).distance_squared(cull.center) > reach * reach
            }
            None => false,
        }
    }
}
