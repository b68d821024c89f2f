//! Physics module
//!
//! Shape queries and collision resolution for a sphere moving among
//! oriented solids. No external physics library: every shape answers its
//! own nearest-point, containment and push-out queries.
//!
//! # Conventions
//!
//! - X forward, Y left, Z up, in every local frame
//! - Shapes are evaluated in their attractor's local space; results are
//!   transformed back to world space
//! - A query with no finite answer means "no contact"
//!
//! # Submodules
//!
//! - [`types`] - Frames and math helpers over glam
//! - [`shape`] - The closed set of attractor shapes and their parameters
//! - [`primitives`] - Segment, triangle and ellipsoid closest-point math
//! - [`queries`] - Nearest point, overlap and push-out per shape
//! - [`collision`] - Actor push-out plus ground/wall classification

pub mod collision;
pub mod primitives;
pub mod queries;
pub mod shape;
pub mod types;

// Re-export commonly used types at the physics module level
pub use collision::{CONTACT_SKIN, CollisionReport, ContactKind, classify_contact, resolve_collisions};
pub use queries::{Contact, PUSH_EPSILON, contains, nearest_point, overlaps, push_out, push_out_with};
pub use shape::{Shape, ShapeKind};
pub use types::{Frame, Quat, Vec2, Vec3, WORLD_UP};
