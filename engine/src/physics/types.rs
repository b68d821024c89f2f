//! Physics type re-exports from glam
//!
//! This module provides the core mathematical types used throughout
//! the physics system, re-exported from the glam library, plus the
//! rigid [`Frame`] every attractor shape is evaluated in.
//!
//! World convention: X forward, Y left, Z up.

pub use glam::{EulerRot, Mat3, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// World up axis.
pub const WORLD_UP: Vec3 = Vec3::Z;

/// A rigid transform (position + unit orientation) without scale.
///
/// Shapes store their parameters in the local space of a frame; queries
/// transform the query point in with [`Frame::to_local`] and results back
/// out with [`Frame::to_world`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Frame {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Build a frame from yaw/pitch/roll in degrees.
    ///
    /// Yaw turns about Z, pitch about the yawed Y, roll about the final X.
    pub fn from_yaw_pitch_roll(position: Vec3, yaw_deg: f32, pitch_deg: f32, roll_deg: f32) -> Self {
        let orientation = Quat::from_euler(
            EulerRot::ZYX,
            yaw_deg.to_radians(),
            pitch_deg.to_radians(),
            roll_deg.to_radians(),
        );
        Self::new(position, orientation)
    }

    #[inline]
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.orientation.inverse() * (point - self.position)
    }

    #[inline]
    pub fn to_world(&self, point: Vec3) -> Vec3 {
        self.orientation * point + self.position
    }

    #[inline]
    pub fn vector_to_world(&self, v: Vec3) -> Vec3 {
        self.orientation * v
    }

    /// Local +X in world space.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// Local +Y in world space.
    #[inline]
    pub fn left(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Local +Z in world space.
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// Return this frame shifted by a local-space offset.
    pub fn offset_local(&self, offset: Vec3) -> Self {
        Self {
            position: self.to_world(offset),
            orientation: self.orientation,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}

/// Build the rotation whose X/Y/Z axes are `forward`, `left` and `up`.
///
/// The axes are re-orthonormalized around `up` first, so slightly skewed
/// inputs are accepted. Returns `None` when `forward` is parallel to `up`.
pub fn orientation_from_axes(forward: Vec3, up: Vec3) -> Option<Quat> {
    let up = up.try_normalize()?;
    let left = up.cross(forward).try_normalize()?;
    let forward = left.cross(up);
    let q = Quat::from_mat3(&Mat3::from_cols(forward, left, up)).normalize();
    q.is_finite().then_some(q)
}

/// Project `v` onto the plane whose normal is `normal` (unit length).
#[inline]
pub fn reject_from(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_round_trip_through_local_space() {
        let frame = Frame::from_yaw_pitch_roll(Vec3::new(3.0, -2.0, 7.0), 35.0, -20.0, 10.0);
        let p = Vec3::new(1.5, 4.0, -0.5);
        let back = frame.to_world(frame.to_local(p));
        assert!((back - p).length() < 1e-4, "Expected {:?}, got {:?}", p, back);
    }

    #[test]
    fn test_yaw_turns_forward_toward_left() {
        let frame = Frame::from_yaw_pitch_roll(Vec3::ZERO, 90.0, 0.0, 0.0);
        assert!((frame.forward() - Vec3::Y).length() < 1e-5);
        assert!((frame.up() - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_orientation_from_axes_rejects_parallel_input() {
        assert!(orientation_from_axes(Vec3::Z, Vec3::Z).is_none());
        let q = orientation_from_axes(Vec3::new(0.0, 1.0, 0.2), Vec3::Z).unwrap();
        assert!((q * Vec3::X - Vec3::Y).length() < 1e-5);
        assert!((q * Vec3::Z - Vec3::Z).length() < 1e-5);
    }
}
