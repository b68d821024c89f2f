//! Camera rig
//!
//! Places a viewing camera relative to an actor. The rig never feeds back
//! into the simulation directly; the host reads [`CameraTransform::forward`]
//! and passes it into the next [`crate::input::StepInput`].

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::physics::Frame;
use crate::player::Actor;

/// Free-look pitch limit in degrees (both directions).
pub const PITCH_LIMIT_DEG: f32 = 85.0;

/// Default distance along the view axis; negative places the camera behind.
pub const DEFAULT_CAMERA_OFFSET: f32 = -12.5;

/// Default free-look turn rate in degrees per second at full stick.
pub const DEFAULT_TURN_RATE: f32 = 150.0;

/// How the camera is placed each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// World-aligned, offset along world X from the actor.
    Fixed,
    /// Player-steered yaw/pitch orbiting the actor.
    Free,
    /// Behind the actor in its own frame.
    #[default]
    Follow,
    /// At the actor's centre, looking along its forward axis.
    FirstPerson,
}

/// World-space camera placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub position: Vec3,
    pub orientation: Quat,
}

impl CameraTransform {
    /// Viewing direction (local +X).
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRig {
    pub mode: CameraMode,
    /// Distance along the view axis from the actor.
    pub offset: f32,
    /// Free-look yaw in degrees, about world Z.
    pub yaw_deg: f32,
    /// Free-look pitch in degrees; positive looks down.
    pub pitch_deg: f32,
    /// Free-look degrees per second at full stick.
    pub turn_rate: f32,
    pub invert_pitch: bool,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            mode: CameraMode::default(),
            offset: DEFAULT_CAMERA_OFFSET,
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            turn_rate: DEFAULT_TURN_RATE,
            invert_pitch: false,
        }
    }
}

impl CameraRig {
    pub fn new(mode: CameraMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Cycle Fixed → Free → Follow → FirstPerson → Fixed.
    pub fn cycle_mode(&mut self) {
        self.mode = match self.mode {
            CameraMode::Fixed => CameraMode::Free,
            CameraMode::Free => CameraMode::Follow,
            CameraMode::Follow => CameraMode::FirstPerson,
            CameraMode::FirstPerson => CameraMode::Fixed,
        };
    }

    /// Turn the free-look camera from a right-stick vector.
    ///
    /// # Arguments
    /// * `stick` - Right stick, `x` right and `y` up, each in [-1, 1]
    /// * `dt` - Frame time in seconds
    pub fn handle_look(&mut self, stick: Vec2, dt: f32) {
        if !stick.is_finite() {
            return;
        }
        let step = self.turn_rate * dt;
        self.yaw_deg -= stick.x * step;
        let pitch_sign = if self.invert_pitch { 1.0 } else { -1.0 };
        self.pitch_deg += stick.y * step * pitch_sign;
        self.pitch_deg = self.pitch_deg.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
    }

    fn free_orientation(&self) -> Quat {
        Frame::from_yaw_pitch_roll(Vec3::ZERO, self.yaw_deg, self.pitch_deg, 0.0).orientation
    }

    /// Where the camera sits this frame for `actor`.
    pub fn transform(&self, actor: &Actor) -> CameraTransform {
        let position = actor.get_position();
        match self.mode {
            CameraMode::Fixed => CameraTransform {
                position: position + Vec3::new(self.offset, 0.0, 0.0),
                orientation: Quat::IDENTITY,
            },
            CameraMode::Free => {
                let orientation = self.free_orientation();
                CameraTransform {
                    position: position + orientation * Vec3::X * self.offset,
                    orientation,
                }
            }
            CameraMode::Follow => CameraTransform {
                position: position + actor.forward() * self.offset,
                orientation: actor.get_orientation(),
            },
            CameraMode::FirstPerson => CameraTransform {
                position,
                orientation: actor.get_orientation(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_sits_behind_actor() {
        let actor = Actor::at(Vec3::new(1.0, 2.0, 3.0));
        let cam = CameraRig::default().transform(&actor);
        assert!((cam.position - Vec3::new(1.0 - 12.5, 2.0, 3.0)).length() < 1e-5);
        assert!((cam.forward() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_first_person_is_at_actor() {
        let actor = Actor::at(Vec3::ONE);
        let cam = CameraRig::new(CameraMode::FirstPerson).transform(&actor);
        assert_eq!(cam.position, Vec3::ONE);
    }

    #[test]
    fn test_free_look_pitch_is_clamped() {
        let mut rig = CameraRig::new(CameraMode::Free);
        for _ in 0..100 {
            rig.handle_look(Vec2::new(0.0, -1.0), 0.1);
        }
        assert_eq!(rig.pitch_deg, PITCH_LIMIT_DEG);
        for _ in 0..200 {
            rig.handle_look(Vec2::new(0.0, 1.0), 0.1);
        }
        assert_eq!(rig.pitch_deg, -PITCH_LIMIT_DEG);
    }

    #[test]
    fn test_free_camera_orbits_behind_view_direction() {
        let mut rig = CameraRig::new(CameraMode::Free);
        rig.yaw_deg = 90.0;
        let actor = Actor::at(Vec3::ZERO);
        let cam = rig.transform(&actor);
        assert!((cam.forward() - Vec3::Y).length() < 1e-5);
        assert!((cam.position - Vec3::new(0.0, -12.5, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_cycle_mode_wraps() {
        let mut rig = CameraRig::new(CameraMode::FirstPerson);
        rig.cycle_mode();
        assert_eq!(rig.mode, CameraMode::Fixed);
    }
}
