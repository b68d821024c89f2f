//! Input Module
//!
//! The locomotion core does not talk to devices. The host samples its
//! controller/keyboard once per frame, debounces it, and hands the result to
//! [`crate::sim::Simulation::step`] as a [`StepInput`].
//!
//! # Example
//!
//! ```rust,ignore
//! use gravity_hop_engine::input::StepInput;
//! use glam::{Vec2, Vec3};
//!
//! let input = StepInput {
//!     movement: Vec2::new(0.0, 1.0), // stick pushed forward
//!     jump_pressed: true,
//!     camera_forward: Vec3::X,
//!     ..Default::default()
//! };
//! ```

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// One frame of already-debounced player intent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepInput {
    /// Stick vector: `x` is right, `y` is forward. Any non-zero value steers.
    pub movement: Vec2,
    /// Jump button went down this frame.
    pub jump_pressed: bool,
    pub crouch_held: bool,
    /// Runs the actor's clock faster while held.
    pub speed_up_held: bool,
    /// World-space forward of the camera the player is looking through.
    pub camera_forward: Vec3,
}

impl Default for StepInput {
    fn default() -> Self {
        Self {
            movement: Vec2::ZERO,
            jump_pressed: false,
            crouch_held: false,
            speed_up_held: false,
            camera_forward: Vec3::X,
        }
    }
}

impl StepInput {
    /// No intent at all, camera looking down +X.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Stick pushed by `movement`, nothing else pressed.
    pub fn steer(movement: Vec2, camera_forward: Vec3) -> Self {
        Self {
            movement,
            camera_forward,
            ..Self::default()
        }
    }

    pub fn with_jump(mut self) -> Self {
        self.jump_pressed = true;
        self
    }

    pub fn with_crouch(mut self) -> Self {
        self.crouch_held = true;
        self
    }

    pub fn with_speed_up(mut self) -> Self {
        self.speed_up_held = true;
        self
    }

    /// Whether the stick is deflected at all.
    #[inline]
    pub fn is_steering(&self) -> bool {
        self.movement != Vec2::ZERO && self.movement.is_finite()
    }
}
