//! Locomotion tuning
//!
//! Every number the actor's movement, jump and gravity code reads lives in
//! [`ActorConfig`]. The defaults are the shipped feel of the game; load
//! overrides from JSON with [`ActorConfig::from_json_str`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Magnitude of the world-down fallback gravity.
pub const STANDARD_GRAVITY: f32 = 100.0;

/// `dot(contact direction, -up)` above this classifies a contact as ground.
pub const GROUNDED_THRESHOLD: f32 = 0.75;

/// `dot(contact direction, forward)` above this classifies a contact as wall.
pub const WALL_THRESHOLD: f32 = 0.9;

/// Landing speed above which the combo window is (re)armed.
pub const TRUE_FALL_THRESHOLD: f32 = 15.0;

/// Largest step accepted by the simulation, in seconds.
pub const MAX_STEP_SECONDS: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    // Movement
    pub movement_speed: f32,
    /// Per-step slerp factor toward the movement direction (not time scaled).
    pub turn_rate: f32,
    /// Time multiplier while speed-up is held.
    pub speed_up_factor: f32,
    pub drag: f32,
    pub crouch_speed_scale: f32,
    /// Speed above which a direction reversal opens the side-flip window.
    pub run_threshold: f32,
    pub collision_radius: f32,

    // Jumps
    pub jump_force: f32,
    /// Gravity multiplier while moving along the gravity vector.
    pub fall_speed_scale: f32,
    pub triple_jump_window: f32,
    pub double_jump_scale: f32,
    pub triple_jump_scale: f32,
    /// Degrees per second.
    pub triple_jump_flip_speed: f32,

    // Long jump
    pub long_jump_height_scale: f32,
    pub long_jump_force: f32,
    /// Extra gravity per second spent long jumping.
    pub long_jump_gravity_scale: f32,

    // Back flip
    pub back_flip_jump_scale: f32,
    pub back_flip_move_impulse: f32,
    /// Degrees per second.
    pub back_flip_speed: f32,

    // Side flip
    pub side_flip_window: f32,
    pub side_flip_move_impulse: f32,
    pub side_flip_jump_scale: f32,

    // Wall
    /// Gravity multiplier while sliding down a wall.
    pub wall_slide_resistance: f32,
    pub wall_jump_impulse: f32,
    pub wall_jump_window: f32,

    // Squash & stretch (cosmetic)
    pub max_stretch: f32,
    pub max_squash: f32,
    pub squash_land_base: f32,
    pub stretch_jump_base: f32,
    pub land_squash_scale: f32,

    // Gravity
    /// Per-step slerp factor toward the gravity "up".
    pub orientation_match_rate: f32,
    /// Keep the last field's gravity after leaving every field.
    pub remember_last_gravity_source: bool,

    pub spawn_position: Vec3,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            movement_speed: 11.0,
            turn_rate: 0.08,
            speed_up_factor: 2.0,
            drag: 7.0,
            crouch_speed_scale: 0.4,
            run_threshold: 6.0,
            collision_radius: 1.0,

            jump_force: 75.0,
            fall_speed_scale: 1.75,
            triple_jump_window: 0.35,
            double_jump_scale: 1.5,
            triple_jump_scale: 2.0,
            triple_jump_flip_speed: 580.0,

            long_jump_height_scale: 0.75,
            long_jump_force: 2500.0,
            long_jump_gravity_scale: 1.75,

            back_flip_jump_scale: 1.6,
            back_flip_move_impulse: 65.0,
            back_flip_speed: -360.0,

            side_flip_window: 0.25,
            side_flip_move_impulse: 50.0,
            side_flip_jump_scale: 1.5,

            wall_slide_resistance: 0.35,
            wall_jump_impulse: 95.0,
            wall_jump_window: 0.2,

            max_stretch: 2.0,
            max_squash: 0.5,
            squash_land_base: 1.1,
            stretch_jump_base: 1.25,
            land_squash_scale: 0.06,

            orientation_match_rate: 0.1,
            remember_last_gravity_source: true,

            spawn_position: Vec3::new(-5.0, 0.0, 0.0),
        }
    }
}

impl ActorConfig {
    /// Parse a (possibly partial) config; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tunings that would make the integrator misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("movement_speed", self.movement_speed),
            ("speed_up_factor", self.speed_up_factor),
            ("drag", self.drag),
            ("collision_radius", self.collision_radius),
            ("jump_force", self.jump_force),
            ("triple_jump_window", self.triple_jump_window),
            ("side_flip_window", self.side_flip_window),
            ("wall_jump_window", self.wall_jump_window),
            ("turn_rate", self.turn_rate),
            ("orientation_match_rate", self.orientation_match_rate),
        ];
        for (field, value) in checks {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }

    /// Jump force multiplier for combo step `jump_number`.
    #[inline]
    pub fn combo_scale(&self, jump_number: u8) -> f32 {
        match jump_number {
            2 => self.double_jump_scale,
            3 => self.triple_jump_scale,
            _ => 1.0,
        }
    }
}
