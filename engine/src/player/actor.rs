//! Actor
//!
//! The player-controlled body: a sphere with a position, velocity, force
//! accumulator and an orientation frame that tracks the current gravity
//! "up". Gravity arrives from whichever field currently owns the actor
//! (see [`Actor::set_gravity_source`]); contacts arrive from the collision
//! resolver through [`Actor::become_grounded`] and [`Actor::start_wall_slide`].
//!
//! # Physics Model
//!
//! - Forces accumulate into `acceleration` during a step
//! - Gravity is scaled up while falling, down while wall sliding
//! - Drag is `-velocity * drag`
//! - `velocity += acceleration * dt; position += velocity * dt`, then the
//!   accumulator is cleared
//! - Orientation slerps toward `-normalize(gravity)` and the velocity is
//!   rotated by the same delta so momentum follows the new frame

use glam::{Quat, Vec3};
use tracing::{debug, warn};

use crate::physics::types::{WORLD_UP, orientation_from_axes};
use crate::world::FieldHandle;

use super::config::{ActorConfig, STANDARD_GRAVITY};
use super::events::LocomotionEvent;
use super::jump::JumpState;

/// Field currently governing the actor plus its cached pull target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySource {
    pub field: FieldHandle,
    pub target: Vec3,
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub(crate) config: ActorConfig,

    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) acceleration: Vec3,
    pub(crate) orientation: Quat,

    pub(crate) gravity_source: Option<GravitySource>,
    pub(crate) gravity_vector: Vec3,

    pub(crate) is_grounded: bool,
    pub(crate) was_grounded_last_frame: bool,
    pub(crate) is_wall_sliding: bool,
    pub(crate) wall_normal: Vec3,
    pub(crate) landing_velocity: Vec3,

    /// Intent of the current step.
    pub(crate) is_crouching: bool,
    pub(crate) is_moving: bool,

    pub(crate) jump: JumpState,
    pub(crate) stretch: f32,

    pub(crate) checkpoint: Option<usize>,
    pub(crate) events: Vec<LocomotionEvent>,
}

impl Default for Actor {
    fn default() -> Self {
        Self::new(ActorConfig::default())
    }
}

impl Actor {
    /// Create an actor at the configured spawn point.
    pub fn new(config: ActorConfig) -> Self {
        Self {
            position: config.spawn_position,
            config,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            gravity_source: None,
            gravity_vector: Vec3::ZERO,
            is_grounded: false,
            was_grounded_last_frame: false,
            is_wall_sliding: false,
            wall_normal: Vec3::ZERO,
            landing_velocity: Vec3::ZERO,
            is_crouching: false,
            is_moving: false,
            jump: JumpState::default(),
            stretch: 1.0,
            checkpoint: None,
            events: Vec::new(),
        }
    }

    /// Create an actor at `position` with default tuning.
    pub fn at(position: Vec3) -> Self {
        let mut actor = Self::default();
        actor.position = position;
        actor
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &ActorConfig {
        &self.config
    }

    pub fn get_position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn get_velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    pub fn get_orientation(&self) -> Quat {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
    }

    /// Local +X.
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// Local +Y.
    pub fn left(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Local +Z.
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    pub fn radius(&self) -> f32 {
        self.config.collision_radius
    }

    pub fn get_gravity_vector(&self) -> Vec3 {
        self.gravity_vector
    }

    pub fn gravity_source(&self) -> Option<GravitySource> {
        self.gravity_source
    }

    pub fn is_grounded(&self) -> bool {
        self.is_grounded
    }

    pub fn was_grounded_last_frame(&self) -> bool {
        self.was_grounded_last_frame
    }

    pub fn is_wall_sliding(&self) -> bool {
        self.is_wall_sliding
    }

    pub fn wall_normal(&self) -> Vec3 {
        self.wall_normal
    }

    pub fn landing_velocity(&self) -> Vec3 {
        self.landing_velocity
    }

    pub fn jump_state(&self) -> &JumpState {
        &self.jump
    }

    pub fn stretch(&self) -> f32 {
        self.stretch
    }

    pub fn checkpoint(&self) -> Option<usize> {
        self.checkpoint
    }

    /// Record whether crouch is held. Crouching only sticks while grounded.
    pub fn set_crouching(&mut self, held: bool) {
        self.is_crouching = held && self.is_grounded;
    }

    /// Record whether the actor is being steered this step.
    pub fn set_moving(&mut self, moving: bool) {
        self.is_moving = moving;
    }

    pub fn is_crouching(&self) -> bool {
        self.is_crouching
    }

    /// Take the events buffered since the last call.
    pub fn drain_events(&mut self) -> Vec<LocomotionEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Gravity
    // ------------------------------------------------------------------

    /// Offer a field as the actor's gravity source.
    ///
    /// - No current source: accepted.
    /// - Same field: cached target and vector are refreshed.
    /// - Different field: accepted only if `target` is strictly closer to
    ///   the actor than the current source's cached target.
    ///
    /// Returns whether the offer was taken.
    pub fn set_gravity_source(&mut self, field: FieldHandle, target: Vec3, vector: Vec3) -> bool {
        match self.gravity_source {
            Some(current) if current.field == field => {
                self.gravity_source = Some(GravitySource { field, target });
                self.gravity_vector = vector;
                true
            }
            Some(current) => {
                let candidate = self.position.distance_squared(target);
                let incumbent = self.position.distance_squared(current.target);
                if candidate < incumbent {
                    self.switch_gravity_source(Some(GravitySource { field, target }), vector);
                    true
                } else {
                    false
                }
            }
            None => {
                self.switch_gravity_source(Some(GravitySource { field, target }), vector);
                true
            }
        }
    }

    /// Drop the current source and fall back to world down.
    pub(crate) fn revert_to_world_gravity(&mut self) {
        if self.gravity_source.is_some() {
            self.switch_gravity_source(None, Vec3::ZERO);
        }
        self.gravity_vector = -WORLD_UP * STANDARD_GRAVITY;
    }

    fn switch_gravity_source(&mut self, source: Option<GravitySource>, vector: Vec3) {
        let from = self.gravity_source.map(|s| s.field);
        let to = source.map(|s| s.field);
        debug!(?from, ?to, "gravity source changed");
        self.gravity_source = source;
        self.gravity_vector = vector;
        self.events.push(LocomotionEvent::GravitySourceChanged { from, to });
    }

    // ------------------------------------------------------------------
    // Forces & integration
    // ------------------------------------------------------------------

    pub fn add_force(&mut self, force: Vec3) {
        self.acceleration += force;
    }

    pub fn add_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse;
    }

    /// Accumulate this step's gravity force.
    pub(crate) fn add_gravity(&mut self) {
        if self.is_grounded {
            return;
        }
        let g = self.gravity_vector;
        let falling = self.velocity.dot(g) > 0.0;
        let force = if falling && !self.jump.is_long_jumping {
            let mut f = g * self.config.fall_speed_scale;
            if self.is_wall_sliding {
                f *= self.config.wall_slide_resistance;
            }
            f
        } else {
            let long_jump = if self.jump.is_long_jumping {
                self.jump.long_jump_timer * self.config.long_jump_gravity_scale
            } else {
                0.0
            };
            g * (1.0 + long_jump)
        };
        self.add_force(force);
    }

    /// Gravity, drag and one semi-implicit Euler step, then reorientation.
    pub(crate) fn update_physics(&mut self, dt: f32) {
        self.add_gravity();
        self.add_force(-self.velocity * self.config.drag);

        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
        self.acceleration = Vec3::ZERO;

        self.match_gravity_orientation();
    }

    /// Slerp toward the gravity "up" and carry the velocity along.
    pub(crate) fn match_gravity_orientation(&mut self) {
        let target_up = match self.gravity_vector.try_normalize() {
            Some(down) => -down,
            None if !self.config.remember_last_gravity_source => WORLD_UP,
            None => return,
        };

        // Keep the left axis where possible so the turn is a pure pitch/roll.
        let forward_hint = self.left().cross(target_up);
        let Some(goal) = orientation_from_axes(forward_hint, target_up)
            .or_else(|| orientation_from_axes(self.forward(), target_up))
        else {
            return;
        };

        let start = self.orientation;
        let end = start.slerp(goal, self.config.orientation_match_rate).normalize();
        let delta = end * start.inverse();
        let rotated = delta * self.velocity;
        if rotated.is_finite() {
            self.velocity = rotated;
        } else {
            warn!(velocity = ?self.velocity, "discarded non-finite velocity rotation");
        }
        self.orientation = end;
    }

    // ------------------------------------------------------------------
    // Contacts
    // ------------------------------------------------------------------

    /// Latch this step's grounded/wall flags into "last frame" and clear them.
    pub(crate) fn roll_contact_flags(&mut self) {
        self.was_grounded_last_frame = self.is_grounded;
        self.is_grounded = false;
        self.is_wall_sliding = false;
    }

    pub fn become_grounded(&mut self) {
        self.is_grounded = true;
        self.landing_velocity = self.velocity;
        self.is_wall_sliding = false;
        self.jump.is_wall_jumping = false;
        self.jump.wall_jump_timer = 0.0;
    }

    /// Begin sliding down a wall whose outward normal is `normal`.
    pub fn start_wall_slide(&mut self, normal: Vec3) {
        self.is_wall_sliding = true;
        self.wall_normal = normal;
        self.jump.jump_number = 0;
        self.jump.do_triple_flip = false;
        self.jump.triple_flip_angle = 0.0;
    }

    // ------------------------------------------------------------------
    // Respawn
    // ------------------------------------------------------------------

    /// Reset kinematics and gravity. Attractors are untouched.
    ///
    /// `checkpoint_center` is used when given, otherwise the configured spawn.
    pub fn respawn(&mut self, checkpoint_center: Option<Vec3>) {
        let to_checkpoint = checkpoint_center.is_some();
        self.position = checkpoint_center.unwrap_or(self.config.spawn_position);
        self.orientation = Quat::IDENTITY;
        self.velocity = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
        if self.gravity_source.is_some() {
            self.switch_gravity_source(None, Vec3::ZERO);
        }
        self.gravity_vector = Vec3::ZERO;
        self.is_grounded = false;
        self.was_grounded_last_frame = false;
        self.is_wall_sliding = false;
        self.jump = JumpState::default();
        self.stretch = 1.0;

        debug!(position = ?self.position, to_checkpoint, "respawned");
        self.events.push(LocomotionEvent::Respawned {
            position: self.position,
            to_checkpoint,
        });
    }
}
