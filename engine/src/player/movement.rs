//! Camera-relative steering
//!
//! Turns a frame of [`StepInput`] into actor intent. The stick is read in
//! the camera's frame, projected onto the plane under the actor's feet, and
//! the actor is turned toward it a little each frame. Forward motion is a
//! force along the actor's own forward axis, so steering and momentum stay
//! consistent when gravity (and therefore "up") changes.

use glam::Vec3;

use crate::input::StepInput;
use crate::physics::types::{orientation_from_axes, reject_from};
use crate::physics::primitives::any_perpendicular;

use super::actor::Actor;
use super::jump::JumpKind;

/// Below this length a projected camera axis is considered degenerate.
const MIN_PROJECTED_LENGTH: f32 = 1e-3;

/// Movement basis on the actor's surface plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl Actor {
    /// Project `camera_forward` onto the plane perpendicular to the actor's up.
    ///
    /// When the camera looks along the actor's up axis (the actor has walked
    /// over a ridge and is now upside down relative to the view) the basis is
    /// flipped so pushing the stick forward still moves away from the camera.
    /// Only forward flips; the strafe axis keeps following the camera.
    /// A degenerate projection falls back to the actor's own forward.
    pub fn surface_basis(&self, camera_forward: Vec3) -> SurfaceBasis {
        let up = self.up();
        let projected = reject_from(camera_forward, up);
        let mut forward = if projected.length() > MIN_PROJECTED_LENGTH && projected.is_finite() {
            projected.normalize()
        } else {
            reject_from(self.forward(), up)
                .try_normalize()
                .unwrap_or_else(|| any_perpendicular(up))
        };
        let right = forward.cross(up).normalize_or_zero();
        if up.dot(camera_forward) > 0.0 {
            forward = -forward;
        }
        SurfaceBasis { forward, right }
    }

    /// Push the actor along `direction` at `speed`, scaled down while crouching.
    ///
    /// # Arguments
    /// * `direction` - World-space direction (need not be normalized)
    /// * `speed` - Target speed; drag turns the force into a terminal velocity
    pub fn move_in_direction(&mut self, direction: Vec3, speed: f32) {
        let mut force = direction.normalize_or_zero() * speed * self.config.drag;
        if self.is_crouching {
            force *= self.config.crouch_speed_scale;
        }
        self.add_force(force);
    }

    /// Read one frame of input.
    ///
    /// Order: crouch, steering (turn + side-flip arming), move force, jump.
    /// Returns the step length to integrate with, which is `dt` stretched by
    /// the speed-up factor while that button is held.
    pub(crate) fn apply_intent(&mut self, input: &StepInput, dt: f32) -> (f32, Option<JumpKind>) {
        self.set_crouching(input.crouch_held);

        let steering = input.is_steering() && !self.jump.is_back_flipping && !self.jump.is_wall_jumping;
        self.set_moving(steering);

        if steering {
            let basis = self.surface_basis(input.camera_forward);
            let direction =
                (basis.forward * input.movement.y + basis.right * input.movement.x).normalize_or_zero();

            if direction != Vec3::ZERO {
                self.turn_toward(direction);

                if direction.dot(self.velocity) < 0.0 && self.velocity.length() > self.config.run_threshold {
                    self.jump.side_flip_timer = self.config.side_flip_window;
                }
            }

            self.move_in_direction(self.forward(), self.config.movement_speed);
        }

        let dt = if input.speed_up_held {
            dt * self.config.speed_up_factor
        } else {
            dt
        };

        let jumped = if input.jump_pressed { self.jump() } else { None };
        (dt, jumped)
    }

    /// Blend the orientation toward facing `direction` on the current up axis.
    fn turn_toward(&mut self, direction: Vec3) {
        let Some(goal) = orientation_from_axes(direction, self.up()) else {
            return;
        };
        self.orientation = self
            .orientation
            .slerp(goal, self.config.turn_rate)
            .normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec2};

    fn grounded_actor() -> Actor {
        let mut actor = Actor::at(Vec3::ZERO);
        actor.is_grounded = true;
        actor
    }

    #[test]
    fn test_surface_basis_level_camera() {
        let actor = Actor::at(Vec3::ZERO);
        let basis = actor.surface_basis(Vec3::new(1.0, 0.0, -0.5));
        assert!((basis.forward - Vec3::X).length() < 1e-5);
        // Right of +X with +Z up is -Y.
        assert!((basis.right + Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_surface_basis_flips_when_camera_looks_along_up() {
        let actor = Actor::at(Vec3::ZERO);
        let from_below = actor.surface_basis(Vec3::new(1.0, 0.0, 0.5));
        assert!((from_below.forward + Vec3::X).length() < 1e-5);
        assert!((from_below.right + Vec3::Y).length() < 1e-5);

        let from_above = actor.surface_basis(Vec3::new(1.0, 0.0, -0.5));
        assert!((from_above.forward - Vec3::X).length() < 1e-5);
        assert_eq!(from_above.right, from_below.right);
    }

    #[test]
    fn test_surface_basis_degenerate_camera_uses_actor_forward() {
        let actor = Actor::at(Vec3::ZERO);
        let basis = actor.surface_basis(Vec3::new(0.0, 0.0, -1.0));
        assert!((basis.forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_steering_turns_gradually() {
        let mut actor = grounded_actor();
        let input = StepInput::steer(Vec2::new(-1.0, 0.0), Vec3::X);
        actor.apply_intent(&input, 0.016);

        // Stick left with the camera down +X means facing +Y; one frame only
        // covers turn_rate of the way.
        let fwd = actor.forward();
        assert!(fwd.y > 0.0 && fwd.x > 0.9, "forward {fwd:?}");
        assert!(actor.is_moving);
    }

    #[test]
    fn test_move_force_follows_actor_forward() {
        let mut actor = grounded_actor();
        actor.apply_intent(&StepInput::steer(Vec2::Y, Vec3::X), 0.016);
        let expected = actor.forward() * actor.config.movement_speed * actor.config.drag;
        assert!((actor.acceleration - expected).length() < 1e-3);
    }

    #[test]
    fn test_crouch_scales_move_force() {
        let mut actor = grounded_actor();
        actor.apply_intent(&StepInput::steer(Vec2::Y, Vec3::X).with_crouch(), 0.016);
        let expected = actor.config.movement_speed * actor.config.drag * actor.config.crouch_speed_scale;
        assert!((actor.acceleration.length() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_no_steering_during_back_flip() {
        let mut actor = grounded_actor();
        actor.jump.is_back_flipping = true;
        actor.apply_intent(&StepInput::steer(Vec2::Y, Vec3::X), 0.016);
        assert!(!actor.is_moving);
        assert_eq!(actor.acceleration, Vec3::ZERO);
        assert_eq!(actor.get_orientation(), Quat::IDENTITY);
    }

    #[test]
    fn test_speed_up_stretches_dt() {
        let mut actor = grounded_actor();
        let (dt, _) = actor.apply_intent(&StepInput::idle().with_speed_up(), 0.05);
        assert!((dt - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_reversal_at_speed_arms_side_flip() {
        let mut actor = grounded_actor();
        actor.velocity = Vec3::new(10.0, 0.0, 0.0);
        actor.apply_intent(&StepInput::steer(Vec2::new(0.0, -1.0), Vec3::X), 0.016);
        assert!(actor.jump.side_flip_timer > 0.0);
    }

    #[test]
    fn test_slow_reversal_does_not_arm_side_flip() {
        let mut actor = grounded_actor();
        actor.velocity = Vec3::new(2.0, 0.0, 0.0);
        actor.apply_intent(&StepInput::steer(Vec2::new(0.0, -1.0), Vec3::X), 0.016);
        assert_eq!(actor.jump.side_flip_timer, 0.0);
    }

    #[test]
    fn test_jump_runs_after_movement() {
        let mut actor = grounded_actor();
        let (_, jumped) = actor.apply_intent(&StepInput::steer(Vec2::Y, Vec3::X).with_crouch().with_jump(), 0.016);
        assert_eq!(jumped, Some(JumpKind::LongJump));
    }
}
