//! Jump system
//!
//! Jump selection, the 1/2/3 combo, long jump, back flip, side flip and
//! wall jump, plus the landing edge and the countdown timers that gate them.
//!
//! # Combo
//!
//! Each grounded jump bumps `jump_number` (1 -> 2 -> 3). A hard landing arms
//! the combo window; when it runs out while the actor is on the ground the
//! counter drops back to 0, so only quick successive jumps chain. Reaching
//! 3 without steering wraps back to 1.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::physics::types::{orientation_from_axes, reject_from};

use super::actor::Actor;
use super::config::TRUE_FALL_THRESHOLD;
use super::events::LocomotionEvent;

/// Which jump a press turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpKind {
    Single,
    Double,
    Triple,
    LongJump,
    BackFlip,
    SideFlip,
    WallJump,
}

/// Jump-arc modifier currently overlaid on the airborne state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JumpModifier {
    #[default]
    None,
    LongJumping,
    BackFlipping,
    SideFlipping,
}

/// Discrete jump state and timers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JumpState {
    /// Combo step, 0 when no combo is running.
    pub jump_number: u8,
    /// Combo window; on expiry while grounded the combo resets.
    pub triple_jump_timer: f32,
    /// Open while a side flip may be triggered.
    pub side_flip_timer: f32,
    /// Post wall-jump window during which steering is ignored.
    pub wall_jump_timer: f32,

    pub is_long_jumping: bool,
    /// Seconds spent in the current long jump.
    pub long_jump_timer: f32,
    pub is_back_flipping: bool,
    pub is_side_flipping: bool,
    pub is_wall_jumping: bool,

    pub do_triple_flip: bool,
    /// Degrees.
    pub triple_flip_angle: f32,
    /// Degrees.
    pub back_flip_angle: f32,
}

impl JumpState {
    pub fn modifier(&self) -> JumpModifier {
        if self.is_long_jumping {
            JumpModifier::LongJumping
        } else if self.is_back_flipping {
            JumpModifier::BackFlipping
        } else if self.is_side_flipping {
            JumpModifier::SideFlipping
        } else {
            JumpModifier::None
        }
    }

    fn clear_arc_modifiers(&mut self) {
        self.is_back_flipping = false;
        self.back_flip_angle = 0.0;
        self.is_long_jumping = false;
        self.long_jump_timer = 0.0;
        self.is_side_flipping = false;
    }
}

impl Actor {
    /// Try to jump. Returns the kind of jump performed, if any.
    ///
    /// Allowed while grounded, on the step right after leaving the ground,
    /// or while wall sliding (which turns into a wall jump).
    pub fn jump(&mut self) -> Option<JumpKind> {
        if !(self.is_grounded || self.was_grounded_last_frame || self.is_wall_sliding) {
            return None;
        }
        if self.is_wall_sliding {
            self.wall_jump();
            return Some(JumpKind::WallJump);
        }

        let config = self.config;
        let jump = &mut self.jump;

        jump.jump_number += 1;
        if jump.jump_number > 3 || (!self.is_moving && jump.jump_number >= 3) {
            jump.jump_number = 1;
        }

        let (kind, scale) = if self.is_crouching && self.is_moving {
            jump.jump_number = 0;
            jump.is_long_jumping = true;
            jump.long_jump_timer = 0.0;
            (JumpKind::LongJump, config.long_jump_height_scale)
        } else if self.is_crouching {
            jump.jump_number = 0;
            jump.is_back_flipping = true;
            jump.back_flip_angle = 0.0;
            (JumpKind::BackFlip, config.back_flip_jump_scale)
        } else if jump.side_flip_timer > 0.0 {
            jump.jump_number = 0;
            jump.is_side_flipping = true;
            jump.side_flip_timer = 0.0;
            (JumpKind::SideFlip, config.side_flip_jump_scale)
        } else {
            match jump.jump_number {
                2 => (JumpKind::Double, config.combo_scale(2)),
                3 => {
                    jump.do_triple_flip = true;
                    jump.triple_flip_angle = 0.0;
                    (JumpKind::Triple, config.combo_scale(3))
                }
                _ => (JumpKind::Single, config.combo_scale(1)),
            }
        };
        let jump_number = jump.jump_number;

        self.add_impulse(self.up() * config.jump_force * scale);
        match kind {
            JumpKind::BackFlip => self.add_impulse(-self.forward() * config.back_flip_move_impulse),
            JumpKind::SideFlip => {
                // Mirror about the vertical axis: face the way we came from.
                if let Some(mirrored) = orientation_from_axes(-self.forward(), self.up()) {
                    self.orientation = mirrored;
                }
                self.add_impulse(self.forward() * config.side_flip_move_impulse);
            }
            _ => {}
        }

        self.stretch = (config.stretch_jump_base + scale * 0.25).clamp(1.0, config.max_stretch);
        // A jump consumes the ground contact.
        self.is_grounded = false;
        self.was_grounded_last_frame = false;

        debug!(?kind, jump_number, "jump");
        self.events.push(LocomotionEvent::Jumped { kind, jump_number });
        Some(kind)
    }

    /// Kick off the current wall: face away from it and leap up and out.
    pub fn wall_jump(&mut self) {
        let config = self.config;
        self.jump.jump_number = 0;
        self.jump.do_triple_flip = false;
        self.jump.triple_flip_angle = 0.0;
        self.is_wall_sliding = false;
        self.jump.is_wall_jumping = true;
        self.jump.wall_jump_timer = config.wall_jump_window;

        let up = self.up();
        let away = reject_from(self.wall_normal, up);
        if let Some(facing) = orientation_from_axes(away, up) {
            self.orientation = facing;
        }
        let direction = (self.forward() + up * 2.0).normalize_or_zero();
        self.add_impulse(direction * config.wall_jump_impulse);

        debug!(wall_normal = ?self.wall_normal, "wall jump");
        self.events.push(LocomotionEvent::WallJumped {
            wall_normal: self.wall_normal,
        });
    }

    /// Apply the continuous long-jump push for this step.
    pub(crate) fn apply_long_jump(&mut self, dt: f32) {
        if !self.jump.is_long_jumping {
            return;
        }
        self.jump.long_jump_timer += dt;
        let force = self.forward() * self.config.long_jump_force * dt * self.config.drag;
        self.add_force(force);
    }

    /// Landing edge plus all countdowns. Runs after collision resolution.
    pub(crate) fn update_jump_timers(&mut self, dt: f32) {
        let config = self.config;

        if !self.was_grounded_last_frame && self.is_grounded {
            self.land();
        }

        let jump = &mut self.jump;
        if self.is_grounded && jump.triple_flip_angle > 1.0 {
            jump.do_triple_flip = false;
            jump.triple_flip_angle = 0.0;
        }

        if jump.triple_jump_timer > 0.0 {
            jump.triple_jump_timer -= dt;
            if jump.triple_jump_timer <= 0.0 {
                jump.triple_jump_timer = 0.0;
                if self.is_grounded || self.was_grounded_last_frame {
                    jump.jump_number = 0;
                }
            }
        }

        if jump.side_flip_timer > 0.0 {
            jump.side_flip_timer = (jump.side_flip_timer - dt).max(0.0);
        }

        if jump.wall_jump_timer > 0.0 {
            jump.wall_jump_timer -= dt;
            if jump.wall_jump_timer <= 0.0 {
                jump.wall_jump_timer = 0.0;
                jump.is_wall_jumping = false;
            }
        }

        if jump.do_triple_flip {
            jump.triple_flip_angle += config.triple_jump_flip_speed * dt;
        }
        if jump.is_back_flipping {
            jump.back_flip_angle += config.back_flip_speed * dt;
        }

        if self.stretch > 1.0 {
            self.stretch = (self.stretch - dt).max(1.0);
        } else if self.stretch < 1.0 {
            self.stretch = (self.stretch + dt).min(1.0);
        }
    }

    fn land(&mut self) {
        let config = self.config;
        let jump = &mut self.jump;
        jump.clear_arc_modifiers();

        if jump.jump_number == 3 {
            jump.jump_number = 0;
            jump.do_triple_flip = false;
            jump.triple_flip_angle = 0.0;
        }

        let speed = self.landing_velocity.length();
        if speed > TRUE_FALL_THRESHOLD {
            jump.triple_jump_timer = config.triple_jump_window;
        }

        let squash = 1.0 / (config.squash_land_base * speed * config.land_squash_scale);
        if squash < 1.0 {
            self.stretch = squash.clamp(config.max_squash, 1.0);
        }

        debug!(speed, jump_number = jump.jump_number, "landed");
        self.events.push(LocomotionEvent::Landed { speed });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const EPS: f32 = 1e-3;

    fn grounded_actor() -> Actor {
        let mut actor = Actor::at(Vec3::ZERO);
        actor.is_grounded = true;
        actor
    }

    /// Simulate touching down with `speed` and run one timer tick.
    fn land_with_speed(actor: &mut Actor, speed: f32) {
        actor.velocity = Vec3::new(0.0, 0.0, -speed);
        actor.was_grounded_last_frame = false;
        actor.become_grounded();
        actor.velocity = Vec3::ZERO;
        actor.update_jump_timers(0.0);
        actor.was_grounded_last_frame = true;
    }

    #[test]
    fn test_airborne_actor_cannot_jump() {
        let mut actor = Actor::at(Vec3::ZERO);
        assert_eq!(actor.jump(), None);
        assert_eq!(actor.get_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_single_jump_impulse_along_up() {
        let mut actor = grounded_actor();
        assert_eq!(actor.jump(), Some(JumpKind::Single));
        assert!((actor.get_velocity() - Vec3::new(0.0, 0.0, 75.0)).length() < EPS);
        assert_eq!(actor.jump_state().jump_number, 1);
        assert!(!actor.is_grounded());
    }

    #[test]
    fn test_coyote_jump_after_leaving_ground() {
        let mut actor = Actor::at(Vec3::ZERO);
        actor.was_grounded_last_frame = true;
        assert_eq!(actor.jump(), Some(JumpKind::Single));
    }

    #[test]
    fn test_combo_wraps_without_steering() {
        let mut actor = grounded_actor();
        actor.jump.jump_number = 2;
        assert_eq!(actor.jump(), Some(JumpKind::Single));
        assert_eq!(actor.jump_state().jump_number, 1);
    }

    #[test]
    fn test_crouch_and_move_long_jumps() {
        let mut actor = grounded_actor();
        actor.set_crouching(true);
        actor.set_moving(true);
        assert_eq!(actor.jump(), Some(JumpKind::LongJump));
        assert!((actor.get_velocity().z - 75.0 * 0.75).abs() < EPS);
        assert!(actor.jump_state().is_long_jumping);
        assert_eq!(actor.jump_state().jump_number, 0);

        actor.apply_long_jump(0.1);
        assert!((actor.jump_state().long_jump_timer - 0.1).abs() < EPS);
        assert!((actor.acceleration.x - 2500.0 * 0.1 * 7.0).abs() < 0.1);
    }

    #[test]
    fn test_crouch_alone_back_flips() {
        let mut actor = grounded_actor();
        actor.set_crouching(true);
        assert_eq!(actor.jump(), Some(JumpKind::BackFlip));
        let v = actor.get_velocity();
        assert!((v.z - 75.0 * 1.6).abs() < EPS);
        assert!((v.x + 65.0).abs() < EPS);
        assert!(actor.jump_state().is_back_flipping);
    }

    #[test]
    fn test_reversal_window_side_flips_and_mirrors() {
        let mut actor = grounded_actor();
        actor.jump.side_flip_timer = 0.1;
        assert_eq!(actor.jump(), Some(JumpKind::SideFlip));
        assert!((actor.forward() + Vec3::X).length() < EPS);
        assert!((actor.up() - Vec3::Z).length() < EPS);
        let v = actor.get_velocity();
        assert!((v.z - 75.0 * 1.5).abs() < EPS);
        assert!((v.x + 50.0).abs() < EPS);
        assert_eq!(actor.jump_state().side_flip_timer, 0.0);
    }

    #[test]
    fn test_wall_jump_faces_away_and_resets_combo() {
        let mut actor = Actor::at(Vec3::ZERO);
        actor.jump.jump_number = 2;
        actor.start_wall_slide(Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(actor.jump_state().jump_number, 0);

        assert_eq!(actor.jump(), Some(JumpKind::WallJump));
        assert!(actor.jump_state().is_wall_jumping);
        assert!(!actor.is_wall_sliding());
        assert_eq!(actor.jump_state().jump_number, 0);
        assert!((actor.forward() + Vec3::X).length() < EPS);
        let expected = Vec3::new(-1.0, 0.0, 2.0).normalize() * 95.0;
        assert!((actor.get_velocity() - expected).length() < EPS);
    }

    #[test]
    fn test_wall_jump_window_decays() {
        let mut actor = Actor::at(Vec3::ZERO);
        actor.start_wall_slide(Vec3::new(-1.0, 0.0, 0.0));
        actor.jump();
        actor.update_jump_timers(0.15);
        assert!(actor.jump_state().is_wall_jumping);
        actor.update_jump_timers(0.1);
        assert!(!actor.jump_state().is_wall_jumping);
        assert_eq!(actor.jump_state().wall_jump_timer, 0.0);
    }

    #[test]
    fn test_hard_landing_arms_combo_window() {
        let mut actor = grounded_actor();
        actor.jump();
        land_with_speed(&mut actor, 40.0);
        assert!((actor.jump_state().triple_jump_timer - 0.35).abs() < EPS);
        assert!(actor.stretch() < 1.0);
    }

    #[test]
    fn test_soft_landing_leaves_window_closed() {
        let mut actor = grounded_actor();
        actor.jump();
        land_with_speed(&mut actor, 5.0);
        assert_eq!(actor.jump_state().triple_jump_timer, 0.0);
    }

    #[test]
    fn test_combo_window_expiry_on_ground_resets_counter() {
        let mut actor = grounded_actor();
        actor.jump();
        land_with_speed(&mut actor, 40.0);
        assert_eq!(actor.jump_state().jump_number, 1);
        actor.update_jump_timers(0.2);
        assert_eq!(actor.jump_state().jump_number, 1);
        actor.update_jump_timers(0.2);
        assert_eq!(actor.jump_state().jump_number, 0);
    }

    #[test]
    fn test_landing_clears_modifiers_and_triple() {
        let mut actor = grounded_actor();
        actor.set_moving(true);
        actor.jump.jump_number = 2;
        assert_eq!(actor.jump(), Some(JumpKind::Triple));
        assert!(actor.jump_state().do_triple_flip);
        actor.update_jump_timers(0.1);
        assert!(actor.jump_state().triple_flip_angle > 0.0);

        land_with_speed(&mut actor, 40.0);
        assert_eq!(actor.jump_state().jump_number, 0);
        assert!(!actor.jump_state().do_triple_flip);
        assert_eq!(actor.jump_state().modifier(), JumpModifier::None);
    }
}
