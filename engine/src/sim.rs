//! Simulation stepping
//!
//! [`Actor::step`] runs one frame for one actor against a shared, read-only
//! [`Level`]. [`Simulation`] owns a set of actors plus the observers that
//! want to hear about their jumps, landings and respawns.
//!
//! # Step order
//!
//! 1. Gravity resolution
//! 2. Intent: crouch, steering, move force, jump
//! 3. Long-jump force
//! 4. Gravity, drag, integration and reorientation
//! 5. Contact flags roll into "last frame"
//! 6. Collision resolution
//! 7. Landing edge, timers, checkpoints
//!
//! Jump legality in (2) reads the classification from the previous step's
//! (6), so these phases must not be reordered.

use std::sync::Arc;

use glam::{Quat, Vec3};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::input::StepInput;
use crate::physics::collision::resolve_collisions;
use crate::player::config::MAX_STEP_SECONDS;
use crate::player::{Actor, ActorConfig, ActorHandle, JumpKind, JumpModifier, LocomotionEvent, LocomotionObserver};
use crate::world::{FieldHandle, Level, resolve_gravity};

/// Coarse locomotion state for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocomotionState {
    Airborne,
    Grounded,
    WallSliding,
    /// Just kicked off a wall; steering is ignored until the window closes.
    WallJumpWindow,
}

/// Everything a renderer or camera needs after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActorSnapshot {
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    pub gravity: Vec3,
    pub gravity_source: Option<FieldHandle>,
    pub state: LocomotionState,
    pub modifier: JumpModifier,
    pub is_grounded: bool,
    pub is_wall_sliding: bool,
    pub is_crouching: bool,
    pub jump_number: u8,
    pub jumped: Option<JumpKind>,
    pub triple_flip_angle: f32,
    pub back_flip_angle: f32,
    /// Squash (< 1) or stretch (> 1) along the up axis.
    pub stretch: f32,
    /// Step length actually integrated (after clamping and speed-up).
    pub dt: f32,
}

impl Actor {
    /// Coarse state derived from the flags.
    pub fn locomotion_state(&self) -> LocomotionState {
        if self.is_grounded {
            LocomotionState::Grounded
        } else if self.is_wall_sliding {
            LocomotionState::WallSliding
        } else if self.jump.is_wall_jumping {
            LocomotionState::WallJumpWindow
        } else {
            LocomotionState::Airborne
        }
    }

    fn snapshot(&self, jumped: Option<JumpKind>, dt: f32) -> ActorSnapshot {
        ActorSnapshot {
            position: self.position,
            orientation: self.orientation,
            velocity: self.velocity,
            gravity: self.gravity_vector,
            gravity_source: self.gravity_source.map(|s| s.field),
            state: self.locomotion_state(),
            modifier: self.jump.modifier(),
            is_grounded: self.is_grounded,
            is_wall_sliding: self.is_wall_sliding,
            is_crouching: self.is_crouching,
            jump_number: self.jump.jump_number,
            jumped,
            triple_flip_angle: self.jump.triple_flip_angle,
            back_flip_angle: self.jump.back_flip_angle,
            stretch: self.stretch,
            dt,
        }
    }

    /// Advance this actor by one frame.
    ///
    /// `dt` is clamped to `[0, MAX_STEP_SECONDS]`; a non-finite `dt` is
    /// treated as zero.
    pub fn step(&mut self, level: &Level, input: &StepInput, dt: f32) -> ActorSnapshot {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_STEP_SECONDS)
        } else {
            warn!(dt, "discarded non-finite step length");
            0.0
        };

        resolve_gravity(level, self);

        let (dt, jumped) = self.apply_intent(input, dt);
        self.apply_long_jump(dt);

        let before = (self.position, self.velocity);
        self.update_physics(dt);
        if !(self.position.is_finite() && self.velocity.is_finite()) {
            warn!(position = ?self.position, velocity = ?self.velocity, "discarded non-finite integration");
            (self.position, self.velocity) = before;
        }

        self.roll_contact_flags();
        resolve_collisions(level, self);

        self.update_jump_timers(dt);
        self.update_checkpoint(level);

        trace!(
            position = ?self.position,
            velocity = ?self.velocity,
            grounded = self.is_grounded,
            wall = self.is_wall_sliding,
            "step"
        );
        self.snapshot(jumped, dt)
    }

    /// Record the checkpoint the sphere is touching, if it changed.
    fn update_checkpoint(&mut self, level: &Level) {
        let radius = self.radius();
        let touched = level
            .checkpoints()
            .iter()
            .enumerate()
            .find(|(_, c)| c.touches_sphere(self.position, radius));
        if let Some((index, checkpoint)) = touched {
            if self.checkpoint != Some(index) {
                self.checkpoint = Some(index);
                debug!(index, section = checkpoint.section, "checkpoint reached");
                self.events.push(LocomotionEvent::CheckpointReached {
                    index,
                    section: checkpoint.section,
                });
            }
        }
    }
}

/// A level plus the actors moving through it.
pub struct Simulation {
    level: Arc<Level>,
    actors: Vec<Actor>,
    observers: Vec<Box<dyn LocomotionObserver>>,
}

impl Simulation {
    pub fn new(level: Arc<Level>) -> Self {
        Self {
            level,
            actors: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn level(&self) -> &Arc<Level> {
        &self.level
    }

    /// Add an actor at its configured spawn point.
    pub fn spawn_actor(&mut self, config: ActorConfig) -> ActorHandle {
        let handle = ActorHandle(self.actors.len() as u32);
        self.actors.push(Actor::new(config));
        debug!(actor = handle.index(), "actor spawned");
        handle
    }

    pub fn actor(&self, handle: ActorHandle) -> Option<&Actor> {
        self.actors.get(handle.index())
    }

    pub fn actor_mut(&mut self, handle: ActorHandle) -> Option<&mut Actor> {
        self.actors.get_mut(handle.index())
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Register an observer; it sees events from every actor.
    pub fn add_observer(&mut self, observer: impl LocomotionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Step one actor. Returns `None` for an unknown handle.
    pub fn step(&mut self, handle: ActorHandle, input: &StepInput, dt: f32) -> Option<ActorSnapshot> {
        let actor = self.actors.get_mut(handle.index())?;
        let snapshot = actor.step(&self.level, input, dt);
        let events = actor.drain_events();
        self.dispatch(handle, &events);
        Some(snapshot)
    }

    /// Reset an actor to its last checkpoint (when asked and one was
    /// reached) or to its spawn point. Returns `false` for an unknown handle.
    pub fn respawn(&mut self, handle: ActorHandle, to_checkpoint: bool) -> bool {
        let Some(actor) = self.actors.get_mut(handle.index()) else {
            return false;
        };
        let center = if to_checkpoint {
            actor
                .checkpoint()
                .and_then(|i| self.level.checkpoints().get(i))
                .map(|c| c.center())
        } else {
            None
        };
        actor.respawn(center);
        let events = actor.drain_events();
        self.dispatch(handle, &events);
        true
    }

    fn dispatch(&mut self, handle: ActorHandle, events: &[LocomotionEvent]) {
        for event in events {
            for observer in &mut self.observers {
                observer.on_event(handle, event);
            }
        }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("actors", &self.actors.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Shape;
    use crate::world::{AttractorDesc, Checkpoint, LevelBuilder, TransformDesc};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn floor_level() -> Level {
        let mut builder = LevelBuilder::new();
        builder
            .add_attractor(
                &AttractorDesc::new(Shape::plane(50.0, 50.0, 0.0), TransformDesc::default())
                    .with_margin_field(10.0, 100.0),
            )
            .unwrap();
        builder
            .add_checkpoint(Checkpoint {
                min: Vec3::new(8.0, -2.0, 0.0),
                max: Vec3::new(12.0, 2.0, 4.0),
                section: 3,
            })
            .unwrap();
        builder.build()
    }

    fn config_at(position: Vec3) -> ActorConfig {
        ActorConfig {
            spawn_position: position,
            ..ActorConfig::default()
        }
    }

    #[test]
    fn test_actor_settles_on_floor() {
        let level = floor_level();
        let mut actor = Actor::new(config_at(Vec3::new(0.0, 0.0, 3.0)));
        let mut last = None;
        for _ in 0..120 {
            last = Some(actor.step(&level, &StepInput::idle(), 1.0 / 60.0));
        }
        let snap = last.unwrap();
        assert_eq!(snap.state, LocomotionState::Grounded);
        assert!((snap.position.z - actor.radius()).abs() < 0.05, "z {}", snap.position.z);
    }

    #[test]
    fn test_dt_is_clamped() {
        let level = floor_level();
        let mut actor = Actor::new(config_at(Vec3::new(0.0, 0.0, 3.0)));
        assert_eq!(actor.step(&level, &StepInput::idle(), 5.0).dt, MAX_STEP_SECONDS);
        assert_eq!(actor.step(&level, &StepInput::idle(), -1.0).dt, 0.0);
        assert_eq!(actor.step(&level, &StepInput::idle(), f32::NAN).dt, 0.0);
    }

    #[test]
    fn test_observers_see_events_in_order() {
        let level = Arc::new(floor_level());
        let mut sim = Simulation::new(level);
        let handle = sim.spawn_actor(config_at(Vec3::new(0.0, 0.0, 3.0)));

        let seen: Rc<RefCell<Vec<LocomotionEvent>>> = Rc::default();
        let sink = Rc::clone(&seen);
        sim.add_observer(move |_: ActorHandle, e: &LocomotionEvent| sink.borrow_mut().push(e.clone()));

        for _ in 0..60 {
            sim.step(handle, &StepInput::idle(), 1.0 / 60.0);
        }
        sim.step(handle, &StepInput::idle().with_jump(), 1.0 / 60.0);

        let seen = seen.borrow();
        assert!(matches!(seen.first(), Some(LocomotionEvent::GravitySourceChanged { from: None, .. })));
        assert!(seen.iter().any(|e| matches!(e, LocomotionEvent::Landed { .. })));
        assert!(matches!(
            seen.last(),
            Some(LocomotionEvent::Jumped {
                kind: JumpKind::Single,
                jump_number: 1
            })
        ));
    }

    #[test]
    fn test_checkpoint_then_respawn() {
        let level = Arc::new(floor_level());
        let mut sim = Simulation::new(level);
        let handle = sim.spawn_actor(config_at(Vec3::new(10.0, 0.0, 1.0)));
        sim.step(handle, &StepInput::idle(), 1.0 / 60.0);
        assert_eq!(sim.actor(handle).unwrap().checkpoint(), Some(0));

        sim.actor_mut(handle).unwrap().set_position(Vec3::new(-30.0, 0.0, 1.0));
        assert!(sim.respawn(handle, true));
        assert_eq!(sim.actor(handle).unwrap().get_position(), Vec3::new(10.0, 0.0, 2.0));

        assert!(sim.respawn(handle, false));
        assert_eq!(sim.actor(handle).unwrap().get_position(), Vec3::new(10.0, 0.0, 1.0));
    }

    #[test]
    fn test_unknown_handle() {
        let mut sim = Simulation::new(Arc::new(floor_level()));
        assert!(sim.step(ActorHandle(7), &StepInput::idle(), 0.016).is_none());
        assert!(!sim.respawn(ActorHandle(7), false));
    }
}
