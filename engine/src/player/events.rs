//! Locomotion Events
//!
//! Observational notifications produced while stepping an actor. They are
//! buffered on the actor during the step and handed to observers once the
//! step is finished, so an observer can never influence the outcome.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::world::FieldHandle;

use super::jump::JumpKind;

/// Opaque index of an actor inside a [`crate::sim::Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorHandle(pub(crate) u32);

impl ActorHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocomotionEvent {
    /// A grounded jump of some kind was selected
    Jumped { kind: JumpKind, jump_number: u8 },

    /// Jumped off a wall while sliding
    WallJumped { wall_normal: Vec3 },

    /// Touched down after being airborne
    Landed { speed: f32 },

    /// Current gravity source switched (or was cleared)
    GravitySourceChanged {
        from: Option<FieldHandle>,
        to: Option<FieldHandle>,
    },

    /// Sphere touched a different checkpoint volume
    CheckpointReached { index: usize, section: u32 },

    /// Actor was reset
    Respawned { position: Vec3, to_checkpoint: bool },
}

/// Receiver of locomotion events.
///
/// Closures `FnMut(ActorHandle, &LocomotionEvent)` implement this directly.
pub trait LocomotionObserver {
    fn on_event(&mut self, actor: ActorHandle, event: &LocomotionEvent);
}

impl<F> LocomotionObserver for F
where
    F: FnMut(ActorHandle, &LocomotionEvent),
{
    fn on_event(&mut self, actor: ActorHandle, event: &LocomotionEvent) {
        self(actor, event)
    }
}

/// Observer that keeps every event it sees, in order.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<(ActorHandle, LocomotionEvent)>,
}

impl EventLog {
    pub fn jumps(&self) -> impl Iterator<Item = JumpKind> + '_ {
        self.events.iter().filter_map(|(_, e)| match e {
            LocomotionEvent::Jumped { kind, .. } => Some(*kind),
            _ => None,
        })
    }
}

impl LocomotionObserver for EventLog {
    fn on_event(&mut self, actor: ActorHandle, event: &LocomotionEvent) {
        self.events.push((actor, event.clone()));
    }
}
