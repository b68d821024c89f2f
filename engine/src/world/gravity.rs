//! Gravity resolution
//!
//! Once per step every field in the level is offered to the actor. Fields
//! that contain the actor's sphere compute a pull and call
//! [`Actor::set_gravity_source`], which applies the nearest-wins arbitration.
//! An actor that ends up outside every field either keeps its last gravity or
//! falls back to world down, depending on
//! [`crate::player::ActorConfig::remember_last_gravity_source`].

use tracing::trace;

use crate::player::Actor;

use super::level::Level;

/// Run every field of `level` against `actor`.
///
/// Returns whether any field claimed the actor this step.
pub fn resolve_gravity(level: &Level, actor: &mut Actor) -> bool {
    let center = actor.get_position();
    let radius = actor.radius();
    let mut claimed = false;

    for field in level.fields() {
        let Some(owner) = level.attractor(field.attractor()) else {
            continue;
        };
        let Some(pull) = field.evaluate(center, radius, |p| owner.nearest_point(p)) else {
            continue;
        };
        claimed = true;
        let accepted = actor.set_gravity_source(pull.field, pull.target, pull.vector);
        trace!(field = pull.field.index(), accepted, "field offered");
    }

    if !claimed && !actor.config().remember_last_gravity_source {
        actor.revert_to_world_gravity();
    }
    claimed
}
