//! Collision resolution
//!
//! Pushes the actor's sphere out of every attractor and classifies what it
//! hit relative to the actor's own frame.
//!
//! # Classification
//!
//! With `d` the unit direction from the actor toward the touched surface:
//!
//! - **Ground**: `dot(d, -up) > GROUNDED_THRESHOLD`
//! - **Wall**: `dot(d, forward) > WALL_THRESHOLD` and not grounded
//! - anything else only separates the sphere
//!
//! When several contacts qualify in one step, ground beats wall and the
//! deepest wall contact supplies the slide normal. Push-out itself is
//! order-independent, so the resting position does not depend on the order
//! attractors were authored in.
//!
//! # Example
//!
//! ```ignore
//! use gravity_hop_engine::physics::collision::{classify_contact, ContactKind};
//! use glam::Vec3;
//!
//! // Surface straight below an upright actor.
//! let kind = classify_contact(Vec3::NEG_Z, Vec3::Z, Vec3::X, false);
//! assert_eq!(kind, ContactKind::Ground);
//! ```

use glam::Vec3;
use tracing::trace;

use crate::player::Actor;
use crate::player::config::{GROUNDED_THRESHOLD, WALL_THRESHOLD};
use crate::world::Level;

use super::queries::Contact;

/// A separated actor closer than this to a floor still counts as grounded.
pub const CONTACT_SKIN: f32 = 0.05;

/// What a single push-out contact means for the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Ground,
    Wall,
    /// Separated, but neither floor nor a wall in front.
    Glancing,
}

/// Classify a contact direction against the actor's frame.
///
/// # Arguments
/// * `direction` - Unit vector from the actor toward the surface
/// * `up` - Actor's up axis
/// * `forward` - Actor's forward axis
/// * `grounded` - Whether the actor is already grounded this step
pub fn classify_contact(direction: Vec3, up: Vec3, forward: Vec3, grounded: bool) -> ContactKind {
    if direction.dot(-up) > GROUNDED_THRESHOLD {
        ContactKind::Ground
    } else if direction.dot(forward) > WALL_THRESHOLD && !grounded {
        ContactKind::Wall
    } else {
        ContactKind::Glancing
    }
}

/// Summary of one collision pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionReport {
    /// Number of attractors that moved the sphere.
    pub pushes: usize,
    pub grounded: bool,
    /// Outward normal of the wall the actor started sliding on.
    pub wall_normal: Option<Vec3>,
}

/// Push the actor out of every attractor in `level` and apply the
/// ground/wall outcome.
///
/// The actor's contact flags are expected to have been cleared for this
/// step already; flags are only ever raised here.
pub fn resolve_collisions(level: &Level, actor: &mut Actor) -> CollisionReport {
    let up = actor.up();
    let forward = actor.forward();
    let radius = actor.radius();
    let already_grounded = actor.is_grounded();

    let mut center = actor.get_position();
    let mut report = CollisionReport::default();
    let mut ground = false;
    let mut deepest_wall: Option<Contact> = None;

    for attractor in level.attractors() {
        let pushed = attractor.push_out_with(&mut center, radius, |contact| {
            match classify_contact(contact.direction, up, forward, already_grounded || ground) {
                ContactKind::Ground => ground = true,
                ContactKind::Wall => {
                    if deepest_wall.is_none_or(|w| contact.depth > w.depth) {
                        deepest_wall = Some(contact);
                    }
                }
                ContactKind::Glancing => {}
            }
        });
        if pushed {
            report.pushes += 1;
        }
    }

    if center.is_finite() {
        actor.set_position(center);
    } else {
        center = actor.get_position();
    }

    if !ground {
        ground = touching_ground(level, center, radius, up);
    }

    if ground {
        actor.become_grounded();
        report.grounded = true;
    } else if let Some(wall) = deepest_wall.filter(|_| !actor.is_grounded()) {
        let normal = wall.normal();
        actor.start_wall_slide(normal);
        report.wall_normal = Some(normal);
    }

    if report.pushes > 0 {
        trace!(pushes = report.pushes, grounded = report.grounded, wall = report.wall_normal.is_some(), "collisions resolved");
    }
    report
}

/// Whether a floor lies within [`CONTACT_SKIN`] below a separated sphere.
fn touching_ground(level: &Level, center: Vec3, radius: f32, up: Vec3) -> bool {
    let reach = radius + CONTACT_SKIN;
    level.attractors().iter().any(|attractor| {
        if !attractor.overlaps(center, reach) {
            return false;
        }
        attractor
            .nearest_point(center)
            .and_then(|p| (p - center).try_normalize())
            .is_some_and(|d| d.dot(-up) > GROUNDED_THRESHOLD)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_below_is_ground() {
        assert_eq!(classify_contact(Vec3::NEG_Z, Vec3::Z, Vec3::X, false), ContactKind::Ground);
    }

    #[test]
    fn test_wall_ahead_is_wall() {
        assert_eq!(classify_contact(Vec3::X, Vec3::Z, Vec3::X, false), ContactKind::Wall);
    }

    #[test]
    fn test_wall_ignored_when_grounded() {
        assert_eq!(classify_contact(Vec3::X, Vec3::Z, Vec3::X, true), ContactKind::Glancing);
    }

    #[test]
    fn test_ceiling_and_side_contacts_are_glancing() {
        assert_eq!(classify_contact(Vec3::Z, Vec3::Z, Vec3::X, false), ContactKind::Glancing);
        assert_eq!(classify_contact(Vec3::Y, Vec3::Z, Vec3::X, false), ContactKind::Glancing);
    }

    #[test]
    fn test_threshold_is_strict() {
        // Exactly at the ground threshold is not ground.
        let d = Vec3::new((1.0f32 - 0.75 * 0.75).sqrt(), 0.0, -0.75);
        assert_ne!(classify_contact(d, Vec3::Z, Vec3::Y, false), ContactKind::Ground);
    }

    #[test]
    fn test_sloped_contacts() {
        // Steep toward the floor: ground even though it is also ahead.
        let kind = classify_contact(Vec3::new(0.6, 0.0, -0.8), Vec3::Z, Vec3::X, false);
        assert_eq!(kind, ContactKind::Ground);
        // Too shallow for ground, not far enough ahead for a wall.
        let kind = classify_contact(Vec3::new(0.8, 0.0, -0.6), Vec3::Z, Vec3::X, false);
        assert_eq!(kind, ContactKind::Glancing);
    }
}
