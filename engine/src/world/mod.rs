//! World Module
//!
//! Everything the actor moves through: attractors (solids it collides
//! with), gravity fields (volumes that decide which way is down) and
//! checkpoint boxes. Levels are built once and then only read.
//!
//! ## Ownership
//! A [`Level`] owns its attractors and fields for its whole lifetime. Actors
//! refer to fields by [`FieldHandle`] only, so a level can be shared behind
//! an `Arc` by any number of actors.

pub mod attractor;
pub mod field;
pub mod gravity;
pub mod level;

pub use attractor::{Attractor, AttractorHandle};
pub use field::{FieldDesc, FieldHandle, GravityField, GravityPull, PrefabPreset, PullMode};
pub use gravity::resolve_gravity;
pub use level::{AttractorDesc, Checkpoint, Level, LevelBuilder, LevelDesc, TransformDesc};
