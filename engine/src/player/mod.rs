//! Player Module
//!
//! The actor and its locomotion state machine.
//!
//! # Components
//!
//! - [`Actor`] - Sphere body with gravity-aligned orientation
//!   - Forces, drag and integration, reorientation toward the current gravity
//!   - Contact flags written by the collision resolver
//! - [`JumpState`] - Combo counter, arc modifiers and their timers
//! - Camera-relative steering (see [`movement`])
//! - [`ActorConfig`] - Tuning, loadable from JSON
//! - [`LocomotionEvent`] / [`LocomotionObserver`] - Observational hooks

pub mod actor;
pub mod config;
pub mod events;
pub mod jump;
pub mod movement;

pub use actor::{Actor, GravitySource};
pub use config::{
    ActorConfig, GROUNDED_THRESHOLD, MAX_STEP_SECONDS, STANDARD_GRAVITY, TRUE_FALL_THRESHOLD,
    WALL_THRESHOLD,
};
pub use events::{ActorHandle, EventLog, LocomotionEvent, LocomotionObserver};
pub use jump::{JumpKind, JumpModifier, JumpState};
pub use movement::SurfaceBasis;
