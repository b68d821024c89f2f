//! Gravity Hop Engine Library
//!
//! Platforming locomotion on small worlds: an actor sphere runs, jumps and
//! wall-slides across spheres, tori, bowls, wires, wedges and meshes, each
//! of which may carry a gravity field that decides which way is down.
//! Rendering, input devices and asset loading live outside this crate; the
//! host feeds in one [`input::StepInput`] per frame and reads back an
//! [`sim::ActorSnapshot`].
//!
//! # Modules
//!
//! - [`physics`] - Frames, shapes, shape queries and collision resolution
//! - [`world`] - Attractors, gravity fields, checkpoints and level building
//! - [`player`] - The actor, its jump state machine and tuning
//! - [`input`] - Per-frame player intent
//! - [`camera`] - Camera placement relative to the actor
//! - [`sim`] - Step order and the multi-actor simulation
//! - [`error`] - Level and config errors
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gravity_hop_engine::{ActorConfig, AttractorDesc, LevelBuilder, Shape, Simulation, StepInput, TransformDesc};
//! use glam::Vec3;
//!
//! let mut builder = LevelBuilder::new();
//! builder.add_attractor(
//!     &AttractorDesc::new(Shape::sphere(20.0), TransformDesc::at(Vec3::new(0.0, 0.0, -21.0)))
//!         .with_margin_field(15.0, 100.0),
//! )?;
//! let mut sim = Simulation::new(Arc::new(builder.build()));
//! let player = sim.spawn_actor(ActorConfig::default());
//!
//! let snapshot = sim.step(player, &StepInput::idle().with_jump(), 1.0 / 60.0);
//! ```

pub mod camera;
pub mod error;
pub mod input;
pub mod physics;
pub mod player;
pub mod sim;
pub mod world;

// Re-export the types a host touches every frame
pub use camera::{CameraMode, CameraRig, CameraTransform};
pub use error::{ConfigError, LevelError};
pub use input::StepInput;
pub use physics::{Frame, Shape};
pub use player::{Actor, ActorConfig, ActorHandle, EventLog, JumpKind, LocomotionEvent, LocomotionObserver};
pub use sim::{ActorSnapshot, LocomotionState, Simulation};
pub use world::{AttractorDesc, Checkpoint, FieldDesc, Level, LevelBuilder, LevelDesc, TransformDesc};
