//! Camera Module
//!
//! Camera placement relative to an actor. Window-system agnostic: it only
//! produces a position and orientation, and the host feeds the camera's
//! forward axis back in as part of the next step's input.

pub mod controller;

pub use controller::{
    CameraMode, CameraRig, CameraTransform, DEFAULT_CAMERA_OFFSET, DEFAULT_TURN_RATE,
    PITCH_LIMIT_DEG,
};
