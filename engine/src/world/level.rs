//! Level construction
//!
//! The content layer describes attractors (shape + transform + optional
//! field) and checkpoint volumes; [`LevelBuilder`] validates them and hands
//! back opaque handles. A built [`Level`] is immutable and can be shared by
//! any number of actors.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::LevelError;
use crate::physics::{Frame, Shape};

use super::attractor::{Attractor, AttractorHandle};
use super::field::{FieldDesc, FieldHandle, GravityField};

/// Local transform of an attractor, authored as position + yaw/pitch/roll degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDesc {
    pub position: Vec3,
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub roll_deg: f32,
}

impl TransformDesc {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn to_frame(&self) -> Frame {
        Frame::from_yaw_pitch_roll(self.position, self.yaw_deg, self.pitch_deg, self.roll_deg)
    }
}

fn unit_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractorDesc {
    #[serde(default)]
    pub name: Option<String>,
    pub shape: Shape,
    #[serde(default)]
    pub transform: TransformDesc,
    /// Uniform scale applied to triangle-mesh vertices (prefabs).
    #[serde(default = "unit_scale")]
    pub scale: f32,
    #[serde(default)]
    pub field: Option<FieldDesc>,
}

impl AttractorDesc {
    pub fn new(shape: Shape, transform: TransformDesc) -> Self {
        Self {
            name: None,
            shape,
            transform,
            scale: 1.0,
            field: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_field(mut self, field: FieldDesc) -> Self {
        self.field = Some(field);
        self
    }

    /// Shorthand for a field that grows the collision shape by `margin`.
    pub fn with_margin_field(self, margin: f32, force: f32) -> Self {
        self.with_field(FieldDesc::Margin {
            margin,
            force,
            offset: Vec3::ZERO,
        })
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Axis-aligned checkpoint volume in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub min: Vec3,
    pub max: Vec3,
    /// Level section this checkpoint belongs to.
    #[serde(default)]
    pub section: u32,
}

impl Checkpoint {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Whether a sphere touches the box.
    pub fn touches_sphere(&self, center: Vec3, radius: f32) -> bool {
        center.clamp(self.min, self.max).distance_squared(center) <= radius * radius
    }
}

/// Whole level as supplied by the content layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelDesc {
    #[serde(default)]
    pub attractors: Vec<AttractorDesc>,
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
}

impl LevelDesc {
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build(&self) -> Result<Level, LevelError> {
        let mut builder = LevelBuilder::new();
        for desc in &self.attractors {
            builder.add_attractor(desc)?;
        }
        for checkpoint in &self.checkpoints {
            builder.add_checkpoint(*checkpoint)?;
        }
        Ok(builder.build())
    }
}

/// Read-only set of attractors, fields and checkpoints.
#[derive(Debug, Clone, Default)]
pub struct Level {
    attractors: Vec<Attractor>,
    fields: Vec<GravityField>,
    checkpoints: Vec<Checkpoint>,
}

impl Level {
    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors
    }

    pub fn fields(&self) -> &[GravityField] {
        &self.fields
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn attractor(&self, handle: AttractorHandle) -> Option<&Attractor> {
        self.attractors.get(handle.index())
    }

    pub fn field(&self, handle: FieldHandle) -> Option<&GravityField> {
        self.fields.get(handle.index())
    }

    /// Attractor owning `field`.
    pub fn field_owner(&self, field: FieldHandle) -> Option<&Attractor> {
        self.attractor(self.field(field)?.attractor)
    }

    pub fn attractor_handles(&self) -> impl Iterator<Item = AttractorHandle> + '_ {
        (0..self.attractors.len()).map(|i| AttractorHandle(i as u32))
    }
}

/// Incremental level construction.
#[derive(Debug, Default)]
pub struct LevelBuilder {
    level: Level,
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add one attractor (and its field, if any).
    pub fn add_attractor(&mut self, desc: &AttractorDesc) -> Result<AttractorHandle, LevelError> {
        let index = self.level.attractors.len();

        let frame = desc.transform.to_frame();
        if !frame.is_finite() {
            return Err(LevelError::NonFinite {
                index,
                field: "transform",
            });
        }
        if !desc.scale.is_finite() || desc.scale < 0.0 {
            return Err(LevelError::NegativeParameter {
                index,
                field: "scale",
                value: desc.scale,
            });
        }

        let shape = match &desc.shape {
            Shape::TriangleMesh(mesh) if desc.scale != 1.0 => Shape::TriangleMesh(mesh.scaled(desc.scale)),
            other => other.clone(),
        };
        shape.validate(index)?;

        let handle = AttractorHandle(index as u32);
        let mut attractor = Attractor::new(desc.name.clone(), frame, shape);

        if let Some(field_desc) = &desc.field {
            let force = field_desc.force();
            if !force.is_finite() || force < 0.0 {
                return Err(LevelError::NegativeParameter {
                    index,
                    field: "field.force",
                    value: force,
                });
            }
            let (field_shape, offset, pull) = field_desc.resolve(&attractor.shape, desc.scale);
            field_shape.validate(index)?;
            if !offset.is_finite() {
                return Err(LevelError::NonFinite {
                    index,
                    field: "field.offset",
                });
            }

            let field_handle = FieldHandle(self.level.fields.len() as u32);
            self.level.fields.push(GravityField {
                handle: field_handle,
                attractor: handle,
                shape: field_shape,
                frame: frame.offset_local(offset),
                offset,
                force,
                pull,
            });
            attractor.field = Some(field_handle);
        }

        self.level.attractors.push(attractor);
        Ok(handle)
    }

    pub fn add_checkpoint(&mut self, checkpoint: Checkpoint) -> Result<usize, LevelError> {
        let index = self.level.checkpoints.len();
        if !checkpoint.min.cmple(checkpoint.max).all() {
            return Err(LevelError::InvertedCheckpoint { index });
        }
        self.level.checkpoints.push(checkpoint);
        Ok(index)
    }

    pub fn build(self) -> Level {
        info!(
            attractors = self.level.attractors.len(),
            fields = self.level.fields.len(),
            checkpoints = self.level.checkpoints.len(),
            "level built"
        );
        self.level
    }
}

static_assertions::assert_impl_all!(Level: Send, Sync);
