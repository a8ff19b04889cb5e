//! Attribute schema for YASF documents.
//!
//! Every entity kind has a static table of [`Descriptor`]s listing the
//! attributes it accepts. The generic [`decode`] routine validates a raw
//! JSON element against such a table and produces a typed [`Record`].
//!
//! - [`registry`]: the descriptor tables and the closed kind enums
//! - [`decode`](mod@decode): the validating deserializer

pub mod decode;
pub mod registry;

use glam::{Vec2, Vec3};

use crate::errors::Result;

pub use decode::{decode, AttrValue, Record, CUSTOM_KEY};
pub use registry::{CameraType, ChildKind, LightType, PrimitiveKind};

/// Shape accepted for one attribute.
#[derive(Debug, Clone, Copy)]
pub enum AttrKind {
    String,
    Boolean,
    /// Exact integral number. `2.0` is accepted, `2.5` is not.
    Integer,
    Float,
    /// `{x, y}`
    Vector2,
    /// `{x, y, z}`
    Vector3,
    /// `{r, g, b}`
    Rgb,
    /// `"x1 y1 x2 y2"` or `{x1, y1, x2, y2}`
    Rectangle2D,
    /// Array (or object, in key order) of elements sharing one descriptor table.
    ListOf(&'static [Descriptor]),
    Fog,
    Skybox,
}

impl AttrKind {
    pub(crate) fn expected(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Boolean => "a boolean",
            Self::Integer => "an integer",
            Self::Float => "a number",
            Self::Vector2 => "a vector2 {x, y}",
            Self::Vector3 => "a vector3 {x, y, z}",
            Self::Rgb => "an rgb {r, g, b}",
            Self::Rectangle2D => "a rectangle \"x1 y1 x2 y2\"",
            Self::ListOf(_) => "a list",
            Self::Fog => "a fog block",
            Self::Skybox => "a skybox block",
        }
    }
}

/// Default applied when an optional attribute is absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    /// The attribute is required.
    Required,
    /// Optional with no value (`null`).
    Null,
    Bool(bool),
    Int(i64),
    Float(f32),
    Str(&'static str),
}

/// One schema entry: attribute name, kind, requiredness and default.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub name: &'static str,
    pub kind: AttrKind,
    pub default: DefaultValue,
}

impl Descriptor {
    #[must_use]
    pub const fn required(name: &'static str, kind: AttrKind) -> Self {
        Self {
            name,
            kind,
            default: DefaultValue::Required,
        }
    }

    #[must_use]
    pub const fn optional(name: &'static str, kind: AttrKind, default: DefaultValue) -> Self {
        Self {
            name,
            kind,
            default,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self.default, DefaultValue::Required)
    }
}

/// Axis-aligned 2D rectangle given by two corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect2D {
    pub p1: Vec2,
    pub p2: Vec2,
}

/// Distance fog settings from the globals block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    pub(crate) fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            color: record.rgb("color")?,
            near: record.float("near")?,
            far: record.float("far")?,
        })
    }
}

/// Skybox settings from the globals block. Face values are image paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Skybox {
    pub size: Vec3,
    pub center: Vec3,
    pub emissive: Vec3,
    pub intensity: f32,
    pub front: String,
    pub back: String,
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
}

impl Skybox {
    pub(crate) fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            size: record.vec3("size")?,
            center: record.vec3("center")?,
            emissive: record.rgb("emissive")?,
            intensity: record.float("intensity")?,
            front: record.string("front")?.to_string(),
            back: record.string("back")?.to_string(),
            up: record.string("up")?.to_string(),
            down: record.string("down")?.to_string(),
            left: record.string("left")?.to_string(),
            right: record.string("right")?.to_string(),
        })
    }

    /// Face paths in cube-map order: +X, -X, +Y, -Y, +Z, -Z.
    #[must_use]
    pub fn cube_faces(&self) -> [&str; 6] {
        [
            &self.right,
            &self.left,
            &self.up,
            &self.down,
            &self.front,
            &self.back,
        ]
    }
}
