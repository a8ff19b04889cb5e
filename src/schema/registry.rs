//! Static descriptor tables, one per entity kind.
//!
//! Kind dispatch is closed: every `type` string a document may use maps to
//! one variant of [`CameraType`], [`PrimitiveKind`] or [`LightType`], and
//! each variant owns its descriptor table.

use std::f32::consts::TAU;

use super::AttrKind::{
    Boolean, Float, Fog, Integer, ListOf, Rgb, Skybox, String as Str, Vector2, Vector3,
};
use super::DefaultValue::{Bool, Float as F, Int, Null, Str as S};
use super::{Descriptor, Descriptor as D};

// ============================================================================
// Globals
// ============================================================================

pub static GLOBALS: &[Descriptor] = &[
    D::required("background", Rgb),
    D::required("ambient", Rgb),
    D::optional("fog", Fog, Null),
    D::optional("skybox", Skybox, Null),
];

pub static FOG: &[Descriptor] = &[
    D::required("color", Rgb),
    D::required("near", Float),
    D::required("far", Float),
];

pub static SKYBOX: &[Descriptor] = &[
    D::required("size", Vector3),
    D::required("center", Vector3),
    D::required("emissive", Rgb),
    D::required("intensity", Float),
    D::required("front", Str),
    D::required("back", Str),
    D::required("up", Str),
    D::required("down", Str),
    D::required("left", Str),
    D::required("right", Str),
];

// ============================================================================
// Textures & Materials
// ============================================================================

/// Highest mipmap level a texture may declare explicitly.
pub const MAX_MIPMAP_LEVEL: usize = 7;

pub static TEXTURE: &[Descriptor] = &[
    D::required("id", Str),
    D::required("filepath", Str),
    D::optional("isVideo", Boolean, Bool(false)),
    D::optional("mipmap0", Str, S("")),
    D::optional("mipmap1", Str, S("")),
    D::optional("mipmap2", Str, S("")),
    D::optional("mipmap3", Str, S("")),
    D::optional("mipmap4", Str, S("")),
    D::optional("mipmap5", Str, S("")),
    D::optional("mipmap6", Str, S("")),
    D::optional("mipmap7", Str, S("")),
];

pub static MATERIAL: &[Descriptor] = &[
    D::required("id", Str),
    D::required("color", Rgb),
    D::required("specular", Rgb),
    D::required("emissive", Rgb),
    D::required("shininess", Float),
    D::optional("transparent", Boolean, Bool(false)),
    D::optional("opacity", Float, F(1.0)),
    D::optional("wireframe", Boolean, Bool(false)),
    D::optional("shading", Boolean, Bool(false)),
    D::optional("textureref", Str, Null),
    D::optional("texlength_s", Float, F(1.0)),
    D::optional("texlength_t", Float, F(1.0)),
    D::optional("twosided", Boolean, Bool(false)),
    D::optional("bumpref", Str, Null),
    D::optional("bumpscale", Float, F(1.0)),
    D::optional("specularref", Str, Null),
    D::optional("specularscale", Float, F(1.0)),
];

// ============================================================================
// Cameras
// ============================================================================

pub static ORTHOGONAL: &[Descriptor] = &[
    D::required("id", Str),
    D::required("type", Str),
    D::required("near", Float),
    D::required("far", Float),
    D::required("location", Vector3),
    D::required("target", Vector3),
    D::required("left", Float),
    D::required("right", Float),
    D::required("bottom", Float),
    D::required("top", Float),
];

pub static PERSPECTIVE: &[Descriptor] = &[
    D::required("id", Str),
    D::required("type", Str),
    D::required("angle", Float),
    D::required("near", Float),
    D::required("far", Float),
    D::required("location", Vector3),
    D::required("target", Vector3),
];

// ============================================================================
// Primitives
// ============================================================================

pub static RECTANGLE: &[Descriptor] = &[
    D::required("type", Str),
    D::required("id", Str),
    D::required("xy1", Vector2),
    D::required("xy2", Vector2),
    D::optional("parts_x", Integer, Int(1)),
    D::optional("parts_y", Integer, Int(1)),
];

pub static TRIANGLE: &[Descriptor] = &[
    D::required("type", Str),
    D::required("id", Str),
    D::required("xyz1", Vector3),
    D::required("xyz2", Vector3),
    D::required("xyz3", Vector3),
];

pub static BOX: &[Descriptor] = &[
    D::required("type", Str),
    D::required("id", Str),
    D::required("xyz1", Vector3),
    D::required("xyz2", Vector3),
    D::optional("parts_x", Integer, Int(1)),
    D::optional("parts_y", Integer, Int(1)),
    D::optional("parts_z", Integer, Int(1)),
];

pub static CYLINDER: &[Descriptor] = &[
    D::required("type", Str),
    D::required("id", Str),
    D::required("base", Float),
    D::required("top", Float),
    D::required("height", Float),
    D::required("slices", Integer),
    D::required("stacks", Integer),
    D::optional("capsclose", Boolean, Bool(false)),
    D::optional("thetastart", Float, F(0.0)),
    D::optional("thetalength", Float, F(TAU)),
    D::optional("distance", Float, F(0.0)),
];

pub static SPHERE: &[Descriptor] = &[
    D::required("type", Str),
    D::required("id", Str),
    D::required("radius", Float),
    D::required("slices", Integer),
    D::required("stacks", Integer),
    D::optional("thetastart", Float, F(0.0)),
    D::optional("thetalength", Float, F(TAU)),
    D::optional("phistart", Float, F(0.0)),
    D::optional("philength", Float, F(TAU)),
];

pub static CONTROL_POINT: &[Descriptor] = &[
    D::required("x", Float),
    D::required("y", Float),
    D::required("z", Float),
];

pub static NURBS: &[Descriptor] = &[
    D::required("type", Str),
    D::required("id", Str),
    D::required("degree_u", Integer),
    D::required("degree_v", Integer),
    D::required("parts_u", Integer),
    D::required("parts_v", Integer),
    D::required("controlpoints", ListOf(CONTROL_POINT)),
];

pub static POLYGON: &[Descriptor] = &[
    D::required("type", Str),
    D::required("id", Str),
    D::required("radius", Float),
    D::required("stacks", Integer),
    D::required("slices", Integer),
    D::required("color_c", Rgb),
    D::required("color_p", Rgb),
];

// ============================================================================
// Lights
// ============================================================================

pub static SPOTLIGHT: &[Descriptor] = &[
    D::required("type", Str),
    D::required("id", Str),
    D::required("color", Rgb),
    D::required("position", Vector3),
    D::required("target", Vector3),
    D::required("angle", Float),
    D::optional("enabled", Boolean, Bool(true)),
    D::optional("intensity", Float, F(1.0)),
    D::optional("distance", Float, F(1000.0)),
    D::optional("decay", Float, F(2.0)),
    D::optional("penumbra", Float, F(1.0)),
    D::optional("castshadow", Boolean, Bool(false)),
    D::optional("shadowfar", Float, F(500.0)),
    D::optional("shadowmapsize", Integer, Int(512)),
];

pub static POINTLIGHT: &[Descriptor] = &[
    D::required("type", Str),
    D::required("id", Str),
    D::required("color", Rgb),
    D::required("position", Vector3),
    D::optional("enabled", Boolean, Bool(true)),
    D::optional("intensity", Float, F(1.0)),
    D::optional("distance", Float, F(1000.0)),
    D::optional("decay", Float, F(2.0)),
    D::optional("castshadow", Boolean, Bool(false)),
    D::optional("shadowfar", Float, F(500.0)),
    D::optional("shadowmapsize", Integer, Int(512)),
];

pub static DIRECTIONALLIGHT: &[Descriptor] = &[
    D::required("type", Str),
    D::required("id", Str),
    D::required("color", Rgb),
    D::required("position", Vector3),
    D::optional("enabled", Boolean, Bool(true)),
    D::optional("intensity", Float, F(1.0)),
    D::optional("castshadow", Boolean, Bool(false)),
    D::optional("shadowleft", Float, F(-5.0)),
    D::optional("shadowright", Float, F(5.0)),
    D::optional("shadowbottom", Float, F(-5.0)),
    D::optional("shadowtop", Float, F(5.0)),
    D::optional("shadowfar", Float, F(500.0)),
    D::optional("shadowmapsize", Integer, Int(512)),
];

// ============================================================================
// Graph entries
// ============================================================================

/// One entry of a node's `transforms` list.
pub static TRANSFORM: &[Descriptor] = &[D::required("type", Str), D::required("amount", Vector3)];

pub static MATERIAL_REF: &[Descriptor] = &[D::required("materialId", Str)];

/// One entry of a LOD's `lodNodes` list.
pub static LOD_LEVEL: &[Descriptor] = &[D::required("nodeId", Str), D::required("mindist", Float)];

// ============================================================================
// Kind enums
// ============================================================================

/// Camera projection kinds accepted in the `cameras` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraType {
    Orthogonal,
    Perspective,
}

impl CameraType {
    #[must_use]
    pub fn from_type(name: &str) -> Option<Self> {
        match name {
            "orthogonal" => Some(Self::Orthogonal),
            "perspective" => Some(Self::Perspective),
            _ => None,
        }
    }

    #[must_use]
    pub fn descriptors(self) -> &'static [Descriptor] {
        match self {
            Self::Orthogonal => ORTHOGONAL,
            Self::Perspective => PERSPECTIVE,
        }
    }
}

/// Leaf geometry kinds that may appear inline in a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Rectangle,
    Triangle,
    Box,
    Cylinder,
    Sphere,
    Nurbs,
    Polygon,
}

impl PrimitiveKind {
    pub const ALL: [Self; 7] = [
        Self::Rectangle,
        Self::Triangle,
        Self::Box,
        Self::Cylinder,
        Self::Sphere,
        Self::Nurbs,
        Self::Polygon,
    ];

    #[must_use]
    pub fn from_type(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Triangle => "triangle",
            Self::Box => "box",
            Self::Cylinder => "cylinder",
            Self::Sphere => "sphere",
            Self::Nurbs => "nurbs",
            Self::Polygon => "polygon",
        }
    }

    #[must_use]
    pub fn descriptors(self) -> &'static [Descriptor] {
        match self {
            Self::Rectangle => RECTANGLE,
            Self::Triangle => TRIANGLE,
            Self::Box => BOX,
            Self::Cylinder => CYLINDER,
            Self::Sphere => SPHERE,
            Self::Nurbs => NURBS,
            Self::Polygon => POLYGON,
        }
    }
}

/// Light kinds that may appear inline in a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    Point,
    Spot,
    Directional,
}

impl LightType {
    #[must_use]
    pub fn from_type(name: &str) -> Option<Self> {
        match name {
            "pointlight" => Some(Self::Point),
            "spotlight" => Some(Self::Spot),
            "directionallight" => Some(Self::Directional),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "pointlight",
            Self::Spot => "spotlight",
            Self::Directional => "directionallight",
        }
    }

    #[must_use]
    pub fn descriptors(self) -> &'static [Descriptor] {
        match self {
            Self::Point => POINTLIGHT,
            Self::Spot => SPOTLIGHT,
            Self::Directional => DIRECTIONALLIGHT,
        }
    }
}

/// Inline child kind, resolved from the child's `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    Primitive(PrimitiveKind),
    Light(LightType),
}

impl ChildKind {
    #[must_use]
    pub fn from_type(name: &str) -> Option<Self> {
        PrimitiveKind::from_type(name)
            .map(Self::Primitive)
            .or_else(|| LightType::from_type(name).map(Self::Light))
    }

    #[must_use]
    pub fn descriptors(self) -> &'static [Descriptor] {
        match self {
            Self::Primitive(k) => k.descriptors(),
            Self::Light(k) => k.descriptors(),
        }
    }
}
