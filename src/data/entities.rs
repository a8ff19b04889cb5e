//! Typed, immutable entity definitions built from decoded records.
//!
//! Each `from_record` is the dedicated decoder for one kind. Once built,
//! a definition is never mutated except for the graph bookkeeping on
//! [`NodeDef`] and [`LodDef`] that the loader owns.

use glam::{Affine3A, EulerRot, Quat, Vec2, Vec3};
use serde_json::{Map, Value};

use crate::errors::{Result, YasfError};
use crate::schema::registry::MAX_MIPMAP_LEVEL;
use crate::schema::{CameraType, Fog, LightType, PrimitiveKind, Record, Skybox};

/// Open-ended extension bag carried by every entity (`"custom": {...}`).
pub type Extras = Map<String, Value>;

// ============================================================================
// Globals
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Globals {
    pub background: Vec3,
    pub ambient: Vec3,
    pub fog: Option<Fog>,
    pub skybox: Option<Skybox>,
    pub custom: Extras,
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            background: Vec3::ZERO,
            ambient: Vec3::ZERO,
            fog: None,
            skybox: None,
            custom: Extras::new(),
        }
    }
}

impl Globals {
    pub(crate) fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            background: record.rgb("background")?,
            ambient: record.rgb("ambient")?,
            fog: record.fog("fog")?,
            skybox: record.skybox("skybox")?,
            custom: record.take_custom(),
        })
    }
}

// ============================================================================
// Textures & Materials
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TextureDef {
    pub id: String,
    pub filepath: String,
    pub is_video: bool,
    /// Explicit mipmap chain starting at level 0. Empty means "generate".
    pub mipmaps: Vec<String>,
    pub custom: Extras,
}

impl TextureDef {
    pub(crate) fn from_record(mut record: Record) -> Result<Self> {
        let mut mipmaps = Vec::new();
        for level in 0..=MAX_MIPMAP_LEVEL {
            match record.opt_string(&format!("mipmap{level}"))? {
                Some(path) => mipmaps.push(path.to_string()),
                None => break,
            }
        }

        Ok(Self {
            id: record.string("id")?.to_string(),
            filepath: record.string("filepath")?.to_string(),
            is_video: record.boolean("isVideo")?,
            mipmaps,
            custom: record.take_custom(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDef {
    pub id: String,
    pub color: Vec3,
    pub specular: Vec3,
    pub emissive: Vec3,
    pub shininess: f32,
    pub transparent: bool,
    pub opacity: f32,
    pub wireframe: bool,
    pub flat_shading: bool,
    pub texture: Option<String>,
    /// Physical size covered by one texture tile, along S and T.
    pub texlength: Vec2,
    pub two_sided: bool,
    pub bump: Option<String>,
    pub bump_scale: f32,
    pub specular_map: Option<String>,
    pub specular_scale: f32,
    pub custom: Extras,
}

impl MaterialDef {
    pub(crate) fn from_record(mut record: Record) -> Result<Self> {
        let owned = |r: &Record, name: &str| -> Result<Option<String>> {
            Ok(r.opt_string(name)?.map(str::to_string))
        };

        Ok(Self {
            id: record.string("id")?.to_string(),
            color: record.rgb("color")?,
            specular: record.rgb("specular")?,
            emissive: record.rgb("emissive")?,
            shininess: record.float("shininess")?,
            transparent: record.boolean("transparent")?,
            opacity: record.float("opacity")?,
            wireframe: record.boolean("wireframe")?,
            flat_shading: record.boolean("shading")?,
            texture: owned(&record, "textureref")?,
            texlength: Vec2::new(record.float("texlength_s")?, record.float("texlength_t")?),
            two_sided: record.boolean("twosided")?,
            bump: owned(&record, "bumpref")?,
            bump_scale: record.float("bumpscale")?,
            specular_map: owned(&record, "specularref")?,
            specular_scale: record.float("specularscale")?,
            custom: record.take_custom(),
        })
    }

    /// Texture ids this material references, with the attribute naming each.
    pub fn texture_refs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("textureref", self.texture.as_deref()),
            ("bumpref", self.bump.as_deref()),
            ("specularref", self.specular_map.as_deref()),
        ]
        .into_iter()
        .filter_map(|(attr, id)| id.map(|id| (attr, id)))
    }
}

// ============================================================================
// Cameras
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraProjection {
    Orthogonal {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
    },
    /// Vertical field of view in degrees.
    Perspective { angle: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraDef {
    pub id: String,
    pub projection: CameraProjection,
    pub near: f32,
    pub far: f32,
    pub location: Vec3,
    pub target: Vec3,
    pub custom: Extras,
}

impl CameraDef {
    pub(crate) fn from_record(kind: CameraType, mut record: Record) -> Result<Self> {
        let projection = match kind {
            CameraType::Orthogonal => CameraProjection::Orthogonal {
                left: record.float("left")?,
                right: record.float("right")?,
                bottom: record.float("bottom")?,
                top: record.float("top")?,
            },
            CameraType::Perspective => CameraProjection::Perspective {
                angle: record.float("angle")?,
            },
        };

        Ok(Self {
            id: record.string("id")?.to_string(),
            projection,
            near: record.float("near")?,
            far: record.float("far")?,
            location: record.vec3("location")?,
            target: record.vec3("target")?,
            custom: record.take_custom(),
        })
    }
}

// ============================================================================
// Lights
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightDefKind {
    Point {
        distance: f32,
        decay: f32,
    },
    Spot {
        target: Vec3,
        /// Cone angle in degrees.
        angle: f32,
        distance: f32,
        decay: f32,
        penumbra: f32,
    },
    Directional {
        shadow_left: f32,
        shadow_right: f32,
        shadow_bottom: f32,
        shadow_top: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightDef {
    pub id: String,
    pub color: Vec3,
    pub position: Vec3,
    pub enabled: bool,
    pub intensity: f32,
    pub cast_shadow: bool,
    pub shadow_far: f32,
    pub shadow_map_size: u32,
    pub kind: LightDefKind,
    pub custom: Extras,
}

impl LightDef {
    pub(crate) fn from_record(kind: LightType, mut record: Record) -> Result<Self> {
        let kind = match kind {
            LightType::Point => LightDefKind::Point {
                distance: record.float("distance")?,
                decay: record.float("decay")?,
            },
            LightType::Spot => LightDefKind::Spot {
                target: record.vec3("target")?,
                angle: record.float("angle")?,
                distance: record.float("distance")?,
                decay: record.float("decay")?,
                penumbra: record.float("penumbra")?,
            },
            LightType::Directional => LightDefKind::Directional {
                shadow_left: record.float("shadowleft")?,
                shadow_right: record.float("shadowright")?,
                shadow_bottom: record.float("shadowbottom")?,
                shadow_top: record.float("shadowtop")?,
            },
        };

        Ok(Self {
            id: record.string("id")?.to_string(),
            color: record.rgb("color")?,
            position: record.vec3("position")?,
            enabled: record.boolean("enabled")?,
            intensity: record.float("intensity")?,
            cast_shadow: record.boolean("castshadow")?,
            shadow_far: record.float("shadowfar")?,
            shadow_map_size: record.count("shadowmapsize", 1)?,
            kind,
            custom: record.take_custom(),
        })
    }

    #[must_use]
    pub fn light_type(&self) -> LightType {
        match self.kind {
            LightDefKind::Point { .. } => LightType::Point,
            LightDefKind::Spot { .. } => LightType::Spot,
            LightDefKind::Directional { .. } => LightType::Directional,
        }
    }
}

// ============================================================================
// Primitives
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleParams {
    pub xy1: Vec2,
    pub xy2: Vec2,
    pub parts_x: u32,
    pub parts_y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleParams {
    pub xyz1: Vec3,
    pub xyz2: Vec3,
    pub xyz3: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxParams {
    pub xyz1: Vec3,
    pub xyz2: Vec3,
    pub parts: [u32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderParams {
    pub base: f32,
    pub top: f32,
    pub height: f32,
    pub slices: u32,
    pub stacks: u32,
    pub caps_closed: bool,
    pub theta_start: f32,
    pub theta_length: f32,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    pub radius: f32,
    pub slices: u32,
    pub stacks: u32,
    pub theta_start: f32,
    pub theta_length: f32,
    pub phi_start: f32,
    pub phi_length: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NurbsParams {
    pub degree_u: u32,
    pub degree_v: u32,
    pub parts_u: u32,
    pub parts_v: u32,
    /// Row-major in U: point `(u, v)` lives at `u * (degree_v + 1) + v`.
    pub control_points: Vec<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonParams {
    pub radius: f32,
    pub stacks: u32,
    pub slices: u32,
    pub color_c: Vec3,
    pub color_p: Vec3,
}

/// Subtype-specific geometry parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveParams {
    Rectangle(RectangleParams),
    Triangle(TriangleParams),
    Box(BoxParams),
    Cylinder(CylinderParams),
    Sphere(SphereParams),
    Nurbs(NurbsParams),
    Polygon(PolygonParams),
}

/// Upper bound on the vertices one primitive may generate.
pub const MAX_PRIMITIVE_VERTICES: u64 = 1 << 24;

/// Vertices of a `(a + 1) x (b + 1)` grid, saturating instead of wrapping.
fn grid_vertices(a: u32, b: u32) -> u64 {
    (u64::from(a) + 1).saturating_mul(u64::from(b) + 1)
}

impl PrimitiveParams {
    /// Upper estimate of the vertex count the generator will produce.
    #[must_use]
    pub fn vertex_estimate(&self) -> u64 {
        match self {
            Self::Rectangle(p) => grid_vertices(p.parts_x, p.parts_y),
            Self::Triangle(_) => 3,
            Self::Box(p) => {
                let [x, y, z] = p.parts;
                grid_vertices(x, y)
                    .saturating_add(grid_vertices(z, y))
                    .saturating_add(grid_vertices(x, z))
                    .saturating_mul(2)
            }
            // 侧面网格 + 两个端盖
            Self::Cylinder(p) => grid_vertices(p.slices, p.stacks)
                .saturating_add((u64::from(p.slices) + 1).saturating_mul(4)),
            Self::Sphere(p) => grid_vertices(p.slices, p.stacks),
            Self::Nurbs(p) => grid_vertices(p.parts_u, p.parts_v),
            Self::Polygon(p) => grid_vertices(p.slices, p.stacks),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Rectangle(_) => PrimitiveKind::Rectangle,
            Self::Triangle(_) => PrimitiveKind::Triangle,
            Self::Box(_) => PrimitiveKind::Box,
            Self::Cylinder(_) => PrimitiveKind::Cylinder,
            Self::Sphere(_) => PrimitiveKind::Sphere,
            Self::Nurbs(_) => PrimitiveKind::Nurbs,
            Self::Polygon(_) => PrimitiveKind::Polygon,
        }
    }

    fn rectangle(r: &Record) -> Result<Self> {
        Ok(Self::Rectangle(RectangleParams {
            xy1: r.vec2("xy1")?,
            xy2: r.vec2("xy2")?,
            parts_x: r.count("parts_x", 1)?,
            parts_y: r.count("parts_y", 1)?,
        }))
    }

    fn triangle(r: &Record) -> Result<Self> {
        Ok(Self::Triangle(TriangleParams {
            xyz1: r.vec3("xyz1")?,
            xyz2: r.vec3("xyz2")?,
            xyz3: r.vec3("xyz3")?,
        }))
    }

    fn cuboid(r: &Record) -> Result<Self> {
        Ok(Self::Box(BoxParams {
            xyz1: r.vec3("xyz1")?,
            xyz2: r.vec3("xyz2")?,
            parts: [
                r.count("parts_x", 1)?,
                r.count("parts_y", 1)?,
                r.count("parts_z", 1)?,
            ],
        }))
    }

    fn cylinder(r: &Record) -> Result<Self> {
        Ok(Self::Cylinder(CylinderParams {
            base: r.float("base")?,
            top: r.float("top")?,
            height: r.float("height")?,
            slices: r.count("slices", 3)?,
            stacks: r.count("stacks", 1)?,
            caps_closed: r.boolean("capsclose")?,
            theta_start: r.float("thetastart")?,
            theta_length: r.float("thetalength")?,
            distance: r.float("distance")?,
        }))
    }

    fn sphere(r: &Record) -> Result<Self> {
        Ok(Self::Sphere(SphereParams {
            radius: r.float("radius")?,
            slices: r.count("slices", 3)?,
            stacks: r.count("stacks", 2)?,
            theta_start: r.float("thetastart")?,
            theta_length: r.float("thetalength")?,
            phi_start: r.float("phistart")?,
            phi_length: r.float("philength")?,
        }))
    }

    fn nurbs(r: &Record) -> Result<Self> {
        let degree_u = r.count("degree_u", 1)?;
        let degree_v = r.count("degree_v", 1)?;
        let control_points = r
            .list("controlpoints")?
            .iter()
            .map(|p| Ok(Vec3::new(p.float("x")?, p.float("y")?, p.float("z")?)))
            .collect::<Result<Vec<_>>>()?;

        let expected = degree_u
            .checked_add(1)
            .zip(degree_v.checked_add(1))
            .and_then(|(u, v)| u.checked_mul(v))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                YasfError::structural(
                    r.element(),
                    format!("nurbs degree {degree_u}x{degree_v} is out of range"),
                )
            })?;
        if control_points.len() != expected {
            return Err(YasfError::structural(
                r.element(),
                format!(
                    "nurbs of degree {degree_u}x{degree_v} needs {expected} control points, found {}",
                    control_points.len()
                ),
            ));
        }

        Ok(Self::Nurbs(NurbsParams {
            degree_u,
            degree_v,
            parts_u: r.count("parts_u", 1)?,
            parts_v: r.count("parts_v", 1)?,
            control_points,
        }))
    }

    fn polygon(r: &Record) -> Result<Self> {
        Ok(Self::Polygon(PolygonParams {
            radius: r.float("radius")?,
            stacks: r.count("stacks", 1)?,
            slices: r.count("slices", 3)?,
            color_c: r.rgb("color_c")?,
            color_p: r.rgb("color_p")?,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveDef {
    pub id: String,
    pub params: PrimitiveParams,
    pub custom: Extras,
}

impl PrimitiveDef {
    pub(crate) fn from_record(kind: PrimitiveKind, mut record: Record) -> Result<Self> {
        let build: fn(&Record) -> Result<PrimitiveParams> = match kind {
            PrimitiveKind::Rectangle => PrimitiveParams::rectangle,
            PrimitiveKind::Triangle => PrimitiveParams::triangle,
            PrimitiveKind::Box => PrimitiveParams::cuboid,
            PrimitiveKind::Cylinder => PrimitiveParams::cylinder,
            PrimitiveKind::Sphere => PrimitiveParams::sphere,
            PrimitiveKind::Nurbs => PrimitiveParams::nurbs,
            PrimitiveKind::Polygon => PrimitiveParams::polygon,
        };

        let params = build(&record)?;
        let vertices = params.vertex_estimate();
        if vertices > MAX_PRIMITIVE_VERTICES {
            return Err(YasfError::structural(
                record.element(),
                format!("{vertices} vertices exceed the per-primitive limit of {MAX_PRIMITIVE_VERTICES}"),
            ));
        }

        Ok(Self {
            id: record.string("id")?.to_string(),
            params,
            custom: record.take_custom(),
        })
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        self.params.kind()
    }
}

// ============================================================================
// Graph
// ============================================================================

/// One entry of a node's `transforms` list. Rotations are stored in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transformation {
    Translate(Vec3),
    Rotate(Vec3),
    Scale(Vec3),
}

impl Transformation {
    /// Builds a rotation from per-axis degrees, converting each component.
    #[must_use]
    pub fn rotate_degrees(degrees: Vec3) -> Self {
        Self::Rotate(Vec3::new(
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        ))
    }

    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        match *self {
            Self::Translate(t) => Affine3A::from_translation(t),
            Self::Rotate(r) => Affine3A::from_quat(Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z)),
            Self::Scale(s) => Affine3A::from_scale(s),
        }
    }
}

/// Per-definition traversal state. `Loaded` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unvisited,
    Visiting,
    Loaded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeChild {
    /// Inline leaf geometry.
    Primitive(PrimitiveDef),
    /// Inline light, stored in the light collection under this id.
    Light(String),
    /// Reference to another node or LOD in the graph table.
    Reference(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDef {
    pub id: String,
    pub transformations: Vec<Transformation>,
    pub material_ids: Vec<String>,
    pub children: Vec<NodeChild>,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    pub state: LoadState,
    pub custom: Extras,
}

impl NodeDef {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Node ids referenced by this node, in declaration order.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|c| match c {
            NodeChild::Reference(id) => Some(id.as_str()),
            _ => None,
        })
    }

    /// Composes the transformation list in declaration order.
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        self.transformations
            .iter()
            .fold(Affine3A::IDENTITY, |acc, t| acc * t.to_affine())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodLevelDef<'a> {
    pub node_id: &'a str,
    pub min_distance: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LodDef {
    pub id: String,
    /// `(node id, minimum distance)` in declaration order.
    pub levels: Vec<(String, f32)>,
    pub state: LoadState,
    pub custom: Extras,
}

impl LodDef {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn levels(&self) -> impl Iterator<Item = LodLevelDef<'_>> {
        self.levels.iter().map(|(id, d)| LodLevelDef {
            node_id: id,
            min_distance: *d,
        })
    }
}
