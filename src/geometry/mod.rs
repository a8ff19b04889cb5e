//! CPU-side geometry produced for each primitive.
//!
//! A [`Geometry`] holds planar vertex attributes as raw bytes (cast with
//! `bytemuck`), a `u32` index list, and optional material groups for
//! multi-face primitives (box faces, cylinder lateral surface and caps).
//!
//! Built geometries are wrapped in `Arc` by the scene builder so instanced
//! subtrees share them without copying vertex data.

pub mod primitives;

use glam::{Affine3A, Vec2, Vec3};
use rustc_hash::FxHashMap;
use uuid::Uuid;

/// Element layout of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::Float32x2 => 8,
            Self::Float32x3 => 12,
            Self::Float32x4 => 16,
        }
    }
}

/// One planar (non-interleaved) vertex attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub data: Vec<u8>,
    pub format: VertexFormat,
    pub count: u32,
    pub stride: u64,
}

impl Attribute {
    pub fn new_planar<T: bytemuck::Pod>(data: &[T], format: VertexFormat) -> Self {
        Self {
            data: bytemuck::cast_slice(data).to_vec(),
            format,
            count: data.len() as u32,
            stride: std::mem::size_of::<T>() as u64,
        }
    }

    /// Reads element `i` as `T`. `None` when out of range or the layout does not fit.
    pub fn read<T: bytemuck::Pod>(&self, i: u32) -> Option<T> {
        let size = std::mem::size_of::<T>();
        let start = i as usize * self.stride as usize;
        let bytes = self.data.get(start..start + size)?;
        bytemuck::try_pod_read_unaligned(bytes).ok()
    }

    #[must_use]
    pub fn read_vec2(&self, i: u32) -> Option<Vec2> {
        self.read::<[f32; 2]>(i).map(Vec2::from_array)
    }

    #[must_use]
    pub fn read_vec3(&self, i: u32) -> Option<Vec3> {
        if self.format == VertexFormat::Float32x2 {
            return None;
        }
        self.read::<[f32; 3]>(i).map(Vec3::from_array)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Bounds of this box after `matrix`, computed from its eight corners.
    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = matrix.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    /// Bounds of a point set. `None` for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |b, p| Self {
            min: b.min.min(p),
            max: b.max.max(p),
        }))
    }
}

/// Index range drawn with one material slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryGroup {
    pub start: u32,
    pub count: u32,
    pub material_index: usize,
}

#[derive(Debug, Clone)]
pub struct Geometry {
    pub uuid: Uuid,
    attributes: FxHashMap<String, Attribute>,
    indices: Vec<u32>,
    groups: Vec<GeometryGroup>,
    bounding_box: Option<BoundingBox>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            attributes: FxHashMap::default(),
            indices: Vec::new(),
            groups: Vec::new(),
            bounding_box: None,
        }
    }

    pub fn set_attribute(&mut self, name: &str, attr: Attribute) {
        self.attributes.insert(name.to_string(), attr);
    }

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    #[must_use]
    pub fn attributes(&self) -> &FxHashMap<String, Attribute> {
        &self.attributes
    }

    pub fn set_indices(&mut self, indices: &[u32]) {
        self.indices = indices.to_vec();
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn add_group(&mut self, start: u32, count: u32, material_index: usize) {
        self.groups.push(GeometryGroup {
            start,
            count,
            material_index,
        });
    }

    #[must_use]
    pub fn groups(&self) -> &[GeometryGroup] {
        &self.groups
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.attributes.get("position").map_or(0, |a| a.count)
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }

    pub fn compute_bounding_volume(&mut self) {
        let Some(positions) = self.attributes.get("position") else {
            return;
        };
        self.bounding_box =
            BoundingBox::from_points((0..positions.count).filter_map(|i| positions.read_vec3(i)));
    }

    /// Assembles a geometry from position / normal / uv streams and indices.
    pub(crate) fn from_buffers(
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        uvs: &[[f32; 2]],
        indices: &[u32],
    ) -> Self {
        let mut geo = Self::new();
        geo.set_attribute(
            "position",
            Attribute::new_planar(positions, VertexFormat::Float32x3),
        );
        geo.set_attribute(
            "normal",
            Attribute::new_planar(normals, VertexFormat::Float32x3),
        );
        if !uvs.is_empty() {
            geo.set_attribute("uv", Attribute::new_planar(uvs, VertexFormat::Float32x2));
        }
        geo.set_indices(indices);
        geo.compute_bounding_volume();
        geo
    }
}
