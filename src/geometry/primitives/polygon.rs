use std::f32::consts::TAU;

use glam::Vec3;

use crate::geometry::{Attribute, Geometry, VertexFormat};

pub struct PolygonOptions {
    pub radius: f32,
    pub stacks: u32,
    pub slices: u32,
    /// Vertex colour at the centre.
    pub color_center: Vec3,
    /// Vertex colour on the rim.
    pub color_rim: Vec3,
}

impl Default for PolygonOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            stacks: 1,
            slices: 6,
            color_center: Vec3::ONE,
            color_rim: Vec3::ONE,
        }
    }
}

/// Flat regular polygon in the XY plane made of concentric rings.
///
/// Ring `k` of `stacks` sits at radius `k / stacks * radius` and its
/// vertices carry `lerp(color_center, color_rim, k / stacks)` in a `color`
/// attribute.
#[must_use]
pub fn create_polygon(options: PolygonOptions) -> Geometry {
    let stacks = options.stacks.max(1);
    let slices = options.slices.max(3);

    let mut positions = vec![[0.0, 0.0, 0.0]];
    let mut colors = vec![options.color_center.to_array()];

    for slice in 0..slices {
        let theta = TAU * slice as f32 / slices as f32;
        let (sin, cos) = theta.sin_cos();
        for stack in 1..=stacks {
            let t = stack as f32 / stacks as f32;
            let r = t * options.radius;
            positions.push([r * cos, r * sin, 0.0]);
            colors.push(options.color_center.lerp(options.color_rim, t).to_array());
        }
    }

    // vertex of ring `stack` (1-based) on spoke `slice`
    let vertex = |slice: u32, stack: u32| 1 + (slice % slices) * stacks + (stack - 1);

    let mut indices = Vec::with_capacity((slices * (2 * stacks - 1) * 3) as usize);
    for slice in 0..slices {
        let next = slice + 1;
        indices.extend_from_slice(&[0, vertex(slice, 1), vertex(next, 1)]);
        for stack in 2..=stacks {
            let a = vertex(slice, stack - 1);
            let b = vertex(slice, stack);
            let c = vertex(next, stack);
            let d = vertex(next, stack - 1);
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    let normals = vec![[0.0, 0.0, 1.0]; positions.len()];
    let mut geo = Geometry::from_buffers(&positions, &normals, &[], &indices);
    geo.set_attribute("color", Attribute::new_planar(&colors, VertexFormat::Float32x3));
    geo
}
