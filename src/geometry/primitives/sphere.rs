use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::geometry::Geometry;

/// `phi` sweeps around the Y axis, `theta` runs from the north pole (0) to
/// the south pole (π).
pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub phi_start: f32,
    pub phi_length: f32,
    pub theta_start: f32,
    pub theta_length: f32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
            phi_start: 0.0,
            phi_length: TAU,
            theta_start: 0.0,
            theta_length: PI,
        }
    }
}

#[must_use]
pub fn create_sphere(options: SphereOptions) -> Geometry {
    let radius = options.radius;
    let width_segments = options.width_segments.max(3);
    let height_segments = options.height_segments.max(2);

    // theta never wraps past the south pole
    let theta_start = options.theta_start.clamp(0.0, PI);
    let theta_end = (theta_start + options.theta_length).min(PI);
    let theta_length = theta_end - theta_start;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    let stride = width_segments + 1;
    for y in 0..=height_segments {
        let v_ratio = y as f32 / height_segments as f32;
        let theta = theta_start + v_ratio * theta_length;

        for x in 0..=width_segments {
            let u_ratio = x as f32 / width_segments as f32;
            let phi = options.phi_start + u_ratio * options.phi_length;

            let p = Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );
            positions.push(p.to_array());
            normals.push(p.normalize_or_zero().to_array());
            uvs.push([u_ratio, 1.0 - v_ratio]);
        }
    }

    // Each grid cell is two triangles; the ones collapsed onto a pole are skipped.
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * stride + x + 1;
            let b = y * stride + x;
            let c = (y + 1) * stride + x;
            let d = (y + 1) * stride + x + 1;

            if y != 0 || theta_start > 0.0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if y != height_segments - 1 || theta_end < PI {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Geometry::from_buffers(&positions, &normals, &uvs, &indices)
}
