use std::f32::consts::TAU;

use glam::Vec3;

use crate::geometry::Geometry;

pub struct CylinderOptions {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub height_segments: u32,
    pub open_ended: bool,
    pub theta_start: f32,
    pub theta_length: f32,
}

impl Default for CylinderOptions {
    fn default() -> Self {
        Self {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: 32,
            height_segments: 1,
            open_ended: false,
            theta_start: 0.0,
            theta_length: TAU,
        }
    }
}

#[derive(Default)]
struct Buffers {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

/// Cylinder (or truncated cone) along Y, centred on the origin.
///
/// Material groups: 0 = lateral surface, 1 = top cap, 2 = bottom cap.
/// Caps exist only when the cylinder is closed and the radius is non-zero.
#[must_use]
pub fn create_cylinder(options: CylinderOptions) -> Geometry {
    let radial = options.radial_segments.max(3);
    let stacks = options.height_segments.max(1);
    let half_height = options.height / 2.0;

    let mut buf = Buffers::default();
    let mut groups = Vec::with_capacity(3);

    // Lateral surface
    let slope = if options.height.abs() > f32::EPSILON {
        (options.radius_bottom - options.radius_top) / options.height
    } else {
        0.0
    };
    let stride = radial + 1;
    for y in 0..=stacks {
        let v = y as f32 / stacks as f32;
        let radius = v * (options.radius_bottom - options.radius_top) + options.radius_top;
        for x in 0..=radial {
            let u = x as f32 / radial as f32;
            let theta = options.theta_start + u * options.theta_length;
            let (sin, cos) = theta.sin_cos();

            buf.positions
                .push([radius * sin, -v * options.height + half_height, radius * cos]);
            buf.normals
                .push(Vec3::new(sin, slope, cos).normalize_or_zero().to_array());
            buf.uvs.push([u, 1.0 - v]);
        }
    }
    for x in 0..radial {
        for y in 0..stacks {
            let a = y * stride + x;
            let b = (y + 1) * stride + x;
            let c = (y + 1) * stride + x + 1;
            let d = y * stride + x + 1;
            if options.radius_top > 0.0 || y != 0 {
                buf.indices.extend_from_slice(&[a, b, d]);
            }
            if options.radius_bottom > 0.0 || y != stacks - 1 {
                buf.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    groups.push((0, buf.indices.len() as u32, 0));

    if !options.open_ended {
        if options.radius_top > 0.0 {
            let start = buf.indices.len() as u32;
            build_cap(&mut buf, &options, radial, true);
            groups.push((start, buf.indices.len() as u32 - start, 1));
        }
        if options.radius_bottom > 0.0 {
            let start = buf.indices.len() as u32;
            build_cap(&mut buf, &options, radial, false);
            groups.push((start, buf.indices.len() as u32 - start, 2));
        }
    }

    let mut geo = Geometry::from_buffers(&buf.positions, &buf.normals, &buf.uvs, &buf.indices);
    for (start, count, material_index) in groups {
        geo.add_group(start, count, material_index);
    }
    geo
}

fn build_cap(buf: &mut Buffers, options: &CylinderOptions, radial: u32, top: bool) {
    let radius = if top {
        options.radius_top
    } else {
        options.radius_bottom
    };
    let sign = if top { 1.0 } else { -1.0 };
    let y = options.height / 2.0 * sign;

    // one centre vertex per segment keeps the uv fan seamless
    let center_start = buf.positions.len() as u32;
    for _ in 0..radial {
        buf.positions.push([0.0, y, 0.0]);
        buf.normals.push([0.0, sign, 0.0]);
        buf.uvs.push([0.5, 0.5]);
    }
    let rim_start = buf.positions.len() as u32;

    for x in 0..=radial {
        let u = x as f32 / radial as f32;
        let theta = options.theta_start + u * options.theta_length;
        let (sin, cos) = theta.sin_cos();
        buf.positions.push([radius * sin, y, radius * cos]);
        buf.normals.push([0.0, sign, 0.0]);
        buf.uvs.push([cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5]);
    }

    for x in 0..radial {
        let c = center_start + x;
        let i = rim_start + x;
        if top {
            buf.indices.extend_from_slice(&[i, i + 1, c]);
        } else {
            buf.indices.extend_from_slice(&[i + 1, i, c]);
        }
    }
}
