use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use smallvec::{SmallVec, smallvec};

use crate::data::{MAX_PRIMITIVE_VERTICES, PrimitiveDef, PrimitiveParams};
use crate::errors::{Result, YasfError};
use crate::geometry::Geometry;
use crate::geometry::primitives::{
    BoxOptions, CylinderOptions, NurbsSurface, PlaneOptions, PolygonOptions, SphereOptions,
    create_box, create_cylinder, create_nurbs, create_plane, create_polygon, create_sphere,
    create_triangle, triangle::triangle_extent,
};

/// Geometry of one primitive plus the face extents its material instances
/// are sized by, one per geometry group.
pub struct Shape {
    pub geometry: Geometry,
    pub faces: SmallVec<[Vec2; 6]>,
    /// Translation applied on the mesh transform.
    pub offset: Vec3,
}

impl Shape {
    fn single(geometry: Geometry, face: Vec2) -> Self {
        Self {
            geometry,
            faces: smallvec![face],
            offset: Vec3::ZERO,
        }
    }
}

pub fn build_shape(primitive: &PrimitiveDef) -> Result<Shape> {
    // definitions built by hand never went through the loader's check
    if primitive.params.vertex_estimate() > MAX_PRIMITIVE_VERTICES {
        return Err(YasfError::structural(&primitive.id, "too many segments"));
    }

    let shape = match &primitive.params {
        PrimitiveParams::Rectangle(p) => {
            let size = (p.xy2 - p.xy1).abs();
            let geometry = create_plane(PlaneOptions {
                width: size.x,
                height: size.y,
                width_segments: p.parts_x,
                height_segments: p.parts_y,
            });
            let mid = (p.xy1 + p.xy2) * 0.5;
            Shape {
                offset: mid.extend(0.0),
                ..Shape::single(geometry, size)
            }
        }

        PrimitiveParams::Triangle(p) => {
            let (w, h) = triangle_extent(p.xyz1, p.xyz2, p.xyz3);
            Shape::single(create_triangle(p.xyz1, p.xyz2, p.xyz3), Vec2::new(w, h))
        }

        PrimitiveParams::Box(p) => {
            let size = (p.xyz2 - p.xyz1).abs();
            let geometry = create_box(BoxOptions {
                width: size.x,
                height: size.y,
                depth: size.z,
                width_segments: p.parts[0],
                height_segments: p.parts[1],
                depth_segments: p.parts[2],
            });
            let (w, h, d) = (size.x, size.y, size.z);
            Shape {
                geometry,
                // +X, -X, +Y, -Y, +Z, -Z
                faces: smallvec![
                    Vec2::new(d, h),
                    Vec2::new(d, h),
                    Vec2::new(w, d),
                    Vec2::new(w, d),
                    Vec2::new(w, h),
                    Vec2::new(w, h),
                ],
                offset: (p.xyz1 + p.xyz2) * 0.5,
            }
        }

        PrimitiveParams::Cylinder(p) => {
            let geometry = create_cylinder(CylinderOptions {
                radius_top: p.top,
                radius_bottom: p.base,
                height: p.height,
                radial_segments: p.slices,
                height_segments: p.stacks,
                open_ended: !p.caps_closed,
                theta_start: p.theta_start,
                theta_length: p.theta_length,
            });
            Shape {
                geometry,
                faces: smallvec![
                    Vec2::new(PI * (p.top + p.base), p.height),
                    Vec2::splat(2.0 * p.top),
                    Vec2::splat(2.0 * p.base),
                ],
                offset: Vec3::ZERO,
            }
        }

        PrimitiveParams::Sphere(p) => {
            let geometry = create_sphere(SphereOptions {
                radius: p.radius,
                width_segments: p.slices,
                height_segments: p.stacks,
                phi_start: p.phi_start,
                phi_length: p.phi_length,
                theta_start: p.theta_start,
                theta_length: p.theta_length,
            });
            Shape::single(geometry, Vec2::splat(TAU * p.radius))
        }

        PrimitiveParams::Nurbs(p) => {
            let count_u = p.degree_u as usize + 1;
            let count_v = p.degree_v as usize + 1;
            let surface = NurbsSurface::new(p.degree_u, p.degree_v, count_u, count_v, &p.control_points)
                .ok_or_else(|| {
                    YasfError::structural(
                        &primitive.id,
                        format!("control grid must be {count_u}x{count_v} points"),
                    )
                })?;

            let (min, max) = p.control_points.iter().fold(
                (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
                |(lo, hi), &pt| (lo.min(pt), hi.max(pt)),
            );
            let extent = (max - min).truncate();
            Shape::single(create_nurbs(&surface, p.parts_u, p.parts_v), extent)
        }

        PrimitiveParams::Polygon(p) => {
            let geometry = create_polygon(PolygonOptions {
                radius: p.radius,
                stacks: p.stacks,
                slices: p.slices,
                color_center: p.color_c,
                color_rim: p.color_p,
            });
            Shape::single(geometry, Vec2::splat(2.0 * p.radius))
        }
    };
    Ok(shape)
}
