use glam::Vec3;

use crate::geometry::Geometry;

/// Single flat triangle through three points.
///
/// The third UV is placed at `(cos α, sin α)` where α is the angle at the
/// first vertex, so texture space keeps the triangle's shape.
#[must_use]
pub fn create_triangle(p1: Vec3, p2: Vec3, p3: Vec3) -> Geometry {
    let normal = (p2 - p1).cross(p3 - p1).normalize_or_zero();

    let a = p1.distance(p2);
    let b = p2.distance(p3);
    let c = p1.distance(p3);
    let denom = 2.0 * a * c;
    let cos_ac = if denom > f32::EPSILON {
        ((a * a - b * b + c * c) / denom).clamp(-1.0, 1.0)
    } else {
        1.0
    };
    let sin_ac = (1.0 - cos_ac * cos_ac).sqrt();

    let n = normal.to_array();
    Geometry::from_buffers(
        &[p1.to_array(), p2.to_array(), p3.to_array()],
        &[n, n, n],
        &[[0.0, 0.0], [1.0, 0.0], [cos_ac, sin_ac]],
        &[0, 1, 2],
    )
}

/// Width and height used to size a triangle's material: the first edge and
/// the height over it (Heron's formula).
#[must_use]
pub fn triangle_extent(p1: Vec3, p2: Vec3, p3: Vec3) -> (f32, f32) {
    let a = p1.distance(p2);
    let b = p2.distance(p3);
    let c = p3.distance(p1);
    let s = 0.5 * (a + b + c);
    let area = (s * (s - a) * (s - b) * (s - c)).max(0.0).sqrt();
    let height = if a > f32::EPSILON { 2.0 * area / a } else { 0.0 };
    (a, height)
}
