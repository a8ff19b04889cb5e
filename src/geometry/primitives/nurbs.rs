use glam::{Vec3, Vec4};
use smallvec::SmallVec;

use crate::geometry::Geometry;

type Basis = SmallVec<[f32; 8]>;

/// Rational B-spline surface with clamped uniform knot vectors.
#[derive(Debug, Clone)]
pub struct NurbsSurface {
    degree_u: usize,
    degree_v: usize,
    knots_u: Vec<f32>,
    knots_v: Vec<f32>,
    /// `points[u][v]`, homogeneous (`w` is the weight).
    points: Vec<Vec<Vec4>>,
}

impl NurbsSurface {
    /// Builds a surface from a row-major grid with `count_u` rows of
    /// `count_v` points, every weight 1. `None` if the grid is too small
    /// for the requested degrees.
    #[must_use]
    pub fn new(degree_u: u32, degree_v: u32, count_u: usize, count_v: usize, points: &[Vec3]) -> Option<Self> {
        let (degree_u, degree_v) = (degree_u as usize, degree_v as usize);
        if count_u <= degree_u || count_v <= degree_v || points.len() != count_u * count_v {
            return None;
        }
        let rows = points
            .chunks(count_v)
            .map(|row| row.iter().map(|p| p.extend(1.0)).collect())
            .collect();
        Some(Self {
            degree_u,
            degree_v,
            knots_u: clamped_knots(degree_u, count_u),
            knots_v: clamped_knots(degree_v, count_v),
            points: rows,
        })
    }

    #[must_use]
    pub fn knots_u(&self) -> &[f32] {
        &self.knots_u
    }

    #[must_use]
    pub fn knots_v(&self) -> &[f32] {
        &self.knots_v
    }

    /// Surface point at normalized parameters `u, v ∈ [0, 1]`.
    #[must_use]
    pub fn point(&self, u: f32, v: f32) -> Vec3 {
        let u = lerp_domain(&self.knots_u, self.degree_u, u);
        let v = lerp_domain(&self.knots_v, self.degree_v, v);

        let span_u = find_span(self.degree_u, u, &self.knots_u);
        let span_v = find_span(self.degree_v, v, &self.knots_v);
        let nu = basis_functions(span_u, u, self.degree_u, &self.knots_u);
        let nv = basis_functions(span_v, v, self.degree_v, &self.knots_v);

        let mut acc = Vec4::ZERO;
        for (l, bv) in nv.iter().enumerate() {
            let col = span_v - self.degree_v + l;
            let mut row_sum = Vec4::ZERO;
            for (k, bu) in nu.iter().enumerate() {
                row_sum += self.points[span_u - self.degree_u + k][col] * *bu;
            }
            acc += row_sum * *bv;
        }

        if acc.w.abs() > f32::EPSILON {
            acc.truncate() / acc.w
        } else {
            acc.truncate()
        }
    }
}

/// `degree + 1` zeros, evenly spaced interior knots, `degree + 1` ones.
#[must_use]
pub fn clamped_knots(degree: usize, count: usize) -> Vec<f32> {
    let interior = count.saturating_sub(degree + 1);
    let mut knots = Vec::with_capacity(count + degree + 1);
    knots.extend(std::iter::repeat_n(0.0, degree + 1));
    knots.extend((1..=interior).map(|i| i as f32 / (interior + 1) as f32));
    knots.extend(std::iter::repeat_n(1.0, degree + 1));
    knots
}

fn lerp_domain(knots: &[f32], degree: usize, t: f32) -> f32 {
    let lo = knots[degree];
    let hi = knots[knots.len() - degree - 1];
    lo + (hi - lo) * t.clamp(0.0, 1.0)
}

fn find_span(degree: usize, u: f32, knots: &[f32]) -> usize {
    let n = knots.len() - degree - 2;
    if u >= knots[n + 1] {
        return n;
    }
    if u <= knots[degree] {
        return degree;
    }
    let (mut low, mut high) = (degree, n + 1);
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

fn basis_functions(span: usize, u: f32, degree: usize, knots: &[f32]) -> Basis {
    let mut n: Basis = SmallVec::from_elem(0.0, degree + 1);
    let mut left: Basis = SmallVec::from_elem(0.0, degree + 1);
    let mut right: Basis = SmallVec::from_elem(0.0, degree + 1);
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom.abs() > f32::EPSILON { n[r] / denom } else { 0.0 };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

/// Samples `surface` on a `parts_u × parts_v` grid.
#[must_use]
pub fn create_nurbs(surface: &NurbsSurface, parts_u: u32, parts_v: u32) -> Geometry {
    const EPS: f32 = 1e-4;

    let slices = parts_u.max(1);
    let stacks = parts_v.max(1);
    let stride = slices + 1;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();

    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        for j in 0..=slices {
            let u = j as f32 / slices as f32;
            let p = surface.point(u, v);

            let du = if u + EPS <= 1.0 {
                surface.point(u + EPS, v) - p
            } else {
                p - surface.point(u - EPS, v)
            };
            let dv = if v + EPS <= 1.0 {
                surface.point(u, v + EPS) - p
            } else {
                p - surface.point(u, v - EPS)
            };

            positions.push(p.to_array());
            normals.push(du.cross(dv).normalize_or_zero().to_array());
            uvs.push([u, v]);
        }
    }

    let mut indices = Vec::with_capacity((slices * stacks * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * stride + j;
            let b = i * stride + j + 1;
            let c = (i + 1) * stride + j + 1;
            let d = (i + 1) * stride + j;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Geometry::from_buffers(&positions, &normals, &uvs, &indices)
}
