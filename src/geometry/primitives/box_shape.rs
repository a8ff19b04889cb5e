use crate::geometry::Geometry;

pub struct BoxOptions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub depth_segments: u32,
}

impl Default for BoxOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            width_segments: 1,
            height_segments: 1,
            depth_segments: 1,
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

/// Axis-aligned box centred on the origin.
///
/// Faces are emitted as six material groups in the order
/// +X, -X, +Y, -Y, +Z, -Z (group `i` uses material slot `i`).
#[must_use]
pub fn create_box(options: BoxOptions) -> Geometry {
    let BoxOptions {
        width: w,
        height: h,
        depth: d,
        ..
    } = options;
    let ws = options.width_segments.max(1);
    let hs = options.height_segments.max(1);
    let ds = options.depth_segments.max(1);

    let mut buf = Buffers::default();
    let mut groups = Vec::with_capacity(6);

    // (u axis, v axis, w axis, u dir, v dir, face width, face height, face depth, grid u, grid v)
    let faces: [(usize, usize, usize, f32, f32, f32, f32, f32, u32, u32); 6] = [
        (2, 1, 0, -1.0, -1.0, d, h, w, ds, hs),
        (2, 1, 0, 1.0, -1.0, d, h, -w, ds, hs),
        (0, 2, 1, 1.0, 1.0, w, d, h, ws, ds),
        (0, 2, 1, 1.0, -1.0, w, d, -h, ws, ds),
        (0, 1, 2, 1.0, -1.0, w, h, d, ws, hs),
        (0, 1, 2, -1.0, -1.0, w, h, -d, ws, hs),
    ];

    for (material_index, &(u, v, axis, udir, vdir, fw, fh, fd, gx, gy)) in faces.iter().enumerate() {
        let start = buf.indices.len() as u32;
        build_face(&mut buf, [u, v, axis], udir, vdir, fw, fh, fd, gx, gy);
        groups.push((start, buf.indices.len() as u32 - start, material_index));
    }

    let mut geo = Geometry::from_buffers(&buf.positions, &buf.normals, &buf.uvs, &buf.indices);
    for (start, count, material_index) in groups {
        geo.add_group(start, count, material_index);
    }
    geo
}

fn build_face(
    buf: &mut Buffers,
    [u, v, w]: [usize; 3],
    udir: f32,
    vdir: f32,
    width: f32,
    height: f32,
    depth: f32,
    grid_x: u32,
    grid_y: u32,
) {
    let segment_width = width / grid_x as f32;
    let segment_height = height / grid_y as f32;
    let width_half = width / 2.0;
    let height_half = height / 2.0;
    let depth_half = depth / 2.0;
    let grid_x1 = grid_x + 1;
    let base = buf.positions.len() as u32;

    for iy in 0..=grid_y {
        let y = iy as f32 * segment_height - height_half;
        for ix in 0..=grid_x {
            let x = ix as f32 * segment_width - width_half;

            let mut position = [0.0; 3];
            position[u] = x * udir;
            position[v] = y * vdir;
            position[w] = depth_half;
            buf.positions.push(position);

            let mut normal = [0.0; 3];
            normal[w] = if depth > 0.0 { 1.0 } else { -1.0 };
            buf.normals.push(normal);

            buf.uvs
                .push([ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32]);
        }
    }

    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = base + ix + grid_x1 * iy;
            let b = base + ix + grid_x1 * (iy + 1);
            let c = base + (ix + 1) + grid_x1 * (iy + 1);
            let d = base + (ix + 1) + grid_x1 * iy;
            buf.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
}
