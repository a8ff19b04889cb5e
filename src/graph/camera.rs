use glam::{Mat4, Vec3};
use uuid::Uuid;

use crate::data::{CameraDef, CameraProjection};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

/// Orthographic frustum extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

#[derive(Debug, Clone)]
pub struct RenderCamera {
    pub uuid: Uuid,
    pub name: String,

    // === Projection ===
    pub projection_type: ProjectionType,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub ortho: OrthoBounds,

    // === View ===
    pub position: Vec3,
    pub target: Vec3,

    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
}

impl RenderCamera {
    /// `fov` is given in degrees.
    #[must_use]
    pub fn new_perspective(name: &str, fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            projection_type: ProjectionType::Perspective,
            fov: fov.to_radians(),
            aspect,
            near,
            far,
            ortho: OrthoBounds {
                left: -1.0,
                right: 1.0,
                bottom: -1.0,
                top: 1.0,
            },
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    #[must_use]
    pub fn new_orthographic(name: &str, ortho: OrthoBounds, near: f32, far: f32) -> Self {
        let mut cam = Self::new_perspective(name, 60.0, 1.0, near, far);
        cam.projection_type = ProjectionType::Orthographic;
        cam.ortho = ortho;
        cam.update_projection_matrix();
        cam
    }

    /// Camera used when a document declares none.
    #[must_use]
    pub fn fallback() -> Self {
        let mut cam = Self::new_perspective("Default", 60.0, 1.0, 0.1, 1000.0);
        cam.look_at(Vec3::new(-15.0, 10.0, 15.0), Vec3::ZERO);
        cam
    }

    #[must_use]
    pub fn from_def(def: &CameraDef) -> Self {
        let mut cam = match def.projection {
            CameraProjection::Perspective { angle } => {
                Self::new_perspective(&def.id, angle, 1.0, def.near, def.far)
            }
            CameraProjection::Orthogonal {
                left,
                right,
                bottom,
                top,
            } => Self::new_orthographic(
                &def.id,
                OrthoBounds {
                    left,
                    right,
                    bottom,
                    top,
                },
                def.near,
                def.far,
            ),
        };
        cam.look_at(def.location, def.target);
        cam
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection_type {
            ProjectionType::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
            }
            ProjectionType::Orthographic => Mat4::orthographic_rh(
                self.ortho.left,
                self.ortho.right,
                self.ortho.bottom,
                self.ortho.top,
                self.near,
                self.far,
            ),
        };
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    /// Places the camera at `position` looking at `target`, +Y up.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
        let up = if (target - position).normalize_or_zero().abs().y > 0.999 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        self.view_matrix = Mat4::look_at_rh(position, target, up);
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }
}
