use glam::Vec3;

use crate::data::Globals;
use crate::schema::{Fog, Skybox};

/// Six-sided skybox ready for a cube-map loader.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyboxFaces {
    pub size: Vec3,
    pub center: Vec3,
    pub emissive: Vec3,
    pub emissive_intensity: f32,
    /// Order: right, left, up, down, front, back.
    pub faces: [String; 6],
}

impl From<&Skybox> for SkyboxFaces {
    fn from(sky: &Skybox) -> Self {
        Self {
            size: sky.size,
            center: sky.center,
            emissive: sky.emissive,
            emissive_intensity: sky.intensity / 10.0,
            faces: sky.cube_faces().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub background: Vec3,
    pub ambient: Vec3,
    pub fog: Option<Fog>,
    pub skybox: Option<SkyboxFaces>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            background: Vec3::ZERO,
            ambient: Vec3::ZERO,
            fog: None,
            skybox: None,
        }
    }
}

impl From<&Globals> for Environment {
    fn from(globals: &Globals) -> Self {
        Self {
            background: globals.background,
            ambient: globals.ambient,
            fog: globals.fog,
            skybox: globals.skybox.as_ref().map(SkyboxFaces::from),
        }
    }
}
