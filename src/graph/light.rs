use glam::Vec3;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::data::{LightDef, LightDefKind};

/// Orthographic extents of a directional light's shadow camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowConfig {
    pub bias: f32,
    pub normal_bias: f32,
    pub map_size: u32,
    pub far: f32,
    /// Only set for directional lights.
    pub bounds: Option<ShadowBounds>,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            bias: 0.005,
            normal_bias: 0.02,
            map_size: 512,
            far: 500.0,
            bounds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Point the light shines towards.
    pub target: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub distance: f32,
    pub decay: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    pub target: Vec3,
    /// Cone half-angle in radians.
    pub angle: f32,
    pub penumbra: f32,
    pub distance: f32,
    pub decay: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

#[derive(Debug, Clone)]
pub struct RenderLight {
    pub uuid: Uuid,
    pub name: String,
    pub source_id: String,
    pub color: Vec3,
    pub intensity: f32,
    pub enabled: bool,
    pub position: Vec3,
    pub kind: LightKind,

    pub cast_shadows: bool,
    pub shadow: ShadowConfig,
    pub custom: Map<String, Value>,
}

impl RenderLight {
    #[must_use]
    pub fn from_def(def: &LightDef, name: String) -> Self {
        let mut shadow = ShadowConfig {
            map_size: def.shadow_map_size,
            far: def.shadow_far,
            ..Default::default()
        };

        let kind = match def.kind {
            LightDefKind::Point { distance, decay } => LightKind::Point(PointLight { distance, decay }),
            LightDefKind::Spot {
                target,
                angle,
                distance,
                decay,
                penumbra,
            } => LightKind::Spot(SpotLight {
                target,
                angle: angle.to_radians(),
                penumbra,
                distance,
                decay,
            }),
            LightDefKind::Directional {
                shadow_left,
                shadow_right,
                shadow_bottom,
                shadow_top,
            } => {
                shadow.bounds = Some(ShadowBounds {
                    left: shadow_left,
                    right: shadow_right,
                    bottom: shadow_bottom,
                    top: shadow_top,
                });
                LightKind::Directional(DirectionalLight { target: Vec3::ZERO })
            }
        };

        Self {
            uuid: Uuid::new_v4(),
            name,
            source_id: def.id.clone(),
            color: def.color,
            intensity: def.intensity,
            enabled: def.enabled,
            position: def.position,
            kind,
            cast_shadows: def.cast_shadow,
            shadow,
            custom: def.custom.clone(),
        }
    }

    /// Direction the light points in, if it has one.
    #[must_use]
    pub fn direction(&self) -> Option<Vec3> {
        let target = match &self.kind {
            LightKind::Directional(d) => d.target,
            LightKind::Spot(s) => s.target,
            LightKind::Point(_) => return None,
        };
        Some((target - self.position).normalize_or_zero())
    }
}
