use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::data::{DEFAULT_MATERIAL, Extras, MaterialDef, TextureDef};
use crate::errors::{ReferenceKind, Result, YasfError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Lit Phong surface.
    Phong,
    /// Unlit surface coloured by the `color` vertex attribute.
    BasicVertexColor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MipmapMode {
    /// Renderer generates the chain.
    Generate,
    /// Explicit level images, level 0 first.
    Explicit(Vec<String>),
    /// Video frames are never mipmapped.
    Disabled,
}

/// A texture source ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureBinding {
    pub id: String,
    pub filepath: String,
    pub is_video: bool,
    pub mipmaps: MipmapMode,
}

impl From<&TextureDef> for TextureBinding {
    fn from(def: &TextureDef) -> Self {
        let mipmaps = if def.is_video {
            MipmapMode::Disabled
        } else if def.mipmaps.is_empty() {
            MipmapMode::Generate
        } else {
            MipmapMode::Explicit(def.mipmaps.clone())
        };
        Self {
            id: def.id.clone(),
            filepath: def.filepath.clone(),
            is_video: def.is_video,
            mipmaps,
        }
    }
}

/// Immutable material state shared by every mesh face that uses it.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    pub name: String,
    pub kind: MaterialKind,

    pub color: Vec3,
    pub specular: Vec3,
    pub emissive: Vec3,
    pub shininess: f32,
    pub transparent: bool,
    pub opacity: f32,
    pub wireframe: bool,
    pub flat_shading: bool,
    pub side: Side,
    pub shadow_side: Side,

    pub texture: Option<Arc<TextureBinding>>,
    /// World-space size covered by one texture tile.
    pub texlength: Vec2,
    pub bump_map: Option<Arc<TextureBinding>>,
    pub bump_scale: f32,
    pub specular_map: Option<Arc<TextureBinding>>,
    pub specular_scale: f32,

    pub custom: Extras,
}

impl MaterialDescriptor {
    /// White Phong material used when no ancestor names one.
    #[must_use]
    pub fn default_material(color: Vec3) -> Self {
        Self {
            name: DEFAULT_MATERIAL.to_string(),
            kind: MaterialKind::Phong,
            color,
            specular: Vec3::ZERO,
            emissive: Vec3::ZERO,
            shininess: 30.0,
            transparent: false,
            opacity: 1.0,
            wireframe: false,
            flat_shading: false,
            side: Side::Front,
            shadow_side: Side::Back,
            texture: None,
            texlength: Vec2::ONE,
            bump_map: None,
            bump_scale: 1.0,
            specular_map: None,
            specular_scale: 1.0,
            custom: Extras::new(),
        }
    }

    #[must_use]
    pub fn vertex_colors(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::BasicVertexColor,
            side: Side::Double,
            ..Self::default_material(Vec3::ONE)
        }
    }

    /// Derives a descriptor from `def`, resolving texture ids with `lookup`.
    pub fn from_def(
        def: &MaterialDef,
        mut lookup: impl FnMut(&str) -> Option<Arc<TextureBinding>>,
    ) -> Result<Self> {
        let mut resolve = |id: Option<&str>| -> Result<Option<Arc<TextureBinding>>> {
            match id {
                None => Ok(None),
                Some(id) => lookup(id)
                    .map(Some)
                    .ok_or_else(|| YasfError::reference(ReferenceKind::Texture, id, &def.id)),
            }
        };

        Ok(Self {
            name: def.id.clone(),
            kind: MaterialKind::Phong,
            color: def.color,
            specular: def.specular,
            emissive: def.emissive,
            shininess: def.shininess,
            transparent: def.transparent,
            opacity: def.opacity,
            wireframe: def.wireframe,
            flat_shading: def.flat_shading,
            side: if def.two_sided { Side::Double } else { Side::Front },
            shadow_side: Side::Back,
            texture: resolve(def.texture.as_deref())?,
            texlength: def.texlength,
            bump_map: resolve(def.bump.as_deref())?,
            bump_scale: def.bump_scale,
            specular_map: resolve(def.specular_map.as_deref())?,
            specular_scale: def.specular_scale,
            custom: def.custom.clone(),
        })
    }

    #[must_use]
    pub fn has_maps(&self) -> bool {
        self.texture.is_some() || self.bump_map.is_some() || self.specular_map.is_some()
    }
}

/// A descriptor applied to one face group, with texture tiling computed
/// from the face size.
#[derive(Debug, Clone)]
pub struct MaterialInstance {
    pub descriptor: Arc<MaterialDescriptor>,
    /// Face extent the instance was sized for.
    pub size: Vec2,
    /// Repeat applied to the colour, bump and specular maps alike.
    pub texture_repeat: Vec2,
}

impl MaterialInstance {
    #[must_use]
    pub fn sized(descriptor: Arc<MaterialDescriptor>, size: Vec2, repeat_floor: f32) -> Self {
        let tile = |extent: f32, length: f32| {
            let r = extent / length;
            if r.is_finite() && r != 0.0 { r } else { repeat_floor }
        };
        let texture_repeat = Vec2::new(
            tile(size.x, descriptor.texlength.x),
            tile(size.y, descriptor.texlength.y),
        );
        Self {
            descriptor,
            size,
            texture_repeat,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Same face size, new descriptor.
    #[must_use]
    pub fn resized_with(&self, descriptor: Arc<MaterialDescriptor>, repeat_floor: f32) -> Self {
        Self::sized(descriptor, self.size, repeat_floor)
    }
}
