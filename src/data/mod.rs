//! Parsed-document store.
//!
//! [`SceneData`] is the value the loader produces: ordered, id-indexed
//! collections per category plus the flat node and LOD tables of the
//! graph. Ids are unique within a category; different categories are
//! separate namespaces.

pub mod entities;

use rustc_hash::FxHashMap;

use crate::errors::{Category, Result, YasfError};

pub use entities::{
    CameraDef, CameraProjection, Extras, Globals, LightDef, LightDefKind, LoadState, LodDef,
    LodLevelDef, MAX_PRIMITIVE_VERTICES, MaterialDef, NodeChild, NodeDef, PrimitiveDef,
    PrimitiveParams, TextureDef, Transformation,
};

/// Reserved material id used when no ancestor declares a material.
pub const DEFAULT_MATERIAL: &str = "defaultMaterial";

/// Insertion-ordered collection indexed by string id.
#[derive(Debug, Clone)]
pub struct IdMap<T> {
    items: Vec<T>,
    index: FxHashMap<String, usize>,
}

impl<T> Default for IdMap<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T> IdMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item` under `id`. Hands the item back if the id is taken.
    pub fn try_insert(&mut self, id: &str, item: T) -> std::result::Result<&mut T, T> {
        if self.index.contains_key(id) {
            return Err(item);
        }
        let slot = self.items.len();
        self.items.push(item);
        self.index.insert(id.to_string(), slot);
        Ok(&mut self.items[slot])
    }

    /// Returns the entry for `id`, creating it with `make` if absent.
    pub fn get_or_insert_with(&mut self, id: &str, make: impl FnOnce() -> T) -> &mut T {
        let slot = match self.index.get(id) {
            Some(&slot) => slot,
            None => {
                let slot = self.items.len();
                self.items.push(make());
                self.index.insert(id.to_string(), slot);
                slot
            }
        };
        &mut self.items[slot]
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.index.get(id).map(|&i| &mut self.items[i])
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a IdMap<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The parsed document.
#[derive(Debug, Clone, Default)]
pub struct SceneData {
    globals: Globals,
    textures: IdMap<TextureDef>,
    materials: IdMap<MaterialDef>,
    cameras: IdMap<CameraDef>,
    lights: IdMap<LightDef>,
    nodes: IdMap<NodeDef>,
    lods: IdMap<LodDef>,
    root_id: Option<String>,
    active_camera_id: Option<String>,
}

impl SceneData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Append with uniqueness checks
    // ========================================================================

    pub fn add_texture(&mut self, texture: TextureDef) -> Result<()> {
        let id = texture.id.clone();
        Self::insert_unique(&mut self.textures, Category::Texture, &id, texture)
    }

    pub fn add_material(&mut self, material: MaterialDef) -> Result<()> {
        let id = material.id.clone();
        Self::insert_unique(&mut self.materials, Category::Material, &id, material)
    }

    pub fn add_camera(&mut self, camera: CameraDef) -> Result<()> {
        let id = camera.id.clone();
        Self::insert_unique(&mut self.cameras, Category::Camera, &id, camera)
    }

    pub fn add_light(&mut self, light: LightDef) -> Result<()> {
        let id = light.id.clone();
        Self::insert_unique(&mut self.lights, Category::Light, &id, light)
    }

    fn insert_unique<T>(map: &mut IdMap<T>, category: Category, id: &str, item: T) -> Result<()> {
        match map.try_insert(id, item) {
            Ok(_) => {
                log::debug!("registered {category} '{id}'");
                Ok(())
            }
            Err(_) => Err(YasfError::DuplicateId {
                category,
                id: id.to_string(),
            }),
        }
    }

    // ========================================================================
    // Lazily created graph entries
    // ========================================================================

    /// Returns the node `id`, creating an empty `Unvisited` one if absent.
    pub fn create_node_if_absent(&mut self, id: &str) -> &mut NodeDef {
        self.nodes.get_or_insert_with(id, || NodeDef::new(id))
    }

    /// Returns the LOD `id`, creating an empty `Unvisited` one if absent.
    pub fn create_lod_if_absent(&mut self, id: &str) -> &mut LodDef {
        self.lods.get_or_insert_with(id, || LodDef::new(id))
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut NodeDef> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn lod_mut(&mut self, id: &str) -> Option<&mut LodDef> {
        self.lods.get_mut(id)
    }

    pub fn set_globals(&mut self, globals: Globals) {
        self.globals = globals;
    }

    pub fn set_root_id(&mut self, id: impl Into<String>) {
        self.root_id = Some(id.into());
    }

    pub fn set_active_camera_id(&mut self, id: impl Into<String>) {
        self.active_camera_id = Some(id.into());
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    #[must_use]
    pub fn texture(&self, id: &str) -> Option<&TextureDef> {
        self.textures.get(id)
    }

    #[must_use]
    pub fn material(&self, id: &str) -> Option<&MaterialDef> {
        self.materials.get(id)
    }

    #[must_use]
    pub fn camera(&self, id: &str) -> Option<&CameraDef> {
        self.cameras.get(id)
    }

    #[must_use]
    pub fn light(&self, id: &str) -> Option<&LightDef> {
        self.lights.get(id)
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&NodeDef> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn lod(&self, id: &str) -> Option<&LodDef> {
        self.lods.get(id)
    }

    #[must_use]
    pub fn textures(&self) -> &IdMap<TextureDef> {
        &self.textures
    }

    #[must_use]
    pub fn materials(&self) -> &IdMap<MaterialDef> {
        &self.materials
    }

    #[must_use]
    pub fn cameras(&self) -> &IdMap<CameraDef> {
        &self.cameras
    }

    #[must_use]
    pub fn lights(&self) -> &IdMap<LightDef> {
        &self.lights
    }

    #[must_use]
    pub fn nodes(&self) -> &IdMap<NodeDef> {
        &self.nodes
    }

    #[must_use]
    pub fn lods(&self) -> &IdMap<LodDef> {
        &self.lods
    }

    #[must_use]
    pub fn root_id(&self) -> Option<&str> {
        self.root_id.as_deref()
    }

    #[must_use]
    pub fn active_camera_id(&self) -> Option<&str> {
        self.active_camera_id.as_deref()
    }

    #[must_use]
    pub fn active_camera(&self) -> Option<&CameraDef> {
        self.active_camera_id.as_deref().and_then(|id| self.camera(id))
    }

    /// True when `id` names a node or a LOD in the graph table.
    #[must_use]
    pub fn has_graph_entry(&self, id: &str) -> bool {
        self.nodes.contains(id) || self.lods.contains(id)
    }
}
