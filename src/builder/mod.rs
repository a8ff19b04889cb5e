//! 对象构建器
//!
//! Turns a loaded [`SceneData`] into a [`RenderGraph`]. All caches live in a
//! per-call [`BuildContext`]; two builds never share state.
//!
//! Graph entries reachable through more than one parent are built once and
//! deep-cloned for every further reference: geometry and material
//! descriptors are shared through `Arc`, names are moved under the new
//! parent path. A clone keeps the materials and shadow flags resolved on
//! its first build.

pub mod naming;
pub mod primitive;

use std::sync::Arc;

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use crate::data::{DEFAULT_MATERIAL, LodDef, NodeChild, NodeDef, PrimitiveDef, PrimitiveParams, SceneData};
use crate::errors::{ReferenceKind, Result, YasfError};
use crate::graph::{
    Environment, LodLevel, MaterialDescriptor, MaterialInstance, Mesh, RenderCamera, RenderChild,
    RenderGraph, RenderLight, RenderLod, RenderNode, ShadowFlags, TextureBinding, Transform,
};

/// Builder configuration.
///
/// ```json
/// { "default_material_color": [1.0, 1.0, 1.0], "texture_repeat_min": 1.0 }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Colour of the reserved `defaultMaterial`.
    pub default_material_color: Vec3,
    /// Texture repeat used when a face size or tile length is degenerate.
    pub texture_repeat_min: f32,
    /// Aspect ratio given to cameras until the viewer sets its own.
    pub camera_aspect: f32,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            default_material_color: Vec3::ONE,
            texture_repeat_min: 1.0,
            camera_aspect: 1.0,
        }
    }
}

/// Builds render graphs from loaded documents.
#[derive(Debug, Clone, Default)]
pub struct ObjectBuilder {
    settings: BuildSettings,
}

impl ObjectBuilder {
    #[must_use]
    pub fn new(settings: BuildSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Builds the scene rooted at the document's root id.
    ///
    /// Either the whole graph is built or an error is returned.
    pub fn build(&self, data: &SceneData) -> Result<RenderGraph> {
        let root_id = data
            .root_id()
            .ok_or_else(|| YasfError::structural("graph", "no root node"))?;

        let mut ctx = BuildContext::new(data, &self.settings, root_id);
        let mut container = RenderNode::new(root_id, root_id);

        let top = ctx.open(root_id, &container, &[], ShadowFlags::empty(), 0.0)?;
        let mut stack = vec![top];

        while let Some(frame) = stack.last_mut() {
            match ctx.advance(frame)? {
                Step::Attach(child) => frame.attach(child, 0.0),
                Step::Enter { id, min_distance } => {
                    if let Some(instance) = ctx.instantiate(id, frame.object.name()) {
                        frame.attach(instance, min_distance);
                    } else {
                        let child = ctx.open_under(id, frame, min_distance)?;
                        stack.push(child);
                    }
                }
                Step::Finish => {
                    let Some(done) = stack.pop() else { break };
                    let (object, min_distance) = ctx.finish(done);
                    match stack.last_mut() {
                        Some(parent) => parent.attach(object, min_distance),
                        None => container.children.push(object),
                    }
                }
            }
        }

        let (cameras, active) = self.cameras(data);
        let environment = Environment::from(data.globals());
        let BuildContext {
            textures,
            material_order,
            ..
        } = ctx;

        log::info!(
            "built scene '{root_id}': {} materials, {} cameras",
            material_order.len(),
            cameras.len()
        );

        Ok(RenderGraph::new(
            container,
            cameras,
            active,
            environment,
            material_order,
            textures,
            self.settings.texture_repeat_min,
        ))
    }

    fn cameras(&self, data: &SceneData) -> (Vec<RenderCamera>, usize) {
        let mut cameras: Vec<RenderCamera> = data
            .cameras()
            .iter()
            .map(|def| {
                let mut cam = RenderCamera::from_def(def);
                cam.set_aspect(self.settings.camera_aspect);
                cam
            })
            .collect();

        if cameras.is_empty() {
            log::debug!("no cameras declared, using the default camera");
            let mut cam = RenderCamera::fallback();
            cam.set_aspect(self.settings.camera_aspect);
            cameras.push(cam);
        }

        let active = data
            .active_camera_id()
            .and_then(|id| cameras.iter().position(|c| c.name == id))
            .unwrap_or(0);
        (cameras, active)
    }
}

// ============================================================================
// Build context
// ============================================================================

#[derive(Clone, Copy)]
enum Entry<'a> {
    Node(&'a NodeDef),
    Lod(&'a LodDef),
}

impl<'a> Entry<'a> {
    fn id(self) -> &'a str {
        match self {
            Self::Node(n) => &n.id,
            Self::Lod(l) => &l.id,
        }
    }
}

/// A node or LOD whose children are still being built.
struct Frame<'a> {
    entry: Entry<'a>,
    object: RenderChild,
    cursor: usize,
    /// Effective material list handed to children.
    materials: &'a [String],
    shadows: ShadowFlags,
    /// Threshold when the parent is a LOD.
    min_distance: f32,
    /// Path prefix of the parent, for renaming clones.
    parent_prefix: String,
}

impl Frame<'_> {
    fn attach(&mut self, child: RenderChild, min_distance: f32) {
        match &mut self.object {
            RenderChild::Group(node) => node.children.push(child),
            RenderChild::Lod(lod) => lod.levels.push(LodLevel {
                min_distance,
                object: child,
            }),
            RenderChild::Primitive(_) | RenderChild::Light(_) => {}
        }
    }
}

enum Step<'a> {
    Attach(RenderChild),
    Enter { id: &'a str, min_distance: f32 },
    Finish,
}

struct Built {
    object: RenderChild,
    prefix: String,
}

/// State of one [`ObjectBuilder::build`] call.
struct BuildContext<'a> {
    data: &'a SceneData,
    settings: &'a BuildSettings,
    root_id: &'a str,

    textures: FxHashMap<String, Arc<TextureBinding>>,
    materials: FxHashMap<String, Arc<MaterialDescriptor>>,
    material_order: Vec<Arc<MaterialDescriptor>>,

    /// Entries with more than one parent.
    shared: FxHashSet<&'a str>,
    built: FxHashMap<&'a str, Built>,
}

impl<'a> BuildContext<'a> {
    fn new(data: &'a SceneData, settings: &'a BuildSettings, root_id: &'a str) -> Self {
        let textures = data
            .textures()
            .iter()
            .map(|def| (def.id.clone(), Arc::new(TextureBinding::from(def))))
            .collect();

        let mut parents: FxHashMap<&'a str, usize> = FxHashMap::default();
        let references = data
            .nodes()
            .iter()
            .flat_map(NodeDef::references)
            .chain(data.lods().iter().flat_map(|l| l.levels().map(|lv| lv.node_id)));
        for id in references {
            *parents.entry(id).or_default() += 1;
        }
        let shared = parents
            .into_iter()
            .filter(|&(_, n)| n > 1)
            .map(|(id, _)| id)
            .collect();

        Self {
            data,
            settings,
            root_id,
            textures,
            materials: FxHashMap::default(),
            material_order: Vec::new(),
            shared,
            built: FxHashMap::default(),
        }
    }

    /// Opens graph entry `id` under `parent`.
    fn open(
        &self,
        id: &'a str,
        parent: &RenderNode,
        inherited: &'a [String],
        shadows: ShadowFlags,
        min_distance: f32,
    ) -> Result<Frame<'a>> {
        self.open_named(id, &parent.name, &parent.source_id, inherited, shadows, min_distance)
    }

    fn open_under(&self, id: &'a str, parent: &Frame<'a>, min_distance: f32) -> Result<Frame<'a>> {
        let source = parent.entry.id();
        self.open_named(
            id,
            parent.object.name(),
            source,
            parent.materials,
            parent.shadows,
            min_distance,
        )
    }

    fn open_named(
        &self,
        id: &'a str,
        parent_name: &str,
        parent_source: &str,
        inherited: &'a [String],
        shadows: ShadowFlags,
        min_distance: f32,
    ) -> Result<Frame<'a>> {
        let parent_prefix = naming::path_prefix(parent_name);

        if let Some(def) = self.data.node(id) {
            let materials: &'a [String] = if def.material_ids.is_empty() {
                inherited
            } else {
                &def.material_ids
            };

            let mut shadows = shadows;
            if def.cast_shadows {
                shadows |= ShadowFlags::CAST;
            }
            if def.receive_shadows {
                shadows |= ShadowFlags::RECEIVE;
            }

            let mut node = RenderNode::new(naming::node_name(parent_name, id, false, self.root_id), id);
            node.transformations.clone_from(&def.transformations);
            node.transform.apply_local_matrix(def.local_matrix());
            node.material_id = materials
                .first()
                .map_or_else(|| DEFAULT_MATERIAL.to_string(), String::clone);
            node.shadows = shadows;
            node.custom.clone_from(&def.custom);

            return Ok(Frame {
                entry: Entry::Node(def),
                object: RenderChild::Group(node),
                cursor: 0,
                materials,
                shadows,
                min_distance,
                parent_prefix,
            });
        }

        if let Some(def) = self.data.lod(id) {
            let lod = RenderLod {
                name: naming::node_name(parent_name, id, true, self.root_id),
                source_id: id.to_string(),
                levels: Vec::with_capacity(def.levels.len()),
                custom: def.custom.clone(),
            };
            return Ok(Frame {
                entry: Entry::Lod(def),
                object: RenderChild::Lod(lod),
                cursor: 0,
                materials: inherited,
                shadows,
                min_distance,
                parent_prefix,
            });
        }

        Err(YasfError::reference(ReferenceKind::Node, id, parent_source))
    }

    fn advance(&mut self, frame: &mut Frame<'a>) -> Result<Step<'a>> {
        let cursor = frame.cursor;
        frame.cursor += 1;

        match frame.entry {
            Entry::Node(def) => {
                let Some(child) = def.children.get(cursor) else {
                    return Ok(Step::Finish);
                };
                match child {
                    NodeChild::Primitive(primitive) => {
                        let mesh = self.build_mesh(primitive, frame)?;
                        Ok(Step::Attach(RenderChild::Primitive(mesh)))
                    }
                    NodeChild::Light(light_id) => {
                        let light = self.data.light(light_id).ok_or_else(|| {
                            YasfError::structural(&def.id, format!("light '{light_id}' was never registered"))
                        })?;
                        let name = naming::light_name(frame.object.name(), light_id);
                        Ok(Step::Attach(RenderChild::Light(RenderLight::from_def(light, name))))
                    }
                    NodeChild::Reference(id) => Ok(Step::Enter {
                        id,
                        min_distance: 0.0,
                    }),
                }
            }
            Entry::Lod(def) => Ok(def.levels.get(cursor).map_or(Step::Finish, |(id, distance)| {
                Step::Enter {
                    id,
                    min_distance: *distance,
                }
            })),
        }
    }

    fn finish(&mut self, frame: Frame<'a>) -> (RenderChild, f32) {
        let Frame {
            entry,
            mut object,
            min_distance,
            parent_prefix,
            ..
        } = frame;

        if let RenderChild::Lod(lod) = &mut object {
            lod.sort_levels();
        }

        let id = entry.id();
        if self.shared.contains(id) {
            self.built.insert(
                id,
                Built {
                    object: object.clone(),
                    prefix: parent_prefix,
                },
            );
        }
        (object, min_distance)
    }

    /// Clones an already built shared entry under `parent_name`.
    fn instantiate(&self, id: &str, parent_name: &str) -> Option<RenderChild> {
        let built = self.built.get(id)?;
        let new_prefix = naming::path_prefix(parent_name);
        let mut object = built.object.clone();
        object.visit_mut(|o| naming::rebase(o.name_mut(), &built.prefix, &new_prefix));
        log::debug!("instanced '{id}' as '{}'", object.name());
        Some(object)
    }

    // ========================================================================
    // Leaves
    // ========================================================================

    fn build_mesh(&mut self, def: &PrimitiveDef, frame: &Frame<'a>) -> Result<Mesh> {
        let shape = primitive::build_shape(def)?;
        let kind = def.kind();

        let descriptor = if matches!(def.params, PrimitiveParams::Polygon(_)) {
            Arc::new(MaterialDescriptor::vertex_colors(format!("{}_polygon", def.id)))
        } else {
            let id = frame.materials.first().map_or(DEFAULT_MATERIAL, String::as_str);
            self.material(id, frame.entry.id())?
        };

        let floor = self.settings.texture_repeat_min;
        let materials = shape
            .faces
            .iter()
            .map(|&face| MaterialInstance::sized(descriptor.clone(), face, floor))
            .collect();

        Ok(Mesh {
            name: naming::primitive_name(frame.object.name(), &def.id, kind.as_str()),
            source_id: def.id.clone(),
            kind,
            geometry: Arc::new(shape.geometry),
            materials,
            transform: Transform::from_translation(shape.offset),
            shadows: frame.shadows,
            custom: def.custom.clone(),
        })
    }

    /// Descriptor for material `id`, derived on first use.
    fn material(&mut self, id: &str, from: &str) -> Result<Arc<MaterialDescriptor>> {
        if let Some(found) = self.materials.get(id) {
            return Ok(found.clone());
        }

        let descriptor = if id == DEFAULT_MATERIAL {
            MaterialDescriptor::default_material(self.settings.default_material_color)
        } else {
            let def = self
                .data
                .material(id)
                .ok_or_else(|| YasfError::reference(ReferenceKind::Material, id, from))?;
            let textures = &self.textures;
            MaterialDescriptor::from_def(def, |tex| textures.get(tex).cloned())?
        };

        let descriptor = Arc::new(descriptor);
        log::debug!("material '{id}' derived");
        self.materials.insert(id.to_string(), descriptor.clone());
        self.material_order.push(descriptor.clone());
        Ok(descriptor)
    }
}
