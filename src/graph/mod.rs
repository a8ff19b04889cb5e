//! 渲染图模块
//!
//! 构建器的输出，一棵拥有所有权的对象树：
//! - RenderNode: 分组节点（变换、阴影标记、子对象）
//! - Mesh: 图元网格（共享几何体 + 按面尺寸计算的材质实例）
//! - RenderLod: 按距离切换的细节层级
//! - RenderLight / RenderCamera / Environment
//!
//! Consumers either walk the tree directly or implement [`SceneObserver`]
//! and call [`RenderGraph::publish`].

pub mod camera;
pub mod environment;
pub mod light;
pub mod material;
pub mod transform;

use std::sync::Arc;

use bitflags::bitflags;
use glam::Affine3A;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

pub use camera::{OrthoBounds, ProjectionType, RenderCamera};
pub use environment::{Environment, SkyboxFaces};
pub use light::{DirectionalLight, LightKind, PointLight, RenderLight, ShadowBounds, ShadowConfig, SpotLight};
pub use material::{MaterialDescriptor, MaterialInstance, MaterialKind, MipmapMode, Side, TextureBinding};
pub use transform::Transform;

use crate::data::{Extras, MaterialDef, Transformation};
use crate::errors::Result;
use crate::geometry::Geometry;
use crate::schema::PrimitiveKind;

bitflags! {
    /// Shadow participation, OR-ed down the tree.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShadowFlags: u8 {
        const CAST    = 1 << 0;
        const RECEIVE = 1 << 1;
    }
}

// ============================================================================
// Objects
// ============================================================================

/// A primitive turned into renderable geometry.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub source_id: String,
    pub kind: PrimitiveKind,
    pub geometry: Arc<Geometry>,
    /// One instance per geometry group (six for a box, three for a
    /// cylinder), otherwise one.
    pub materials: SmallVec<[MaterialInstance; 1]>,
    pub transform: Transform,
    pub shadows: ShadowFlags,
    pub custom: Extras,
}

impl Mesh {
    #[must_use]
    pub fn material(&self) -> Option<&MaterialInstance> {
        self.materials.first()
    }
}

#[derive(Debug, Clone)]
pub struct RenderNode {
    pub name: String,
    pub source_id: String,
    /// The declared list, kept for editors. Already folded into `transform`.
    pub transformations: Vec<Transformation>,
    pub transform: Transform,
    /// Effective material after inheritance.
    pub material_id: String,
    pub shadows: ShadowFlags,
    pub children: Vec<RenderChild>,
    pub custom: Extras,
}

impl RenderNode {
    #[must_use]
    pub fn new(name: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_id: source_id.into(),
            transformations: Vec::new(),
            transform: Transform::new(),
            material_id: crate::data::DEFAULT_MATERIAL.to_string(),
            shadows: ShadowFlags::empty(),
            children: Vec::new(),
            custom: Extras::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LodLevel {
    pub min_distance: f32,
    pub object: RenderChild,
}

#[derive(Debug, Clone)]
pub struct RenderLod {
    pub name: String,
    pub source_id: String,
    /// Ascending by `min_distance`.
    pub levels: Vec<LodLevel>,
    pub custom: Extras,
}

impl RenderLod {
    /// Stable sort, so equal distances keep declaration order.
    pub fn sort_levels(&mut self) {
        self.levels
            .sort_by(|a, b| a.min_distance.total_cmp(&b.min_distance));
    }

    /// Level shown at `distance`: the last one whose threshold has been
    /// reached, or the nearest level when none has.
    #[must_use]
    pub fn level_for_distance(&self, distance: f32) -> Option<&LodLevel> {
        self.levels
            .iter()
            .rev()
            .find(|level| level.min_distance <= distance)
            .or_else(|| self.levels.first())
    }
}

#[derive(Debug, Clone)]
pub enum RenderChild {
    Primitive(Mesh),
    Light(RenderLight),
    Group(RenderNode),
    Lod(RenderLod),
}

impl RenderChild {
    #[must_use]
    pub fn name(&self) -> &str {
        self.as_object().name()
    }

    #[must_use]
    pub fn as_object(&self) -> ObjectRef<'_> {
        match self {
            Self::Primitive(mesh) => ObjectRef::Mesh(mesh),
            Self::Light(light) => ObjectRef::Light(light),
            Self::Group(node) => ObjectRef::Node(node),
            Self::Lod(lod) => ObjectRef::Lod(lod),
        }
    }

    pub(crate) fn name_mut(&mut self) -> &mut String {
        match self {
            Self::Primitive(mesh) => &mut mesh.name,
            Self::Light(light) => &mut light.name,
            Self::Group(node) => &mut node.name,
            Self::Lod(lod) => &mut lod.name,
        }
    }

    /// Pre-order mutable visit of this object and everything below it.
    pub fn visit_mut(&mut self, mut f: impl FnMut(&mut RenderChild)) {
        let mut stack: Vec<&mut RenderChild> = vec![self];
        while let Some(child) = stack.pop() {
            f(&mut *child);
            match child {
                Self::Group(node) => stack.extend(node.children.iter_mut().rev()),
                Self::Lod(lod) => stack.extend(lod.levels.iter_mut().rev().map(|l| &mut l.object)),
                Self::Primitive(_) | Self::Light(_) => {}
            }
        }
    }
}

/// Borrowed view of any object in the tree.
#[derive(Debug, Clone, Copy)]
pub enum ObjectRef<'a> {
    Node(&'a RenderNode),
    Mesh(&'a Mesh),
    Light(&'a RenderLight),
    Lod(&'a RenderLod),
}

impl<'a> ObjectRef<'a> {
    #[must_use]
    pub fn name(self) -> &'a str {
        match self {
            Self::Node(n) => &n.name,
            Self::Mesh(m) => &m.name,
            Self::Light(l) => &l.name,
            Self::Lod(l) => &l.name,
        }
    }

    #[must_use]
    pub fn source_id(self) -> &'a str {
        match self {
            Self::Node(n) => &n.source_id,
            Self::Mesh(m) => &m.source_id,
            Self::Light(l) => &l.source_id,
            Self::Lod(l) => &l.source_id,
        }
    }

    /// Local transform relative to the parent object.
    #[must_use]
    pub fn local_matrix(self) -> Affine3A {
        match self {
            Self::Node(n) => *n.transform.local_matrix(),
            Self::Mesh(m) => *m.transform.local_matrix(),
            Self::Light(l) => Affine3A::from_translation(l.position),
            Self::Lod(_) => Affine3A::IDENTITY,
        }
    }

    fn push_children(self, stack: &mut Vec<(ObjectRef<'a>, usize)>, depth: usize) {
        match self {
            Self::Node(n) => stack.extend(n.children.iter().rev().map(|c| (c.as_object(), depth + 1))),
            Self::Lod(l) => stack.extend(l.levels.iter().rev().map(|lv| (lv.object.as_object(), depth + 1))),
            Self::Mesh(_) | Self::Light(_) => {}
        }
    }
}

/// Depth-first, declaration-order iterator yielding `(object, depth)`.
pub struct Objects<'a> {
    stack: Vec<(ObjectRef<'a>, usize)>,
}

impl<'a> Iterator for Objects<'a> {
    type Item = (ObjectRef<'a>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (object, depth) = self.stack.pop()?;
        object.push_children(&mut self.stack, depth);
        Some((object, depth))
    }
}

/// Receives the built scene. Implemented by renderers and editors.
pub trait SceneObserver {
    fn add_object(&mut self, object: ObjectRef<'_>);

    fn add_light(&mut self, light: &RenderLight);

    fn update_material(&mut self, _name: &str, _material: &MaterialDescriptor) {}
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Debug, Clone)]
pub struct RenderGraph {
    /// Container named after the document's root id; the root node or LOD
    /// is its only child.
    pub root: RenderNode,
    pub cameras: Vec<RenderCamera>,
    active_camera: usize,
    pub environment: Environment,

    materials: Vec<Arc<MaterialDescriptor>>,
    textures: FxHashMap<String, Arc<TextureBinding>>,
    repeat_floor: f32,
}

impl RenderGraph {
    /// `cameras` must not be empty; the builder inserts the fallback camera.
    pub(crate) fn new(
        root: RenderNode,
        cameras: Vec<RenderCamera>,
        active_camera: usize,
        environment: Environment,
        materials: Vec<Arc<MaterialDescriptor>>,
        textures: FxHashMap<String, Arc<TextureBinding>>,
        repeat_floor: f32,
    ) -> Self {
        Self {
            root,
            cameras,
            active_camera,
            environment,
            materials,
            textures,
            repeat_floor,
        }
    }

    // ========================================================================
    // Cameras / materials
    // ========================================================================

    #[must_use]
    pub fn active_camera(&self) -> &RenderCamera {
        &self.cameras[self.active_camera]
    }

    /// Switches the active camera. Returns `false` for an unknown name.
    pub fn set_active_camera(&mut self, name: &str) -> bool {
        match self.cameras.iter().position(|c| c.name == name) {
            Some(i) => {
                self.active_camera = i;
                true
            }
            None => false,
        }
    }

    /// Material descriptors in first-use order.
    #[must_use]
    pub fn materials(&self) -> &[Arc<MaterialDescriptor>] {
        &self.materials
    }

    #[must_use]
    pub fn material(&self, name: &str) -> Option<&Arc<MaterialDescriptor>> {
        self.materials.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn texture(&self, id: &str) -> Option<&Arc<TextureBinding>> {
        self.textures.get(id)
    }

    /// Re-derives material `name` from `def` and swaps it into every mesh
    /// face that uses it. Returns the number of faces updated.
    pub fn update_material(&mut self, name: &str, def: &MaterialDef) -> Result<usize> {
        let mut descriptor = MaterialDescriptor::from_def(def, |id| self.textures.get(id).cloned())?;
        descriptor.name = name.to_string();
        let descriptor = Arc::new(descriptor);

        match self.materials.iter_mut().find(|m| m.name == name) {
            Some(slot) => *slot = descriptor.clone(),
            None => self.materials.push(descriptor.clone()),
        }

        let floor = self.repeat_floor;
        let mut updated = 0;
        for child in &mut self.root.children {
            child.visit_mut(|object| {
                if let RenderChild::Primitive(mesh) = object {
                    for instance in mesh.materials.iter_mut().filter(|i| i.name() == name) {
                        *instance = instance.resized_with(descriptor.clone(), floor);
                        updated += 1;
                    }
                }
            });
        }
        log::debug!("material '{name}' updated on {updated} faces");
        Ok(updated)
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Every object, root container included, depth-first.
    #[must_use]
    pub fn objects(&self) -> Objects<'_> {
        Objects {
            stack: vec![(ObjectRef::Node(&self.root), 0)],
        }
    }

    pub fn walk<'a>(&'a self, mut visit: impl FnMut(ObjectRef<'a>, usize)) {
        for (object, depth) in self.objects() {
            visit(object, depth);
        }
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<ObjectRef<'_>> {
        self.objects().map(|(o, _)| o).find(|o| o.name() == name)
    }

    #[must_use]
    pub fn object_names(&self) -> Vec<&str> {
        self.objects().map(|(o, _)| o.name()).collect()
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.objects()
            .filter(|(o, _)| matches!(o, ObjectRef::Mesh(_)))
            .count()
    }

    #[must_use]
    pub fn light_count(&self) -> usize {
        self.objects()
            .filter(|(o, _)| matches!(o, ObjectRef::Light(_)))
            .count()
    }

    /// Number of nodes / LODs built from graph entry `id`. Shared entries
    /// count once per instance.
    #[must_use]
    pub fn count_source(&self, id: &str) -> usize {
        self.objects()
            .filter(|(o, _)| matches!(o, ObjectRef::Node(_) | ObjectRef::Lod(_)))
            .filter(|(o, _)| o.source_id() == id)
            .count()
    }

    /// Feeds every object, light and material to `observer`.
    pub fn publish(&self, observer: &mut impl SceneObserver) {
        for (object, _) in self.objects() {
            match object {
                ObjectRef::Light(light) => observer.add_light(light),
                other => observer.add_object(other),
            }
        }
        for material in &self.materials {
            observer.update_material(&material.name, material);
        }
    }

    /// World matrices of all objects, keyed by name.
    ///
    /// LOD levels all inherit the LOD's parent matrix.
    #[must_use]
    pub fn world_transforms(&self) -> FxHashMap<String, Affine3A> {
        let mut out = FxHashMap::default();
        let mut stack = vec![(ObjectRef::Node(&self.root), Affine3A::IDENTITY)];

        while let Some((object, parent)) = stack.pop() {
            let world = parent * object.local_matrix();
            out.insert(object.name().to_string(), world);

            // 子节点继承当前世界矩阵
            match object {
                ObjectRef::Node(n) => stack.extend(n.children.iter().map(|c| (c.as_object(), world))),
                ObjectRef::Lod(l) => stack.extend(l.levels.iter().map(|lv| (lv.object.as_object(), world))),
                ObjectRef::Mesh(_) | ObjectRef::Light(_) => {}
            }
        }
        out
    }
}
