//! Document loader.
//!
//! [`SceneLoader`] parses a YASF document into a [`SceneData`] in a fixed
//! order: globals, textures, materials, cameras, then the node graph.
//!
//! # Graph traversal
//!
//! The graph is walked with an explicit stack of `Enter` / `Exit` frames
//! instead of recursion. Each node or LOD definition moves through
//! `Unvisited → Visiting → Loaded`:
//!
//! - `Enter` on a `Loaded` definition is a no-op, so diamond-shaped
//!   sharing is parsed once.
//! - `Enter` on a `Visiting` definition means the node is an ancestor of
//!   itself, which is reported as [`YasfError::Cycle`].
//! - `Exit` marks the definition `Loaded` once all its children are done.
//!
//! Any failure aborts the whole load.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::data::entities::{Globals, LightDef, LodDef, NodeChild, PrimitiveDef, Transformation};
use crate::data::{CameraDef, DEFAULT_MATERIAL, LoadState, MaterialDef, SceneData, TextureDef};
use crate::errors::{ReferenceKind, Result, YasfError};
use crate::schema::registry::{self, LOD_LEVEL, MATERIAL_REF, TRANSFORM};
use crate::schema::{CUSTOM_KEY, CameraType, ChildKind, decode};

const ROOT_ID_KEY: &str = "rootid";
const ACTIVE_CAMERA_KEY: &str = "initial";
const NODES_LIST_KEY: &str = "nodesList";
const LODS_LIST_KEY: &str = "lodsList";

const DOCUMENT_KEYS: &[&str] = &["globals", "textures", "materials", "cameras", "graph"];
const NODE_KEYS: &[&str] = &[
    "type",
    "transforms",
    "castshadows",
    "receiveshadows",
    "materialref",
    "children",
];
const LOD_KEYS: &[&str] = &["type", "lodNodes"];

/// Loader configuration.
///
/// # Example
///
/// ```rust,ignore
/// use yasf::{LoaderSettings, SceneLoader};
///
/// let loader = SceneLoader::new(LoaderSettings {
///     validate_unreachable: false,
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Key wrapping the document body. When the top-level object has no
    /// such key the object itself is treated as the body.
    pub root_key: String,

    /// Parse and validate graph entries that the root never reaches.
    ///
    /// They are still excluded from the built scene; a warning is logged
    /// for each one.
    pub validate_unreachable: bool,

    /// Longest chain of nested nodes accepted before the document is
    /// rejected as malformed.
    pub max_graph_depth: usize,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            root_key: "yasf".to_string(),
            validate_unreachable: true,
            max_graph_depth: 4096,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GraphKind {
    Node,
    Lod,
}

enum Frame<'a> {
    Enter { id: &'a str, from: &'a str },
    Exit { id: &'a str, kind: GraphKind },
}

/// Parses YASF documents into [`SceneData`].
#[derive(Debug, Clone, Default)]
pub struct SceneLoader {
    settings: LoaderSettings,
}

impl SceneLoader {
    #[must_use]
    pub fn new(settings: LoaderSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    pub fn load_str(&self, text: &str) -> Result<SceneData> {
        let document: Value = serde_json::from_str(text)?;
        self.load(&document)
    }

    pub fn load_slice(&self, bytes: &[u8]) -> Result<SceneData> {
        let document: Value = serde_json::from_slice(bytes)?;
        self.load(&document)
    }

    /// Parses a whole document. Nothing is returned unless every stage succeeds.
    pub fn load(&self, document: &Value) -> Result<SceneData> {
        let root_key = self.settings.root_key.as_str();
        let body = document.get(root_key).unwrap_or(document);
        let body = object(root_key, root_key, body)?;

        for key in body.keys() {
            if key != CUSTOM_KEY && !DOCUMENT_KEYS.contains(&key.as_str()) {
                return Err(YasfError::unknown_attribute(root_key, key));
            }
        }

        let graph = body
            .get("graph")
            .ok_or_else(|| YasfError::structural(root_key, "missing 'graph' block"))?;

        let mut data = SceneData::new();

        if let Some(globals) = body.get("globals") {
            data.set_globals(Globals::from_record(decode("globals", globals, registry::GLOBALS)?)?);
        }
        self.load_textures(body.get("textures"), &mut data)?;
        self.load_materials(body.get("materials"), &mut data)?;
        self.load_cameras(body.get("cameras"), &mut data)?;
        self.load_graph(graph, &mut data)?;

        validate_references(&data)?;

        log::info!(
            "Loaded scene: {} textures, {} materials, {} cameras, {} lights, {} nodes, {} LODs",
            data.textures().len(),
            data.materials().len(),
            data.cameras().len(),
            data.lights().len(),
            data.nodes().len(),
            data.lods().len(),
        );

        Ok(data)
    }

    // ========================================================================
    // Flat collections
    // ========================================================================

    fn load_textures(&self, block: Option<&Value>, data: &mut SceneData) -> Result<()> {
        let Some(block) = block else { return Ok(()) };
        for (id, element) in entries(&self.settings.root_key, "textures", block)? {
            let texture = TextureDef::from_record(decode(id, element, registry::TEXTURE)?)?;
            data.add_texture(texture)?;
        }
        Ok(())
    }

    fn load_materials(&self, block: Option<&Value>, data: &mut SceneData) -> Result<()> {
        let Some(block) = block else { return Ok(()) };
        for (id, element) in entries(&self.settings.root_key, "materials", block)? {
            let material = MaterialDef::from_record(decode(id, element, registry::MATERIAL)?)?;
            data.add_material(material)?;
        }
        Ok(())
    }

    fn load_cameras(&self, block: Option<&Value>, data: &mut SceneData) -> Result<()> {
        let Some(block) = block else { return Ok(()) };
        for (id, element) in entries(&self.settings.root_key, "cameras", block)? {
            if id == ACTIVE_CAMERA_KEY {
                let active = element
                    .as_str()
                    .ok_or_else(|| YasfError::mismatch("cameras", ACTIVE_CAMERA_KEY, "a string"))?;
                data.set_active_camera_id(active);
                continue;
            }

            let type_name = type_of(id, element)?;
            let kind = CameraType::from_type(type_name).ok_or_else(|| {
                YasfError::structural(id, format!("unrecognized camera type '{type_name}'"))
            })?;
            let camera = CameraDef::from_record(kind, decode(id, element, kind.descriptors())?)?;
            data.add_camera(camera)?;
        }
        Ok(())
    }

    // ========================================================================
    // Graph
    // ========================================================================

    fn load_graph(&self, graph: &Value, data: &mut SceneData) -> Result<()> {
        let table = object(&self.settings.root_key, "graph", graph)?;

        let root_id = table
            .get(ROOT_ID_KEY)
            .ok_or_else(|| YasfError::structural("graph", "missing 'rootid'"))?
            .as_str()
            .ok_or_else(|| YasfError::mismatch("graph", ROOT_ID_KEY, "a string"))?;
        data.set_root_id(root_id);

        self.traverse(table, root_id, "graph", data)?;

        for id in table.keys().filter(|k| k.as_str() != ROOT_ID_KEY) {
            if data.has_graph_entry(id) {
                continue;
            }
            if self.settings.validate_unreachable {
                log::warn!("Graph entry '{id}' is not reachable from root '{root_id}'");
                self.traverse(table, id, "graph", data)?;
            } else {
                log::warn!("Skipping graph entry '{id}': not reachable from root '{root_id}'");
            }
        }

        Ok(())
    }

    fn traverse<'a>(
        &self,
        table: &'a Map<String, Value>,
        start: &'a str,
        from: &'a str,
        data: &mut SceneData,
    ) -> Result<()> {
        let mut stack = vec![Frame::Enter { id: start, from }];
        let mut depth = 0usize;

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Exit { id, kind } => {
                    set_state(data, id, kind, LoadState::Loaded);
                    depth -= 1;
                }
                Frame::Enter { id, from } => {
                    let element = graph_entry(table, id)
                        .ok_or_else(|| YasfError::reference(ReferenceKind::Node, id, from))?;
                    let kind = match type_of(id, element)? {
                        "node" => GraphKind::Node,
                        "lod" => GraphKind::Lod,
                        other => {
                            return Err(YasfError::structural(
                                id,
                                format!("unrecognized node type '{other}'"),
                            ));
                        }
                    };

                    let state = match kind {
                        GraphKind::Node => data.create_node_if_absent(id).state,
                        GraphKind::Lod => data.create_lod_if_absent(id).state,
                    };
                    match state {
                        LoadState::Loaded => continue,
                        LoadState::Visiting => {
                            return Err(YasfError::Cycle {
                                id: id.to_string(),
                                from: from.to_string(),
                            });
                        }
                        LoadState::Unvisited => {}
                    }

                    depth += 1;
                    if depth > self.settings.max_graph_depth {
                        return Err(YasfError::structural(
                            id,
                            format!("graph nesting exceeds {}", self.settings.max_graph_depth),
                        ));
                    }
                    set_state(data, id, kind, LoadState::Visiting);

                    let references = match kind {
                        GraphKind::Node => parse_node(id, element, data)?,
                        GraphKind::Lod => parse_lod(id, element, data)?,
                    };
                    log::debug!("Parsed {kind:?} '{id}' ({} references)", references.len());

                    stack.push(Frame::Exit { id, kind });
                    for child in references.iter().rev() {
                        let Some((child, _)) = table
                            .get_key_value(child.as_str())
                            .filter(|(k, _)| k.as_str() != ROOT_ID_KEY)
                        else {
                            return Err(YasfError::reference(ReferenceKind::Node, child.as_str(), id));
                        };
                        stack.push(Frame::Enter { id: child.as_str(), from: id });
                    }
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Per-entry parsing
// ============================================================================

/// Parses a node element into its definition and returns the ids it references.
fn parse_node(id: &str, element: &Value, data: &mut SceneData) -> Result<Vec<String>> {
    let map = object(id, id, element)?;
    check_keys(id, map, NODE_KEYS)?;

    let transformations = match map.get("transforms") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| parse_transform(&format!("{id}.transforms[{i}]"), entry))
            .collect::<Result<_>>()?,
        Some(_) => return Err(YasfError::mismatch(id, "transforms", "an array")),
    };

    let cast_shadows = opt_bool(id, map, "castshadows")?;
    let receive_shadows = opt_bool(id, map, "receiveshadows")?;

    let material_ids = match map.get("materialref") {
        None | Some(Value::Null) => Vec::new(),
        Some(reference) => {
            let record = decode(&format!("{id}.materialref"), reference, MATERIAL_REF)?;
            vec![record.string("materialId")?.to_string()]
        }
    };

    let children_block = map
        .get("children")
        .ok_or_else(|| YasfError::structural(id, "missing 'children' block"))?;
    let children_map = object(id, "children", children_block)?;

    let mut children = Vec::with_capacity(children_map.len());
    let mut references: Vec<String> = Vec::new();

    for (key, value) in children_map {
        match key.as_str() {
            NODES_LIST_KEY | LODS_LIST_KEY => {
                let ids = value
                    .as_array()
                    .ok_or_else(|| YasfError::mismatch(id, key, "an array of ids"))?;
                for child in ids {
                    let child = child
                        .as_str()
                        .ok_or_else(|| YasfError::mismatch(id, key, "an array of ids"))?;
                    if references.iter().any(|r| r == child) {
                        log::warn!("Node '{id}' references '{child}' more than once; keeping one");
                        continue;
                    }
                    references.push(child.to_string());
                    children.push(NodeChild::Reference(child.to_string()));
                }
            }
            _ => {
                let type_name = type_of(key, value)?;
                match ChildKind::from_type(type_name) {
                    Some(ChildKind::Primitive(kind)) => {
                        let record = decode(key, value, kind.descriptors())?;
                        children.push(NodeChild::Primitive(PrimitiveDef::from_record(kind, record)?));
                    }
                    Some(ChildKind::Light(kind)) => {
                        let record = decode(key, value, kind.descriptors())?;
                        data.add_light(LightDef::from_record(kind, record)?)?;
                        children.push(NodeChild::Light(key.clone()));
                    }
                    None => {
                        return Err(YasfError::structural(
                            id,
                            format!("child '{key}' has unrecognized type '{type_name}'"),
                        ));
                    }
                }
            }
        }
    }

    let node = data.create_node_if_absent(id);
    node.transformations = transformations;
    node.material_ids = material_ids;
    node.cast_shadows = cast_shadows;
    node.receive_shadows = receive_shadows;
    node.children = children;
    node.custom = custom_of(id, map)?;

    Ok(references)
}

fn parse_lod(id: &str, element: &Value, data: &mut SceneData) -> Result<Vec<String>> {
    let map = object(id, id, element)?;
    check_keys(id, map, LOD_KEYS)?;

    let entries = map
        .get("lodNodes")
        .ok_or_else(|| YasfError::structural(id, "missing 'lodNodes' block"))?
        .as_array()
        .ok_or_else(|| YasfError::mismatch(id, "lodNodes", "an array"))?;

    let mut levels: Vec<(String, f32)> = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let record = decode(&format!("{id}.lodNodes[{i}]"), entry, LOD_LEVEL)?;
        let node_id = record.string("nodeId")?;
        if levels.iter().any(|(n, _)| n == node_id) {
            log::warn!("LOD '{id}' lists '{node_id}' more than once; keeping the first");
            continue;
        }
        levels.push((node_id.to_string(), record.float("mindist")?));
    }

    let references = levels.iter().map(|(n, _)| n.clone()).collect();

    let lod: &mut LodDef = data.create_lod_if_absent(id);
    lod.levels = levels;
    lod.custom = custom_of(id, map)?;

    Ok(references)
}

fn parse_transform(element: &str, entry: &Value) -> Result<Transformation> {
    let record = decode(element, entry, TRANSFORM)?;
    let amount = record.vec3("amount")?;
    match record.string("type")? {
        "translate" => Ok(Transformation::Translate(amount)),
        "rotate" => Ok(Transformation::rotate_degrees(amount)),
        "scale" => Ok(Transformation::Scale(amount)),
        other => Err(YasfError::structural(
            element,
            format!("unrecognized transform type '{other}'"),
        )),
    }
}

// ============================================================================
// Reference validation
// ============================================================================

fn validate_references(data: &SceneData) -> Result<()> {
    for node in data.nodes() {
        for material in &node.material_ids {
            if material != DEFAULT_MATERIAL && data.material(material).is_none() {
                return Err(YasfError::reference(
                    ReferenceKind::Material,
                    material.as_str(),
                    node.id.as_str(),
                ));
            }
        }
    }

    for material in data.materials() {
        for (attribute, texture) in material.texture_refs() {
            if data.texture(texture).is_none() {
                return Err(YasfError::reference(
                    ReferenceKind::Texture,
                    texture,
                    format!("{}.{attribute}", material.id),
                ));
            }
        }
    }

    match data.active_camera_id() {
        Some(id) if data.camera(id).is_none() => {
            return Err(YasfError::reference(
                ReferenceKind::Camera,
                id,
                format!("cameras.{ACTIVE_CAMERA_KEY}"),
            ));
        }
        None if !data.cameras().is_empty() => {
            log::warn!("No active camera selected; the first declared camera will be used");
        }
        _ => {}
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn graph_entry<'a>(table: &'a Map<String, Value>, id: &str) -> Option<&'a Value> {
    (id != ROOT_ID_KEY).then(|| table.get(id)).flatten()
}

fn set_state(data: &mut SceneData, id: &str, kind: GraphKind, state: LoadState) {
    match kind {
        GraphKind::Node => {
            if let Some(node) = data.node_mut(id) {
                node.state = state;
            }
        }
        GraphKind::Lod => {
            if let Some(lod) = data.lod_mut(id) {
                lod.state = state;
            }
        }
    }
}

/// Elements of a collection block, keyed either by map key or, for the
/// array form, by each element's own `id`.
fn entries<'a>(element: &str, block_name: &str, block: &'a Value) -> Result<Vec<(&'a str, &'a Value)>> {
    match block {
        Value::Object(map) => Ok(map.iter().map(|(k, v)| (k.as_str(), v)).collect()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let at = format!("{block_name}[{i}]");
                let id = object(&at, &at, item)?
                    .get("id")
                    .ok_or_else(|| YasfError::missing(&at, "id"))?
                    .as_str()
                    .ok_or_else(|| YasfError::mismatch(&at, "id", "a string"))?;
                Ok((id, item))
            })
            .collect(),
        _ => Err(YasfError::mismatch(element, block_name, "an object or an array")),
    }
}

fn object<'a>(element: &str, attribute: &str, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| YasfError::mismatch(element, attribute, "an object"))
}

fn check_keys(id: &str, map: &Map<String, Value>, allowed: &[&str]) -> Result<()> {
    match map
        .keys()
        .find(|k| k.as_str() != CUSTOM_KEY && !allowed.contains(&k.as_str()))
    {
        Some(unknown) => Err(YasfError::unknown_attribute(id, unknown)),
        None => Ok(()),
    }
}

fn type_of<'a>(id: &str, element: &'a Value) -> Result<&'a str> {
    let map = object(id, id, element)?;
    map.get("type")
        .ok_or_else(|| YasfError::missing(id, "type"))?
        .as_str()
        .ok_or_else(|| YasfError::mismatch(id, "type", "a string"))
}

fn opt_bool(id: &str, map: &Map<String, Value>, key: &str) -> Result<bool> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(YasfError::mismatch(id, key, "a boolean")),
    }
}

fn custom_of(id: &str, map: &Map<String, Value>) -> Result<Map<String, Value>> {
    match map.get(CUSTOM_KEY) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(bag)) => Ok(bag.clone()),
        Some(_) => Err(YasfError::mismatch(id, CUSTOM_KEY, "an object")),
    }
}
