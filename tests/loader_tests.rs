//! Document Loader Tests
//!
//! Tests for:
//! - Attribute defaults on materials and textures
//! - Unknown attribute / missing block rejection
//! - Degree to radian conversion of rotate transforms
//! - Duplicate ids, dangling references and cycles
//! - Shared node definitions parsed once (Loaded state)
//! - Collection blocks in map and array form
//! - Active camera selection
//! - Segment and degree limits on primitives

use glam::Vec3;
use serde_json::{Value, json};

use yasf::data::{LoadState, NodeChild, Transformation};
use yasf::errors::{Category, ReferenceKind};
use yasf::schema::LightType;
use yasf::{LoaderSettings, SceneData, SceneLoader, SchemaViolation, YasfError};

// ============================================================================
// Helpers
// ============================================================================

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

fn rgb(r: f32, g: f32, b: f32) -> Value {
    json!({ "r": r, "g": g, "b": b })
}

fn xyz(x: f32, y: f32, z: f32) -> Value {
    json!({ "x": x, "y": y, "z": z })
}

fn material() -> Value {
    json!({
        "color": rgb(0.8, 0.6, 0.4),
        "specular": rgb(0.1, 0.1, 0.1),
        "emissive": rgb(0.0, 0.0, 0.0),
        "shininess": 10.0
    })
}

fn node(children: Value) -> Value {
    json!({ "type": "node", "children": children })
}

fn document(graph: Value) -> Value {
    json!({
        "yasf": {
            "globals": { "background": rgb(0.0, 0.0, 0.0), "ambient": rgb(0.2, 0.2, 0.2) },
            "graph": graph
        }
    })
}

fn single_node_graph() -> Value {
    json!({ "rootid": "scene", "scene": node(json!({})) })
}

fn load(doc: &Value) -> Result<SceneData, YasfError> {
    SceneLoader::default().load(doc)
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn loader_material_defaults() {
    let mut doc = document(single_node_graph());
    doc["yasf"]["materials"] = json!({ "m1": material() });

    let data = load(&doc).unwrap();
    let m1 = data.material("m1").unwrap();
    assert!(approx(m1.opacity, 1.0));
    assert!(!m1.two_sided);
    assert!(!m1.transparent);
    assert!(m1.texture.is_none());
    assert!(vec3_approx(m1.color, Vec3::new(0.8, 0.6, 0.4)));
}

#[test]
fn loader_texture_defaults() {
    let mut doc = document(single_node_graph());
    doc["yasf"]["textures"] = json!({ "brick": { "filepath": "brick.png" } });

    let data = load(&doc).unwrap();
    let brick = data.texture("brick").unwrap();
    assert!(!brick.is_video);
    assert!(brick.mipmaps.is_empty());
    assert_eq!(brick.filepath, "brick.png");
}

#[test]
fn loader_missing_globals_default_to_black() {
    let doc = json!({ "graph": single_node_graph() });
    let data = load(&doc).unwrap();
    assert_eq!(data.globals().background, Vec3::ZERO);
    assert!(data.globals().fog.is_none());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn loader_unknown_material_attribute() {
    let mut doc = document(single_node_graph());
    let mut m1 = material();
    m1["foo"] = json!(1);
    doc["yasf"]["materials"] = json!({ "m1": m1 });

    let err = load(&doc).unwrap_err();
    assert_eq!(
        err.as_schema(),
        Some(&SchemaViolation::UnknownAttribute {
            element: "m1".into(),
            attribute: "foo".into(),
        })
    );
}

#[test]
fn loader_custom_bag_is_accepted() {
    let mut doc = document(single_node_graph());
    let mut m1 = material();
    m1["custom"] = json!({ "author": "level-team" });
    doc["yasf"]["materials"] = json!({ "m1": m1 });

    let data = load(&doc).unwrap();
    assert_eq!(data.material("m1").unwrap().custom["author"], "level-team");
}

#[test]
fn loader_missing_graph_is_structural() {
    let doc = json!({ "yasf": { "globals": { "background": rgb(0.0, 0.0, 0.0), "ambient": rgb(0.0, 0.0, 0.0) } } });
    assert!(matches!(load(&doc), Err(YasfError::Structural { .. })));
}

#[test]
fn loader_missing_root_id_is_structural() {
    let doc = document(json!({ "scene": node(json!({})) }));
    assert!(matches!(load(&doc), Err(YasfError::Structural { .. })));
}

#[test]
fn loader_missing_children_block_is_structural() {
    let doc = document(json!({ "rootid": "scene", "scene": { "type": "node" } }));
    match load(&doc) {
        Err(YasfError::Structural { element, .. }) => assert_eq!(element, "scene"),
        other => panic!("expected structural error, got {other:?}"),
    }
}

#[test]
fn loader_unknown_node_type_is_structural() {
    let doc = document(json!({ "rootid": "scene", "scene": { "type": "group", "children": {} } }));
    assert!(matches!(load(&doc), Err(YasfError::Structural { .. })));
}

#[test]
fn loader_unknown_primitive_type_is_structural() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": node(json!({ "t1": { "type": "torus" } }))
    }));
    assert!(matches!(load(&doc), Err(YasfError::Structural { .. })));
}

#[test]
fn loader_type_mismatch_names_attribute() {
    let mut doc = document(single_node_graph());
    let mut m1 = material();
    m1["shininess"] = json!("shiny");
    doc["yasf"]["materials"] = json!({ "m1": m1 });

    match load(&doc).unwrap_err().as_schema() {
        Some(SchemaViolation::TypeMismatch { element, attribute, .. }) => {
            assert_eq!(element, "m1");
            assert_eq!(attribute, "shininess");
        }
        other => panic!("expected type mismatch, got {other:?}"),
    }
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn loader_rotation_converted_to_radians() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": {
            "type": "node",
            "transforms": [
                { "type": "translate", "amount": xyz(1.0, 2.0, 3.0) },
                { "type": "rotate", "amount": xyz(90.0, 0.0, 0.0) }
            ],
            "children": {}
        }
    }));

    let data = load(&doc).unwrap();
    let scene = data.node("scene").unwrap();
    assert_eq!(scene.transformations.len(), 2);
    assert_eq!(scene.transformations[0], Transformation::Translate(Vec3::new(1.0, 2.0, 3.0)));
    match scene.transformations[1] {
        Transformation::Rotate(r) => assert!(vec3_approx(r, Vec3::new(1.5708, 0.0, 0.0))),
        ref other => panic!("expected rotation, got {other:?}"),
    }
}

#[test]
fn loader_unknown_transform_type_is_structural() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": {
            "type": "node",
            "transforms": [{ "type": "shear", "amount": xyz(1.0, 0.0, 0.0) }],
            "children": {}
        }
    }));
    assert!(matches!(load(&doc), Err(YasfError::Structural { .. })));
}

// ============================================================================
// Ids & References
// ============================================================================

#[test]
fn loader_duplicate_material_id() {
    let mut doc = document(single_node_graph());
    let mut first = material();
    first["id"] = json!("wood");
    let mut second = material();
    second["id"] = json!("wood");
    doc["yasf"]["materials"] = json!([first, second]);

    match load(&doc) {
        Err(YasfError::DuplicateId { category, id }) => {
            assert_eq!(category, Category::Material);
            assert_eq!(id, "wood");
        }
        other => panic!("expected duplicate id, got {other:?}"),
    }
}

#[test]
fn loader_duplicate_light_id_across_nodes() {
    let light = json!({ "type": "pointlight", "color": rgb(1.0, 1.0, 1.0), "position": xyz(0.0, 5.0, 0.0) });
    let doc = document(json!({
        "rootid": "scene",
        "scene": node(json!({ "nodesList": ["a", "b"] })),
        "a": node(json!({ "lamp": light })),
        "b": node(json!({ "lamp": light }))
    }));
    assert!(matches!(
        load(&doc),
        Err(YasfError::DuplicateId { category: Category::Light, .. })
    ));
}

#[test]
fn loader_ids_are_namespaced_per_category() {
    let mut doc = document(json!({
        "rootid": "scene",
        "scene": node(json!({ "nodesList": ["wood"] })),
        "wood": node(json!({}))
    }));
    doc["yasf"]["materials"] = json!({ "wood": material() });
    doc["yasf"]["textures"] = json!({ "wood": { "filepath": "wood.png" } });

    let data = load(&doc).unwrap();
    assert!(data.material("wood").is_some());
    assert!(data.texture("wood").is_some());
    assert!(data.node("wood").is_some());
}

#[test]
fn loader_dangling_node_reference() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": node(json!({ "nodesList": ["ghost"] }))
    }));
    match load(&doc) {
        Err(YasfError::Reference { kind, id, from }) => {
            assert_eq!(kind, ReferenceKind::Node);
            assert_eq!(id, "ghost");
            assert_eq!(from, "scene");
        }
        other => panic!("expected reference error, got {other:?}"),
    }
}

#[test]
fn loader_dangling_material_reference() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": { "type": "node", "materialref": { "materialId": "steel" }, "children": {} }
    }));
    assert!(matches!(
        load(&doc),
        Err(YasfError::Reference { kind: ReferenceKind::Material, .. })
    ));
}

#[test]
fn loader_dangling_texture_reference() {
    let mut doc = document(single_node_graph());
    let mut m1 = material();
    m1["textureref"] = json!("missing");
    doc["yasf"]["materials"] = json!({ "m1": m1 });
    assert!(matches!(
        load(&doc),
        Err(YasfError::Reference { kind: ReferenceKind::Texture, .. })
    ));
}

#[test]
fn loader_cycle_detected() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": node(json!({ "nodesList": ["a"] })),
        "a": node(json!({ "nodesList": ["b"] })),
        "b": node(json!({ "nodesList": ["a"] }))
    }));
    match load(&doc) {
        Err(YasfError::Cycle { id, from }) => {
            assert_eq!(id, "a");
            assert_eq!(from, "b");
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn loader_self_reference_is_a_cycle() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": node(json!({ "nodesList": ["scene"] }))
    }));
    assert!(matches!(load(&doc), Err(YasfError::Cycle { .. })));
}

#[test]
fn loader_depth_limit() {
    let mut graph = serde_json::Map::new();
    graph.insert("rootid".into(), json!("n0"));
    for i in 0..10 {
        graph.insert(format!("n{i}"), node(json!({ "nodesList": [format!("n{}", i + 1)] })));
    }
    graph.insert("n10".into(), node(json!({})));

    let loader = SceneLoader::new(LoaderSettings {
        max_graph_depth: 5,
        ..Default::default()
    });
    assert!(matches!(
        loader.load(&document(Value::Object(graph))),
        Err(YasfError::Structural { .. })
    ));
}

// ============================================================================
// Shared Definitions
// ============================================================================

#[test]
fn loader_shared_node_is_loaded_once() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": node(json!({ "nodesList": ["left", "right"] })),
        "left": node(json!({ "nodesList": ["wheel"] })),
        "right": node(json!({ "nodesList": ["wheel"] })),
        "wheel": node(json!({}))
    }));

    let data = load(&doc).unwrap();
    assert_eq!(data.nodes().len(), 4);
    assert!(data.nodes().iter().all(|n| n.state == LoadState::Loaded));
}

#[test]
fn loader_repeated_reference_under_one_parent_is_collapsed() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": node(json!({ "nodesList": ["wheel", "wheel"] })),
        "wheel": node(json!({}))
    }));
    let data = load(&doc).unwrap();
    let refs: Vec<&str> = data.node("scene").unwrap().references().collect();
    assert_eq!(refs, ["wheel"]);
}

#[test]
fn loader_children_keep_declaration_order() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": node(json!({
            "floor": { "type": "rectangle", "xy1": { "x": 0.0, "y": 0.0 }, "xy2": { "x": 1.0, "y": 1.0 } },
            "nodesList": ["lamp_post"],
            "sun": { "type": "directionallight", "color": rgb(1.0, 1.0, 1.0), "position": xyz(0.0, 10.0, 0.0) }
        })),
        "lamp_post": node(json!({}))
    }));

    let data = load(&doc).unwrap();
    let children = &data.node("scene").unwrap().children;
    assert!(matches!(children[0], NodeChild::Primitive(_)));
    assert!(matches!(children[1], NodeChild::Reference(ref id) if id == "lamp_post"));
    assert!(matches!(children[2], NodeChild::Light(ref id) if id == "sun"));
    let sun = data.light("sun").unwrap();
    assert_eq!(sun.light_type(), LightType::Directional);
    assert_eq!(sun.light_type().as_str(), "directionallight");
}

#[test]
fn loader_lod_levels_keep_declaration_order() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": node(json!({ "lodsList": ["tree"] })),
        "tree": {
            "type": "lod",
            "lodNodes": [
                { "nodeId": "mid", "mindist": 150.0 },
                { "nodeId": "near", "mindist": 0.0 },
                { "nodeId": "far", "mindist": 200.0 }
            ]
        },
        "near": node(json!({})),
        "mid": node(json!({})),
        "far": node(json!({}))
    }));

    let data = load(&doc).unwrap();
    let distances: Vec<f32> = data.lod("tree").unwrap().levels().map(|l| l.min_distance).collect();
    assert_eq!(distances, vec![150.0, 0.0, 200.0]);
}

#[test]
fn loader_unreachable_entries_are_validated() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": node(json!({})),
        "orphan": node(json!({ "nodesList": ["ghost"] }))
    }));
    assert!(matches!(load(&doc), Err(YasfError::Reference { .. })));

    let lenient = SceneLoader::new(LoaderSettings {
        validate_unreachable: false,
        ..Default::default()
    });
    let data = lenient.load(&doc).unwrap();
    assert!(data.node("orphan").is_none());
}

// ============================================================================
// Primitive Limits
// ============================================================================

fn primitive_graph(primitive: Value) -> Value {
    document(json!({ "rootid": "scene", "scene": node(json!({ "p1": primitive })) }))
}

fn assert_structural_at(doc: &Value, id: &str) {
    match load(doc) {
        Err(YasfError::Structural { element, .. }) => assert_eq!(element, id),
        other => panic!("expected structural error on '{id}', got {other:?}"),
    }
}

#[test]
fn loader_nurbs_degree_overflow_is_structural() {
    let doc = primitive_graph(json!({
        "type": "nurbs", "degree_u": 4_294_967_295_u32, "degree_v": 1,
        "parts_u": 2, "parts_v": 2, "controlpoints": []
    }));
    assert_structural_at(&doc, "p1");

    let doc = primitive_graph(json!({
        "type": "nurbs", "degree_u": 65_535, "degree_v": 65_535,
        "parts_u": 2, "parts_v": 2, "controlpoints": []
    }));
    assert_structural_at(&doc, "p1");
}

#[test]
fn loader_oversized_segment_grid_is_structural() {
    let huge = [
        json!({ "type": "rectangle", "xy1": { "x": 0, "y": 0 }, "xy2": { "x": 1, "y": 1 },
                "parts_x": 70_000, "parts_y": 70_000 }),
        json!({ "type": "box", "xyz1": xyz(0.0, 0.0, 0.0), "xyz2": xyz(1.0, 1.0, 1.0),
                "parts_x": 4_294_967_295_u32, "parts_y": 4_294_967_295_u32, "parts_z": 1 }),
        json!({ "type": "sphere", "radius": 1.0, "slices": 100_000, "stacks": 100_000 }),
        json!({ "type": "cylinder", "base": 1, "top": 1, "height": 1,
                "slices": 4_294_967_295_u32, "stacks": 1 }),
        json!({ "type": "polygon", "radius": 1.0, "stacks": 50_000, "slices": 50_000,
                "color_c": rgb(1.0, 1.0, 1.0), "color_p": rgb(0.0, 0.0, 0.0) }),
    ];
    for primitive in huge {
        assert_structural_at(&primitive_graph(primitive), "p1");
    }
}

#[test]
fn loader_largest_allowed_grid_loads() {
    // 4095 x 4095 segments is exactly 4096^2 vertices
    let doc = primitive_graph(json!({
        "type": "rectangle", "xy1": { "x": 0, "y": 0 }, "xy2": { "x": 1, "y": 1 },
        "parts_x": 4095, "parts_y": 4095
    }));
    let data = load(&doc).unwrap();
    match &data.node("scene").unwrap().children[0] {
        NodeChild::Primitive(p) => {
            assert_eq!(p.params.vertex_estimate(), yasf::data::MAX_PRIMITIVE_VERTICES);
        }
        other => panic!("expected primitive, got {other:?}"),
    }

    let doc = primitive_graph(json!({
        "type": "rectangle", "xy1": { "x": 0, "y": 0 }, "xy2": { "x": 1, "y": 1 },
        "parts_x": 4096, "parts_y": 4095
    }));
    assert_structural_at(&doc, "p1");
}

// ============================================================================
// Cameras & Document Shape
// ============================================================================

#[test]
fn loader_initial_camera_is_selected() {
    let mut doc = document(single_node_graph());
    doc["yasf"]["cameras"] = json!({
        "initial": "top",
        "persp": {
            "type": "perspective", "angle": 45.0, "near": 0.1, "far": 100.0,
            "location": xyz(10.0, 10.0, 10.0), "target": xyz(0.0, 0.0, 0.0)
        },
        "top": {
            "type": "orthogonal", "near": 0.1, "far": 100.0,
            "location": xyz(0.0, 20.0, 0.0), "target": xyz(0.0, 0.0, 0.0),
            "left": -10.0, "right": 10.0, "bottom": -10.0, "top": 10.0
        }
    });

    let data = load(&doc).unwrap();
    assert_eq!(data.cameras().len(), 2);
    assert_eq!(data.active_camera_id(), Some("top"));
    assert_eq!(data.active_camera().unwrap().id, "top");
}

#[test]
fn loader_unknown_initial_camera_is_reference_error() {
    let mut doc = document(single_node_graph());
    doc["yasf"]["cameras"] = json!({ "initial": "nowhere" });
    assert!(matches!(
        load(&doc),
        Err(YasfError::Reference { kind: ReferenceKind::Camera, .. })
    ));
}

#[test]
fn loader_unknown_top_level_key() {
    let mut doc = document(single_node_graph());
    doc["yasf"]["animations"] = json!({});
    assert!(matches!(
        load(&doc).unwrap_err().as_schema(),
        Some(SchemaViolation::UnknownAttribute { .. })
    ));
}

#[test]
fn loader_accepts_unwrapped_document() {
    let doc = json!({ "graph": single_node_graph() });
    let data = load(&doc).unwrap();
    assert_eq!(data.root_id(), Some("scene"));
}

#[test]
fn loader_rejects_invalid_json() {
    assert!(matches!(
        SceneLoader::default().load_str("{ \"yasf\": "),
        Err(YasfError::Json(_))
    ));
}
