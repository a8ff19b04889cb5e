//! Object Builder Tests
//!
//! Tests for:
//! - Primitive meshes: naming, placement, face sizing, texture repeat
//! - Material inheritance and first-use ordering
//! - Shadow flag propagation
//! - LOD level ordering and selection
//! - Shared node instancing
//! - Cameras, lights and environment
//! - Live material updates and observer publishing

use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde_json::{Value, json};

use yasf::graph::{LightKind, MaterialDescriptor, MaterialKind, MipmapMode, ProjectionType, Side};
use yasf::{
    BuildSettings, DEFAULT_MATERIAL, Mesh, ObjectBuilder, ObjectRef, RenderChild, RenderGraph,
    RenderLight, SceneData, SceneLoader, SceneObserver, ShadowFlags, YasfError,
};

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

fn vec2_approx(a: Vec2, b: Vec2) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y)
}

fn rgb(r: f32, g: f32, b: f32) -> Value {
    json!({ "r": r, "g": g, "b": b })
}

fn xyz(x: f32, y: f32, z: f32) -> Value {
    json!({ "x": x, "y": y, "z": z })
}

fn material(color: Value) -> Value {
    json!({
        "color": color,
        "specular": rgb(0.1, 0.1, 0.1),
        "emissive": rgb(0.0, 0.0, 0.0),
        "shininess": 10.0
    })
}

fn node(children: Value) -> Value {
    json!({ "type": "node", "children": children })
}

fn unit_box() -> Value {
    json!({ "type": "box", "xyz1": xyz(-1.0, -1.0, -1.0), "xyz2": xyz(1.0, 1.0, 1.0) })
}

fn document(graph: Value) -> Value {
    json!({
        "yasf": {
            "globals": { "background": rgb(0.0, 0.0, 0.0), "ambient": rgb(0.2, 0.2, 0.2) },
            "graph": graph
        }
    })
}

fn load(doc: &Value) -> SceneData {
    SceneLoader::default().load(doc).unwrap()
}

fn build(doc: &Value) -> RenderGraph {
    ObjectBuilder::default().build(&load(doc)).unwrap()
}

fn mesh<'a>(graph: &'a RenderGraph, name: &str) -> &'a Mesh {
    match graph.find_by_name(name) {
        Some(ObjectRef::Mesh(mesh)) => mesh,
        other => panic!("expected mesh '{name}', got {other:?}"),
    }
}

// ============================================================================
// Primitives
// ============================================================================

#[test]
fn builder_box_end_to_end() {
    let graph = build(&document(json!({
        "rootid": "scene",
        "scene": node(json!({ "nodesList": ["cubeNode"] })),
        "cubeNode": node(json!({ "box1": unit_box() }))
    })));

    assert_eq!(graph.root.name, "scene");
    assert_eq!(graph.root.children.len(), 1);
    assert_eq!(graph.root.children[0].name(), "scene_obj");
    assert_eq!(graph.mesh_count(), 1);

    let cube = mesh(&graph, "scene_cubeNode_box1_box_obj");
    assert_eq!(cube.source_id, "box1");
    assert_eq!(cube.materials.len(), 6);
    assert!(cube.materials.iter().all(|m| m.name() == DEFAULT_MATERIAL));
    assert!(vec3_approx(cube.transform.position, Vec3::ZERO));

    let bounds = cube.geometry.bounding_box().unwrap();
    assert!(vec3_approx(bounds.size(), Vec3::splat(2.0)));
}

#[test]
fn builder_box_is_moved_to_its_midpoint() {
    let graph = build(&document(json!({
        "rootid": "scene",
        "scene": node(json!({
            "crate": { "type": "box", "xyz1": xyz(2.0, 0.0, 0.0), "xyz2": xyz(4.0, 1.0, 3.0) }
        }))
    })));

    let crate_mesh = mesh(&graph, "scene_crate_box_obj");
    assert!(vec3_approx(crate_mesh.transform.position, Vec3::new(3.0, 0.5, 1.5)));
    let center = crate_mesh.geometry.bounding_box().unwrap().center();
    assert!(vec3_approx(center, Vec3::ZERO));
}

#[test]
fn builder_cylinder_face_sizes() {
    let graph = build(&document(json!({
        "rootid": "scene",
        "scene": node(json!({
            "pillar": {
                "type": "cylinder", "base": 1.0, "top": 2.0, "height": 3.0,
                "slices": 16, "stacks": 2, "capsclose": true
            }
        }))
    })));

    let pillar = mesh(&graph, "scene_pillar_cylinder_obj");
    assert_eq!(pillar.materials.len(), 3);
    assert!(vec2_approx(pillar.materials[0].size, Vec2::new(3.0 * PI, 3.0)));
    assert!(vec2_approx(pillar.materials[1].size, Vec2::splat(4.0)));
    assert!(vec2_approx(pillar.materials[2].size, Vec2::splat(2.0)));
    assert_eq!(pillar.geometry.groups().len(), 3);
}

#[test]
fn builder_texture_repeat_follows_face_size() {
    let mut doc = document(json!({
        "rootid": "scene",
        "scene": {
            "type": "node",
            "materialref": { "materialId": "bricks" },
            "children": {
                "wall": { "type": "rectangle", "xy1": { "x": 0.0, "y": 0.0 }, "xy2": { "x": 4.0, "y": 2.0 } }
            }
        }
    }));
    let mut bricks = material(rgb(1.0, 1.0, 1.0));
    bricks["textureref"] = json!("brick");
    bricks["texlength_s"] = json!(2.0);
    bricks["texlength_t"] = json!(0.5);
    doc["yasf"]["materials"] = json!({ "bricks": bricks });
    doc["yasf"]["textures"] = json!({ "brick": { "filepath": "brick.png" } });

    let graph = build(&doc);
    let wall = mesh(&graph, "scene_wall_rectangle_obj");
    let face = wall.material().unwrap();
    assert!(vec2_approx(face.texture_repeat, Vec2::new(2.0, 4.0)));
    assert!(vec3_approx(wall.transform.position, Vec3::new(2.0, 1.0, 0.0)));

    let brick = graph.texture("brick").unwrap();
    assert_eq!(brick.mipmaps, MipmapMode::Generate);
    assert!(Arc::ptr_eq(face.descriptor.texture.as_ref().unwrap(), brick));
}

#[test]
fn builder_polygon_uses_vertex_colors() {
    let graph = build(&document(json!({
        "rootid": "scene",
        "scene": node(json!({
            "badge": {
                "type": "polygon", "radius": 1.0, "stacks": 2, "slices": 6,
                "color_c": rgb(1.0, 0.0, 0.0), "color_p": rgb(0.0, 0.0, 1.0)
            }
        }))
    })));

    let badge = mesh(&graph, "scene_badge_polygon_obj");
    let descriptor = &badge.material().unwrap().descriptor;
    assert_eq!(descriptor.name, "badge_polygon");
    assert_eq!(descriptor.kind, MaterialKind::BasicVertexColor);
    assert_eq!(descriptor.side, Side::Double);
    assert!(badge.geometry.get_attribute("color").is_some());
    assert!(graph.material("badge_polygon").is_none());
}

#[test]
fn builder_nurbs_with_wrong_point_count_fails() {
    let text = serde_json::to_string(&document(json!({
        "rootid": "scene",
        "scene": node(json!({
            "patch": {
                "type": "nurbs", "degree_u": 1, "degree_v": 1, "parts_u": 4, "parts_v": 4,
                "controlpoints": [xyz(0.0, 0.0, 0.0), xyz(1.0, 0.0, 0.0), xyz(0.0, 1.0, 0.0)]
            }
        }))
    })))
    .unwrap();

    assert!(matches!(yasf::load_scene(&text), Err(YasfError::Structural { .. })));
}

// ============================================================================
// Materials & Shadows
// ============================================================================

#[test]
fn builder_material_inheritance() {
    let mut doc = document(json!({
        "rootid": "scene",
        "scene": {
            "type": "node",
            "materialref": { "materialId": "red" },
            "children": { "nodesList": ["inner", "blue"] }
        },
        "inner": node(json!({ "b1": unit_box() })),
        "blue": {
            "type": "node",
            "materialref": { "materialId": "blue" },
            "children": { "b2": unit_box() }
        }
    }));
    doc["yasf"]["materials"] = json!({
        "blue": material(rgb(0.0, 0.0, 1.0)),
        "red": material(rgb(1.0, 0.0, 0.0))
    });

    let graph = build(&doc);
    assert_eq!(mesh(&graph, "scene_inner_b1_box_obj").material().unwrap().name(), "red");
    assert_eq!(mesh(&graph, "scene_blue_b2_box_obj").material().unwrap().name(), "blue");

    let order: Vec<&str> = graph.materials().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(order, ["red", "blue"]);
}

#[test]
fn builder_default_material_color_setting() {
    let data = load(&document(json!({
        "rootid": "scene",
        "scene": node(json!({ "b1": unit_box() }))
    })));
    let builder = ObjectBuilder::new(BuildSettings {
        default_material_color: Vec3::new(0.5, 0.5, 0.5),
        ..Default::default()
    });

    let graph = builder.build(&data).unwrap();
    let default = graph.material(DEFAULT_MATERIAL).unwrap();
    assert!(vec3_approx(default.color, Vec3::splat(0.5)));
}

#[test]
fn builder_shadow_flags_propagate() {
    let doc = document(json!({
        "rootid": "scene",
        "scene": {
            "type": "node",
            "castshadows": true,
            "children": { "floor": unit_box(), "nodesList": ["table"] }
        },
        "table": {
            "type": "node",
            "receiveshadows": true,
            "children": { "top": unit_box() }
        }
    }));

    let graph = build(&doc);
    assert_eq!(mesh(&graph, "scene_floor_box_obj").shadows, ShadowFlags::CAST);
    assert_eq!(
        mesh(&graph, "scene_table_top_box_obj").shadows,
        ShadowFlags::CAST | ShadowFlags::RECEIVE
    );
}

#[test]
fn builder_update_material_swaps_descriptor() {
    let mut doc = document(json!({
        "rootid": "scene",
        "scene": {
            "type": "node",
            "materialref": { "materialId": "paint" },
            "children": { "b1": unit_box() }
        }
    }));
    doc["yasf"]["materials"] = json!({ "paint": material(rgb(1.0, 0.0, 0.0)) });

    let data = load(&doc);
    let mut graph = ObjectBuilder::default().build(&data).unwrap();

    let mut repaint = data.material("paint").unwrap().clone();
    repaint.color = Vec3::new(0.0, 1.0, 0.0);
    let updated = graph.update_material("paint", &repaint).unwrap();

    assert_eq!(updated, 6);
    let cube = mesh(&graph, "scene_b1_box_obj");
    assert!(cube.materials.iter().all(|m| m.descriptor.color == Vec3::Y));
    assert_eq!(graph.material("paint").unwrap().color, Vec3::Y);
}

// ============================================================================
// LODs
// ============================================================================

fn lod_document() -> Value {
    document(json!({
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
        "near": node(json!({ "b": unit_box() })),
        "mid": node(json!({ "b": unit_box() })),
        "far": node(json!({ "b": unit_box() }))
    }))
}

#[test]
fn builder_lod_levels_sorted_ascending() {
    let graph = build(&lod_document());

    let Some(ObjectRef::Lod(tree)) = graph.find_by_name("scene_tree_lod") else {
        panic!("LOD not built");
    };
    let distances: Vec<f32> = tree.levels.iter().map(|l| l.min_distance).collect();
    assert_eq!(distances, vec![0.0, 150.0, 200.0]);

    let names: Vec<&str> = tree.levels.iter().map(|l| l.object.name()).collect();
    assert_eq!(names, ["scene_tree_near_obj", "scene_tree_mid_obj", "scene_tree_far_obj"]);
}

#[test]
fn builder_lod_level_selection() {
    let graph = build(&lod_document());
    let Some(ObjectRef::Lod(tree)) = graph.find_by_name("scene_tree_lod") else {
        panic!("LOD not built");
    };

    assert_eq!(tree.level_for_distance(10.0).unwrap().object.name(), "scene_tree_near_obj");
    assert_eq!(tree.level_for_distance(160.0).unwrap().object.name(), "scene_tree_mid_obj");
    assert_eq!(tree.level_for_distance(1.0e6).unwrap().object.name(), "scene_tree_far_obj");
}

// ============================================================================
// Shared Nodes
// ============================================================================

#[test]
fn builder_shared_node_is_instanced() {
    let graph = build(&document(json!({
        "rootid": "scene",
        "scene": node(json!({ "nodesList": ["left", "right"] })),
        "left": node(json!({ "nodesList": ["wheel"] })),
        "right": node(json!({ "nodesList": ["wheel"] })),
        "wheel": node(json!({ "rim": unit_box() }))
    })));

    assert_eq!(graph.count_source("wheel"), 2);
    assert_eq!(graph.mesh_count(), 2);

    let left = mesh(&graph, "scene_left_wheel_rim_box_obj");
    let right = mesh(&graph, "scene_right_wheel_rim_box_obj");
    assert!(Arc::ptr_eq(&left.geometry, &right.geometry));
    assert!(graph.find_by_name("scene_right_wheel_obj").is_some());

    let mut names = graph.object_names();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total, "object names must be unique");
}

#[test]
fn builder_shared_lod_level_is_instanced() {
    let graph = build(&document(json!({
        "rootid": "scene",
        "scene": node(json!({ "lodsList": ["tree"], "nodesList": ["trunk"] })),
        "tree": { "type": "lod", "lodNodes": [{ "nodeId": "trunk", "mindist": 0.0 }] },
        "trunk": node(json!({ "bark": unit_box() }))
    })));

    assert_eq!(graph.count_source("trunk"), 2);
    assert!(graph.find_by_name("scene_tree_trunk_bark_box_obj").is_some());
    assert!(graph.find_by_name("scene_trunk_bark_box_obj").is_some());
}

#[test]
fn builder_builds_are_independent() {
    let data = load(&lod_document());
    let builder = ObjectBuilder::default();
    let first = builder.build(&data).unwrap();
    let second = builder.build(&data).unwrap();

    assert_eq!(first.object_names(), second.object_names());
    assert_eq!(first.materials().len(), second.materials().len());
}

#[test]
fn builder_requires_root_id() {
    let err = ObjectBuilder::default().build(&SceneData::new()).unwrap_err();
    assert!(matches!(err, YasfError::Structural { .. }));
}

// ============================================================================
// Cameras, Lights & Environment
// ============================================================================

#[test]
fn builder_default_camera() {
    let graph = build(&document(json!({ "rootid": "scene", "scene": node(json!({})) })));

    assert_eq!(graph.cameras.len(), 1);
    let camera = graph.active_camera();
    assert_eq!(camera.name, "Default");
    assert_eq!(camera.projection_type, ProjectionType::Perspective);
    assert!(approx(camera.fov, 60f32.to_radians()));
    assert!(vec3_approx(camera.position, Vec3::new(-15.0, 10.0, 15.0)));
}

#[test]
fn builder_declared_cameras() {
    let mut doc = document(json!({ "rootid": "scene", "scene": node(json!({})) }));
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

    let data = load(&doc);
    let builder = ObjectBuilder::new(BuildSettings {
        camera_aspect: 1.5,
        ..Default::default()
    });
    let mut graph = builder.build(&data).unwrap();

    assert_eq!(graph.active_camera().name, "top");
    assert_eq!(graph.active_camera().projection_type, ProjectionType::Orthographic);
    assert!(graph.cameras.iter().all(|c| approx(c.aspect, 1.5)));

    assert!(graph.set_active_camera("persp"));
    assert!(approx(graph.active_camera().fov, 45f32.to_radians()));
    assert!(!graph.set_active_camera("missing"));
    assert_eq!(graph.active_camera().name, "persp");
}

#[test]
fn builder_lights() {
    let graph = build(&document(json!({
        "rootid": "scene",
        "scene": node(json!({
            "sun": {
                "type": "spotlight", "color": rgb(1.0, 1.0, 0.9),
                "position": xyz(0.0, 10.0, 0.0), "target": xyz(0.0, 0.0, 0.0),
                "angle": 30.0, "castshadow": true
            },
            "bulb": { "type": "pointlight", "color": rgb(1.0, 1.0, 1.0), "position": xyz(1.0, 1.0, 1.0) }
        }))
    })));

    assert_eq!(graph.light_count(), 2);
    let Some(ObjectRef::Light(sun)) = graph.find_by_name("scene_sun_light") else {
        panic!("spotlight not built");
    };
    assert!(sun.cast_shadows);
    assert_eq!(sun.shadow.map_size, 512);
    assert!(approx(sun.shadow.far, 500.0));
    match &sun.kind {
        LightKind::Spot(spot) => assert!(approx(spot.angle, 30f32.to_radians())),
        other => panic!("expected spotlight, got {other:?}"),
    }
    assert!(vec3_approx(sun.direction().unwrap(), Vec3::NEG_Y));

    let Some(ObjectRef::Light(bulb)) = graph.find_by_name("scene_bulb_light") else {
        panic!("point light not built");
    };
    assert!(bulb.enabled);
    assert!(approx(bulb.intensity, 1.0));
    assert!(bulb.direction().is_none());
}

#[test]
fn builder_environment_and_skybox() {
    let mut doc = document(json!({ "rootid": "scene", "scene": node(json!({})) }));
    doc["yasf"]["globals"]["fog"] = json!({ "color": rgb(0.5, 0.5, 0.5), "near": 1.0, "far": 50.0 });
    doc["yasf"]["globals"]["skybox"] = json!({
        "size": xyz(100.0, 100.0, 100.0), "center": xyz(0.0, 0.0, 0.0),
        "emissive": rgb(1.0, 1.0, 1.0), "intensity": 5.0,
        "front": "front.png", "back": "back.png", "up": "up.png",
        "down": "down.png", "left": "left.png", "right": "right.png"
    });

    let graph = build(&doc);
    let env = &graph.environment;
    assert!(vec3_approx(env.ambient, Vec3::splat(0.2)));
    assert!(approx(env.fog.unwrap().far, 50.0));

    let sky = env.skybox.as_ref().unwrap();
    assert!(approx(sky.emissive_intensity, 0.5));
    assert_eq!(sky.faces[0], "right.png");
    assert_eq!(sky.faces[5], "back.png");
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn builder_world_transforms_compose() {
    let graph = build(&document(json!({
        "rootid": "scene",
        "scene": {
            "type": "node",
            "transforms": [{ "type": "translate", "amount": xyz(1.0, 0.0, 0.0) }],
            "children": {
                "nodesList": ["shelf"],
                "lamp": { "type": "pointlight", "color": rgb(1.0, 1.0, 1.0), "position": xyz(0.0, 5.0, 0.0) }
            }
        },
        "shelf": {
            "type": "node",
            "transforms": [{ "type": "translate", "amount": xyz(0.0, 2.0, 0.0) }],
            "children": {
                "book": { "type": "box", "xyz1": xyz(-1.0, -1.0, 2.0), "xyz2": xyz(1.0, 1.0, 4.0) }
            }
        }
    })));

    let world = graph.world_transforms();
    let book = world["scene_shelf_book_box_obj"];
    assert!(vec3_approx(book.translation.into(), Vec3::new(1.0, 2.0, 3.0)));
    let lamp = world["scene_lamp_light"];
    assert!(vec3_approx(lamp.translation.into(), Vec3::new(1.0, 5.0, 0.0)));
}

#[test]
fn builder_rotation_is_applied_in_radians() {
    let graph = build(&document(json!({
        "rootid": "scene",
        "scene": {
            "type": "node",
            "transforms": [{ "type": "rotate", "amount": xyz(0.0, 0.0, 90.0) }],
            "children": {}
        }
    })));

    let Some(ObjectRef::Node(scene)) = graph.find_by_name("scene_obj") else {
        panic!("root node not built");
    };
    let x_axis = scene.transform.local_matrix().transform_vector3(Vec3::X);
    assert!(vec3_approx(x_axis, Vec3::Y));
}

#[derive(Default)]
struct Recorder {
    objects: Vec<String>,
    lights: Vec<String>,
    materials: Vec<String>,
}

impl SceneObserver for Recorder {
    fn add_object(&mut self, object: ObjectRef<'_>) {
        self.objects.push(object.name().to_string());
    }

    fn add_light(&mut self, light: &RenderLight) {
        self.lights.push(light.name.clone());
    }

    fn update_material(&mut self, name: &str, _material: &MaterialDescriptor) {
        self.materials.push(name.to_string());
    }
}

#[test]
fn builder_publish_feeds_observer() {
    let graph = build(&document(json!({
        "rootid": "scene",
        "scene": node(json!({
            "b1": unit_box(),
            "sun": { "type": "directionallight", "color": rgb(1.0, 1.0, 1.0), "position": xyz(0.0, 10.0, 0.0) }
        }))
    })));

    let mut recorder = Recorder::default();
    graph.publish(&mut recorder);

    assert_eq!(recorder.objects, ["scene", "scene_obj", "scene_b1_box_obj"]);
    assert_eq!(recorder.lights, ["scene_sun_light"]);
    assert_eq!(recorder.materials, [DEFAULT_MATERIAL]);
}

#[test]
fn builder_walk_reports_depth() {
    let graph = build(&document(json!({
        "rootid": "scene",
        "scene": node(json!({ "nodesList": ["cubeNode"] })),
        "cubeNode": node(json!({ "box1": unit_box() }))
    })));

    let mut depths = Vec::new();
    graph.walk(|object, depth| depths.push((object.name(), depth)));
    assert_eq!(
        depths,
        [
            ("scene", 0),
            ("scene_obj", 1),
            ("scene_cubeNode_obj", 2),
            ("scene_cubeNode_box1_box_obj", 3),
        ]
    );

    assert!(matches!(
        graph.root.children[0],
        RenderChild::Group(ref n) if n.material_id == DEFAULT_MATERIAL
    ));
}

// ============================================================================
// Sample Scene
// ============================================================================

#[test]
fn builder_sample_scene() {
    let text = include_str!("../demo_apps/yasf_inspect/scenes/table.json");
    let graph = yasf::load_scene(text).unwrap();

    assert_eq!(graph.count_source("leg"), 4);
    assert_eq!(graph.mesh_count(), 8);
    assert_eq!(graph.light_count(), 1);
    assert_eq!(graph.active_camera().name, "overview");

    let post = mesh(&graph, "room_table_leg_br_leg_post_cylinder_obj");
    assert_eq!(post.material().unwrap().name(), "metal");
    assert!(post.shadows.contains(ShadowFlags::CAST | ShadowFlags::RECEIVE));

    let top = mesh(&graph, "room_table_top_box_obj");
    assert!(top.material().unwrap().descriptor.has_maps());

    let world = graph.world_transforms();
    let leg = world["room_table_leg_fl_obj"];
    assert!(vec3_approx(leg.translation.into(), Vec3::new(-0.9, 0.45, 0.5)));
}
