//! Loads a YASF document and prints what the builder made of it.
//!
//! ```text
//! yasf_inspect <scene.json> [build-settings.json]
//! ```
//!
//! The optional second file is a JSON object with [`BuildSettings`] fields.
//! Set `RUST_LOG=debug` to follow loading and building step by step.

use std::fs;

use anyhow::{Context, bail};
use yasf::graph::MaterialDescriptor;
use yasf::{BuildSettings, ObjectBuilder, ObjectRef, RenderGraph, RenderLight, SceneLoader, SceneObserver};

/// Collects what a renderer would be handed.
#[derive(Default)]
struct Summary {
    objects: usize,
    lights: Vec<String>,
    materials: Vec<String>,
}

impl SceneObserver for Summary {
    fn add_object(&mut self, _object: ObjectRef<'_>) {
        self.objects += 1;
    }

    fn add_light(&mut self, light: &RenderLight) {
        self.lights.push(light.name.clone());
    }

    fn update_material(&mut self, name: &str, material: &MaterialDescriptor) {
        let maps = if material.has_maps() { ", textured" } else { "" };
        self.materials.push(format!("{name}{maps}"));
    }
}

fn print_tree(graph: &RenderGraph) {
    graph.walk(|object, depth| {
        let indent = "  ".repeat(depth);
        match object {
            ObjectRef::Node(node) => println!("{indent}{} [node, material {}]", node.name, node.material_id),
            ObjectRef::Mesh(mesh) => println!(
                "{indent}{} [{}, {} tris]",
                mesh.name,
                mesh.kind.as_str(),
                mesh.geometry.triangle_count()
            ),
            ObjectRef::Light(light) => println!("{indent}{} [light]", light.name),
            ObjectRef::Lod(lod) => {
                let levels: Vec<String> = lod.levels.iter().map(|l| l.min_distance.to_string()).collect();
                println!("{indent}{} [lod {}]", lod.name, levels.join(" / "));
            }
        }
    });
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(scene_path) = args.next() else {
        bail!("usage: yasf_inspect <scene.json> [build-settings.json]");
    };

    // 构建参数（可选）
    let settings: BuildSettings = match args.next() {
        Some(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?
        }
        None => BuildSettings::default(),
    };

    // 1. 解析文档
    let text = fs::read_to_string(&scene_path).with_context(|| format!("reading {scene_path}"))?;
    let data = SceneLoader::default()
        .load_str(&text)
        .with_context(|| format!("loading {scene_path}"))?;

    for light in data.lights().iter() {
        log::info!("declared {} '{}'", light.light_type().as_str(), light.id);
    }

    // 2. 构建渲染图
    let graph = ObjectBuilder::new(settings)
        .build(&data)
        .with_context(|| format!("building {scene_path}"))?;
    log::info!("{} meshes, {} lights", graph.mesh_count(), graph.light_count());

    print_tree(&graph);

    let mut summary = Summary::default();
    graph.publish(&mut summary);

    println!();
    println!("objects:   {}", summary.objects);
    println!("lights:    {}", summary.lights.join(", "));
    println!("materials: {}", summary.materials.join(", "));
    println!(
        "cameras:   {} (active: {})",
        graph.cameras.len(),
        graph.active_camera().name
    );
    Ok(())
}
