#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! YASF scene loading.
//!
//! A YASF document is JSON describing textures, materials, cameras and a
//! graph of nodes, LODs, primitives and lights. Loading runs in two steps:
//!
//! 1. [`SceneLoader`] validates the document against the attribute schema
//!    and produces a [`SceneData`] store.
//! 2. [`ObjectBuilder`] turns the store into an owned [`RenderGraph`].
//!
//! ```no_run
//! let text = std::fs::read_to_string("scene.json")?;
//! let graph = yasf::load_scene(&text)?;
//! println!("{} meshes", graph.mesh_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod data;
pub mod errors;
pub mod geometry;
pub mod graph;
pub mod loader;
pub mod schema;

pub use builder::{BuildSettings, ObjectBuilder};
pub use data::{DEFAULT_MATERIAL, SceneData};
pub use errors::{Result, SchemaViolation, YasfError};
pub use geometry::{BoundingBox, Geometry};
pub use graph::{
    Mesh, ObjectRef, RenderCamera, RenderChild, RenderGraph, RenderLight, RenderLod, RenderNode,
    SceneObserver, ShadowFlags,
};
pub use loader::{LoaderSettings, SceneLoader};

/// Loads and builds `text` with default settings.
pub fn load_scene(text: &str) -> Result<RenderGraph> {
    let data = SceneLoader::default().load_str(text)?;
    ObjectBuilder::default().build(&data)
}
