//! Object naming.
//!
//! Every built object is named after its path from the root, so two
//! instances of a shared node get distinct names:
//!
//! ```text
//! scene_obj
//! scene_cube_obj
//! scene_cube_box1_box_obj
//! scene_cube_sun_light
//! ```
//!
//! Path segments are joined with `_` and ids are not escaped, so the
//! uniqueness only holds for ids without underscores. Node `a` with child
//! `b_c` and node `a_b` with child `c` both produce `scene_a_b_c_obj`.
//! Names are display labels; identity lives in `source_id`.

pub const NODE_SUFFIX: &str = "_obj";
pub const LOD_SUFFIX: &str = "_lod";
pub const LIGHT_SUFFIX: &str = "_light";

/// Path prefix children of `name` start with: the trailing `_obj` or
/// `_lod` becomes `_`.
#[must_use]
pub fn path_prefix(name: &str) -> String {
    let stem = name
        .strip_suffix(NODE_SUFFIX)
        .or_else(|| name.strip_suffix(LOD_SUFFIX))
        .unwrap_or(name);
    format!("{stem}_")
}

/// Name of graph entry `id` placed under `parent`.
///
/// The root entry sits under a container named after the root id itself,
/// which would yield `scenescene_obj`; the doubled token is collapsed.
#[must_use]
pub fn node_name(parent: &str, id: &str, is_lod: bool, root_id: &str) -> String {
    let suffix = if is_lod { LOD_SUFFIX } else { NODE_SUFFIX };
    let prefix = if parent == root_id {
        parent.to_string()
    } else {
        path_prefix(parent)
    };
    collapse_leading_repeat(format!("{prefix}{id}{suffix}"), root_id)
}

#[must_use]
pub fn primitive_name(node: &str, primitive_id: &str, subtype: &str) -> String {
    format!("{}{primitive_id}_{subtype}{NODE_SUFFIX}", path_prefix(node))
}

#[must_use]
pub fn light_name(node: &str, light_id: &str) -> String {
    format!("{}{light_id}{LIGHT_SUFFIX}", path_prefix(node))
}

/// `"scenescene_obj"` → `"scene_obj"` for root token `"scene"`.
#[must_use]
pub fn collapse_leading_repeat(name: String, root_id: &str) -> String {
    if root_id.is_empty() {
        return name;
    }
    match name.strip_prefix(root_id) {
        Some(rest) if rest.starts_with(root_id) => rest.to_string(),
        _ => name,
    }
}

/// Moves `name` from under `old_prefix` to under `new_prefix`. Names
/// outside `old_prefix` are left unchanged.
pub fn rebase(name: &mut String, old_prefix: &str, new_prefix: &str) {
    if let Some(rest) = name.strip_prefix(old_prefix) {
        *name = format!("{new_prefix}{rest}");
    }
}
