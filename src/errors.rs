//! Error Types
//!
//! This module defines the error types used throughout the loader.
//!
//! # Overview
//!
//! The main error type [`YasfError`] covers every way a document can be
//! rejected:
//! - Schema violations (unknown, missing or mistyped attributes)
//! - Dangling references to nodes, materials, textures or cameras
//! - Structural problems (missing root id, missing children block, unknown kinds)
//! - Duplicate ids within a category
//! - Cycles in the node graph
//!
//! Every failure is fatal for the current load. No partial scene is ever
//! returned to the caller.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, YasfError>`.
//!
//! ```rust,ignore
//! use yasf::errors::{YasfError, Result};
//!
//! fn load() -> Result<()> {
//!     let data = yasf::SceneLoader::default().load_str(r#"{"yasf": {}}"#)?;
//!     Ok(())
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// Attribute-level validation failures produced by the deserializer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    /// The element carries an attribute that is not in its descriptor table.
    #[error("unknown attribute '{attribute}' on element '{element}'")]
    UnknownAttribute {
        /// Id (or key path) of the offending element
        element: String,
        /// The unexpected attribute name
        attribute: String,
    },

    /// A required attribute is absent.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingRequired { element: String, attribute: String },

    /// An attribute is present but its value has the wrong shape.
    #[error("attribute '{attribute}' on element '{element}' must be {expected}")]
    TypeMismatch {
        element: String,
        attribute: String,
        /// Human readable description of the accepted shape
        expected: &'static str,
    },
}

/// Category of a dangling reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Node,
    Material,
    Texture,
    Camera,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Node => "node",
            Self::Material => "material",
            Self::Texture => "texture",
            Self::Camera => "camera",
        })
    }
}

/// Id namespace used for uniqueness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Texture,
    Material,
    Camera,
    Light,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Texture => "texture",
            Self::Material => "material",
            Self::Camera => "camera",
            Self::Light => "light",
        })
    }
}

/// The main error type for the YASF loader.
///
/// Each variant carries the offending element id and, where it applies,
/// the attribute or child name that triggered it.
#[derive(Error, Debug)]
pub enum YasfError {
    // ========================================================================
    // Schema Errors
    // ========================================================================
    /// An element failed descriptor validation.
    #[error("Schema violation: {0}")]
    Schema(#[from] SchemaViolation),

    // ========================================================================
    // Graph Errors
    // ========================================================================
    /// A reference names an id that does not exist in its category.
    #[error("Dangling {kind} reference '{id}' from '{from}'")]
    Reference {
        kind: ReferenceKind,
        /// The missing id
        id: String,
        /// The element holding the reference
        from: String,
    },

    /// The document shape is wrong in a way no descriptor covers.
    #[error("Structural error in '{element}': {reason}")]
    Structural { element: String, reason: String },

    /// Two entities of the same category share an id.
    #[error("Duplicate {category} id '{id}'")]
    DuplicateId { category: Category, id: String },

    /// A node references itself directly or through one of its ancestors.
    #[error("Cycle detected: node '{id}' is reachable from itself (via '{from}')")]
    Cycle { id: String, from: String },

    // ========================================================================
    // Input Errors
    // ========================================================================
    /// The textual input is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl YasfError {
    pub(crate) fn structural(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Structural {
            element: element.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn reference(
        kind: ReferenceKind,
        id: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self::Reference {
            kind,
            id: id.into(),
            from: from.into(),
        }
    }

    pub(crate) fn unknown_attribute(element: &str, attribute: &str) -> Self {
        SchemaViolation::UnknownAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
        .into()
    }

    pub(crate) fn missing(element: &str, attribute: &str) -> Self {
        SchemaViolation::MissingRequired {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
        .into()
    }

    pub(crate) fn mismatch(element: &str, attribute: &str, expected: &'static str) -> Self {
        SchemaViolation::TypeMismatch {
            element: element.to_string(),
            attribute: attribute.to_string(),
            expected,
        }
        .into()
    }

    /// Returns the schema violation, if this error is one.
    #[must_use]
    pub fn as_schema(&self) -> Option<&SchemaViolation> {
        match self {
            Self::Schema(v) => Some(v),
            _ => None,
        }
    }
}

/// Alias for `Result<T, YasfError>`.
pub type Result<T> = std::result::Result<T, YasfError>;
