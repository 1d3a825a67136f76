//! # strata-types
//!
//! Shared type definitions for the Strata wallpaper-scene editor.
//! This crate holds the document model (layers, CA views, projects, overrides)
//! together with the pure tree and state reducers that operate on it.
//! Nothing in here performs I/O.

pub mod action;
pub mod color;
pub mod layer;
pub mod reduce;
pub mod state;
pub mod tree;

pub use action::{DomainAction, LayerAction, ProjectAction, StateAction, ViewAction};
pub use color::Color;
pub use layer::*;
pub use state::*;
pub use tree::{LayerNode, LayerSubtree, LayerTree, Placement};

/// Unique identifier for a layer. Unique within one CA view's tree.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Allocate a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
