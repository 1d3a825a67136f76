//! Action types for the document controller.
//!
//! The action enums live in strata-types next to their reducers. This module
//! adds the dispatch result, which describes what a dispatch did.

pub use strata_types::{DomainAction, LayerAction, ProjectAction, StateAction, ViewAction};

use strata_types::LayerId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchResult {
    /// The document was replaced.
    pub changed: bool,
    /// An undo snapshot was pushed.
    pub recorded: bool,
    /// A debounced save was scheduled.
    pub save_scheduled: bool,
    /// Ids of layers created by a paste.
    pub pasted: Vec<LayerId>,
    /// Human-readable note for the host (e.g. why a paste was refused).
    pub status: Option<String>,
}

impl DispatchResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_status(message: impl Into<String>) -> Self {
        Self {
            status: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn applied(recorded: bool) -> Self {
        Self {
            changed: true,
            recorded,
            save_scheduled: recorded,
            ..Self::default()
        }
    }
}
