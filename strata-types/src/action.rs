//! Edit actions. The controller dispatches these; [`crate::reduce`] applies
//! the pure part of each to a view.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::layer::{Layer, LayerPatch};
use crate::reduce::StateWrite;
use crate::state::view::Appearance;
use crate::state::{KeyPath, ViewKind};
use crate::tree::Placement;
use crate::LayerId;

/// Layer tree edits within one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerAction {
    Add(Layer),
    Update(LayerId, LayerPatch),
    SetProperty(LayerId, KeyPath, f64),
    Delete(LayerId),
    Duplicate(LayerId),
    Select(Option<LayerId>),
    MoveAdjacent(LayerId, LayerId, Placement),
    MoveInto(LayerId, Option<LayerId>),
}

/// State & appearance edits within one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateAction {
    SetActive(String),
    SetAppearanceSplit(bool),
    SetAppearance(Appearance),
    WriteOverrides(Vec<StateWrite>),
    ClearOverride {
        state: String,
        target: LayerId,
        key_path: KeyPath,
    },
}

/// Edits scoped to a single CA view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewAction {
    Layer(LayerAction),
    State(StateAction),
}

/// Project metadata edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectAction {
    Rename(String),
    Resize { width: f64, height: f64 },
    SetBackground(Color),
    SetGeometryFlipped(bool),
    SetGyroEnabled(bool),
}

/// Everything the document controller can be asked to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainAction {
    View(ViewKind, ViewAction),
    Project(ProjectAction),
    Copy(ViewKind, Vec<LayerId>),
    Paste(ViewKind),
    Undo,
    Redo,
}

impl DomainAction {
    /// Whether dispatching this action records an undo snapshot.
    pub fn is_undoable(&self) -> bool {
        match self {
            DomainAction::View(_, ViewAction::Layer(LayerAction::Select(_))) => false,
            DomainAction::View(_, ViewAction::State(StateAction::SetActive(_))) => false,
            DomainAction::View(_, ViewAction::State(StateAction::SetAppearance(_))) => false,
            DomainAction::Copy(..) | DomainAction::Undo | DomainAction::Redo => false,
            DomainAction::View(..) | DomainAction::Project(_) | DomainAction::Paste(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_moves_are_not_undoable() {
        let select = DomainAction::View(ViewKind::Floating, ViewAction::Layer(LayerAction::Select(None)));
        assert!(!select.is_undoable());
        let state = DomainAction::View(
            ViewKind::Floating,
            ViewAction::State(StateAction::SetActive("Locked".into())),
        );
        assert!(!state.is_undoable());
        assert!(!DomainAction::Undo.is_undoable());
    }

    #[test]
    fn edits_are_undoable() {
        let delete = DomainAction::View(
            ViewKind::Background,
            ViewAction::Layer(LayerAction::Delete("x".into())),
        );
        assert!(delete.is_undoable());
        assert!(DomainAction::Paste(ViewKind::Floating).is_undoable());
        assert!(DomainAction::Project(ProjectAction::Rename("n".into())).is_undoable());
    }
}
