//! Pure state-mutation reducers for CA views.
//!
//! These functions are the single source of truth for action → view
//! mutations. Reducers are pure: they mutate the [`CaView`] (or, for
//! project edits, the `ProjectMeta`) they are handed and nothing else.
//! They do NOT:
//! - Push undo snapshots
//! - Schedule persistence
//! - Touch asset blobs

pub mod layers;
pub mod project;
pub mod states;
pub mod transitions;

pub use project::reduce_project;
pub use states::{effective_layer, resolve_state_key, StateWrite};
pub use transitions::{derive_transitions, SpringAnimation, StateTransition, TransitionElement, STATE_SPRING};

use crate::action::{LayerAction, StateAction, ViewAction};
use crate::layer::Size;
use crate::state::view::CaView;

/// Apply a view action. `canvas` is the project size, used to center layers
/// added at root. Returns false when the action was a no-op (unknown ids,
/// invalid moves).
pub fn reduce_view(action: &ViewAction, view: &mut CaView, canvas: Size) -> bool {
    match action {
        ViewAction::Layer(a) => reduce_layer(a, view, canvas),
        ViewAction::State(a) => reduce_state(a, view),
    }
}

fn reduce_layer(action: &LayerAction, view: &mut CaView, canvas: Size) -> bool {
    match action {
        LayerAction::Add(layer) => layers::add_layer(view, layer.clone(), canvas).is_some(),
        LayerAction::Update(id, patch) => states::apply_patch(view, id, patch),
        LayerAction::SetProperty(id, key, value) => states::write_property(view, id, *key, *value),
        LayerAction::Delete(id) => !layers::delete_layer(view, id).is_empty(),
        LayerAction::Duplicate(id) => layers::duplicate_layer(view, id).is_some(),
        LayerAction::Select(id) => layers::select(view, id.as_ref()),
        LayerAction::MoveAdjacent(id, anchor, placement) => {
            view.tree.move_adjacent(id, anchor, *placement)
        }
        LayerAction::MoveInto(id, parent) => view.tree.move_into(id, parent.as_ref()),
    }
}

fn reduce_state(action: &StateAction, view: &mut CaView) -> bool {
    match action {
        StateAction::SetActive(name) => states::set_active_state(view, name),
        StateAction::SetAppearanceSplit(enabled) => {
            states::set_appearance_split(view, *enabled);
            true
        }
        StateAction::SetAppearance(mode) => {
            states::set_appearance(view, *mode);
            true
        }
        StateAction::WriteOverrides(writes) => states::write_overrides_batch(view, writes) > 0,
        StateAction::ClearOverride {
            state,
            target,
            key_path,
        } => states::clear_override(view, state, target, *key_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{Layer, LayerKind};
    use crate::state::{KeyPath, PropertyOverride, ViewKind};
    use crate::tree::Placement;

    const CANVAS: Size = Size::new(100.0, 100.0);

    fn add(view: &mut CaView, kind: LayerKind) -> crate::LayerId {
        let layer = Layer::new(kind);
        let id = layer.id.clone();
        assert!(reduce_view(&ViewAction::Layer(LayerAction::Add(layer)), view, CANVAS));
        id
    }

    #[test]
    fn locked_opacity_write_goes_to_override() {
        let mut view = CaView::new(ViewKind::Floating);
        let id = add(&mut view, LayerKind::Basic);
        reduce_view(
            &ViewAction::State(StateAction::SetActive("Locked".into())),
            &mut view,
            CANVAS,
        );
        reduce_view(
            &ViewAction::Layer(LayerAction::SetProperty(id.clone(), KeyPath::Opacity, 0.5)),
            &mut view,
            CANVAS,
        );
        assert_eq!(view.tree.get(&id).unwrap().opacity, 1.0);
        assert!(view
            .overrides("Locked")
            .contains(&PropertyOverride::new(id, KeyPath::Opacity, 0.5)));
    }

    #[test]
    fn invalid_move_reports_noop() {
        let mut view = CaView::new(ViewKind::Floating);
        let id = add(&mut view, LayerKind::Basic);
        let action = ViewAction::Layer(LayerAction::MoveAdjacent(id.clone(), id, Placement::After));
        let before = view.clone();
        assert!(!reduce_view(&action, &mut view, CANVAS));
        assert_eq!(view, before);
    }
}
