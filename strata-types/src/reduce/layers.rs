//! View-level layer mutations: the tree operations plus the bookkeeping a
//! CA view needs around them (selection, override cascade, placement).

use crate::layer::{Layer, Point, Size};
use crate::state::view::CaView;
use crate::tree::{unique_name, LayerSubtree, Placement};
use crate::LayerId;

use super::states;

/// Add a layer under the selected container (or at root), centered in that
/// parent's bounds or the canvas. The new layer becomes selected.
pub fn add_layer(view: &mut CaView, mut layer: Layer, canvas: Size) -> Option<LayerId> {
    let parent = view
        .selected
        .as_ref()
        .and_then(|id| view.tree.get(id))
        .filter(|l| l.is_container());
    let bounds = parent.map(|p| p.size).unwrap_or(canvas);
    layer.position = Point::new(bounds.width / 2.0, bounds.height / 2.0);
    layer.name = unique_name(
        &layer.name,
        view.tree.sibling_names(parent.map(|p| &p.id)),
    );
    let id = layer.id.clone();
    let selected = view.selected.clone();
    if !view
        .tree
        .insert_into_selected(selected.as_ref(), LayerSubtree::leaf(layer))
    {
        return None;
    }
    view.selected = Some(id.clone());
    Some(id)
}

/// Delete a layer with its subtree. Clears the selection when it pointed into
/// the removed subtree and drops every override targeting a removed id.
pub fn delete_layer(view: &mut CaView, id: &LayerId) -> Vec<LayerId> {
    let removed = view.tree.delete(id);
    if removed.is_empty() {
        return removed;
    }
    if view.selected.as_ref().is_some_and(|s| removed.contains(s)) {
        view.selected = None;
    }
    states::remove_overrides_for(view, &removed);
    removed
}

/// Clone a layer and its subtree next to the original. The clone gets fresh
/// ids, a unique name and copies of the original's overrides.
pub fn duplicate_layer(view: &mut CaView, id: &LayerId) -> Option<LayerId> {
    let original = view.tree.subtree(id)?;
    let parent = view.tree.parent(id).cloned();
    let (mut clone, map) = original.with_fresh_ids();
    clone.layer.name = unique_name(&original.layer.name, view.tree.sibling_names(parent.as_ref()));
    let new_id = clone.layer.id.clone();
    if !view.tree.insert_adjacent(id, clone, Placement::After) {
        return None;
    }
    states::copy_overrides(view, &map);
    view.selected = Some(new_id.clone());
    Some(new_id)
}

/// Select a layer, or clear the selection with `None`. Unknown ids are
/// ignored.
pub fn select(view: &mut CaView, id: Option<&LayerId>) -> bool {
    match id {
        Some(id) if !view.tree.contains(id) => false,
        _ => {
            view.selected = id.cloned();
            true
        }
    }
}
