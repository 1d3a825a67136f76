//! State & override engine.
//!
//! The base layer holds the default appearance; every named state is a diff
//! expressed as `(target, key path, value)` overrides. While a named state is
//! active, numeric property writes land in that state's override list.
//! Structural edits always hit the base layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerPatch};
use crate::state::view::{split_variant, variant_name, Appearance, CaView, BASE_STATE};
use crate::state::{KeyPath, PropertyOverride};
use crate::LayerId;

/// A single entry of a batch override write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateWrite {
    pub state: String,
    pub target: LayerId,
    pub key_path: KeyPath,
    pub value: f64,
}

/// Map a requested state name onto the key actually stored for this view:
/// bare names gain the current appearance suffix under split, variant names
/// lose it when not split.
pub fn resolve_state_key(view: &CaView, name: &str) -> String {
    if name == BASE_STATE {
        return name.to_string();
    }
    let (bare, variant) = split_variant(name);
    match (view.appearance_split, variant) {
        (true, None) => variant_name(bare, view.appearance),
        (false, Some(_)) => bare.to_string(),
        _ => name.to_string(),
    }
}

/// Switch the active state. Unknown names are ignored.
pub fn set_active_state(view: &mut CaView, name: &str) -> bool {
    let key = resolve_state_key(view, name);
    if key != BASE_STATE && !view.state_names.contains(&key) {
        return false;
    }
    view.active_state = key;
    true
}

/// Insert or replace the override for `(target, key_path)`; never appends a
/// duplicate.
pub fn upsert_override(list: &mut Vec<PropertyOverride>, target: &LayerId, key_path: KeyPath, value: f64) {
    match list
        .iter_mut()
        .find(|o| &o.target_id == target && o.key_path == key_path)
    {
        Some(existing) => existing.value = value,
        None => list.push(PropertyOverride::new(target.clone(), key_path, value)),
    }
}

/// Write one numeric property, redirected into the active state when it is
/// not the base state.
pub fn write_property(view: &mut CaView, target: &LayerId, key_path: KeyPath, value: f64) -> bool {
    if !view.tree.contains(target) {
        return false;
    }
    if view.is_base_active() {
        return view
            .tree
            .update_with(target, |layer| layer.set_property(key_path, value));
    }
    let state = view.active_state.clone();
    let list = view.state_overrides.entry(state).or_default();
    upsert_override(list, target, key_path, value);
    true
}

/// Apply a layer patch: numeric fields follow [`write_property`], everything
/// else is written to the base layer.
pub fn apply_patch(view: &mut CaView, target: &LayerId, patch: &LayerPatch) -> bool {
    if !view.tree.accepts_patch(target, patch) {
        return false;
    }
    let (numeric, structural) = patch.split_numeric();
    for (key_path, value) in numeric {
        write_property(view, target, key_path, value);
    }
    if !structural.is_empty() {
        view.tree.update(target, &structural);
    }
    true
}

/// Write many overrides in one call. Under split, a bare state name fans
/// the same value into both the Light and Dark variant. Writes addressed to
/// the base state land on the base layer.
pub fn write_overrides_batch(view: &mut CaView, writes: &[StateWrite]) -> usize {
    let mut applied = 0;
    for write in writes {
        if !view.tree.contains(&write.target) {
            continue;
        }
        if write.state == BASE_STATE {
            view.tree
                .update_with(&write.target, |l| l.set_property(write.key_path, write.value));
            applied += 1;
            continue;
        }
        for key in fan_out(view, &write.state) {
            let list = view.state_overrides.entry(key).or_default();
            upsert_override(list, &write.target, write.key_path, write.value);
            applied += 1;
        }
    }
    applied
}

fn fan_out(view: &CaView, state: &str) -> Vec<String> {
    let (bare, variant) = split_variant(state);
    let keys = match (view.appearance_split, variant) {
        (true, None) => vec![
            variant_name(bare, Appearance::Light),
            variant_name(bare, Appearance::Dark),
        ],
        (false, Some(_)) => vec![bare.to_string()],
        _ => vec![state.to_string()],
    };
    keys.into_iter()
        .filter(|k| view.state_names.contains(k))
        .collect()
}

/// Remove one override. Returns whether anything was removed.
pub fn clear_override(view: &mut CaView, state: &str, target: &LayerId, key_path: KeyPath) -> bool {
    let Some(list) = view.state_overrides.get_mut(state) else {
        return false;
    };
    let before = list.len();
    list.retain(|o| !(&o.target_id == target && o.key_path == key_path));
    list.len() != before
}

/// Drop every override, in every state, targeting one of `ids`.
pub fn remove_overrides_for(view: &mut CaView, ids: &[LayerId]) {
    for list in view.state_overrides.values_mut() {
        list.retain(|o| !ids.contains(&o.target_id));
    }
}

/// Expand every state into Light/Dark variants (seeded with identical
/// overrides), or collapse back keeping the variant matching the current
/// appearance.
pub fn set_appearance_split(view: &mut CaView, enabled: bool) {
    if view.appearance_split == enabled {
        return;
    }
    if enabled {
        let mut names = Vec::with_capacity(view.state_names.len() * 2);
        let mut overrides = BTreeMap::new();
        for bare in &view.state_names {
            let list = view.state_overrides.get(bare).cloned().unwrap_or_default();
            for appearance in [Appearance::Light, Appearance::Dark] {
                let key = variant_name(bare, appearance);
                names.push(key.clone());
                overrides.insert(key, list.clone());
            }
        }
        view.state_names = names;
        view.state_overrides = overrides;
    } else {
        let (preferred, fallback) = match view.appearance {
            Appearance::Dark => (Appearance::Dark, Appearance::Light),
            Appearance::Light => (Appearance::Light, Appearance::Dark),
        };
        let mut names: Vec<String> = Vec::new();
        let mut overrides = BTreeMap::new();
        for name in &view.state_names {
            let bare = split_variant(name).0.to_string();
            if names.contains(&bare) {
                continue;
            }
            let list = view
                .state_overrides
                .get(&variant_name(&bare, preferred))
                .or_else(|| view.state_overrides.get(&variant_name(&bare, fallback)))
                .cloned()
                .unwrap_or_default();
            overrides.insert(bare.clone(), list);
            names.push(bare);
        }
        view.state_names = names;
        view.state_overrides = overrides;
    }
    view.appearance_split = enabled;
    if !view.is_base_active() {
        let bare = split_variant(&view.active_state).0.to_string();
        view.active_state = resolve_state_key(view, &bare);
    }
}

/// Change the light/dark mode. Under split, an active variant follows the
/// new mode.
pub fn set_appearance(view: &mut CaView, appearance: Appearance) {
    view.appearance = appearance;
    if view.appearance_split && !view.is_base_active() {
        let bare = split_variant(&view.active_state).0.to_string();
        view.active_state = variant_name(&bare, appearance);
    }
}

/// The layer as it appears in the active state: base values with the
/// active state's overrides applied.
pub fn effective_layer(view: &CaView, id: &LayerId) -> Option<Layer> {
    let mut layer = view.tree.get(id)?.clone();
    if !view.is_base_active() {
        for o in view.overrides(&view.active_state) {
            if &o.target_id == id {
                layer.set_property(o.key_path, o.value);
            }
        }
    }
    Some(layer)
}

/// Duplicate the overrides of mapped layers onto their counterparts.
pub fn copy_overrides(view: &mut CaView, map: &std::collections::HashMap<LayerId, LayerId>) {
    for list in view.state_overrides.values_mut() {
        let copies: Vec<PropertyOverride> = list
            .iter()
            .filter_map(|o| {
                map.get(&o.target_id)
                    .map(|new_id| PropertyOverride::new(new_id.clone(), o.key_path, o.value))
            })
            .collect();
        for copy in copies {
            upsert_override(list, &copy.target_id, copy.key_path, copy.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{LayerKind, Point};
    use crate::state::ViewKind;
    use crate::tree::LayerSubtree;

    fn view_with_layer() -> (CaView, LayerId) {
        let mut view = CaView::new(ViewKind::Floating);
        let layer = Layer::new(LayerKind::Basic);
        let id = layer.id.clone();
        view.tree.insert_into_selected(None, LayerSubtree::leaf(layer));
        (view, id)
    }

    #[test]
    fn group_with_children_cannot_become_a_leaf() {
        let (mut view, group) = view_with_layer();
        let child = Layer::new(LayerKind::Basic);
        let child_id = child.id.clone();
        view.tree.append_child(Some(&group), LayerSubtree::leaf(child));

        let patch = LayerPatch {
            kind: Some(LayerKind::Text(Default::default())),
            opacity: Some(0.3),
            ..LayerPatch::default()
        };
        assert!(!apply_patch(&mut view, &group, &patch));
        let layer = view.tree.get(&group).unwrap();
        assert!(layer.is_container());
        assert_eq!(layer.opacity, 1.0);
        assert_eq!(view.tree.children(&group), &[child_id.clone()]);

        // Container to container, and leaf to leaf, still apply.
        let to_transform = LayerPatch {
            kind: Some(LayerKind::Transform),
            ..LayerPatch::default()
        };
        assert!(apply_patch(&mut view, &group, &to_transform));
        let to_text = LayerPatch {
            kind: Some(LayerKind::Text(Default::default())),
            ..LayerPatch::default()
        };
        assert!(apply_patch(&mut view, &child_id, &to_text));
        assert!(!view.tree.get(&child_id).unwrap().is_container());
    }

    #[test]
    fn base_state_writes_hit_the_layer() {
        let (mut view, id) = view_with_layer();
        assert!(write_property(&mut view, &id, KeyPath::Opacity, 0.4));
        assert_eq!(view.tree.get(&id).unwrap().opacity, 0.4);
        assert!(view.state_overrides.values().all(Vec::is_empty));
    }

    #[test]
    fn named_state_writes_become_overrides() {
        let (mut view, id) = view_with_layer();
        assert!(set_active_state(&mut view, "Locked"));
        write_property(&mut view, &id, KeyPath::Opacity, 0.5);
        write_property(&mut view, &id, KeyPath::Opacity, 0.6);

        assert_eq!(view.tree.get(&id).unwrap().opacity, 1.0);
        assert_eq!(
            view.overrides("Locked"),
            &[PropertyOverride::new(id.clone(), KeyPath::Opacity, 0.6)]
        );
        assert_eq!(effective_layer(&view, &id).unwrap().opacity, 0.6);
    }

    #[test]
    fn structural_patch_ignores_active_state() {
        let (mut view, id) = view_with_layer();
        set_active_state(&mut view, "Sleep");
        let patch = LayerPatch {
            name: Some("Moved".into()),
            position: Some(Point::new(10.0, 20.0)),
            ..LayerPatch::default()
        };
        assert!(apply_patch(&mut view, &id, &patch));
        let base = view.tree.get(&id).unwrap();
        assert_eq!(base.name, "Moved");
        assert_eq!(base.position, Point::new(50.0, 50.0));
        assert_eq!(view.overrides("Sleep").len(), 2);
    }

    #[test]
    fn unknown_state_is_rejected() {
        let (mut view, _) = view_with_layer();
        assert!(!set_active_state(&mut view, "Charging"));
        assert!(view.is_base_active());
    }

    #[test]
    fn split_seeds_both_variants() {
        let (mut view, id) = view_with_layer();
        set_active_state(&mut view, "Locked");
        write_property(&mut view, &id, KeyPath::CornerRadius, 8.0);

        set_appearance_split(&mut view, true);
        assert_eq!(view.state_names.len(), 6);
        assert_eq!(view.overrides("Locked Light"), view.overrides("Locked Dark"));
        assert_eq!(view.overrides("Locked Light").len(), 1);
        assert_eq!(view.active_state, "Locked Light");
    }

    #[test]
    fn split_then_collapse_is_identity() {
        let (mut view, id) = view_with_layer();
        set_active_state(&mut view, "Unlock");
        write_property(&mut view, &id, KeyPath::PositionX, 3.0);
        let names = view.state_names.clone();
        let overrides = view.state_overrides.clone();

        set_appearance_split(&mut view, true);
        set_appearance_split(&mut view, false);
        assert_eq!(view.state_names, names);
        assert_eq!(view.state_overrides, overrides);
        assert_eq!(view.active_state, "Unlock");
    }

    #[test]
    fn collapse_prefers_dark_in_dark_mode() {
        let (mut view, id) = view_with_layer();
        set_appearance_split(&mut view, true);
        set_appearance(&mut view, Appearance::Dark);
        write_overrides_batch(
            &mut view,
            &[
                StateWrite {
                    state: "Locked Light".into(),
                    target: id.clone(),
                    key_path: KeyPath::Opacity,
                    value: 0.1,
                },
                StateWrite {
                    state: "Locked Dark".into(),
                    target: id.clone(),
                    key_path: KeyPath::Opacity,
                    value: 0.9,
                },
            ],
        );
        set_appearance_split(&mut view, false);
        assert_eq!(view.overrides("Locked")[0].value, 0.9);
    }

    #[test]
    fn bare_batch_fans_out_under_split() {
        let (mut view, id) = view_with_layer();
        set_appearance_split(&mut view, true);
        let applied = write_overrides_batch(
            &mut view,
            &[StateWrite {
                state: "Sleep".into(),
                target: id.clone(),
                key_path: KeyPath::ZPosition,
                value: 5.0,
            }],
        );
        assert_eq!(applied, 2);
        assert_eq!(view.overrides("Sleep Light")[0].value, 5.0);
        assert_eq!(view.overrides("Sleep Dark")[0].value, 5.0);
    }

    #[test]
    fn appearance_change_moves_active_variant() {
        let (mut view, _) = view_with_layer();
        set_appearance_split(&mut view, true);
        set_active_state(&mut view, "Sleep");
        assert_eq!(view.active_state, "Sleep Light");
        set_appearance(&mut view, Appearance::Dark);
        assert_eq!(view.active_state, "Sleep Dark");
    }

    #[test]
    fn remove_overrides_cascades_over_states() {
        let (mut view, id) = view_with_layer();
        for state in ["Locked", "Unlock"] {
            set_active_state(&mut view, state);
            write_property(&mut view, &id, KeyPath::Opacity, 0.2);
        }
        remove_overrides_for(&mut view, &[id.clone()]);
        assert!(view.state_overrides.values().all(Vec::is_empty));
    }

    #[test]
    fn clear_override_removes_single_entry() {
        let (mut view, id) = view_with_layer();
        set_active_state(&mut view, "Locked");
        write_property(&mut view, &id, KeyPath::Opacity, 0.2);
        write_property(&mut view, &id, KeyPath::ZPosition, 2.0);
        assert!(clear_override(&mut view, "Locked", &id, KeyPath::Opacity));
        assert!(!clear_override(&mut view, "Locked", &id, KeyPath::Opacity));
        assert_eq!(view.overrides("Locked").len(), 1);
    }
}
