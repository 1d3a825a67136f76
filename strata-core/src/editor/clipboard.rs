//! Copy and paste, within a view or across views.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use strata_types::reduce::states::upsert_override;
use strata_types::tree::unique_name;
use strata_types::{
    split_variant, variant_name, Appearance, CaView, ClipboardContents, Layer, LayerId,
    PropertyOverride, ViewKind,
};

use super::DocumentController;
use crate::action::DispatchResult;
use crate::error::Result;
use crate::store::{paths, ProjectStore};

impl<S: ProjectStore> DocumentController<S> {
    /// Capture `ids` (and their subtrees) with the assets and overrides they
    /// reference. Ids nested under another copied id are folded into it.
    pub(super) fn copy(&mut self, kind: ViewKind, ids: &[LayerId]) -> DispatchResult {
        let view = self.document.view(kind);
        let mut roots: Vec<&LayerId> = Vec::new();
        for id in ids {
            let nested = ids.iter().any(|other| view.tree.is_ancestor(other, id));
            if view.tree.contains(id) && !nested && !roots.contains(&id) {
                roots.push(id);
            }
        }
        let layers: Vec<_> = roots.iter().filter_map(|id| view.tree.subtree(id)).collect();
        if layers.is_empty() {
            return DispatchResult::with_status("nothing to copy");
        }

        let copied: HashSet<LayerId> = layers.iter().flat_map(|s| s.ids()).collect();
        let assets: BTreeSet<String> = layers.iter().flat_map(|s| s.asset_refs()).collect();
        let overrides: BTreeMap<String, Vec<PropertyOverride>> = view
            .state_overrides
            .iter()
            .filter_map(|(state, list)| {
                let kept: Vec<PropertyOverride> = list
                    .iter()
                    .filter(|o| copied.contains(&o.target_id))
                    .cloned()
                    .collect();
                (!kept.is_empty()).then(|| (state.clone(), kept))
            })
            .collect();

        log::debug!(target: "editor", "copied {} layer(s) from {}", layers.len(), kind);
        self.clipboard.contents = Some(ClipboardContents {
            layers,
            source_view: kind,
            assets: assets.into_iter().collect(),
            overrides,
        });
        DispatchResult::none()
    }

    /// Paste the clipboard into `kind` under the selected container (or at
    /// root). Pasting from another view copies the referenced asset blobs
    /// first; the document only changes once they are written.
    pub(super) fn paste(&mut self, kind: ViewKind) -> DispatchResult {
        let Some(contents) = self.clipboard.contents.clone() else {
            return DispatchResult::with_status("clipboard is empty");
        };
        if contents.source_view != kind {
            if let Err(e) = self.copy_assets(&contents.assets, contents.source_view, kind) {
                log::warn!(target: "editor", "paste aborted, asset copy failed: {}", e);
                return DispatchResult::with_status(format!("paste failed: {e}"));
            }
        }

        let mut next = self.document.clone();
        let view = next.view_mut(kind);
        let parent = view
            .selected
            .clone()
            .filter(|id| view.tree.get(id).is_some_and(Layer::is_container));
        let mut id_map = HashMap::new();
        let mut pasted = Vec::new();
        for subtree in &contents.layers {
            let (mut fresh, map) = subtree.with_fresh_ids();
            fresh.layer.name = unique_name(&fresh.layer.name, view.tree.sibling_names(parent.as_ref()));
            let id = fresh.layer.id.clone();
            if view.tree.append_child(parent.as_ref(), fresh) {
                pasted.push(id);
                id_map.extend(map);
            }
        }
        if pasted.is_empty() {
            return DispatchResult::none();
        }
        paste_overrides(view, &contents.overrides, &id_map);
        view.selected = pasted.last().cloned();

        let mut result = self.commit(next, true, true);
        result.pasted = pasted;
        result
    }

    fn copy_assets(&mut self, assets: &[String], from: ViewKind, to: ViewKind) -> Result<()> {
        let meta = &self.document.meta;
        for filename in assets {
            let source = paths::asset(meta, from, filename);
            match self.store.read_blob(&meta.id, &source)? {
                Some(blob) => {
                    self.store
                        .put_blob_file(&meta.id, &paths::asset(meta, to, filename), &blob)?;
                }
                None => {
                    log::warn!(target: "editor", "asset {} has no stored blob, keeping reference", source);
                }
            }
        }
        Ok(())
    }
}

/// Re-target copied overrides onto the pasted ids, into states the
/// destination has. A bare state lands on both variants of a split view; a
/// variant lands on its bare state in an unsplit view.
fn paste_overrides(
    view: &mut CaView,
    overrides: &BTreeMap<String, Vec<PropertyOverride>>,
    id_map: &HashMap<LayerId, LayerId>,
) {
    for (state, list) in overrides {
        for key in destination_states(view, state) {
            let Some(dest) = view.state_overrides.get_mut(&key) else {
                continue;
            };
            for o in list {
                if let Some(new_id) = id_map.get(&o.target_id) {
                    upsert_override(dest, new_id, o.key_path, o.value);
                }
            }
        }
    }
}

fn destination_states(view: &CaView, state: &str) -> Vec<String> {
    if view.state_overrides.contains_key(state) {
        return vec![state.to_string()];
    }
    match split_variant(state) {
        (bare, Some(_)) => vec![bare.to_string()],
        (bare, None) => [Appearance::Light, Appearance::Dark]
            .into_iter()
            .map(|a| variant_name(bare, a))
            .collect(),
    }
}
