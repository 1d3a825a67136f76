//! Arena-backed layer tree.
//!
//! Layers are stored in a map keyed by [`LayerId`]; each node records its
//! parent and ordered children. Roots are kept in a separate ordered list.
//! A snapshot of the tree is a plain `clone()`.
//!
//! Invalid mutations (unknown ids, moving a layer into its own subtree,
//! inserting under a non-container, id collisions) leave the tree untouched
//! and report `false`/`None`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerPatch};
use crate::LayerId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerNode {
    pub layer: Layer,
    pub parent: Option<LayerId>,
    pub children: Vec<LayerId>,
}

/// An owned, detached subtree. Produced by removal and copy, consumed by
/// insertion; also the shape the codec reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSubtree {
    pub layer: Layer,
    pub children: Vec<LayerSubtree>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Before,
    After,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerTree {
    roots: Vec<LayerId>,
    nodes: HashMap<LayerId, LayerNode>,
}

impl LayerTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from nested subtrees. Subtrees whose ids collide with
    /// layers already placed are skipped.
    pub fn from_subtrees(subtrees: impl IntoIterator<Item = LayerSubtree>) -> Self {
        let mut tree = Self::new();
        for subtree in subtrees {
            tree.append_child(None, subtree);
        }
        tree
    }

    pub fn roots(&self) -> &[LayerId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &LayerId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.nodes.get(id).map(|n| &n.layer)
    }

    pub fn node(&self, id: &LayerId) -> Option<&LayerNode> {
        self.nodes.get(id)
    }

    pub fn parent(&self, id: &LayerId) -> Option<&LayerId> {
        self.nodes.get(id).and_then(|n| n.parent.as_ref())
    }

    pub fn children(&self, id: &LayerId) -> &[LayerId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Pre-order walk over every layer.
    pub fn iter(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// `id` plus every descendant id, pre-order.
    pub fn subtree_ids(&self, id: &LayerId) -> Vec<LayerId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current.clone());
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: &LayerId, id: &LayerId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Names of the layers sharing `parent` (`None` = roots).
    pub fn sibling_names(&self, parent: Option<&LayerId>) -> Vec<&str> {
        let ids = match parent {
            None => self.roots.as_slice(),
            Some(p) => self.children(p),
        };
        ids.iter()
            .filter_map(|id| self.get(id))
            .map(|l| l.name.as_str())
            .collect()
    }

    /// Copy out the subtree rooted at `id`.
    pub fn subtree(&self, id: &LayerId) -> Option<LayerSubtree> {
        let node = self.nodes.get(id)?;
        Some(LayerSubtree {
            layer: node.layer.clone(),
            children: node
                .children
                .iter()
                .filter_map(|c| self.subtree(c))
                .collect(),
        })
    }

    /// Copy out the whole forest in nested form.
    pub fn to_subtrees(&self) -> Vec<LayerSubtree> {
        self.roots.iter().filter_map(|id| self.subtree(id)).collect()
    }

    /// Append `subtree` as the last child of the selected layer when it can
    /// hold children, otherwise as the last root.
    pub fn insert_into_selected(&mut self, selected: Option<&LayerId>, subtree: LayerSubtree) -> bool {
        let parent = selected.filter(|id| self.get(id).is_some_and(Layer::is_container));
        self.append_child(parent, subtree)
    }

    /// Append `subtree` under `parent` (`None` = at root). The parent must be
    /// a container.
    pub fn append_child(&mut self, parent: Option<&LayerId>, subtree: LayerSubtree) -> bool {
        if let Some(p) = parent {
            if !self.get(p).is_some_and(Layer::is_container) {
                return false;
            }
        }
        if !self.can_accept(&subtree) {
            return false;
        }
        let id = self.attach(subtree, parent.cloned());
        match self.siblings_mut(parent) {
            Some(siblings) => {
                siblings.push(id);
                true
            }
            None => false,
        }
    }

    /// Insert `subtree` next to `anchor` in the anchor's sibling list.
    /// Returns whether the anchor was found.
    pub fn insert_adjacent(&mut self, anchor: &LayerId, subtree: LayerSubtree, placement: Placement) -> bool {
        let Some(parent) = self.nodes.get(anchor).map(|n| n.parent.clone()) else {
            return false;
        };
        if !self.can_accept(&subtree) {
            return false;
        }
        let id = self.attach(subtree, parent.clone());
        let Some(siblings) = self.siblings_mut(parent.as_ref()) else {
            return false;
        };
        let anchor_idx = siblings
            .iter()
            .position(|s| s == anchor)
            .unwrap_or(siblings.len().saturating_sub(1));
        let idx = match placement {
            Placement::Before => anchor_idx,
            Placement::After => anchor_idx + 1,
        };
        siblings.insert(idx.min(siblings.len()), id);
        true
    }

    /// Shallow-merge `patch` into the layer with `id`.
    pub fn update(&mut self, id: &LayerId, patch: &LayerPatch) -> bool {
        self.update_with(id, |layer| layer.apply_patch(patch))
    }

    /// Whether `patch` can apply to `id`: the layer exists and, if it has
    /// children, the patch does not turn it into a leaf kind.
    pub fn accepts_patch(&self, id: &LayerId, patch: &LayerPatch) -> bool {
        match (self.nodes.get(id), &patch.kind) {
            (None, _) => false,
            (Some(node), Some(kind)) => node.children.is_empty() || kind.is_container(),
            (Some(_), None) => true,
        }
    }

    /// Mutate a layer in place. The layer's id cannot be changed this way,
    /// and a layer with children must stay a container; a mutation that
    /// breaks that is rolled back.
    pub fn update_with(&mut self, id: &LayerId, f: impl FnOnce(&mut Layer)) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let before = node.layer.clone();
        f(&mut node.layer);
        node.layer.id = id.clone();
        if !node.children.is_empty() && !node.layer.is_container() {
            node.layer = before;
            return false;
        }
        true
    }

    /// Detach the subtree rooted at `id`, e.g. for reinsertion by a move.
    pub fn remove(&mut self, id: &LayerId) -> Option<LayerSubtree> {
        let parent = self.nodes.get(id)?.parent.clone();
        if let Some(siblings) = self.siblings_mut(parent.as_ref()) {
            siblings.retain(|s| s != id);
        }
        self.take_subtree(id)
    }

    /// Remove `id` and its whole subtree. Returns every removed id.
    pub fn delete(&mut self, id: &LayerId) -> Vec<LayerId> {
        let ids = self.subtree_ids(id);
        self.remove(id);
        ids
    }

    /// Move `id` next to `anchor`. Moving relative to itself or into its own
    /// subtree is a no-op.
    pub fn move_adjacent(&mut self, id: &LayerId, anchor: &LayerId, placement: Placement) -> bool {
        if id == anchor || !self.contains(id) || !self.contains(anchor) || self.is_ancestor(id, anchor) {
            return false;
        }
        match self.remove(id) {
            Some(subtree) => self.insert_adjacent(anchor, subtree, placement),
            None => false,
        }
    }

    /// Re-parent `id` as the last child of `parent` (`None` = root).
    pub fn move_into(&mut self, id: &LayerId, parent: Option<&LayerId>) -> bool {
        if !self.contains(id) {
            return false;
        }
        if let Some(p) = parent {
            if p == id || self.is_ancestor(id, p) || !self.get(p).is_some_and(Layer::is_container) {
                return false;
            }
        }
        match self.remove(id) {
            Some(subtree) => self.append_child(parent, subtree),
            None => false,
        }
    }

    fn can_accept(&self, subtree: &LayerSubtree) -> bool {
        let mut seen = HashSet::new();
        subtree
            .iter()
            .all(|layer| !self.nodes.contains_key(&layer.id) && seen.insert(&layer.id))
    }

    fn attach(&mut self, subtree: LayerSubtree, parent: Option<LayerId>) -> LayerId {
        let id = subtree.layer.id.clone();
        let children = subtree
            .children
            .into_iter()
            .map(|child| self.attach(child, Some(id.clone())))
            .collect();
        self.nodes.insert(
            id.clone(),
            LayerNode {
                layer: subtree.layer,
                parent,
                children,
            },
        );
        id
    }

    fn take_subtree(&mut self, id: &LayerId) -> Option<LayerSubtree> {
        let node = self.nodes.remove(id)?;
        let children = node
            .children
            .iter()
            .filter_map(|c| self.take_subtree(c))
            .collect();
        Some(LayerSubtree {
            layer: node.layer,
            children,
        })
    }

    fn siblings_mut(&mut self, parent: Option<&LayerId>) -> Option<&mut Vec<LayerId>> {
        match parent {
            None => Some(&mut self.roots),
            Some(p) => self.nodes.get_mut(p).map(|n| &mut n.children),
        }
    }
}

/// Pre-order iterator over a [`LayerTree`].
pub struct DepthFirst<'a> {
    tree: &'a LayerTree,
    stack: Vec<&'a LayerId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a Layer;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.tree.nodes.get(id) {
                self.stack.extend(node.children.iter().rev());
                return Some(&node.layer);
            }
        }
        None
    }
}

impl LayerSubtree {
    pub fn leaf(layer: Layer) -> Self {
        Self {
            layer,
            children: Vec::new(),
        }
    }

    pub fn with_children(layer: Layer, children: Vec<LayerSubtree>) -> Self {
        Self { layer, children }
    }

    /// Pre-order walk over the subtree's layers.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(&node.layer)
        })
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.iter().map(|l| l.id.clone()).collect()
    }

    pub fn asset_refs(&self) -> Vec<String> {
        self.iter().flat_map(|l| l.kind.asset_refs()).collect()
    }

    /// Clone with fresh ids, walking original and clone in parallel so each
    /// old id maps onto the clone at the same tree position.
    pub fn with_fresh_ids(&self) -> (LayerSubtree, HashMap<LayerId, LayerId>) {
        let mut map = HashMap::new();
        let cloned = self.remap(&mut map);
        (cloned, map)
    }

    fn remap(&self, map: &mut HashMap<LayerId, LayerId>) -> LayerSubtree {
        let fresh = LayerId::generate();
        map.insert(self.layer.id.clone(), fresh.clone());
        let mut layer = self.layer.clone();
        layer.id = fresh;
        LayerSubtree {
            layer,
            children: self.children.iter().map(|c| c.remap(map)).collect(),
        }
    }
}

/// Recursive clone with fresh ids for the node and its descendants, renamed
/// so it does not collide with any of `siblings`.
pub fn clone_layer_deep<'a>(node: &LayerSubtree, siblings: impl IntoIterator<Item = &'a str>) -> LayerSubtree {
    let (mut cloned, _) = node.with_fresh_ids();
    cloned.layer.name = unique_name(&node.layer.name, siblings);
    cloned
}

/// `name` if free, otherwise `<base> <n>` with the smallest free `n >= 2`,
/// where `<base>` is `name` without a trailing counter.
pub fn unique_name<'a>(name: &str, taken: impl IntoIterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = taken.into_iter().collect();
    if !taken.contains(name) {
        return name.to_string();
    }
    let base = match name.rsplit_once(' ') {
        Some((base, counter)) if !base.is_empty() && counter.parse::<u32>().is_ok() => base,
        _ => name,
    };
    (2u32..)
        .map(|n| format!("{base} {n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| format!("{base} copy"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{LayerKind, TextContent};

    fn group(id: &str, children: Vec<LayerSubtree>) -> LayerSubtree {
        LayerSubtree::with_children(Layer::new(LayerKind::Basic).with_id(id).with_name(id), children)
    }

    fn text(id: &str) -> LayerSubtree {
        LayerSubtree::leaf(
            Layer::new(LayerKind::Text(TextContent::default()))
                .with_id(id)
                .with_name(id),
        )
    }

    fn ids(tree: &LayerTree) -> Vec<&str> {
        tree.iter().map(|l| l.id.as_str()).collect()
    }

    fn sample() -> LayerTree {
        LayerTree::from_subtrees([
            group("a", vec![text("a1"), group("a2", vec![text("a2x")])]),
            text("b"),
        ])
    }

    #[test]
    fn parent_keeps_a_container_kind() {
        let mut tree = sample();
        let to_text = LayerPatch {
            kind: Some(LayerKind::Text(TextContent::default())),
            name: Some("renamed".into()),
            ..LayerPatch::default()
        };
        assert!(!tree.accepts_patch(&"a2".into(), &to_text));
        assert!(!tree.update(&"a2".into(), &to_text));
        let a2 = tree.get(&"a2".into()).unwrap();
        assert!(a2.is_container());
        assert_eq!(a2.name, "a2");

        assert!(tree.update(&"a2x".into(), &LayerPatch {
            kind: Some(LayerKind::Basic),
            ..LayerPatch::default()
        }));
        assert!(tree.accepts_patch(&"a".into(), &LayerPatch::default()));
        assert!(!tree.accepts_patch(&"missing".into(), &LayerPatch::default()));
    }

    #[test]
    fn depth_first_order() {
        assert_eq!(ids(&sample()), vec!["a", "a1", "a2", "a2x", "b"]);
    }

    #[test]
    fn insert_into_selected_container() {
        let mut tree = sample();
        assert!(tree.insert_into_selected(Some(&"a2".into()), text("new")));
        assert_eq!(tree.parent(&"new".into()), Some(&LayerId::from("a2")));
        assert_eq!(tree.children(&"a2".into()).last().map(LayerId::as_str), Some("new"));
    }

    #[test]
    fn insert_into_selected_leaf_falls_back_to_root() {
        let mut tree = sample();
        assert!(tree.insert_into_selected(Some(&"b".into()), text("new")));
        assert_eq!(tree.parent(&"new".into()), None);
        assert_eq!(tree.roots().last().map(LayerId::as_str), Some("new"));
    }

    #[test]
    fn insert_without_selection_goes_to_root() {
        let mut tree = LayerTree::new();
        assert!(tree.insert_into_selected(None, text("only")));
        assert_eq!(tree.roots(), &[LayerId::from("only")]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut tree = sample();
        let before = tree.clone();
        assert!(!tree.insert_into_selected(None, text("a1")));
        assert_eq!(tree, before);
    }

    #[test]
    fn insert_adjacent_reports_missing_anchor() {
        let mut tree = sample();
        assert!(!tree.insert_adjacent(&"nope".into(), text("x"), Placement::After));
        assert!(tree.insert_adjacent(&"a1".into(), text("x"), Placement::Before));
        assert_eq!(ids(&tree), vec!["a", "x", "a1", "a2", "a2x", "b"]);
        assert!(tree.insert_adjacent(&"b".into(), text("y"), Placement::After));
        assert_eq!(tree.roots().last().map(LayerId::as_str), Some("y"));
    }

    #[test]
    fn insert_adjacent_leaves_other_layers_untouched() {
        let mut tree = sample();
        let b_before = tree.get(&"b".into()).cloned();
        let b_parent = tree.parent(&"b".into()).cloned();
        tree.insert_adjacent(&"a2x".into(), text("z"), Placement::After);
        assert_eq!(tree.get(&"b".into()).cloned(), b_before);
        assert_eq!(tree.parent(&"b".into()).cloned(), b_parent);
    }

    #[test]
    fn update_merges_patch_and_keeps_id() {
        let mut tree = sample();
        let patch = LayerPatch {
            opacity: Some(0.3),
            name: Some("Renamed".into()),
            ..LayerPatch::default()
        };
        assert!(tree.update(&"a1".into(), &patch));
        let layer = tree.get(&"a1".into()).unwrap();
        assert_eq!(layer.opacity, 0.3);
        assert_eq!(layer.name, "Renamed");
        assert!(!tree.update(&"missing".into(), &patch));
    }

    #[test]
    fn remove_returns_detached_subtree() {
        let mut tree = sample();
        let detached = tree.remove(&"a2".into()).unwrap();
        assert_eq!(detached.ids(), vec![LayerId::from("a2"), LayerId::from("a2x")]);
        assert!(!tree.contains(&"a2x".into()));
        assert_eq!(tree.children(&"a".into()), &[LayerId::from("a1")]);
    }

    #[test]
    fn delete_reports_all_removed_ids() {
        let mut tree = sample();
        let removed = tree.delete(&"a".into());
        assert_eq!(removed.len(), 4);
        assert_eq!(ids(&tree), vec!["b"]);
        assert!(tree.delete(&"a".into()).is_empty());
    }

    #[test]
    fn move_into_own_descendant_is_noop() {
        let mut tree = sample();
        let before = tree.clone();
        assert!(!tree.move_into(&"a".into(), Some(&"a2".into())));
        assert!(!tree.move_adjacent(&"a".into(), &"a2x".into(), Placement::After));
        assert!(!tree.move_adjacent(&"a".into(), &"a".into(), Placement::After));
        assert_eq!(tree, before);
    }

    #[test]
    fn move_into_non_container_is_noop() {
        let mut tree = sample();
        let before = tree.clone();
        assert!(!tree.move_into(&"a1".into(), Some(&"b".into())));
        assert_eq!(tree, before);
    }

    #[test]
    fn move_adjacent_reorders() {
        let mut tree = sample();
        assert!(tree.move_adjacent(&"b".into(), &"a1".into(), Placement::After));
        assert_eq!(ids(&tree), vec!["a", "a1", "b", "a2", "a2x"]);
        assert_eq!(tree.parent(&"b".into()), Some(&LayerId::from("a")));
    }

    #[test]
    fn clone_deep_has_disjoint_ids_and_same_shape() {
        let tree = sample();
        let original = tree.subtree(&"a".into()).unwrap();
        let clone = clone_layer_deep(&original, tree.sibling_names(None));

        assert_eq!(clone.children.len(), original.children.len());
        assert_eq!(clone.children[1].children.len(), 1);
        let original_ids: HashSet<_> = original.ids().into_iter().collect();
        assert!(clone.ids().iter().all(|id| !original_ids.contains(id)));
        assert_eq!(clone.layer.name, "a 2");
    }

    #[test]
    fn fresh_id_map_follows_tree_positions() {
        let tree = sample();
        let original = tree.subtree(&"a".into()).unwrap();
        let (clone, map) = original.with_fresh_ids();
        assert_eq!(map.len(), 4);
        assert_eq!(map[&LayerId::from("a2x")], clone.children[1].children[0].layer.id);
    }

    #[test]
    fn unique_name_bumps_counter() {
        assert_eq!(unique_name("Layer", ["Other"]), "Layer");
        assert_eq!(unique_name("Layer", ["Layer"]), "Layer 2");
        assert_eq!(unique_name("Layer 2", ["Layer", "Layer 2"]), "Layer 3");
        assert_eq!(unique_name("Layer", ["Layer", "Layer 2", "Layer 3"]), "Layer 4");
    }
}
