// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The node registry.
//!
//! An [`EditorState`] maps every node key to the current version of that
//! node. Versions are shared between states through [`Arc`], so the
//! pending state of a transaction starts as a cheap copy of the committed
//! one and only diverges for the nodes that get written.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dom::nodes::Node;
use crate::{NodeKey, NodeLookup, RangeSelection};

#[derive(Clone, Debug)]
pub struct EditorState {
    pub(crate) nodes: HashMap<NodeKey, Arc<Node>>,
    pub(crate) selection: Option<RangeSelection>,
}

impl EditorState {
    /// A state holding nothing but an empty root.
    pub fn new() -> Self {
        let root = Node::root();
        Self {
            nodes: HashMap::from([(root.key(), Arc::new(root))]),
            selection: None,
        }
    }

    /// Number of nodes in the registry, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// The shared version of a node. Two states that return pointer-equal
    /// versions for a key agree on that node without having copied it.
    pub fn version(&self, key: NodeKey) -> Option<&Arc<Node>> {
        self.nodes.get(&key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().map(Arc::as_ref)
    }

    pub(crate) fn insert(&mut self, node: Node) {
        self.nodes.insert(node.key(), Arc::new(node));
    }

    pub(crate) fn remove(&mut self, key: NodeKey) -> Option<Arc<Node>> {
        self.nodes.remove(&key)
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeLookup for EditorState {
    fn resolve(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(&key).map(Arc::as_ref)
    }

    fn selection(&self) -> Option<&RangeSelection> {
        self.selection.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::nodes::{BlockKind, BlockNode, NodeKind, TextNode};
    use crate::TreeError;

    /// Build `root > [paragraph > [texts...], ...]` by hand, bypassing
    /// transactions so tests can also build broken trees.
    fn state_with(paragraphs: &[&[&str]]) -> (EditorState, Vec<NodeKey>) {
        let mut state = EditorState::new();
        let mut root = Node::root();
        let mut all = Vec::new();
        for texts in paragraphs {
            let p_key = NodeKey::next();
            let mut p = Node::new(
                p_key,
                NodeKind::Block(BlockNode::new(BlockKind::Paragraph)),
            );
            p.set_parent(Some(NodeKey::ROOT));
            all.push(p_key);
            for text in *texts {
                let t_key = NodeKey::next();
                let mut t =
                    Node::new(t_key, NodeKind::Text(TextNode::new(*text)));
                t.set_parent(Some(p_key));
                p.as_block_mut().unwrap().push_child(t_key);
                state.insert(t);
                all.push(t_key);
            }
            root.as_block_mut().unwrap().push_child(p_key);
            state.insert(p);
        }
        state.insert(root);
        (state, all)
    }

    fn texts<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<&'a str> {
        nodes
            .into_iter()
            .filter_map(|n| n.as_text().map(TextNode::text))
            .collect()
    }

    #[test]
    fn new_state_has_only_a_root() {
        let state = EditorState::new();
        assert_eq!(state.node_count(), 1);
        assert!(state.is_empty(NodeKey::ROOT));
        assert!(state.is_attached(NodeKey::ROOT));
        assert!(state.assert_invariants().is_ok());
    }

    #[test]
    fn first_and_last_text_nodes_descend_into_blocks() {
        let (state, _) = state_with(&[&[], &["a", "b"], &["c"], &[]]);
        let first = state.get_first_text_node(NodeKey::ROOT).unwrap();
        let last = state.get_last_text_node(NodeKey::ROOT).unwrap();
        assert_eq!(first.as_text().unwrap().text(), "a");
        assert_eq!(last.as_text().unwrap().text(), "c");
    }

    #[test]
    fn text_node_search_of_a_textless_tree_is_none() {
        let (state, _) = state_with(&[&[], &[]]);
        assert!(state.get_first_text_node(NodeKey::ROOT).is_none());
        assert!(state.get_last_text_node(NodeKey::ROOT).is_none());
    }

    #[test]
    fn all_text_nodes_come_back_in_document_order() {
        let (state, _) = state_with(&[&["a", "b"], &["c"]]);
        assert_eq!(
            texts(state.get_all_text_nodes(NodeKey::ROOT)),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn siblings_and_indexes() {
        let (state, keys) = state_with(&[&["a", "b", "c"]]);
        let (a, b, c) = (keys[1], keys[2], keys[3]);
        assert_eq!(state.get_index_within_parent(b), Some(1));
        assert_eq!(state.get_next_sibling(a).map(Node::key), Some(b));
        assert_eq!(state.get_previous_sibling(c).map(Node::key), Some(b));
        assert!(state.get_previous_sibling(a).is_none());
        assert!(state.get_next_sibling(c).is_none());
        assert_eq!(
            state.get_child_at_index(keys[0], 2).map(Node::key),
            Some(c)
        );
    }

    #[test]
    fn text_content_separates_blocks() {
        let (state, keys) = state_with(&[&["a", "b"], &["c"]]);
        assert_eq!(state.get_text_content(NodeKey::ROOT), "ab\n\nc");
        assert_eq!(state.get_text_content(keys[0]), "ab");
    }

    #[test]
    #[cfg(not(feature = "assert-invariants"))]
    fn dangling_children_are_skipped_by_reads() {
        let (mut state, keys) = state_with(&[&["a", "b", "c"]]);
        state.remove(keys[2]);
        assert_eq!(texts(state.get_children(keys[0])), vec!["a", "c"]);
        assert_eq!(state.get_children_size(keys[0]), 2);
    }

    #[test]
    #[cfg(not(feature = "assert-invariants"))]
    fn dangling_last_child_resolves_to_none() {
        let (mut state, keys) = state_with(&[&["a", "b"]]);
        state.remove(keys[2]);
        assert!(state.get_last_child(keys[0]).is_none());
        assert_eq!(
            state.get_first_child(keys[0]).map(Node::key),
            Some(keys[1])
        );
    }

    #[test]
    fn get_latest_fails_for_removed_nodes() {
        let (mut state, keys) = state_with(&[&["a"]]);
        let stale = state.get_node(keys[1]).unwrap().clone();
        assert_eq!(state.get_latest(&stale).map(Node::key), Ok(keys[1]));
        state.remove(keys[1]);
        assert_eq!(
            state.get_latest(&stale),
            Err(TreeError::NodeNotFound(keys[1]))
        );
    }

    #[test]
    fn capability_mismatches_are_reported() {
        let (state, keys) = state_with(&[&["a"]]);
        assert_eq!(
            state.get_block(keys[1]),
            Err(TreeError::NotABlock(keys[1]))
        );
        assert_eq!(
            state.get_text(keys[0]),
            Err(TreeError::NotAText(keys[0]))
        );
        assert!(state.get_children(keys[1]).is_empty());
    }

    #[test]
    fn well_formed_trees_pass_the_invariant_check() {
        let (state, _) = state_with(&[&["a", "b"], &["c"]]);
        assert_eq!(state.assert_invariants(), Ok(()));
    }

    #[test]
    fn a_child_listed_twice_breaks_the_invariants() {
        let (mut state, keys) = state_with(&[&["a"]]);
        let mut p = state.get_node(keys[0]).unwrap().clone();
        p.as_block_mut().unwrap().push_child(keys[1]);
        state.insert(p);
        assert!(matches!(
            state.assert_invariants(),
            Err(TreeError::Invariant(_))
        ));
    }

    #[test]
    fn a_wrong_parent_pointer_breaks_the_invariants() {
        let (mut state, keys) = state_with(&[&["a"], &[]]);
        let mut a = state.get_node(keys[1]).unwrap().clone();
        a.set_parent(Some(keys[2]));
        state.insert(a);
        assert!(matches!(
            state.assert_invariants(),
            Err(TreeError::Invariant(_))
        ));
    }
}
