// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use strum_macros::{AsRefStr, Display};
use tracing::trace;

use crate::dom::nodes::{BlockKind, BlockNode, Node, NodeKind, TextNode};
use crate::{
    EditorState, NodeKey, NodeLookup, RangeSelection, TreeError, TreeResult,
};

/// Whether a transaction may change the tree. This is the read-only gate
/// every mutator checks before touching anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TxnMode {
    ReadOnly,
    Write,
}

/// Why a block is in the dirty set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DirtyKind {
    /// The block itself was written.
    Intentional,
    /// Only something underneath the block was written.
    Unintentional,
}

/// The context of one edit (or read) of the tree.
///
/// A transaction works on a pending [`EditorState`] that starts out
/// sharing every node version with the committed state. The first write
/// to a node replaces its version in the pending state with a private
/// clone; later writes in the same transaction reuse that clone. All of
/// this bookkeeping dies with the transaction.
pub struct Transaction {
    pub(crate) state: Arc<EditorState>,
    mode: TxnMode,
    base_selection: Option<RangeSelection>,
    cloned: HashSet<NodeKey>,
    dirty_leaves: HashSet<NodeKey>,
    dirty_blocks: HashMap<NodeKey, DirtyKind>,
    dirty_sub_trees: HashSet<NodeKey>,
}

/// What a committed transaction changed, for the renderer.
///
/// The dirty sets may contain keys that are no longer in `state`: those
/// nodes were removed.
#[derive(Clone, Debug)]
pub struct TreeUpdate {
    pub state: Arc<EditorState>,
    pub dirty_leaves: HashSet<NodeKey>,
    pub dirty_blocks: HashMap<NodeKey, DirtyKind>,
    pub dirty_sub_trees: HashSet<NodeKey>,
    pub selection_dirty: bool,
}

impl TreeUpdate {
    pub fn is_node_dirty(&self, key: NodeKey) -> bool {
        self.dirty_leaves.contains(&key)
            || self.dirty_blocks.contains_key(&key)
            || self.dirty_sub_trees.contains(&key)
    }

    pub fn has_changes(&self) -> bool {
        !self.dirty_leaves.is_empty()
            || !self.dirty_blocks.is_empty()
            || !self.dirty_sub_trees.is_empty()
            || self.selection_dirty
    }
}

impl Transaction {
    pub(crate) fn new(state: Arc<EditorState>, mode: TxnMode) -> Self {
        let base_selection = state.selection.clone();
        Self {
            state,
            mode,
            base_selection,
            cloned: HashSet::new(),
            dirty_leaves: HashSet::new(),
            dirty_blocks: HashMap::new(),
            dirty_sub_trees: HashSet::new(),
        }
    }

    pub fn mode(&self) -> TxnMode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == TxnMode::ReadOnly
    }

    /// The pending state as it stands right now.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub(crate) fn check_writable(
        &self,
        operation: &'static str,
    ) -> TreeResult<()> {
        match self.mode {
            TxnMode::Write => Ok(()),
            TxnMode::ReadOnly => Err(TreeError::ReadOnly { operation }),
        }
    }

    /// Whether the node has already been copied for writing in this
    /// transaction.
    pub fn is_cloned(&self, key: NodeKey) -> bool {
        self.cloned.contains(&key)
    }

    pub fn dirty_leaves(&self) -> &HashSet<NodeKey> {
        &self.dirty_leaves
    }

    pub fn dirty_blocks(&self) -> &HashMap<NodeKey, DirtyKind> {
        &self.dirty_blocks
    }

    pub fn dirty_sub_trees(&self) -> &HashSet<NodeKey> {
        &self.dirty_sub_trees
    }

    /// A version of the node that is safe to mutate in this transaction.
    ///
    /// The first call for a key clones the node and makes the clone the
    /// version everybody sees from then on. Later calls hand back the
    /// same clone.
    pub fn get_writable(&mut self, key: NodeKey) -> TreeResult<&mut Node> {
        self.check_writable("get a writable node")?;
        self.writable(key)
    }

    /// [`Self::get_writable`] without the gate, for mutators that have
    /// already checked it.
    pub(crate) fn writable(&mut self, key: NodeKey) -> TreeResult<&mut Node> {
        if !self.state.contains(key) {
            return Err(TreeError::NodeNotFound(key));
        }
        if self.cloned.insert(key) {
            trace!(%key, "cloning node for write");
            self.mark_dirty(key);
            let state = self.state_mut();
            if let Some(slot) = state.nodes.get_mut(&key) {
                let clone = Node::clone(&**slot);
                *slot = Arc::new(clone);
            }
        }
        self.state_mut()
            .nodes
            .get_mut(&key)
            .map(Arc::make_mut)
            .ok_or(TreeError::NodeNotFound(key))
    }

    pub(crate) fn writable_block(
        &mut self,
        key: NodeKey,
    ) -> TreeResult<&mut BlockNode> {
        self.writable(key)?
            .as_block_mut()
            .ok_or(TreeError::NotABlock(key))
    }

    pub(crate) fn writable_text(
        &mut self,
        key: NodeKey,
    ) -> TreeResult<&mut TextNode> {
        self.writable(key)?
            .as_text_mut()
            .ok_or(TreeError::NotAText(key))
    }

    /// Copies the pending state the first time it diverges from the
    /// committed one. Node versions stay shared.
    pub(crate) fn state_mut(&mut self) -> &mut EditorState {
        Arc::make_mut(&mut self.state)
    }

    /// Ask the renderer to treat everything under `key` as changed.
    pub fn mark_sub_tree_dirty(&mut self, key: NodeKey) -> TreeResult<()> {
        self.check_writable("mark a sub-tree dirty")?;
        self.get_node(key)?;
        self.dirty_sub_trees.insert(key);
        Ok(())
    }

    pub(crate) fn mark_sub_tree_dirty_unchecked(&mut self, key: NodeKey) {
        self.dirty_sub_trees.insert(key);
    }

    fn mark_dirty(&mut self, key: NodeKey) {
        let Some(node) = self.state.resolve(key) else {
            return;
        };
        if node.is_text() {
            self.dirty_leaves.insert(key);
        } else {
            self.dirty_blocks.insert(key, DirtyKind::Intentional);
        }
        let mut parent = node.parent();
        while let Some(block) = parent {
            self.dirty_blocks
                .entry(block)
                .or_insert(DirtyKind::Unintentional);
            parent = self.state.resolve(block).and_then(Node::parent);
        }
    }

    /// Create a new, detached, empty block.
    pub fn create_block(&mut self, kind: BlockKind) -> TreeResult<NodeKey> {
        self.check_writable("create a block")?;
        if kind == BlockKind::Root {
            return Err(TreeError::invariant(
                "there can only be one root block",
            ));
        }
        Ok(self.insert_new(NodeKind::Block(BlockNode::new(kind))))
    }

    /// Create a new, detached, unformatted text node.
    pub fn create_text(
        &mut self,
        text: impl Into<String>,
    ) -> TreeResult<NodeKey> {
        self.create_text_node(TextNode::new(text))
    }

    /// Create a new, detached text node from a prepared [`TextNode`].
    pub fn create_text_node(&mut self, text: TextNode) -> TreeResult<NodeKey> {
        self.check_writable("create a text node")?;
        Ok(self.insert_new(NodeKind::Text(text)))
    }

    /// Register a brand new node. It counts as already cloned: nobody
    /// else can hold a version of it.
    pub(crate) fn insert_new(&mut self, kind: NodeKind) -> NodeKey {
        let key = NodeKey::next();
        self.state_mut().insert(Node::new(key, kind));
        self.cloned.insert(key);
        self.mark_dirty(key);
        key
    }

    /// Drop a node from the pending registry.
    pub(crate) fn delete_from_registry(&mut self, key: NodeKey) {
        self.state_mut().remove(key);
    }

    /// Finish the transaction, handing the pending state and everything
    /// that was marked dirty to the caller.
    pub(crate) fn commit(mut self) -> TreeUpdate {
        let moved = match (&self.base_selection, &self.state.selection) {
            (None, None) => false,
            (Some(before), Some(after)) => !before.same_points(after),
            _ => true,
        };
        let flagged = self
            .state
            .selection
            .as_ref()
            .is_some_and(RangeSelection::is_dirty);
        if flagged {
            if let Some(selection) = self.state_mut().selection.as_mut() {
                selection.clear_dirty();
            }
        }
        TreeUpdate {
            state: self.state,
            dirty_leaves: self.dirty_leaves,
            dirty_blocks: self.dirty_blocks,
            dirty_sub_trees: self.dirty_sub_trees,
            selection_dirty: moved || flagged,
        }
    }
}

impl NodeLookup for Transaction {
    fn resolve(&self, key: NodeKey) -> Option<&Node> {
        self.state.resolve(key)
    }

    fn selection(&self) -> Option<&RangeSelection> {
        self.state.selection.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_txn() -> Transaction {
        Transaction::new(Arc::new(EditorState::new()), TxnMode::Write)
    }

    #[test]
    fn first_write_clones_and_later_writes_reuse_the_clone() {
        let committed = Arc::new(EditorState::new());
        let mut txn = Transaction::new(Arc::clone(&committed), TxnMode::Write);
        assert!(!txn.is_cloned(NodeKey::ROOT));

        let first = txn.get_writable(NodeKey::ROOT).unwrap() as *const Node;
        assert!(txn.is_cloned(NodeKey::ROOT));
        let second = txn.get_writable(NodeKey::ROOT).unwrap() as *const Node;
        assert_eq!(first, second);

        let pending = txn.state().version(NodeKey::ROOT).unwrap();
        let original = committed.version(NodeKey::ROOT).unwrap();
        assert!(!Arc::ptr_eq(pending, original));
    }

    #[test]
    fn reads_go_to_the_writable_clone() {
        let mut txn = write_txn();
        let text = txn.create_text("a").unwrap();
        txn.writable_text(text).unwrap().set_text("b");
        assert_eq!(txn.get_text(text).unwrap().text(), "b");
    }

    #[test]
    fn untouched_nodes_keep_sharing_their_version() {
        let committed = Arc::new(EditorState::new());
        let mut txn = Transaction::new(Arc::clone(&committed), TxnMode::Write);
        txn.create_text("x").unwrap();
        assert!(Arc::ptr_eq(
            txn.state().version(NodeKey::ROOT).unwrap(),
            committed.version(NodeKey::ROOT).unwrap()
        ));
    }

    #[test]
    fn read_only_transactions_refuse_writable_access() {
        let mut txn =
            Transaction::new(Arc::new(EditorState::new()), TxnMode::ReadOnly);
        assert!(txn.is_read_only());
        assert!(matches!(
            txn.get_writable(NodeKey::ROOT),
            Err(TreeError::ReadOnly { .. })
        ));
        assert!(matches!(
            txn.create_text("a"),
            Err(TreeError::ReadOnly { .. })
        ));
        assert!(!txn.is_cloned(NodeKey::ROOT));
        assert_eq!(txn.state().node_count(), 1);
    }

    #[test]
    fn writing_a_missing_node_fails() {
        let mut txn = write_txn();
        let missing = NodeKey::from_raw(u64::MAX);
        assert_eq!(
            txn.get_writable(missing).map(|n| n.key()),
            Err(TreeError::NodeNotFound(missing))
        );
    }

    #[test]
    fn a_second_root_cannot_be_created() {
        let mut txn = write_txn();
        assert!(matches!(
            txn.create_block(BlockKind::Root),
            Err(TreeError::Invariant(_))
        ));
    }

    #[test]
    fn writing_a_leaf_marks_its_ancestors_unintentionally_dirty() {
        let mut txn = write_txn();
        let p = txn.create_block(BlockKind::Paragraph).unwrap();
        let t = txn.create_text("a").unwrap();
        txn.append(NodeKey::ROOT, p).unwrap();
        txn.append(p, t).unwrap();
        let update = txn.commit();

        let mut txn = Transaction::new(update.state, TxnMode::Write);
        txn.get_writable(t).unwrap();
        assert!(txn.dirty_leaves().contains(&t));
        assert_eq!(
            txn.dirty_blocks().get(&p),
            Some(&DirtyKind::Unintentional)
        );
        assert_eq!(
            txn.dirty_blocks().get(&NodeKey::ROOT),
            Some(&DirtyKind::Unintentional)
        );
    }

    #[test]
    fn commit_clears_the_selection_dirty_flag() {
        let mut txn = write_txn();
        let t = txn.create_text("abc").unwrap();
        txn.append(NodeKey::ROOT, t).unwrap();
        txn.select_text(t, 1, 1).unwrap();
        let update = txn.commit();
        assert!(update.selection_dirty);
        assert!(!update.state.selection().unwrap().is_dirty());
    }

    #[test]
    fn committing_nothing_reports_no_changes() {
        let txn = write_txn();
        let update = txn.commit();
        assert!(!update.has_changes());
    }
}
