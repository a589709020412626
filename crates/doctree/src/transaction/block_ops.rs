// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Structural edits of a block's child list.

use super::selection::ChildChange;
use crate::dom::nodes::{Node, NodeKind, TextNode};
use crate::invariants::report_inconsistency;
use crate::{
    NodeKey, NodeLookup, Point, RangeSelection, Transaction, TreeError,
    TreeResult,
};

impl Transaction {
    /// Move `child` to the end of `block`, taking it out of whatever block
    /// held it before. Returns `block` so calls can be chained.
    ///
    /// If the last child of `block` was an empty text node, that node is
    /// marked as a dirty sub-tree: it stops being trailing and may have
    /// to be rendered differently.
    pub fn append(
        &mut self,
        block: NodeKey,
        child: NodeKey,
    ) -> TreeResult<NodeKey> {
        self.check_writable("append")?;
        self.check_can_insert(block, child)?;

        let trailing_empty_text = self
            .get_last_child(block)
            .filter(|last| last.is_empty_text())
            .map(Node::key);

        self.writable(block)?;
        self.writable(child)?;
        self.unlink_from_parent(child)?;
        self.writable(child)?.set_parent(Some(block));
        if let Some(key) = trailing_empty_text {
            self.mark_sub_tree_dirty_unchecked(key);
        }
        let target = self.writable_block(block)?;
        target.push_child(child);
        let index = target.children().len() - 1;
        self.shift_element_points(block, index, ChildChange::Inserted);
        Ok(block)
    }

    /// [`Self::append`] each of `children` in turn.
    pub fn append_all(
        &mut self,
        block: NodeKey,
        children: &[NodeKey],
    ) -> TreeResult<NodeKey> {
        self.check_writable("append")?;
        for child in children {
            self.append(block, *child)?;
        }
        Ok(block)
    }

    /// Remove every child of `block` and leave a single empty text node in
    /// its place, so the block stays addressable by a cursor.
    ///
    /// With `restore_selection` the selection is collapsed onto the start
    /// of the new text node (a selection is created if there was none).
    /// Returns the key of the new text node.
    pub fn clear(
        &mut self,
        block: NodeKey,
        restore_selection: bool,
    ) -> TreeResult<NodeKey> {
        self.check_writable("clear")?;
        self.get_block(block)?;

        for child in self.get_children_keys(block) {
            if self.resolve(child).is_some() {
                self.remove_node(child, true)?;
            } else {
                self.remove_dangling_child(block, child)?;
            }
        }

        let placeholder = self.insert_new(NodeKind::Text(TextNode::default()));
        self.append(block, placeholder)?;

        if restore_selection {
            let point = Point::text(placeholder, 0);
            let mut selection = match self.state.selection.clone() {
                Some(mut selection) => {
                    selection.anchor = point;
                    selection.focus = point;
                    selection
                }
                None => RangeSelection::collapsed(point),
            };
            selection.mark_dirty();
            self.state_mut().selection = Some(selection);
        }
        Ok(placeholder)
    }

    /// Remove `delete_count` children of `block` starting at `start` and
    /// insert `nodes` in their place. The removed nodes are deleted from
    /// the editor state; their keys are returned.
    pub fn splice(
        &mut self,
        block: NodeKey,
        start: usize,
        delete_count: usize,
        nodes: &[NodeKey],
    ) -> TreeResult<Vec<NodeKey>> {
        self.check_writable("splice")?;
        let children = self.get_block(block)?.children().to_vec();
        if start > children.len() {
            return Err(TreeError::OffsetOutOfBounds {
                key: block,
                offset: start,
                len: children.len(),
            });
        }
        let end = start.saturating_add(delete_count).min(children.len());
        let deleted = children[start..end].to_vec();
        for (i, node) in nodes.iter().enumerate() {
            self.check_can_insert(block, *node)?;
            let removed = deleted
                .iter()
                .any(|key| key == node || self.is_ancestor(*key, *node));
            if removed || nodes[..i].contains(node) {
                return Err(TreeError::invariant(format!(
                    "splice: node {node} would be inserted twice, or \
                     inserted while it (or an ancestor) is removed"
                )));
            }
        }

        for key in &deleted {
            if self.resolve(*key).is_some() {
                self.remove_node(*key, true)?;
            } else {
                self.remove_dangling_child(block, *key)?;
            }
        }

        let mut insert_at = start;
        for node in nodes {
            if let Some((old_parent, index)) = self.unlink_from_parent(*node)?
            {
                if old_parent == block && index < insert_at {
                    insert_at -= 1;
                }
            }
        }
        for (i, node) in nodes.iter().enumerate() {
            self.writable(*node)?.set_parent(Some(block));
            self.writable_block(block)?.insert_child(insert_at + i, *node);
            self.shift_element_points(
                block,
                insert_at + i,
                ChildChange::Inserted,
            );
        }
        Ok(deleted)
    }

    /// Insert `node` as the next sibling of `existing`.
    pub fn insert_after(
        &mut self,
        existing: NodeKey,
        node: NodeKey,
    ) -> TreeResult<()> {
        self.check_writable("insert after")?;
        self.insert_next_to(existing, node, 1)
    }

    /// Insert `node` as the previous sibling of `existing`.
    pub fn insert_before(
        &mut self,
        existing: NodeKey,
        node: NodeKey,
    ) -> TreeResult<()> {
        self.check_writable("insert before")?;
        self.insert_next_to(existing, node, 0)
    }

    fn insert_next_to(
        &mut self,
        existing: NodeKey,
        node: NodeKey,
        shift: usize,
    ) -> TreeResult<()> {
        let parent = self.get_node(existing)?.parent().ok_or_else(|| {
            TreeError::invariant(format!(
                "node {existing} has no parent to insert next to it in"
            ))
        })?;
        if node == existing {
            return Err(TreeError::invariant(format!(
                "cannot insert node {node} next to itself"
            )));
        }
        self.check_can_insert(parent, node)?;

        self.unlink_from_parent(node)?;
        let index = self
            .get_block(parent)?
            .index_of(existing)
            .ok_or_else(|| {
                TreeError::invariant(format!(
                    "node {existing} is missing from its parent {parent}"
                ))
            })?;
        self.writable(node)?.set_parent(Some(parent));
        self.writable_block(parent)?
            .insert_child(index + shift, node);
        self.shift_element_points(parent, index + shift, ChildChange::Inserted);
        Ok(())
    }

    /// Everything that must hold before `node` can become a child of
    /// `parent`. Checked before any mutation.
    pub(crate) fn check_can_insert(
        &self,
        parent: NodeKey,
        node: NodeKey,
    ) -> TreeResult<()> {
        self.get_block(parent)?;
        self.get_node(node)?;
        if node.is_root() {
            return Err(TreeError::invariant(
                "the root node cannot be inserted anywhere",
            ));
        }
        if node == parent || self.is_ancestor(node, parent) {
            return Err(TreeError::invariant(format!(
                "cannot insert node {node} into its own descendant {parent}"
            )));
        }
        Ok(())
    }

    /// Take `key` out of its parent's child list and clear its parent.
    /// Returns the old parent and the index `key` had in it.
    ///
    /// A parent that doesn't list the child is tolerated: there is
    /// nothing to remove.
    pub(crate) fn unlink_from_parent(
        &mut self,
        key: NodeKey,
    ) -> TreeResult<Option<(NodeKey, usize)>> {
        let Some(parent) = self.get_node(key)?.parent() else {
            return Ok(None);
        };
        let removed_at = if self.resolve(parent).is_some() {
            let index = self.writable_block(parent)?.remove_child(key);
            if let Some(index) = index {
                self.shift_element_points(parent, index, ChildChange::Removed);
            } else {
                report_inconsistency(&format!(
                    "node {key} is missing from the children of its parent \
                     {parent}"
                ));
            }
            index.map(|i| (parent, i))
        } else {
            report_inconsistency(&format!(
                "parent {parent} of node {key} does not exist"
            ));
            None
        };
        self.writable(key)?.set_parent(None);
        Ok(removed_at)
    }

    /// Drop a child key that no longer resolves from `block`.
    fn remove_dangling_child(
        &mut self,
        block: NodeKey,
        child: NodeKey,
    ) -> TreeResult<()> {
        if let Some(index) = self.writable_block(block)?.remove_child(child) {
            self.shift_element_points(block, index, ChildChange::Removed);
        }
        Ok(())
    }
}
