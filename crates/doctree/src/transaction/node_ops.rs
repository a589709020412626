// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::HashSet;

use tracing::debug;

use crate::{NodeKey, NodeLookup, Point, Transaction, TreeError, TreeResult};

impl Transaction {
    /// Remove a node and everything under it from the tree and from the
    /// editor state.
    ///
    /// Selection points inside the removed sub-tree move to the parent,
    /// at the index the node used to occupy. Unless
    /// `preserve_empty_parent` is set, a parent left without children is
    /// removed as well (the root never is).
    pub fn remove(
        &mut self,
        key: NodeKey,
        preserve_empty_parent: bool,
    ) -> TreeResult<()> {
        self.check_writable("remove")?;
        self.remove_node(key, preserve_empty_parent)
    }

    /// Take a node out of its parent but keep it (and its sub-tree) in the
    /// editor state so it can be inserted somewhere else.
    pub fn detach(&mut self, key: NodeKey) -> TreeResult<()> {
        self.check_writable("detach")?;
        if key.is_root() {
            return Err(TreeError::invariant(
                "the root node cannot be detached",
            ));
        }
        let sub_tree: HashSet<NodeKey> =
            self.collect_sub_tree(key).into_iter().collect();
        if let Some((parent, index)) = self.unlink_from_parent(key)? {
            self.move_selection_out_of(&sub_tree, parent, index);
        }
        Ok(())
    }

    pub(crate) fn remove_node(
        &mut self,
        key: NodeKey,
        preserve_empty_parent: bool,
    ) -> TreeResult<()> {
        self.get_node(key)?;
        if key.is_root() {
            return Err(TreeError::invariant(
                "the root node cannot be removed",
            ));
        }

        let sub_tree = self.collect_sub_tree(key);
        let removed_from = self.unlink_from_parent(key)?;
        let sub_tree_set: HashSet<NodeKey> = sub_tree.iter().copied().collect();
        match removed_from {
            Some((parent, index)) => {
                self.move_selection_out_of(&sub_tree_set, parent, index)
            }
            None => self.drop_selection_inside(&sub_tree_set),
        }
        for node in &sub_tree {
            self.delete_from_registry(*node);
        }
        debug!(%key, removed = sub_tree.len(), "removed sub-tree");

        if preserve_empty_parent {
            return Ok(());
        }
        if let Some((parent, _)) = removed_from {
            if !parent.is_root()
                && self.resolve(parent).is_some()
                && self.is_empty(parent)
            {
                self.remove_node(parent, false)?;
            }
        }
        Ok(())
    }

    /// `key` and all its live descendants, parents before children.
    pub(crate) fn collect_sub_tree(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut found = Vec::new();
        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            if self.resolve(next).is_none() {
                continue;
            }
            found.push(next);
            pending.extend(self.get_children_keys(next).into_iter().rev());
        }
        found
    }

    fn move_selection_out_of(
        &mut self,
        sub_tree: &HashSet<NodeKey>,
        parent: NodeKey,
        index: usize,
    ) {
        let touches = self.selection().is_some_and(|selection| {
            sub_tree.contains(&selection.anchor.key)
                || sub_tree.contains(&selection.focus.key)
        });
        if !touches {
            return;
        }
        if let Some(selection) = self.state_mut().selection.as_mut() {
            for point in selection.points_mut() {
                if sub_tree.contains(&point.key) {
                    *point = Point::element(parent, index);
                }
            }
            selection.mark_dirty();
        }
    }

    /// A sub-tree removed while detached has nowhere to send the
    /// selection, so the selection goes away.
    fn drop_selection_inside(&mut self, sub_tree: &HashSet<NodeKey>) {
        let touches = self.selection().is_some_and(|selection| {
            sub_tree.contains(&selection.anchor.key)
                || sub_tree.contains(&selection.focus.key)
        });
        if touches {
            self.state_mut().selection = None;
        }
    }
}
