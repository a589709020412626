// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Structural invariants of the node tree.
//!
//! With the `assert-invariants` feature enabled every tolerated
//! inconsistency panics and every commit checks the whole tree. Without
//! it the inconsistencies are only logged.

use std::collections::HashSet;

use crate::dom::nodes::{BlockKind, Node};
use crate::{EditorState, NodeKey, NodeLookup, TreeError, TreeResult};

cfg_if::cfg_if! {
    if #[cfg(feature = "assert-invariants")] {
        pub(crate) fn report_inconsistency(message: &str) {
            panic!("tree inconsistency: {message}");
        }

        pub(crate) fn assert_before_commit(state: &EditorState) {
            if let Err(e) = state.assert_invariants() {
                panic!("refusing to commit a malformed tree: {e}");
            }
        }
    } else {
        pub(crate) fn report_inconsistency(message: &str) {
            tracing::warn!("tree inconsistency: {message}");
        }

        pub(crate) fn assert_before_commit(_state: &EditorState) {}
    }
}

impl EditorState {
    /// Check every parent/child link in the state.
    ///
    /// Returns the first violation found: a parent that doesn't list its
    /// child exactly once, a child that doesn't point back at the block
    /// listing it, or a key listed twice.
    pub fn assert_invariants(&self) -> TreeResult<()> {
        let root = self.get_block(NodeKey::ROOT)?;
        if root.kind() != BlockKind::Root {
            return Err(TreeError::invariant("the root node is not a root"));
        }
        if self.get_node(NodeKey::ROOT)?.parent().is_some() {
            return Err(TreeError::invariant("the root node has a parent"));
        }

        let mut listed = HashSet::new();
        for node in self.nodes() {
            check_parent_link(self, node)?;
            let Some(block) = node.as_block() else {
                continue;
            };
            for child in block.children() {
                if !listed.insert(*child) {
                    return Err(TreeError::invariant(format!(
                        "node {child} is listed as a child more than once"
                    )));
                }
                let child_node = self.get_node(*child).map_err(|_| {
                    TreeError::invariant(format!(
                        "block {} lists missing child {child}",
                        node.key()
                    ))
                })?;
                if child_node.parent() != Some(node.key()) {
                    return Err(TreeError::invariant(format!(
                        "child {child} of block {} points at parent {:?}",
                        node.key(),
                        child_node.parent()
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_parent_link(state: &EditorState, node: &Node) -> TreeResult<()> {
    let Some(parent) = node.parent() else {
        return Ok(());
    };
    let block = state.get_block(parent).map_err(|_| {
        TreeError::invariant(format!(
            "node {} has parent {parent} which is not a block in the state",
            node.key()
        ))
    })?;
    let count = block.children().iter().filter(|k| **k == node.key()).count();
    if count != 1 {
        return Err(TreeError::invariant(format!(
            "block {parent} lists node {} {count} times",
            node.key()
        )));
    }
    Ok(())
}
