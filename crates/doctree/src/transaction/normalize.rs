// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Merging of adjacent, compatible text nodes.
//!
//! The children of a block are scanned left to right and cut into
//! batches: maximal runs of adjacent text nodes that are neither
//! immutable nor segmented and share the format and url of the first
//! node in the run. Anything else closes the current batch. Every batch
//! of two or more nodes collapses into its first node.
//!
//! Always run over the full child list of a block: normalizing a window
//! of it could leave mergeable neighbours at the window edges.

use tracing::debug;

use crate::dom::nodes::text_node::utf16_len;
use crate::dom::nodes::{Node, TextNode};
use crate::{
    NodeKey, NodeLookup, PointKind, Transaction, TreeError, TreeResult,
};

/// A batch ready to merge: every node's key and text, in order.
type MergePlan = Vec<(NodeKey, String)>;

impl Transaction {
    /// Merge every run of adjacent compatible text nodes among the
    /// children of `block`.
    ///
    /// With `restore_selection`, selection points inside nodes that get
    /// merged away are moved into the surviving node at the matching
    /// offset, and the selection is marked dirty. That requires a
    /// selection: without one the call fails before changing anything.
    pub fn normalize(
        &mut self,
        block: NodeKey,
        restore_selection: bool,
    ) -> TreeResult<()> {
        self.check_writable("normalize")?;
        self.get_block(block)?;

        let plans = self
            .merge_batches(block)
            .into_iter()
            .filter(|batch| batch.len() > 1)
            .map(|batch| self.plan_merge(&batch))
            .collect::<TreeResult<Vec<MergePlan>>>()?;
        if plans.is_empty() {
            return Ok(());
        }
        if restore_selection && self.selection().is_none() {
            return Err(TreeError::invariant(format!(
                "cannot restore the selection while normalizing block \
                 {block}: there is no selection"
            )));
        }

        for plan in plans {
            self.merge(plan, restore_selection)?;
        }
        Ok(())
    }

    /// Normalize every block touched in this transaction that is still
    /// in the tree.
    pub(crate) fn normalize_dirty_blocks(&mut self) -> TreeResult<()> {
        let mut blocks: Vec<NodeKey> = self
            .dirty_blocks()
            .keys()
            .copied()
            .filter(|key| {
                self.resolve(*key).is_some_and(Node::is_block)
                    && self.is_attached(*key)
            })
            .collect();
        blocks.sort_unstable();
        let restore_selection = self.selection().is_some();
        for block in blocks {
            // An earlier merge may have removed an emptied block.
            if self.resolve(block).is_some() {
                self.normalize(block, restore_selection)?;
            }
        }
        Ok(())
    }

    /// Cut the children of `block` into batches of merge candidates.
    fn merge_batches(&self, block: NodeKey) -> Vec<Vec<NodeKey>> {
        let mut batches = Vec::new();
        let mut current: Vec<NodeKey> = Vec::new();
        let mut reference: Option<&TextNode> = None;

        for child in self.get_children(block) {
            match child.as_text().filter(|t| t.is_mergeable()) {
                Some(text)
                    if reference.is_some_and(|r| r.can_merge_with(text)) =>
                {
                    current.push(child.key());
                }
                Some(text) => {
                    close_batch(&mut batches, &mut current);
                    current.push(child.key());
                    reference = Some(text);
                }
                None => {
                    close_batch(&mut batches, &mut current);
                    reference = None;
                }
            }
        }
        close_batch(&mut batches, &mut current);
        batches
    }

    /// Resolve every node of a batch up front. A merge splices real
    /// text, so a node that can't be found is an error here, not
    /// something to skip. Batches come from `get_children`, which has
    /// already dropped dangling keys, so this only fires if a batch is
    /// built some other way.
    fn plan_merge(&self, batch: &[NodeKey]) -> TreeResult<MergePlan> {
        batch
            .iter()
            .map(|key| {
                let text = self
                    .resolve(*key)
                    .and_then(Node::as_text)
                    .ok_or_else(|| {
                        TreeError::invariant(format!(
                            "text node {key} vanished while merging"
                        ))
                    })?;
                Ok((*key, text.text().to_owned()))
            })
            .collect()
    }

    fn merge(
        &mut self,
        plan: MergePlan,
        restore_selection: bool,
    ) -> TreeResult<()> {
        let mut sources = plan.into_iter();
        let Some((target, target_text)) = sources.next() else {
            return Ok(());
        };
        let sources: Vec<(NodeKey, String)> = sources.collect();

        let mut offset = utf16_len(&target_text);
        let mut rebased = false;
        for (source, text) in &sources {
            if restore_selection {
                rebased |= self.rebase_points(*source, target, offset);
            }
            self.writable_text(target)?.push_text(text);
            offset += utf16_len(text);
        }

        for (source, _) in &sources {
            self.remove_node(*source, true)?;
        }
        if rebased {
            if let Some(selection) = self.state_mut().selection.as_mut() {
                selection.mark_dirty();
            }
        }
        debug!(%target, merged = sources.len() + 1, "merged text nodes");
        Ok(())
    }

    /// Point every selection end inside `source` at the same character
    /// in `target`, where `source`'s text starts at `offset`.
    fn rebase_points(
        &mut self,
        source: NodeKey,
        target: NodeKey,
        offset: usize,
    ) -> bool {
        let affected = self.selection().is_some_and(|selection| {
            selection.anchor.key == source || selection.focus.key == source
        });
        if !affected {
            return false;
        }
        if let Some(selection) = self.state_mut().selection.as_mut() {
            for point in selection.points_mut() {
                if point.key == source {
                    point.key = target;
                    point.offset += offset;
                    point.kind = PointKind::Text;
                }
            }
        }
        true
    }
}

fn close_batch(batches: &mut Vec<Vec<NodeKey>>, current: &mut Vec<NodeKey>) {
    if !current.is_empty() {
        batches.push(std::mem::take(current));
    }
}
