// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::{AsRefStr, Display, EnumIter};

use crate::NodeKey;

/// The semantic kind of a block.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum BlockKind {
    Root,
    Paragraph,
    Quote,
    CodeBlock,
    ListItem,
    Generic,
}

/// A composite node. It owns the order of its children but not the
/// children themselves: those live in the editor state and are referred
/// to by key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockNode {
    kind: BlockKind,
    children: Vec<NodeKey>,
}

impl BlockNode {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Child keys in document order, as recorded. Some may be dangling;
    /// use [`crate::NodeLookup::get_children`] to get live nodes.
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn first_child_key(&self) -> Option<NodeKey> {
        self.children.first().copied()
    }

    pub fn last_child_key(&self) -> Option<NodeKey> {
        self.children.last().copied()
    }

    pub fn index_of(&self, key: NodeKey) -> Option<usize> {
        self.children.iter().position(|k| *k == key)
    }

    pub(crate) fn push_child(&mut self, key: NodeKey) {
        self.children.push(key);
    }

    pub(crate) fn insert_child(&mut self, index: usize, key: NodeKey) {
        self.children.insert(index, key);
    }

    /// Remove `key` from the child list, returning the index it was at.
    pub(crate) fn remove_child(&mut self, key: NodeKey) -> Option<usize> {
        let index = self.index_of(key)?;
        self.children.remove(index);
        Some(index)
    }
}
