// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::nodes::{BlockKind, BlockNode, TextNode};
use crate::NodeKey;

/// What a node is. The set is closed: code dispatches on this tag (or on
/// the capability queries on [`Node`]) rather than on concrete types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Block(BlockNode),
    Text(TextNode),
}

/// A single version of a node.
///
/// Nodes never point at each other directly: the parent and the children
/// are keys, resolved through the editor state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    key: NodeKey,
    parent: Option<NodeKey>,
    kind: NodeKind,
}

impl Node {
    pub(crate) fn new(key: NodeKey, kind: NodeKind) -> Self {
        Self {
            key,
            parent: None,
            kind,
        }
    }

    pub(crate) fn root() -> Self {
        Self::new(
            NodeKey::ROOT,
            NodeKind::Block(BlockNode::new(BlockKind::Root)),
        )
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, NodeKind::Block(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    pub fn can_have_children(&self) -> bool {
        self.is_block()
    }

    pub fn can_hold_text(&self) -> bool {
        self.is_text()
    }

    pub fn as_block(&self) -> Option<&BlockNode> {
        match &self.kind {
            NodeKind::Block(block) => Some(block),
            NodeKind::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Block(_) => None,
        }
    }

    /// True for a text node whose content is the empty string.
    pub fn is_empty_text(&self) -> bool {
        self.as_text().is_some_and(TextNode::is_empty)
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeKey>) {
        self.parent = parent;
    }

    pub(crate) fn as_block_mut(&mut self) -> Option<&mut BlockNode> {
        match &mut self.kind {
            NodeKind::Block(block) => Some(block),
            NodeKind::Text(_) => None,
        }
    }

    pub(crate) fn as_text_mut(&mut self) -> Option<&mut TextNode> {
        match &mut self.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Block(_) => None,
        }
    }
}
