// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Read-side traversal of the node tree.
//!
//! Everything here goes through [`NodeLookup::resolve`], so it always sees
//! the latest version of every node: inside a transaction that is the
//! writable clone if there is one, otherwise the committed version.
//!
//! Child keys that no longer resolve are treated as already removed and
//! skipped. Read paths prefer carrying on over failing.

use crate::dom::nodes::{BlockNode, Node, TextNode};
use crate::invariants::report_inconsistency;
use crate::{NodeKey, RangeSelection, TreeError, TreeResult};

const BLOCK_SEPARATOR: &str = "\n\n";

pub trait NodeLookup {
    /// The latest version of the node with this key, if it exists.
    fn resolve(&self, key: NodeKey) -> Option<&Node>;

    /// The active selection, if any.
    fn selection(&self) -> Option<&RangeSelection>;

    fn get_node(&self, key: NodeKey) -> TreeResult<&Node> {
        self.resolve(key).ok_or(TreeError::NodeNotFound(key))
    }

    /// Resolve a possibly stale copy of a node to its latest version.
    fn get_latest(&self, node: &Node) -> TreeResult<&Node> {
        self.get_node(node.key())
    }

    fn get_block(&self, key: NodeKey) -> TreeResult<&BlockNode> {
        self.get_node(key)?
            .as_block()
            .ok_or(TreeError::NotABlock(key))
    }

    fn get_text(&self, key: NodeKey) -> TreeResult<&TextNode> {
        self.get_node(key)?
            .as_text()
            .ok_or(TreeError::NotAText(key))
    }

    /// Recorded child keys of a block, dangling ones included. Empty for
    /// text nodes and unknown keys.
    fn get_children_keys(&self, key: NodeKey) -> Vec<NodeKey> {
        self.resolve(key)
            .and_then(Node::as_block)
            .map(|block| block.children().to_vec())
            .unwrap_or_default()
    }

    /// Live children of a block, in document order.
    fn get_children(&self, key: NodeKey) -> Vec<&Node> {
        let Some(block) = self.resolve(key).and_then(Node::as_block) else {
            return Vec::new();
        };
        block
            .children()
            .iter()
            .filter_map(|child| {
                let node = self.resolve(*child);
                if node.is_none() {
                    report_inconsistency(&format!(
                        "child {child} of block {key} does not resolve; \
                         skipping it"
                    ));
                }
                node
            })
            .collect()
    }

    fn get_children_size(&self, key: NodeKey) -> usize {
        self.get_children(key).len()
    }

    fn is_empty(&self, key: NodeKey) -> bool {
        self.get_children_size(key) == 0
    }

    fn get_first_child(&self, key: NodeKey) -> Option<&Node> {
        let first = self.resolve(key)?.as_block()?.first_child_key()?;
        self.resolve(first)
    }

    fn get_last_child(&self, key: NodeKey) -> Option<&Node> {
        let last = self.resolve(key)?.as_block()?.last_child_key()?;
        self.resolve(last)
    }

    fn get_child_at_index(&self, key: NodeKey, index: usize) -> Option<&Node> {
        let child = *self.resolve(key)?.as_block()?.children().get(index)?;
        self.resolve(child)
    }

    /// The first text node under `key`, searching depth-first in
    /// document order.
    fn get_first_text_node(&self, key: NodeKey) -> Option<&Node> {
        for child in self.get_children(key) {
            if child.is_text() {
                return Some(child);
            }
            if let Some(text) = self.get_first_text_node(child.key()) {
                return Some(text);
            }
        }
        None
    }

    /// The last text node under `key`, searching depth-first in reverse
    /// document order.
    fn get_last_text_node(&self, key: NodeKey) -> Option<&Node> {
        for child in self.get_children(key).into_iter().rev() {
            if child.is_text() {
                return Some(child);
            }
            if let Some(text) = self.get_last_text_node(child.key()) {
                return Some(text);
            }
        }
        None
    }

    /// Every text node under `key`, in document order.
    fn get_all_text_nodes(&self, key: NodeKey) -> Vec<&Node> {
        let mut found = Vec::new();
        for child in self.get_children(key) {
            if child.is_text() {
                found.push(child);
            } else {
                found.extend(self.get_all_text_nodes(child.key()));
            }
        }
        found
    }

    fn get_parent(&self, key: NodeKey) -> Option<&Node> {
        let parent = self.resolve(key)?.parent()?;
        self.resolve(parent)
    }

    fn get_index_within_parent(&self, key: NodeKey) -> Option<usize> {
        self.get_parent(key)?.as_block()?.index_of(key)
    }

    fn get_next_sibling(&self, key: NodeKey) -> Option<&Node> {
        let parent = self.get_parent(key)?;
        let index = parent.as_block()?.index_of(key)?;
        self.get_child_at_index(parent.key(), index + 1)
    }

    fn get_previous_sibling(&self, key: NodeKey) -> Option<&Node> {
        let parent = self.get_parent(key)?;
        let index = parent.as_block()?.index_of(key)?;
        self.get_child_at_index(parent.key(), index.checked_sub(1)?)
    }

    /// Whether `ancestor` is a strict ancestor of `key`.
    fn is_ancestor(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        let mut current = self.resolve(key).and_then(Node::parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.resolve(parent).and_then(Node::parent);
        }
        false
    }

    /// Whether `key` is reachable from the root through parent links.
    fn is_attached(&self, key: NodeKey) -> bool {
        self.resolve(key).is_some()
            && (key.is_root() || self.is_ancestor(NodeKey::ROOT, key))
    }

    /// Plain text of the sub-tree under `key`. Sibling blocks are
    /// separated by a blank line.
    fn get_text_content(&self, key: NodeKey) -> String {
        let Some(node) = self.resolve(key) else {
            return String::new();
        };
        if let Some(text) = node.as_text() {
            return text.text().to_owned();
        }
        let children = self.get_children(key);
        let mut content = String::new();
        for (i, child) in children.iter().enumerate() {
            content.push_str(&self.get_text_content(child.key()));
            if child.is_block() && i + 1 < children.len() {
                content.push_str(BLOCK_SEPARATOR);
            }
        }
        content
    }
}
