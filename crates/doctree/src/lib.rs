// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The mutable document tree behind a rich-text editor.
//!
//! Nodes live in a registry ([`EditorState`]) keyed by [`NodeKey`]; blocks
//! refer to their children by key. Edits happen inside a [`Transaction`]
//! obtained from [`Editor::update`]: the first write to a node clones it,
//! so committed states are never changed after the fact and untouched
//! nodes are shared between states.

pub mod dom;
mod editor;
mod editor_state;
mod error;
mod invariants;
mod lookup;
mod selection;
mod to_tree;
mod transaction;

#[cfg(test)]
mod tests;

pub use crate::dom::nodes::{
    BlockKind, BlockNode, FormatFlags, Node, NodeKey, NodeKind, TextFormat,
    TextMode, TextNode,
};
pub use crate::editor::{Editor, EditorConfig};
pub use crate::editor_state::EditorState;
pub use crate::error::{TreeError, TreeResult};
pub use crate::lookup::NodeLookup;
pub use crate::selection::{Point, PointKind, RangeSelection};
pub use crate::to_tree::ToTree;
pub use crate::transaction::{DirtyKind, Transaction, TreeUpdate, TxnMode};
