// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use thiserror::Error;

use crate::NodeKey;

/// Everything that can go wrong while reading or editing the tree.
///
/// All of these are contract violations by the caller: there is no I/O
/// underneath, so nothing here is worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A mutator was called on a read-only transaction. Nothing was
    /// changed.
    #[error("Cannot {operation}: the editor state is read-only")]
    ReadOnly { operation: &'static str },

    /// The tree (or the selection) is not in a shape the operation can
    /// work with.
    #[error("Invariant violation: {0}")]
    Invariant(String),

    #[error("Node {0} does not exist in the editor state")]
    NodeNotFound(NodeKey),

    #[error("Node {0} is not a block node")]
    NotABlock(NodeKey),

    #[error("Node {0} is not a text node")]
    NotAText(NodeKey),

    #[error("Offset {offset} is out of bounds for node {key} (length {len})")]
    OffsetOutOfBounds {
        key: NodeKey,
        offset: usize,
        len: usize,
    },
}

impl TreeError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
