// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Key 0 is reserved for the root.
static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Stable identifier for a node.
///
/// A key names a node, not a version of it: the copy-on-write clone made
/// when a node is first written in a transaction keeps the same key.
/// Keys are unique within the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u64);

impl NodeKey {
    /// The root block that every editor state contains.
    pub const ROOT: NodeKey = NodeKey(0);

    /// Allocate a key that has never been handed out before.
    pub(crate) fn next() -> Self {
        Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw key, e.g. one that a host stored earlier.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }

    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
