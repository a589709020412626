// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

pub mod block_node;
pub mod node;
pub mod node_key;
pub mod text_node;

pub use block_node::{BlockKind, BlockNode};
pub use node::{Node, NodeKind};
pub use node_key::NodeKey;
pub use text_node::{FormatFlags, TextFormat, TextMode, TextNode};
