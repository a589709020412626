// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The edit-transaction context.
//!
//! [`Transaction`] owns the pending state of one edit. Its operations are
//! spread over several files, each adding an `impl Transaction` block:
//!
//! | File          | Operations                                         |
//! |---------------|----------------------------------------------------|
//! | `base`        | copy-on-write access, node creation, dirty sets    |
//! | `block_ops`   | `append`, `clear`, `splice`, `insert_before/after` |
//! | `node_ops`    | `remove`, `detach`                                 |
//! | `text_ops`    | text content, formats, `split_text`                |
//! | `selection`   | reading and moving the selection                   |
//! | `normalize`   | merging adjacent compatible text nodes             |

mod base;
mod block_ops;
mod node_ops;
mod normalize;
mod selection;
mod text_ops;

pub use base::{DirtyKind, Transaction, TreeUpdate, TxnMode};
