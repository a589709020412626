// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::invariants::assert_before_commit;
use crate::{EditorState, Transaction, TreeResult, TreeUpdate, TxnMode};

/// Runtime settings of an [`Editor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    /// Label attached to the log spans of this editor, to tell several
    /// editors apart.
    pub namespace: String,
    /// Normalize every touched block before each commit, restoring the
    /// selection if there is one.
    pub normalize_on_commit: bool,
}

impl EditorConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_normalize_on_commit(mut self, normalize: bool) -> Self {
        self.normalize_on_commit = normalize;
        self
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            namespace: String::from("doctree"),
            normalize_on_commit: false,
        }
    }
}

/// Owner of the committed editor state.
///
/// Every read or edit runs inside a [`Transaction`] created here. An
/// edit that returns `Ok` is committed and becomes the new state; one
/// that returns `Err` is thrown away, leaving the committed state
/// exactly as it was.
pub struct Editor {
    config: EditorConfig,
    state: Arc<EditorState>,
}

impl Editor {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            state: Arc::new(EditorState::new()),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The committed state. Node versions in it are never changed by
    /// later edits.
    pub fn state(&self) -> Arc<EditorState> {
        Arc::clone(&self.state)
    }

    /// Run `f` against the committed state. Any mutator `f` calls fails
    /// with [`TreeError::ReadOnly`](crate::TreeError::ReadOnly).
    pub fn read<T>(
        &self,
        f: impl FnOnce(&mut Transaction) -> TreeResult<T>,
    ) -> TreeResult<T> {
        let span = debug_span!("read", namespace = %self.config.namespace);
        let _entered = span.enter();
        let mut txn =
            Transaction::new(Arc::clone(&self.state), TxnMode::ReadOnly);
        f(&mut txn)
    }

    /// Run `f` as one edit and commit the result.
    pub fn update<T>(
        &mut self,
        f: impl FnOnce(&mut Transaction) -> TreeResult<T>,
    ) -> TreeResult<(T, TreeUpdate)> {
        let span = debug_span!("update", namespace = %self.config.namespace);
        let _entered = span.enter();
        debug!("begin transaction");

        let mut txn =
            Transaction::new(Arc::clone(&self.state), TxnMode::Write);
        let normalize = self.config.normalize_on_commit;
        let result = f(&mut txn).and_then(|value| {
            if normalize {
                txn.normalize_dirty_blocks()?;
            }
            Ok(value)
        });
        let value = match result {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "transaction aborted, discarding changes");
                return Err(e);
            }
        };

        assert_before_commit(txn.state());
        let update = txn.commit();
        debug!(
            leaves = update.dirty_leaves.len(),
            blocks = update.dirty_blocks.len(),
            sub_trees = update.dirty_sub_trees.len(),
            selection = update.selection_dirty,
            "committed transaction"
        );
        self.state = Arc::clone(&update.state);
        Ok((value, update))
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::dom::nodes::BlockKind;
    use crate::{Editor, EditorConfig, NodeKey, NodeLookup, TreeError};

    #[test]
    fn default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.namespace, "doctree");
        assert!(!config.normalize_on_commit);
    }

    #[test]
    fn config_builder() {
        let config =
            EditorConfig::new("composer").with_normalize_on_commit(true);
        assert_eq!(config.namespace, "composer");
        assert!(config.normalize_on_commit);
    }

    #[test]
    fn successful_updates_replace_the_state() {
        let mut editor = Editor::new();
        let before = editor.state();
        let (p, update) = editor
            .update(|txn| {
                let p = txn.create_block(BlockKind::Paragraph)?;
                txn.append(NodeKey::ROOT, p)?;
                Ok(p)
            })
            .unwrap();
        assert!(Arc::ptr_eq(&editor.state(), &update.state));
        assert!(editor.state().contains(p));
        assert!(!before.contains(p));
    }

    #[test]
    fn failed_updates_leave_the_state_alone() {
        let mut editor = Editor::new();
        let before = editor.state();
        let result = editor.update(|txn| {
            let p = txn.create_block(BlockKind::Paragraph)?;
            txn.append(NodeKey::ROOT, p)?;
            txn.remove(NodeKey::ROOT, false)
        });
        assert!(matches!(result, Err(TreeError::Invariant(_))));
        assert!(Arc::ptr_eq(&editor.state(), &before));
        assert_eq!(editor.state().get_children_size(NodeKey::ROOT), 0);
    }

    #[test]
    fn reads_cannot_write() {
        let editor = Editor::new();
        let result = editor.read(|txn| txn.create_block(BlockKind::Quote));
        assert_eq!(
            result,
            Err(TreeError::ReadOnly {
                operation: "create a block"
            })
        );
    }
}
