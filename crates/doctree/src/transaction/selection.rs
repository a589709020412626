// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Selection management.

use crate::{
    NodeKey, NodeLookup, Point, PointKind, RangeSelection, Transaction,
    TreeError, TreeResult,
};

/// A change to one slot of a block's child list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChildChange {
    Inserted,
    Removed,
}

impl Transaction {
    /// The current selection, if any.
    pub fn get_selection(&self) -> Option<&RangeSelection> {
        self.selection()
    }

    /// Replace the selection. Both points must name existing nodes of the
    /// right kind, with offsets inside them. The new selection is marked
    /// dirty.
    pub fn set_selection(
        &mut self,
        selection: Option<RangeSelection>,
    ) -> TreeResult<()> {
        self.check_writable("set the selection")?;
        let selection = match selection {
            Some(mut selection) => {
                self.check_point(&selection.anchor)?;
                self.check_point(&selection.focus)?;
                selection.mark_dirty();
                Some(selection)
            }
            None => None,
        };
        self.state_mut().selection = selection;
        Ok(())
    }

    /// Select from `anchor_offset` to `focus_offset` inside one text node.
    pub fn select_text(
        &mut self,
        key: NodeKey,
        anchor_offset: usize,
        focus_offset: usize,
    ) -> TreeResult<()> {
        self.set_selection(Some(RangeSelection::new(
            Point::text(key, anchor_offset),
            Point::text(key, focus_offset),
        )))
    }

    /// Keep element points on `parent` between the same two children
    /// after the child at `index` was inserted or removed.
    pub(crate) fn shift_element_points(
        &mut self,
        parent: NodeKey,
        index: usize,
        change: ChildChange,
    ) {
        let affected = |point: &Point| {
            point.kind == PointKind::Element
                && point.key == parent
                && match change {
                    ChildChange::Inserted => point.offset >= index,
                    ChildChange::Removed => point.offset > index,
                }
        };
        let touches = self.selection().is_some_and(|selection| {
            affected(&selection.anchor) || affected(&selection.focus)
        });
        if !touches {
            return;
        }
        if let Some(selection) = self.state_mut().selection.as_mut() {
            for point in selection.points_mut() {
                if affected(&*point) {
                    match change {
                        ChildChange::Inserted => point.offset += 1,
                        ChildChange::Removed => point.offset -= 1,
                    }
                }
            }
            selection.mark_dirty();
        }
    }

    fn check_point(&self, point: &Point) -> TreeResult<()> {
        let len = match point.kind {
            PointKind::Text => self.get_text(point.key)?.text_len(),
            PointKind::Element => {
                self.get_block(point.key)?.children().len()
            }
        };
        if point.offset > len {
            return Err(TreeError::OffsetOutOfBounds {
                key: point.key,
                offset: point.offset,
                len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::tests::testutils::{plain_paragraph, write_txn};
    use crate::{
        EditorState, NodeKey, Point, RangeSelection, Transaction, TreeError,
        TxnMode,
    };

    #[test]
    fn select_text_sets_both_points_and_marks_dirty() {
        let mut txn = write_txn();
        let (_, keys) = plain_paragraph(&mut txn, &["abcdef"]);
        txn.select_text(keys[0], 5, 2).unwrap();
        let selection = txn.get_selection().unwrap();
        assert_eq!(selection.anchor, Point::text(keys[0], 5));
        assert_eq!(selection.focus, Point::text(keys[0], 2));
        assert!(selection.is_dirty());
        assert!(!selection.is_collapsed());
    }

    #[test]
    fn offsets_past_the_end_are_rejected() {
        let mut txn = write_txn();
        let (_, keys) = plain_paragraph(&mut txn, &["abc"]);
        assert_eq!(
            txn.select_text(keys[0], 0, 4),
            Err(TreeError::OffsetOutOfBounds {
                key: keys[0],
                offset: 4,
                len: 3
            })
        );
        assert!(txn.get_selection().is_none());
    }

    #[test]
    fn element_points_count_children() {
        let mut txn = write_txn();
        let (p, _) = plain_paragraph(&mut txn, &["a", "b"]);
        let at_end = RangeSelection::collapsed(Point::element(p, 2));
        assert_eq!(txn.set_selection(Some(at_end)), Ok(()));
        let past_end = RangeSelection::collapsed(Point::element(p, 3));
        assert!(txn.set_selection(Some(past_end)).is_err());
    }

    #[test]
    fn text_points_must_name_text_nodes() {
        let mut txn = write_txn();
        assert_eq!(
            txn.select_text(NodeKey::ROOT, 0, 0),
            Err(TreeError::NotAText(NodeKey::ROOT))
        );
    }

    #[test]
    fn clearing_the_selection() {
        let mut txn = write_txn();
        let (_, keys) = plain_paragraph(&mut txn, &["a"]);
        txn.select_text(keys[0], 0, 0).unwrap();
        txn.set_selection(None).unwrap();
        assert!(txn.get_selection().is_none());
    }

    #[test]
    fn read_only_transactions_cannot_select() {
        let mut txn =
            Transaction::new(Arc::new(EditorState::new()), TxnMode::ReadOnly);
        assert!(matches!(
            txn.set_selection(None),
            Err(TreeError::ReadOnly { .. })
        ));
    }
}
