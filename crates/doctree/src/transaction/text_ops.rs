// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Editing text nodes: content, formats, links, modes and splitting.

use super::selection::ChildChange;
use crate::dom::nodes::text_node::{byte_index_for_utf16, utf16_len};
use crate::dom::nodes::{FormatFlags, NodeKind, TextFormat, TextMode};
use crate::{
    NodeKey, NodeLookup, PointKind, Transaction, TreeError, TreeResult,
};

impl Transaction {
    /// Replace the text of a text node. Selection points past the new end
    /// are pulled back to it.
    pub fn set_text_content(
        &mut self,
        key: NodeKey,
        text: impl Into<String>,
    ) -> TreeResult<()> {
        self.check_writable("set text content")?;
        let text = text.into();
        let len = utf16_len(&text);
        self.writable_text(key)?.set_text(text);

        let overshoots = self.selection().is_some_and(|selection| {
            [selection.anchor, selection.focus].iter().any(|point| {
                point.key == key
                    && point.kind == PointKind::Text
                    && point.offset > len
            })
        });
        if overshoots {
            if let Some(selection) = self.state_mut().selection.as_mut() {
                for point in selection.points_mut() {
                    if point.key == key && point.offset > len {
                        point.offset = len;
                    }
                }
                selection.mark_dirty();
            }
        }
        Ok(())
    }

    pub fn set_format(
        &mut self,
        key: NodeKey,
        format: FormatFlags,
    ) -> TreeResult<()> {
        self.check_writable("set format")?;
        self.writable_text(key)?.set_format(format);
        Ok(())
    }

    pub fn toggle_format(
        &mut self,
        key: NodeKey,
        format: TextFormat,
    ) -> TreeResult<()> {
        self.check_writable("toggle format")?;
        self.writable_text(key)?.toggle_format(format);
        Ok(())
    }

    pub fn set_url(
        &mut self,
        key: NodeKey,
        url: Option<String>,
    ) -> TreeResult<()> {
        self.check_writable("set url")?;
        self.writable_text(key)?.set_url(url);
        Ok(())
    }

    pub fn set_mode(&mut self, key: NodeKey, mode: TextMode) -> TreeResult<()> {
        self.check_writable("set mode")?;
        self.writable_text(key)?.set_mode(mode);
        Ok(())
    }

    /// Split a text node at the given UTF-16 offsets.
    ///
    /// The first part keeps the original key; the others are new nodes
    /// with the same format, url and mode, inserted right after it when
    /// the node has a parent. Offsets at either end of the text are
    /// ignored. Selection points inside the node follow their text; a
    /// point exactly on a split stays at the end of the left part.
    ///
    /// Returns the keys of all the parts, in order.
    pub fn split_text(
        &mut self,
        key: NodeKey,
        offsets: &[usize],
    ) -> TreeResult<Vec<NodeKey>> {
        self.check_writable("split text")?;
        let original = self.get_text(key)?.clone();
        let len = original.text_len();

        let mut cuts = offsets.to_vec();
        cuts.sort_unstable();
        cuts.dedup();
        let mut byte_cuts = Vec::with_capacity(cuts.len());
        for offset in &cuts {
            let byte = byte_index_for_utf16(original.text(), *offset)
                .ok_or(TreeError::OffsetOutOfBounds {
                    key,
                    offset: *offset,
                    len,
                })?;
            byte_cuts.push(byte);
        }
        let bounds: Vec<(usize, usize)> = cuts
            .into_iter()
            .zip(byte_cuts)
            .filter(|(offset, _)| *offset > 0 && *offset < len)
            .collect();
        if bounds.is_empty() {
            return Ok(vec![key]);
        }

        // (utf16 start, byte start) of every part, plus the end.
        let mut edges = vec![(0, 0)];
        edges.extend(bounds);
        edges.push((len, original.text().len()));

        let pieces: Vec<(usize, usize, &str)> = edges
            .windows(2)
            .map(|w| (w[0].0, w[1].0, &original.text()[w[0].1..w[1].1]))
            .collect();

        let parent = self.get_node(key)?.parent();
        let mut index = match parent {
            Some(parent) => self.get_block(parent)?.index_of(key),
            None => None,
        };

        self.writable_text(key)?.set_text(pieces[0].2);
        let mut parts = vec![key];
        for (_, _, piece) in &pieces[1..] {
            let mut text = original.clone();
            text.set_text(*piece);
            let part = self.insert_new(NodeKind::Text(text));
            if let (Some(parent), Some(at)) = (parent, index.as_mut()) {
                *at += 1;
                self.writable(part)?.set_parent(Some(parent));
                self.writable_block(parent)?.insert_child(*at, part);
                self.shift_element_points(parent, *at, ChildChange::Inserted);
            }
            parts.push(part);
        }

        self.rebase_selection_after_split(key, &pieces, &parts);
        Ok(parts)
    }

    fn rebase_selection_after_split(
        &mut self,
        key: NodeKey,
        pieces: &[(usize, usize, &str)],
        parts: &[NodeKey],
    ) {
        let inside = self.selection().is_some_and(|selection| {
            [selection.anchor, selection.focus]
                .iter()
                .any(|p| p.key == key && p.kind == PointKind::Text)
        });
        if !inside {
            return;
        }
        if let Some(selection) = self.state_mut().selection.as_mut() {
            for point in selection.points_mut() {
                if point.key != key || point.kind != PointKind::Text {
                    continue;
                }
                let part = pieces
                    .iter()
                    .position(|(start, end, _)| {
                        point.offset > *start && point.offset <= *end
                    })
                    .unwrap_or(0);
                point.key = parts[part];
                point.offset -= pieces[part].0;
            }
            selection.mark_dirty();
        }
    }
}
