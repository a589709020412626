// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Debug rendering of the node tree.
//!
//! ```text
//! root
//! ├─ paragraph
//! │  ├─ "a{b"
//! │  └─ "c}d" [bold]
//! └─ quote
//!    └─ |
//! ```
//!
//! Selection points are drawn inside the text they sit in: `|` for a
//! collapsed selection, `{` and `}` for the start and end of a range in
//! document order. A point on a block shows up as a `|` line among its
//! children. Keys are left out so dumps stay stable between runs.

use crate::dom::nodes::{Node, TextMode, TextNode};
use crate::{NodeKey, NodeLookup, Point, PointKind};

pub trait ToTree {
    fn to_tree(&self) -> String;
}

impl<L: NodeLookup + ?Sized> ToTree for L {
    fn to_tree(&self) -> String {
        let markers = selection_markers(self);
        let mut out = String::from("root\n");
        render_children(self, NodeKey::ROOT, "", &markers, &mut out);
        out
    }
}

enum Entry<'a> {
    Node(&'a Node),
    Caret(char),
}

fn render_children<L: NodeLookup + ?Sized>(
    lookup: &L,
    block: NodeKey,
    prefix: &str,
    markers: &[(Point, char)],
    out: &mut String,
) {
    let children = lookup.get_children(block);
    let carets_at = move |index: usize, last: bool| {
        markers.iter().filter(move |(point, _)| {
            point.kind == PointKind::Element
                && point.key == block
                && (point.offset == index || (last && point.offset > index))
        })
    };

    let mut entries = Vec::new();
    for (index, child) in children.iter().copied().enumerate() {
        entries.extend(carets_at(index, false).map(|(_, c)| Entry::Caret(*c)));
        entries.push(Entry::Node(child));
    }
    entries.extend(
        carets_at(children.len(), true).map(|(_, c)| Entry::Caret(*c)),
    );

    let count = entries.len();
    for (i, entry) in entries.into_iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { "└─ " } else { "├─ " };
        match entry {
            Entry::Caret(c) => {
                out.push_str(&format!("{prefix}{connector}{c}\n"));
            }
            Entry::Node(node) => {
                out.push_str(&format!(
                    "{prefix}{connector}{}\n",
                    describe(node, markers)
                ));
                if node.is_block() {
                    let nested = if last { "   " } else { "│  " };
                    render_children(
                        lookup,
                        node.key(),
                        &format!("{prefix}{nested}"),
                        markers,
                        out,
                    );
                }
            }
        }
    }
}

fn describe(node: &Node, markers: &[(Point, char)]) -> String {
    if let Some(block) = node.as_block() {
        return block.kind().to_string();
    }
    let Some(text) = node.as_text() else {
        return String::new();
    };
    let mut marks: Vec<(usize, char)> = markers
        .iter()
        .filter(|(point, _)| {
            point.kind == PointKind::Text && point.key == node.key()
        })
        .map(|(point, c)| (point.offset, *c))
        .collect();
    marks.sort_by_key(|(offset, _)| *offset);

    let mut line = format!("\"{}\"", annotate(text.text(), &marks));
    line.push_str(&text_attributes(text));
    line
}

fn text_attributes(text: &TextNode) -> String {
    let mut out = String::new();
    let formats: Vec<String> =
        text.format().iter().map(|f| f.to_string()).collect();
    if !formats.is_empty() {
        out.push_str(&format!(" [{}]", formats.join(", ")));
    }
    if let Some(url) = text.url() {
        out.push_str(&format!(" link=\"{url}\""));
    }
    if text.mode() != TextMode::Normal {
        out.push_str(&format!(" ({})", text.mode()));
    }
    out
}

/// Insert markers at UTF-16 offsets. `marks` must be sorted by offset.
fn annotate(text: &str, marks: &[(usize, char)]) -> String {
    let mut out = String::with_capacity(text.len() + marks.len());
    let mut pending = marks.iter().peekable();
    let mut pos = 0;
    for ch in text.chars() {
        while let Some((_, c)) = pending.next_if(|(offset, _)| *offset <= pos)
        {
            out.push(*c);
        }
        out.push(ch);
        pos += ch.len_utf16();
    }
    out.extend(pending.map(|(_, c)| *c));
    out
}

fn selection_markers<L: NodeLookup + ?Sized>(lookup: &L) -> Vec<(Point, char)> {
    let Some(selection) = lookup.selection() else {
        return Vec::new();
    };
    if selection.is_collapsed() {
        return vec![(selection.anchor, '|')];
    }
    let (start, end) = match (
        document_position(lookup, &selection.anchor),
        document_position(lookup, &selection.focus),
    ) {
        (Some(anchor), Some(focus)) if focus < anchor => {
            (selection.focus, selection.anchor)
        }
        _ => (selection.anchor, selection.focus),
    };
    vec![(start, '{'), (end, '}')]
}

/// The path of child indexes from the root down to the point, followed
/// by the offset. Comparing two of these orders points in the document.
fn document_position<L: NodeLookup + ?Sized>(
    lookup: &L,
    point: &Point,
) -> Option<Vec<usize>> {
    let mut path = vec![point.offset];
    let mut key = point.key;
    while !key.is_root() {
        path.push(lookup.get_index_within_parent(key)?);
        key = lookup.get_node(key).ok()?.parent()?;
    }
    path.reverse();
    Some(path)
}
