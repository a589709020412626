// Copyright (c) 2026 Element Creations Ltd
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter};

/// Inline formatting that can be applied to a run of text.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum TextFormat {
    Bold,
    Italic,
    StrikeThrough,
    Underline,
    InlineCode,
}

/// A set of [`TextFormat`]s, stored as a bitset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FormatFlags(u8);

impl FormatFlags {
    pub const NONE: FormatFlags = FormatFlags(0);

    fn bit(format: TextFormat) -> u8 {
        1 << (format as u8)
    }

    pub fn contains(&self, format: TextFormat) -> bool {
        self.0 & Self::bit(format) != 0
    }

    pub fn insert(&mut self, format: TextFormat) {
        self.0 |= Self::bit(format);
    }

    pub fn remove(&mut self, format: TextFormat) {
        self.0 &= !Self::bit(format);
    }

    pub fn toggle(&mut self, format: TextFormat) {
        self.0 ^= Self::bit(format);
    }

    pub fn with(mut self, format: TextFormat) -> Self {
        self.insert(format);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The formats in this set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = TextFormat> + '_ {
        TextFormat::iter().filter(|f| self.contains(*f))
    }
}

impl From<TextFormat> for FormatFlags {
    fn from(format: TextFormat) -> Self {
        FormatFlags::NONE.with(format)
    }
}

impl FromIterator<TextFormat> for FormatFlags {
    fn from_iter<I: IntoIterator<Item = TextFormat>>(iter: I) -> Self {
        let mut flags = FormatFlags::NONE;
        for format in iter {
            flags.insert(format);
        }
        flags
    }
}

/// How the editor treats a text node as a unit.
///
/// `Immutable` nodes behave as a single token (think mention pills) and
/// `Segmented` nodes are edited word by word. Neither ever merges with
/// its neighbours.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, AsRefStr, Display,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum TextMode {
    #[default]
    Normal,
    Immutable,
    Segmented,
}

/// A leaf holding a run of identically formatted text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextNode {
    text: String,
    format: FormatFlags,
    url: Option<String>,
    mode: TextMode,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<FormatFlags>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_mode(mut self, mode: TextMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> FormatFlags {
        self.format
    }

    pub fn has_format(&self, format: TextFormat) -> bool {
        self.format.contains(format)
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn mode(&self) -> TextMode {
        self.mode
    }

    /// Length in UTF-16 code units, the unit selection offsets use.
    pub fn text_len(&self) -> usize {
        utf16_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_immutable(&self) -> bool {
        self.mode == TextMode::Immutable
    }

    pub fn is_segmented(&self) -> bool {
        self.mode == TextMode::Segmented
    }

    /// Whether this node may take part in a normalization merge at all.
    pub fn is_mergeable(&self) -> bool {
        self.mode == TextMode::Normal
    }

    /// Whether `other` could be merged into the same run as `self`.
    pub fn can_merge_with(&self, other: &TextNode) -> bool {
        self.is_mergeable()
            && other.is_mergeable()
            && self.format == other.format
            && self.url == other.url
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn set_format(&mut self, format: FormatFlags) {
        self.format = format;
    }

    pub(crate) fn toggle_format(&mut self, format: TextFormat) {
        self.format.toggle(format);
    }

    pub(crate) fn set_url(&mut self, url: Option<String>) {
        self.url = url;
    }

    pub(crate) fn set_mode(&mut self, mode: TextMode) {
        self.mode = mode;
    }
}

pub(crate) fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Convert a UTF-16 offset into a byte index into `text`.
///
/// Returns `None` when the offset is past the end or falls between the
/// two halves of a surrogate pair.
pub(crate) fn byte_index_for_utf16(
    text: &str,
    offset: usize,
) -> Option<usize> {
    let mut units = 0;
    for (byte_index, ch) in text.char_indices() {
        if units == offset {
            return Some(byte_index);
        }
        if units > offset {
            return None;
        }
        units += ch.len_utf16();
    }
    (units == offset).then_some(text.len())
}
