//! Selection-aware markdown edits.
//!
//! Every operation here is a pure function of a [`TextBuffer`] (text plus a
//! selection) and returns a new buffer. Nothing in this module knows about
//! key events, storage or rendering; the hotkey dispatcher feeds it the live
//! value of a text input and writes the result back.
//!
//! Offsets are **character** offsets, the way a text input reports them,
//! never byte offsets. Conversion to byte offsets happens at the edges of each
//! operation via [`char_offset_to_byte_offset`].
//!
//! # Operations
//!
//! - [`wrap_selection`] - toggling prefix/suffix wrap (bold, spoiler, ...)
//! - [`line_start`] - toggle or stack a prefix on the selection's line
//! - [`insert_at_every_line`] - same rule applied to every selected line
//! - [`wrap_video_link`] - validated, non-toggling embed wrap
//! - [`wrap_link`] / [`wrap_image`] - link and image templates

mod lines;
mod media;
mod wrap;

#[cfg(test)]
#[path = "editing_tests.rs"]
mod editing_tests;

pub use lines::{insert_at_every_line, line_start};
pub use media::{
    image_markdown, wrap_image, wrap_link, wrap_video_link, ImageUnit, ImageWidth,
    DEFAULT_IMAGE_WIDTH,
};
pub use wrap::{wrap_selection, Delimiters};

use serde::{Deserialize, Serialize};

/// A selection range in character offsets. `start <= end` always holds for
/// values produced by [`Selection::new`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Build a selection, swapping the ends if they arrive reversed.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A collapsed selection (caret) at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Clamp both ends into `0..=len`.
    pub fn clamped(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

/// Text plus the selection an edit applies to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    selection: Selection,
    char_len: usize,
}

impl TextBuffer {
    /// Create a buffer. Out-of-range selections are clamped, reversed ones
    /// are swapped.
    pub fn new(text: impl Into<String>, selection: Selection) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self {
            selection: selection.clamped(char_len),
            text,
            char_len,
        }
    }

    /// Create a buffer with a caret at the end of the text.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self {
            text,
            selection: Selection::caret(char_len),
            char_len,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection.clamped(self.char_len);
        self
    }

    /// The selected substring.
    pub fn selected_text(&self) -> &str {
        let (start, end) = self.selection_bytes();
        &self.text[start..end]
    }

    /// Text before the selection.
    pub(crate) fn before(&self) -> &str {
        &self.text[..self.selection_bytes().0]
    }

    /// Text after the selection.
    pub(crate) fn after(&self) -> &str {
        &self.text[self.selection_bytes().1..]
    }

    /// Selection as byte offsets into [`TextBuffer::text`].
    pub(crate) fn selection_bytes(&self) -> (usize, usize) {
        let start = char_offset_to_byte_offset(&self.text, self.selection.start);
        let end = char_offset_to_byte_offset(&self.text, self.selection.end);
        (start, end)
    }
}

/// Convert a character offset into a byte offset, clamping to the end of the
/// string.
pub(crate) fn char_offset_to_byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(text.len())
}

/// Character count of a string slice.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}
