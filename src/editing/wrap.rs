//! Toggling prefix/suffix wraps.

use serde::{Deserialize, Serialize};

use super::{char_len, Selection, TextBuffer};

/// An opening and closing marker pair.
///
/// Serialized either as a single string (symmetric wrap, e.g. `"__"`) or as a
/// two-element array (asymmetric wrap, e.g. `["~!", "!~"]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "DelimitersRepr", into = "DelimitersRepr")]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DelimitersRepr {
    Symmetric(String),
    Pair(String, String),
}

impl From<DelimitersRepr> for Delimiters {
    fn from(repr: DelimitersRepr) -> Self {
        match repr {
            DelimitersRepr::Symmetric(s) => Self::symmetric(s),
            DelimitersRepr::Pair(open, close) => Self::pair(open, close),
        }
    }
}

impl From<Delimiters> for DelimitersRepr {
    fn from(d: Delimiters) -> Self {
        if d.open == d.close {
            DelimitersRepr::Symmetric(d.open)
        } else {
            DelimitersRepr::Pair(d.open, d.close)
        }
    }
}

impl Delimiters {
    pub fn symmetric(marker: impl Into<String>) -> Self {
        let marker = marker.into();
        Self {
            open: marker.clone(),
            close: marker,
        }
    }

    pub fn pair(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// True when either side is empty. Such a pair cannot wrap anything.
    pub fn is_degenerate(&self) -> bool {
        self.open.is_empty() || self.close.is_empty()
    }

    /// Whether the selection of `buffer` sits directly between these markers,
    /// with neither marker continuing into a longer run of the same character.
    fn surrounds(&self, buffer: &TextBuffer) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let before = buffer.before();
        let after = buffer.after();
        let Some(outside_open) = before.strip_suffix(self.open.as_str()) else {
            return false;
        };
        let Some(outside_close) = after.strip_prefix(self.close.as_str()) else {
            return false;
        };

        let open_repeated = outside_open.chars().next_back() == self.open.chars().next();
        let close_repeated = outside_close.chars().next() == self.close.chars().next_back();
        !open_repeated && !close_repeated
    }
}

/// Wrap the selection in `delimiters`, or strip them if already present.
///
/// With `cancellable` set, a selection that is already directly surrounded by
/// `delimiters` (or by `special_remove`, checked second) is unwrapped instead.
/// Applying the same wrap twice therefore restores the original text and
/// selection. Degenerate delimiters leave the buffer unchanged.
pub fn wrap_selection(
    buffer: &TextBuffer,
    delimiters: &Delimiters,
    special_remove: Option<&Delimiters>,
    cancellable: bool,
) -> TextBuffer {
    if delimiters.is_degenerate() {
        return buffer.clone();
    }

    if cancellable {
        let existing = std::iter::once(delimiters)
            .chain(special_remove)
            .find(|d| d.surrounds(buffer));
        if let Some(existing) = existing {
            return unwrap(buffer, existing);
        }
    }

    insert(buffer, delimiters)
}

fn insert(buffer: &TextBuffer, delimiters: &Delimiters) -> TextBuffer {
    let mut text = String::with_capacity(
        buffer.text().len() + delimiters.open.len() + delimiters.close.len(),
    );
    text.push_str(buffer.before());
    text.push_str(&delimiters.open);
    text.push_str(buffer.selected_text());
    text.push_str(&delimiters.close);
    text.push_str(buffer.after());

    let shift = char_len(&delimiters.open);
    let sel = buffer.selection();
    TextBuffer::new(text, Selection::new(sel.start + shift, sel.end + shift))
}

fn unwrap(buffer: &TextBuffer, delimiters: &Delimiters) -> TextBuffer {
    let before = buffer.before();
    let after = buffer.after();
    let before = &before[..before.len() - delimiters.open.len()];
    let after = &after[delimiters.close.len()..];

    let mut text = String::with_capacity(buffer.text().len());
    text.push_str(before);
    text.push_str(buffer.selected_text());
    text.push_str(after);

    let shift = char_len(&delimiters.open);
    let sel = buffer.selection();
    TextBuffer::new(
        text,
        Selection::new(sel.start.saturating_sub(shift), sel.end.saturating_sub(shift)),
    )
}
