//! Link, image and video templates.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::wrap::{wrap_selection, Delimiters};
use super::{char_len, Selection, TextBuffer};

/// Default image width used when nothing is configured.
pub const DEFAULT_IMAGE_WIDTH: u32 = 420;

/// Unit of an [`ImageWidth`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageUnit {
    #[default]
    Px,
    Percent,
}

/// Width written into `imgWIDTH(url)` markup.
///
/// Displays as the bare number for pixels (`420`) and with a trailing `%`
/// for percentages (`50%`), which is the form the markdown parser reads back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageWidth {
    pub value: u32,
    #[serde(default)]
    pub unit: ImageUnit,
}

impl ImageWidth {
    pub fn px(value: u32) -> Self {
        Self {
            value,
            unit: ImageUnit::Px,
        }
    }

    pub fn percent(value: u32) -> Self {
        Self {
            value,
            unit: ImageUnit::Percent,
        }
    }
}

impl Default for ImageWidth {
    fn default() -> Self {
        Self::px(DEFAULT_IMAGE_WIDTH)
    }
}

impl fmt::Display for ImageWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            ImageUnit::Px => write!(f, "{}", self.value),
            ImageUnit::Percent => write!(f, "{}%", self.value),
        }
    }
}

/// Markdown fragment for an uploaded or dropped image.
///
/// Matches exactly what [`wrap_image`] produces around a selected URL.
pub fn image_markdown(url: &str, width: ImageWidth) -> String {
    format!("img{width}({url})")
}

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r"^https?://\S+$").expect("URL pattern is valid"))
}

/// Wrap a validated URL in a video embed marker such as `youtube(...)`.
///
/// Does nothing unless the selected text matches `validation`. The wrap never
/// toggles off, and a selection that is already wrapped is left alone so
/// repeated invocations produce a single wrap.
pub fn wrap_video_link(
    buffer: &TextBuffer,
    delimiters: &Delimiters,
    validation: &Regex,
) -> TextBuffer {
    if delimiters.is_degenerate() || !validation.is_match(buffer.selected_text()) {
        return buffer.clone();
    }
    if buffer.before().ends_with(&delimiters.open) && buffer.after().starts_with(&delimiters.close)
    {
        return buffer.clone();
    }
    wrap_selection(buffer, delimiters, None, false)
}

/// Insert a link template around the selection.
///
/// `selected_plain_text` is what the host reports as the user's visible
/// selection. When it is a URL the result is `[](url)` with the caret inside
/// the brackets, ready for the link text. Otherwise the selection becomes the
/// link text, `[text]()`, with the caret inside the parentheses.
pub fn wrap_link(buffer: &TextBuffer, selected_plain_text: &str) -> TextBuffer {
    let selected = buffer.selected_text();
    let start = buffer.selection().start;
    let is_url = url_regex().is_match(selected_plain_text.trim());

    let (insert, caret) = if is_url {
        (format!("[]({selected})"), start + 1)
    } else {
        (format!("[{selected}]()"), start + 1 + char_len(selected) + 2)
    };

    let mut text = String::with_capacity(buffer.text().len() + insert.len());
    text.push_str(buffer.before());
    text.push_str(&insert);
    text.push_str(buffer.after());
    TextBuffer::new(text, Selection::caret(caret))
}

/// Wrap the selection as `imgWIDTH(...)`, keeping the selection inside the
/// parentheses.
pub fn wrap_image(buffer: &TextBuffer, width: ImageWidth) -> TextBuffer {
    let delimiters = Delimiters::pair(format!("img{width}("), ")");
    wrap_selection(buffer, &delimiters, None, false)
}
