//! Live preview that follows a text surface.

use tracing::debug;

use super::attach::{attach, RenderedContent};
use super::parser::MarkdownParser;
use super::sanitize::{AllowListSanitizer, Sanitizer};
use crate::editing::TextBuffer;

/// Re-renders the buffer every time its surface reports a change.
///
/// Selection-only changes do not trigger a new render.
#[derive(Debug, Clone)]
pub struct LivePreview<S = AllowListSanitizer> {
    parser: MarkdownParser<S>,
    source: Option<String>,
    content: Option<RenderedContent>,
    renders: usize,
}

impl Default for LivePreview {
    fn default() -> Self {
        Self::with_parser(MarkdownParser::new())
    }
}

impl LivePreview {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Sanitizer> LivePreview<S> {
    pub fn with_parser(parser: MarkdownParser<S>) -> Self {
        Self {
            parser,
            source: None,
            content: None,
            renders: 0,
        }
    }

    /// Change notification from the surface.
    pub fn update(&mut self, buffer: &TextBuffer) {
        if self.source.as_deref() == Some(buffer.text()) {
            return;
        }
        let html = self.parser.parse(buffer.text());
        self.content = Some(attach(&html));
        self.source = Some(buffer.text().to_string());
        self.renders += 1;
        debug!(renders = self.renders, chars = buffer.char_len(), "Preview re-rendered");
    }

    pub fn content(&self) -> Option<&RenderedContent> {
        self.content.as_ref()
    }

    pub fn content_mut(&mut self) -> Option<&mut RenderedContent> {
        self.content.as_mut()
    }

    /// Current preview markup, empty before the first update.
    pub fn html(&self) -> String {
        self.content
            .as_ref()
            .map(RenderedContent::html)
            .unwrap_or_default()
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }
}
