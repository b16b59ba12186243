//! Editing surfaces the dispatcher works on.

use std::fmt;

use crate::editing::TextBuffer;

/// What kind of input currently has focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Plain multi-line text input. The only kind hotkeys act on.
    TextArea,
    /// Code editor used for raw CSS. It owns its own key handling.
    CodeEditor,
    /// Anything else that can hold focus.
    Other,
}

/// A host input holding a text buffer.
pub trait EditSurface {
    fn kind(&self) -> SurfaceKind;

    /// Current text and selection.
    fn buffer(&self) -> TextBuffer;

    /// Replace the text and selection, then tell observers the input changed.
    fn set_buffer(&mut self, buffer: TextBuffer);
}

type Observer = Box<dyn FnMut(&TextBuffer)>;

/// In-process surface with a change-observer list.
///
/// Observers (character counters, live preview) are called after every
/// write, in subscription order.
pub struct TextSurface {
    kind: SurfaceKind,
    buffer: TextBuffer,
    observers: Vec<Observer>,
}

impl TextSurface {
    pub fn new(kind: SurfaceKind, buffer: TextBuffer) -> Self {
        Self {
            kind,
            buffer,
            observers: Vec::new(),
        }
    }

    pub fn text_area(buffer: TextBuffer) -> Self {
        Self::new(SurfaceKind::TextArea, buffer)
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&TextBuffer) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }
}

impl EditSurface for TextSurface {
    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn buffer(&self) -> TextBuffer {
        self.buffer.clone()
    }

    fn set_buffer(&mut self, buffer: TextBuffer) {
        self.buffer = buffer;
        for observer in &mut self.observers {
            observer(&self.buffer);
        }
    }
}

impl fmt::Debug for TextSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextSurface")
            .field("kind", &self.kind)
            .field("buffer", &self.buffer)
            .field("observers", &self.observers.len())
            .finish()
    }
}
