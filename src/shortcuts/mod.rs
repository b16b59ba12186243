//! Markdown editing hotkeys.
//!
//! This module provides:
//! - Chord parsing, matching and platform-aware display
//! - The built-in command table and the user's mapping set
//! - Persistence of user rebindings through the host key-value store
//! - A dispatcher that applies editing operations to a focused text surface
//!
//! # Example
//!
//! ```ignore
//! use anilist_markdown::shortcuts::{KeyEvent, MarkdownHotkeys, TextSurface, DispatchContext};
//! use anilist_markdown::storage::MemoryStore;
//!
//! let hotkeys = MarkdownHotkeys::load(MemoryStore::new());
//! let mut surface = TextSurface::text_area(TextBuffer::new("hi", Selection::new(0, 2)));
//! hotkeys.dispatch(&KeyEvent::from_chord("ctrl+b")?, &mut surface, &DispatchContext::default());
//! assert_eq!(surface.text(), "__hi__");
//! ```

mod defaults;
mod dispatcher;
mod mapping;
mod persistence;
mod registry;
mod settings;
mod surface;
mod types;

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;


#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod dispatcher_tests;

pub use types::{canonicalize_key, is_known_key, KeyEvent, Modifiers, Platform, Shortcut, ShortcutParseError};

pub use defaults::{default_mappings, IMAGE, LINK, WEBM_URL_PATTERN, YOUTUBE_URL_PATTERN};
pub use mapping::{InputMapping, MappingType};
pub use registry::{ChordConflict, MarkdownHotkeysConfig};

pub use persistence::{clear_hotkeys, load_hotkeys, save_hotkeys, LoadReport, FORMAT_VERSION, STORAGE_KEY};

pub use dispatcher::{run_mapping, DispatchContext, HotkeyDispatcher};
pub use settings::{MarkdownHotkeys, SettingsRow};
pub use surface::{EditSurface, SurfaceKind, TextSurface};
