//! AniList markdown - editing hotkeys and comment rendering
//!
//! This library provides the text-editing commands bound to hotkeys in
//! AniList text areas, the persisted user rebindings, and the markdown
//! parser that turns comment source into sanitized HTML with interactive
//! spoilers and video embeds.

pub mod config;
pub mod editing;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod shortcuts;
pub mod storage;
