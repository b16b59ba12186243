//! Markdown rendering for the editor dialect.
//!
//! - [`parse`] turns markdown into sanitized HTML through a fixed sequence of
//!   substitutions
//! - [`attach`] adds the interactive layer (spoilers, lazy video embeds, links
//!   opening in a new tab) on top of rendered HTML
//! - [`LivePreview`] keeps a rendered copy of an editing surface up to date

mod attach;
mod parser;
mod preview;
mod sanitize;

pub use attach::{attach, RenderedContent, Widget};
pub use parser::{parse, youtube_video_id, MarkdownParser, PROFILE_URL_PREFIX};
pub use preview::LivePreview;
pub use sanitize::{AllowListSanitizer, Sanitizer};
