//! Built-in command table.

use crate::editing::Delimiters;

use super::mapping::InputMapping;

/// Description of the built-in link command.
pub const LINK: &str = "Link";
/// Description of the built-in image command.
pub const IMAGE: &str = "Image";

pub const YOUTUBE_URL_PATTERN: &str =
    r"^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:\S*&)?v=|embed/|shorts/)|youtu\.be/)[\w-]{11}(?:[?&#]\S*)?$";

pub const WEBM_URL_PATTERN: &str = r"^https?://\S+\.webm(?:[?#]\S*)?$";

/// The default mapping set, in dispatch order.
pub fn default_mappings() -> Vec<InputMapping> {
    vec![
        InputMapping::wrap("ctrl+b", "Bold", Delimiters::symmetric("__"))
            .with_special_remove(Delimiters::symmetric("**")),
        InputMapping::wrap("ctrl+i", "Italic", Delimiters::symmetric("_"))
            .with_special_remove(Delimiters::symmetric("*")),
        InputMapping::wrap("ctrl+shift+x", "Strikethrough", Delimiters::symmetric("~~")),
        InputMapping::wrap("ctrl+shift+s", "Spoiler", Delimiters::pair("~!", "!~")),
        InputMapping::wrap("ctrl+shift+e", "Center", Delimiters::symmetric("~~~")),
        InputMapping::wrap("ctrl+backquote", "Code", Delimiters::symmetric("`")),
        InputMapping::wrap(
            "ctrl+shift+backquote",
            "Code Block",
            Delimiters::pair("```\n", "\n```"),
        ),
        InputMapping::line_start("ctrl+h", "Header", "#", 5),
        InputMapping::every_line_start("ctrl+q", "Quote", ">"),
        InputMapping::every_line_start("ctrl+shift+8", "Bullet List", "-"),
        InputMapping::every_line_start("ctrl+shift+7", "Numbered List", "1."),
        InputMapping::video(
            "ctrl+shift+y",
            "YouTube",
            Delimiters::pair("youtube(", ")"),
            YOUTUBE_URL_PATTERN,
        ),
        InputMapping::video(
            "ctrl+shift+m",
            "WebM",
            Delimiters::pair("webm(", ")"),
            WEBM_URL_PATTERN,
        ),
        InputMapping::link("ctrl+k", LINK),
        InputMapping::image("ctrl+shift+i", IMAGE),
    ]
}
