//! Post-render attachment of interactive behaviour.
//!
//! The parser only produces static markup. [`attach`] scans that markup for
//! the elements that react to clicks (spoilers, YouTube placeholders), gives
//! each one a `data-widget` id, and forces every link to open in a new tab.
//! The returned [`RenderedContent`] tracks click state and re-renders the
//! markup on demand, so hosts never have to touch the HTML themselves.
//!
//! Running [`attach`] on its own output yields the same markup again.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::debug;

const REVEALED_CLASS: &str = "markdown-spoiler-revealed";

struct Patterns {
    anchor: Regex,
    widget: Regex,
    video_id: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        anchor: Regex::new(r"<a\b([^>]*)>").expect("anchor pattern is valid"),
        widget: Regex::new(
            r#"<span class="(markdown-spoiler(?: markdown-spoiler-revealed)?|youtube)"(?: data-widget="\d+")?([^>]*)>"#,
        )
        .expect("widget pattern is valid"),
        video_id: Regex::new(r#"data-video-id="([\w-]+)""#).expect("video id pattern is valid"),
    })
}

/// An element that reacts to clicks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Widget {
    /// Hidden content, revealed by clicking it and hidden again with its close
    /// icon.
    Spoiler { revealed: bool },
    /// Thumbnail placeholder that turns into an embedded player when clicked.
    YouTube { video_id: String, active: bool },
}

/// Parsed markup plus the state of its interactive elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedContent {
    markup: String,
    widgets: Vec<Widget>,
}

/// Attach interactive behaviour to rendered markdown.
pub fn attach(html: &str) -> RenderedContent {
    let p = patterns();

    let with_targets = p.anchor.replace_all(html, |caps: &Captures| {
        let attrs = &caps[1];
        if attrs.contains("target=") {
            caps[0].to_string()
        } else {
            format!(r#"<a{attrs} target="_blank" rel="noopener noreferrer">"#)
        }
    });

    let mut widgets = Vec::new();
    let markup = p
        .widget
        .replace_all(&with_targets, |caps: &Captures| {
            let id = widgets.len();
            let class = &caps[1];
            let rest = &caps[2];
            if class == "youtube" {
                let video_id = p
                    .video_id
                    .captures(rest)
                    .map(|c| c[1].to_string())
                    .unwrap_or_default();
                widgets.push(Widget::YouTube {
                    video_id,
                    active: false,
                });
                format!(r#"<span class="youtube" data-widget="{id}"{rest}>"#)
            } else {
                widgets.push(Widget::Spoiler {
                    revealed: class.ends_with(REVEALED_CLASS),
                });
                format!(r#"<span class="markdown-spoiler" data-widget="{id}"{rest}>"#)
            }
        })
        .into_owned();

    debug!(widgets = widgets.len(), "Attached rendered markdown");
    RenderedContent { markup, widgets }
}

impl RenderedContent {
    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// Click on the widget body: reveals a spoiler, activates a video.
    /// Returns whether anything changed.
    pub fn click(&mut self, id: usize) -> bool {
        match self.widgets.get_mut(id) {
            Some(Widget::Spoiler { revealed }) if !*revealed => {
                *revealed = true;
                true
            }
            Some(Widget::YouTube { active, video_id }) if !*active && !video_id.is_empty() => {
                *active = true;
                true
            }
            _ => false,
        }
    }

    /// Click on a spoiler's close icon: hides it again.
    pub fn click_close(&mut self, id: usize) -> bool {
        match self.widgets.get_mut(id) {
            Some(Widget::Spoiler { revealed }) if *revealed => {
                *revealed = false;
                true
            }
            _ => false,
        }
    }

    /// Current markup, reflecting widget state.
    pub fn html(&self) -> String {
        let mut html = self.markup.clone();
        for (id, widget) in self.widgets.iter().enumerate() {
            match widget {
                Widget::Spoiler { revealed: true } => {
                    html = html.replacen(
                        &format!(r#"<span class="markdown-spoiler" data-widget="{id}""#),
                        &format!(
                            r#"<span class="markdown-spoiler {REVEALED_CLASS}" data-widget="{id}""#
                        ),
                        1,
                    );
                }
                Widget::YouTube {
                    video_id,
                    active: true,
                } => html = activate_video(&html, id, video_id),
                _ => {}
            }
        }
        html
    }
}

/// Swap the placeholder span for widget `id` with an embedded player.
fn activate_video(html: &str, id: usize, video_id: &str) -> String {
    let opening = format!(r#"<span class="youtube" data-widget="{id}""#);
    let Some(start) = html.find(&opening) else {
        return html.to_string();
    };
    let Some(len) = html[start..].find("</span>") else {
        return html.to_string();
    };
    let end = start + len + "</span>".len();
    let player = format!(
        concat!(
            r#"<iframe class="youtube" data-widget="{id}" "#,
            r#"src="https://www.youtube.com/embed/{video_id}?autoplay=1" "#,
            r#"frameborder="0" allow="autoplay; encrypted-media" allowfullscreen></iframe>"#
        ),
        id = id,
        video_id = video_id
    );
    format!("{}{}{}", &html[..start], player, &html[end..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse;

    #[test]
    fn test_links_open_in_new_tab() {
        let content = attach(r#"<p><a href="https://anilist.co">x</a></p>"#);
        assert_eq!(
            content.html(),
            r#"<p><a href="https://anilist.co" target="_blank" rel="noopener noreferrer">x</a></p>"#
        );
    }

    #[test]
    fn test_attach_is_idempotent() {
        let html = parse("~!a!~ [x](https://x.y) youtube(dQw4w9WgXcQ) ~!b!~");
        let once = attach(&html);
        let twice = attach(&once.html());
        assert_eq!(once.html(), twice.html());
        assert_eq!(once.widgets(), twice.widgets());
    }

    #[test]
    fn test_spoiler_reveal_and_hide() {
        let mut content = attach(&parse("~!secret!~"));
        assert_eq!(content.widgets(), &[Widget::Spoiler { revealed: false }]);
        assert!(!content.html().contains(REVEALED_CLASS));

        assert!(content.click(0));
        assert!(content.html().contains(REVEALED_CLASS));
        assert!(!content.click(0));

        assert!(content.click_close(0));
        assert!(!content.html().contains(REVEALED_CLASS));
    }

    #[test]
    fn test_revealed_state_survives_reattach() {
        let mut content = attach(&parse("~!secret!~"));
        content.click(0);
        let again = attach(&content.html());
        assert_eq!(again.widgets(), &[Widget::Spoiler { revealed: true }]);
    }

    #[test]
    fn test_youtube_activation_is_lazy() {
        let mut content = attach(&parse("youtube(https://youtu.be/dQw4w9WgXcQ)"));
        assert_eq!(
            content.widgets(),
            &[Widget::YouTube {
                video_id: "dQw4w9WgXcQ".to_string(),
                active: false
            }]
        );
        assert!(!content.html().contains("<iframe"));

        assert!(content.click(0));
        let html = content.html();
        assert!(html.contains(r#"src="https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1""#));
        assert!(!html.contains("hqdefault.jpg"));
    }

    #[test]
    fn test_unknown_widget_click_is_ignored() {
        let mut content = attach("<p>plain</p>");
        assert!(!content.click(3));
        assert!(!content.click_close(0));
    }
}
