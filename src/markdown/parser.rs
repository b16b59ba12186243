//! Ordered-substitution markdown renderer.
//!
//! The dialect is small and fixed, so rendering is a fixed sequence of global
//! substitutions over the whole string rather than a tree. The order of the
//! steps in [`MarkdownParser::parse`] is part of the output format: block
//! rules run before newlines become `<br>`, bold runs before italic, center
//! runs before strikethrough, and the sanitizer always runs last.
//!
//! URLs and finished image tags are parked in a [`Stash`] as soon as they are
//! recognized so later inline rules (emphasis, mentions) cannot rewrite them.

use std::ops::Range;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::trace;

use super::sanitize::{escape_attr, AllowListSanitizer, Sanitizer};

/// Delimits stash tokens. Stripped from input, so users cannot forge tokens.
const STASH_MARK: char = '\u{1A}';

/// Where a user mention links to.
pub const PROFILE_URL_PREFIX: &str = "https://anilist.co/user/";

struct Rules {
    headers: Vec<(usize, Regex)>,
    spoiler: Regex,
    blockquote: Regex,
    unordered: Regex,
    unordered_marker: Regex,
    ordered: Regex,
    ordered_marker: Regex,
    paragraph: Regex,
    md_image: Regex,
    img_shorthand: Regex,
    embed_arg: Regex,
    link: Regex,
    bold_italic_star: Regex,
    bold_italic_underscore: Regex,
    bold_star: Regex,
    bold_underscore: Regex,
    italic_star: Regex,
    italic_underscore: Regex,
    center: Regex,
    strike: Regex,
    fenced: Regex,
    youtube: Regex,
    webm: Regex,
    video_id: Regex,
    rule: Regex,
    mention: Regex,
    stash_token: Regex,
    tag: Regex,
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("markdown rule pattern is valid")
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| Rules {
        headers: (1..=5)
            .rev()
            .map(|level| {
                (
                    level,
                    re(&format!(r"(?m)^#{{{level}}}[ \t]+([^\n]*?)[ \t]*(?:\n|$)")),
                )
            })
            .collect(),
        spoiler: re(r"(?s)~!(.*?)!~"),
        blockquote: re(r"(?m)^>[^\n]*(?:\n>[^\n]*)*(?:\n|$)"),
        unordered: re(r"(?m)^[ \t]*[-*][ \t]+[^\n]*(?:\n[ \t]*[-*][ \t]+[^\n]*)*(?:\n|$)"),
        unordered_marker: re(r"^[ \t]*[-*][ \t]+"),
        ordered: re(r"(?m)^[ \t]*\d+\.[ \t]+[^\n]*(?:\n[ \t]*\d+\.[ \t]+[^\n]*)*(?:\n|$)"),
        ordered_marker: re(r"^[ \t]*\d+\.[ \t]+"),
        paragraph: re(r"\n{2,}"),
        md_image: re(r"!\[([^\]\n]*)\]\(([^)\s]+)\)"),
        img_shorthand: re(r"img(\d+(?:%|px)?)?\(([^)\s]+)\)"),
        embed_arg: re(r"(youtube|webm)\(([^)\s]+)\)"),
        link: re(r"\[([^\]\n]*)\]\(([^)\s]+)\)"),
        bold_italic_star: re(r"\*\*\*(\S(?:.*?\S)?)\*\*\*"),
        bold_italic_underscore: re(r"___(\S(?:.*?\S)?)___"),
        bold_star: re(r"\*\*(\S(?:.*?\S)?)\*\*"),
        bold_underscore: re(r"__(\S(?:.*?\S)?)__"),
        italic_star: re(r"\*(\S(?:[^*]*?\S)?)\*"),
        italic_underscore: re(r"_(\S(?:[^_]*?\S)?)_"),
        center: re(r"~~~(.+?)~~~"),
        strike: re(r"~~(.+?)~~"),
        fenced: re(r"(?s)```(?:<br>)?(.*?)```"),
        youtube: re(r"youtube\((\x{1A}\d+\x{1A})\)"),
        webm: re(r"webm\((\x{1A}\d+\x{1A})\)"),
        video_id: re(
            r"^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:[^#\s]*&)?v=|embed/|shorts/|v/|live/)|youtu\.be/)?([\w-]{11})(?:[?&#/]\S*)?$",
        ),
        rule: re(r"(^|<br>|<p>)[ \t]*-{3,}[ \t]*(<br>|</p>|$)"),
        mention: re(r"@(\w+)"),
        stash_token: re(r"\x{1A}(\d+)\x{1A}"),
        tag: re(r"<(/?)([A-Za-z][A-Za-z0-9]*)[^<>]*>"),
    })
}

/// A value hidden from the inline rules until the end of rendering.
enum Stashed {
    /// Raw attribute value, escaped on restore.
    Attr(String),
    /// Finished markup, restored verbatim.
    Html(String),
}

#[derive(Default)]
struct Stash {
    entries: Vec<Stashed>,
}

impl Stash {
    fn push(&mut self, entry: Stashed) -> String {
        let index = self.entries.len();
        self.entries.push(entry);
        format!("{STASH_MARK}{index}{STASH_MARK}")
    }

    fn attr(&mut self, raw: &str) -> String {
        self.push(Stashed::Attr(raw.to_string()))
    }

    fn html(&mut self, markup: String) -> String {
        self.push(Stashed::Html(markup))
    }

    /// Raw value behind an attribute token.
    fn raw(&self, token: &str) -> Option<&str> {
        let index: usize = token.trim_matches(STASH_MARK).parse().ok()?;
        match self.entries.get(index)? {
            Stashed::Attr(raw) => Some(raw),
            Stashed::Html(_) => None,
        }
    }

    fn restore(&self, text: &str) -> String {
        rules()
            .stash_token
            .replace_all(text, |caps: &Captures| {
                let entry = caps[1].parse::<usize>().ok().and_then(|i| self.entries.get(i));
                match entry {
                    Some(Stashed::Attr(raw)) => escape_attr(raw),
                    Some(Stashed::Html(markup)) => markup.clone(),
                    None => String::new(),
                }
            })
            .into_owned()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Elements whose content is never rewritten by the inline rules.
const LITERAL_ELEMENTS: &[&str] = &["a", "code"];

/// Byte ranges of the tags already present in the text, and of the elements
/// in [`LITERAL_ELEMENTS`]. Both lists are sorted and non-overlapping.
struct TagMap {
    tags: Vec<Range<usize>>,
    literal: Vec<Range<usize>>,
}

impl TagMap {
    fn new(text: &str) -> Self {
        let mut tags = Vec::new();
        let mut literal = Vec::new();
        let mut open: Option<(String, usize)> = None;

        for caps in rules().tag.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            tags.push(whole.range());

            let closing = !caps[1].is_empty();
            let name = caps[2].to_ascii_lowercase();
            open = match open.take() {
                None if !closing && LITERAL_ELEMENTS.contains(&name.as_str()) => {
                    Some((name, whole.start()))
                }
                Some((open_name, start)) if closing && open_name == name => {
                    literal.push(start..whole.end());
                    None
                }
                unchanged => unchanged,
            };
        }

        Self { tags, literal }
    }

    fn containing(ranges: &[Range<usize>], pos: usize) -> Option<&Range<usize>> {
        let index = ranges.partition_point(|range| range.end <= pos);
        ranges.get(index).filter(|range| range.start <= pos)
    }

    /// The tag that byte `pos` falls inside of.
    fn tag_at(&self, pos: usize) -> Option<&Range<usize>> {
        Self::containing(&self.tags, pos)
    }

    fn in_literal(&self, pos: usize) -> bool {
        Self::containing(&self.literal, pos).is_some()
    }
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    pos + text[pos..].chars().next().map_or(1, char::len_utf8)
}

/// Replace every match of `re` that starts and ends outside of `tags` and for
/// which `accept` approves the text preceding the match. Rejected matches are
/// left as they are and the search resumes one character later.
fn replace_if(
    re: &Regex,
    text: &str,
    tags: &TagMap,
    accept: impl Fn(&str) -> bool,
    mut replace: impl FnMut(&Captures) -> String,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut from = 0;

    while from <= text.len() {
        let Some(caps) = re.captures_at(text, from) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        if let Some(tag) = tags.tag_at(whole.start()) {
            from = tag.end;
            continue;
        }
        let ends_in_tag = !whole.is_empty() && tags.tag_at(whole.end() - 1).is_some();
        if ends_in_tag || !accept(&text[..whole.start()]) {
            from = next_char_boundary(text, whole.start());
            continue;
        }

        out.push_str(&text[last..whole.start()]);
        out.push_str(&replace(&caps));
        last = whole.end();
        from = if whole.is_empty() {
            next_char_boundary(text, whole.end())
        } else {
            whole.end()
        };
    }

    out.push_str(&text[last..]);
    out
}

/// Replace matches outside of tags, so attribute values written as raw HTML
/// keep their `_`, `*` and `~` characters.
fn replace_outside_tags(re: &Regex, text: &str, template: &str) -> String {
    let tags = TagMap::new(text);
    replace_if(re, text, &tags, |_| true, |caps| {
        let mut out = String::new();
        caps.expand(template, &mut out);
        out
    })
}

/// Matches that do not continue a word, so `snake_case` or `myimg(x)` stay
/// literal.
fn replace_standalone(
    re: &Regex,
    text: &str,
    replace: impl FnMut(&Captures) -> String,
) -> String {
    let tags = TagMap::new(text);
    replace_if(
        re,
        text,
        &tags,
        |before| !before.chars().next_back().is_some_and(is_word_char),
        replace,
    )
}

/// Replace a block rule whose matches swallow their line end. A blank line
/// after the block keeps its newline so the paragraph break survives.
fn replace_blocks(re: &Regex, text: &str, build: impl Fn(&Captures) -> String) -> String {
    re.replace_all(text, |caps: &Captures| {
        let markup = build(caps);
        match caps.get(0) {
            Some(whole)
                if whole.as_str().ends_with('\n') && text[whole.end()..].starts_with('\n') =>
            {
                markup + "\n"
            }
            _ => markup,
        }
    })
    .into_owned()
}

/// Group consecutive list lines into one list element.
fn list_block(caps: &Captures, tag: &str, marker: &Regex) -> String {
    let items: String = caps[0]
        .trim_end_matches('\n')
        .split('\n')
        .map(|line| format!("<li>{}</li>", marker.replace(line, "").trim()))
        .collect();
    format!("<{tag}>{items}</{tag}>")
}

/// Length of the run of backticks at the start of `s`.
fn backtick_run(s: &str) -> usize {
    s.bytes().take_while(|&b| b == b'`').count()
}

/// Byte offset of the next backtick that stands alone (not part of a run).
fn find_single_backtick(s: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(found) = s[offset..].find('`') {
        let at = offset + found;
        let run = backtick_run(&s[at..]);
        if run == 1 {
            return Some(at);
        }
        offset = at + run;
    }
    None
}

/// `` `code` `` spans. Runs of several backticks (fences) are left alone.
fn inline_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('`') {
        out.push_str(&rest[..open]);
        let run = backtick_run(&rest[open..]);
        if run == 1 {
            let body = &rest[open + 1..];
            if let Some(close) = find_single_backtick(body) {
                out.push_str("<code>");
                out.push_str(&body[..close]);
                out.push_str("</code>");
                rest = &body[close + 1..];
                continue;
            }
        }
        out.push_str(&rest[open..open + run]);
        rest = &rest[open + run..];
    }
    out.push_str(rest);
    out
}

/// Extract an 11-character YouTube video id from a URL or bare id.
pub fn youtube_video_id(url: &str) -> Option<&str> {
    rules()
        .video_id
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Renders the markdown dialect to sanitized HTML.
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser<S = AllowListSanitizer> {
    sanitizer: S,
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Sanitizer> MarkdownParser<S> {
    /// Use a different final sanitization step.
    pub fn with_sanitizer(sanitizer: S) -> Self {
        Self { sanitizer }
    }

    pub fn sanitizer(&self) -> &S {
        &self.sanitizer
    }

    /// Render `markdown` to HTML. Never fails: unmatched markers stay literal.
    pub fn parse(&self, markdown: &str) -> String {
        let r = rules();
        let mut stash = Stash::default();
        let mut text: String = markdown
            .replace("\r\n", "\n")
            .chars()
            .filter(|&c| c != STASH_MARK)
            .collect();

        // 1. headers, deepest first
        for (level, header) in &r.headers {
            text = replace_blocks(header, &text, |caps| {
                format!("<h{level}>{}</h{level}>", &caps[1])
            });
        }

        // 2. spoilers
        text = r
            .spoiler
            .replace_all(
                &text,
                concat!(
                    r#"<span class="markdown-spoiler">"#,
                    r#"<span class="markdown-spoiler-hide" title="Hide spoiler">&#10005;</span>"#,
                    r#"<span class="markdown-spoiler-content">${1}</span>"#,
                    "</span>"
                ),
            )
            .into_owned();

        // 3. blockquotes
        text = replace_blocks(&r.blockquote, &text, |caps| {
            let inner = caps[0]
                .trim_end_matches('\n')
                .split('\n')
                .map(|line| line.trim_start_matches('>').trim())
                .collect::<Vec<_>>()
                .join("\n");
            format!("<blockquote>{inner}</blockquote>")
        });

        // 4-5. lists
        text = replace_blocks(&r.unordered, &text, |caps| {
            list_block(caps, "ul", &r.unordered_marker)
        });
        text = replace_blocks(&r.ordered, &text, |caps| {
            list_block(caps, "ol", &r.ordered_marker)
        });

        // 6-7. paragraphs and line breaks
        text = r.paragraph.replace_all(&text, "</p><p>").into_owned();
        text = text.replace('\n', "<br>");

        // 8. images, plus embed URLs parked until step 14
        text = r
            .md_image
            .replace_all(&text, |caps: &Captures| {
                stash.html(format!(
                    r#"<img src="{}" alt="{}" />"#,
                    escape_attr(&caps[2]),
                    escape_attr(&caps[1])
                ))
            })
            .into_owned();
        text = replace_standalone(&r.img_shorthand, &text, |caps| {
            let src = escape_attr(&caps[2]);
            let markup = match caps.get(1) {
                Some(width) => {
                    let width = width.as_str().trim_end_matches("px");
                    format!(r#"<img src="{src}" width="{width}" />"#)
                }
                None => format!(r#"<img src="{src}" />"#),
            };
            stash.html(markup)
        });
        text = replace_standalone(&r.embed_arg, &text, |caps| {
            format!("{}({})", &caps[1], stash.attr(&caps[2]))
        });

        // 9. links
        text = r
            .link
            .replace_all(&text, |caps: &Captures| {
                format!(r#"<a href="{}">{}</a>"#, stash.attr(&caps[2]), &caps[1])
            })
            .into_owned();

        // 10. bold italic, bold, then italic
        text = replace_outside_tags(&r.bold_italic_star, &text, "<strong><em>${1}</em></strong>");
        text = replace_standalone(&r.bold_italic_underscore, &text, |caps| {
            format!("<strong><em>{}</em></strong>", &caps[1])
        });
        text = replace_outside_tags(&r.bold_star, &text, "<strong>${1}</strong>");
        text = replace_standalone(&r.bold_underscore, &text, |caps| {
            format!("<strong>{}</strong>", &caps[1])
        });
        text = replace_outside_tags(&r.italic_star, &text, "<em>${1}</em>");
        text = replace_standalone(&r.italic_underscore, &text, |caps| {
            format!("<em>{}</em>", &caps[1])
        });

        // 11-12. center, then strikethrough
        text = replace_outside_tags(&r.center, &text, "<center>${1}</center>");
        text = replace_outside_tags(&r.strike, &text, "<del>${1}</del>");

        // 13. inline code, then fenced blocks
        text = inline_code(&text);
        text = r
            .fenced
            .replace_all(&text, |caps: &Captures| {
                let body = caps[1].strip_suffix("<br>").unwrap_or(&caps[1]);
                format!("<pre><code>{body}</code></pre>")
            })
            .into_owned();

        // 14. embeds
        text = r
            .youtube
            .replace_all(&text, |caps: &Captures| {
                match stash.raw(&caps[1]).and_then(youtube_video_id) {
                    Some(id) => format!(
                        concat!(
                            r#"<span class="youtube" data-video-id="{id}">"#,
                            r#"<img src="https://i.ytimg.com/vi/{id}/hqdefault.jpg" alt="YouTube video" />"#,
                            "</span>"
                        ),
                        id = id
                    ),
                    None => caps[0].to_string(),
                }
            })
            .into_owned();
        text = r
            .webm
            .replace_all(&text, r#"<video src="${1}" controls loop muted></video>"#)
            .into_owned();

        // 15. horizontal rules
        text = r
            .rule
            .replace_all(&text, |caps: &Captures| {
                let open = if &caps[1] == "<p>" { "<p>" } else { "" };
                let close = if &caps[2] == "</p>" { "</p>" } else { "" };
                format!("{open}<hr>{close}")
            })
            .into_owned();

        // 16. mentions outside of tags, links and code
        let tags = TagMap::new(&text);
        text = replace_if(
            &r.mention,
            &text,
            &tags,
            |before| {
                let prev_ok = !before
                    .chars()
                    .next_back()
                    .is_some_and(|c| is_word_char(c) || matches!(c, '@' | '.' | '/' | ':' | '"' | '\'' | '='));
                prev_ok && !tags.in_literal(before.len())
            },
            |caps| {
                let name = &caps[1];
                format!(r#"<a href="{PROFILE_URL_PREFIX}{name}/">@{name}</a>"#)
            },
        );

        text = stash.restore(&text);

        // 17. single outer paragraph
        let html = format!("<p>{text}</p>");

        // 18. sanitize the complete output
        let html = self.sanitizer.sanitize(&html);
        trace!(input_len = markdown.len(), output_len = html.len(), "Rendered markdown");
        html
    }
}

/// Render with the default allow-list sanitizer.
pub fn parse(markdown: &str) -> String {
    MarkdownParser::new().parse(markdown)
}
