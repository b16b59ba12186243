//! Allow-list HTML sanitizer.
//!
//! Runs over the complete parser output. Tags outside the allow list are
//! dropped (their text content is kept), script-like elements are dropped
//! together with their content, attributes outside the per-tag allow list are
//! removed, and URL attributes must use a safe scheme. Everything that
//! survives is re-serialized with escaped, double-quoted attribute values.

/// Final HTML cleaning step of the markdown pipeline.
pub trait Sanitizer {
    fn sanitize(&self, html: &str) -> String;
}

/// Elements removed together with everything inside them.
const DROP_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "template", "noscript", "textarea", "title",
    "xmp", "svg", "math",
];

const GLOBAL_ATTRIBUTES: &[&str] = &["class", "title"];

const URL_ATTRIBUTES: &[&str] = &["href", "src"];

const BOOLEAN_ATTRIBUTES: &[&str] = &["controls", "loop", "muted", "autoplay"];

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Allowed elements and their element-specific attributes.
const DEFAULT_ALLOWED: &[(&str, &[&str])] = &[
    ("a", &["href", "target", "rel"]),
    ("b", &[]),
    ("blockquote", &[]),
    ("br", &[]),
    ("center", &[]),
    ("code", &[]),
    ("del", &[]),
    ("div", &[]),
    ("em", &[]),
    ("h1", &[]),
    ("h2", &[]),
    ("h3", &[]),
    ("h4", &[]),
    ("h5", &[]),
    ("hr", &[]),
    ("i", &[]),
    ("img", &["src", "alt", "width", "height"]),
    ("li", &[]),
    ("ol", &[]),
    ("p", &[]),
    ("pre", &[]),
    ("s", &[]),
    ("span", &["data-video-id"]),
    ("strong", &[]),
    ("sub", &[]),
    ("sup", &[]),
    ("u", &[]),
    ("ul", &[]),
    ("video", &["src", "controls", "loop", "muted", "autoplay", "width", "height"]),
];

/// Sanitizer keeping exactly the element and attribute set the markdown
/// parser emits, plus a few harmless inline elements users type by hand.
#[derive(Debug, Clone)]
pub struct AllowListSanitizer {
    allowed: &'static [(&'static str, &'static [&'static str])],
}

impl Default for AllowListSanitizer {
    fn default() -> Self {
        Self {
            allowed: DEFAULT_ALLOWED,
        }
    }
}

impl AllowListSanitizer {
    fn tag_attributes(&self, tag: &str) -> Option<&'static [&'static str]> {
        self.allowed
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, attrs)| *attrs)
    }

    fn attribute_allowed(&self, tag_attrs: &[&str], name: &str) -> bool {
        GLOBAL_ATTRIBUTES.contains(&name) || tag_attrs.contains(&name)
    }
}

impl Sanitizer for AllowListSanitizer {
    fn sanitize(&self, html: &str) -> String {
        let mut scanner = TagScanner::new(html);
        let mut out = String::with_capacity(html.len());

        while !scanner.is_eof() {
            let text = scanner.take_text();
            out.push_str(text);
            if scanner.is_eof() {
                break;
            }

            if scanner.skip_comment() {
                continue;
            }

            if let Some(name) = scanner.parse_closing_tag() {
                if self.tag_attributes(&name).is_some() {
                    out.push_str("</");
                    out.push_str(&name);
                    out.push('>');
                }
                continue;
            }

            if let Some(tag) = scanner.parse_opening_tag() {
                if DROP_WITH_CONTENT.contains(&tag.name.as_str()) {
                    if !tag.self_closing {
                        scanner.skip_past_closing(&tag.name);
                    }
                    continue;
                }
                if let Some(tag_attrs) = self.tag_attributes(&tag.name) {
                    write_tag(&mut out, &tag, |name, value| {
                        self.attribute_allowed(tag_attrs, name)
                            && (!URL_ATTRIBUTES.contains(&name) || is_safe_url(value))
                    });
                }
                continue;
            }

            // A '<' that does not start a tag is plain text.
            scanner.advance(1);
            out.push_str("&lt;");
        }

        out
    }
}

fn write_tag(out: &mut String, tag: &Tag, keep: impl Fn(&str, &str) -> bool) {
    out.push('<');
    out.push_str(&tag.name);
    for (name, value) in &tag.attributes {
        if !keep(name, value) {
            continue;
        }
        out.push(' ');
        out.push_str(name);
        if value.is_empty() && BOOLEAN_ATTRIBUTES.contains(&name.as_str()) {
            continue;
        }
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    if tag.self_closing {
        out.push_str(" />");
    } else {
        out.push('>');
    }
}

/// Only relative URLs and a few well-known schemes survive.
fn is_safe_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let scheme_end = compact.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(idx) if compact[idx..].starts_with(':') => {
            let scheme = compact[..idx].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}

/// Escape a value for use inside a double-quoted attribute.
pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode the entities that matter for attribute inspection: the basic named
/// ones and numeric references.
fn decode_entities(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest.find(';').filter(|&i| i <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "colon" => Some(':'),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// An opening tag as read from the input.
#[derive(Debug)]
struct Tag {
    name: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

/// Cursor over raw HTML.
struct TagScanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TagScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Advance by `n` characters.
    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            match self.peek_char() {
                Some(c) => self.pos += c.len_utf8(),
                None => break,
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance(1);
        }
    }

    /// Text up to the next '<'.
    fn take_text(&mut self) -> &'a str {
        let rest = self.remaining();
        let len = rest.find('<').unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn skip_comment(&mut self) -> bool {
        if !self.remaining().starts_with("<!") {
            return false;
        }
        let end = if self.remaining().starts_with("<!--") {
            self.remaining().find("-->").map(|i| i + 3)
        } else {
            self.remaining().find('>').map(|i| i + 1)
        };
        self.pos += end.unwrap_or(self.remaining().len());
        true
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                name.push(c.to_ascii_lowercase());
                self.advance(1);
            } else {
                break;
            }
        }
        name
    }

    /// Parse `</name>`. Restores the cursor and returns `None` when the input
    /// is not a well-formed closing tag.
    fn parse_closing_tag(&mut self) -> Option<String> {
        if !self.remaining().starts_with("</") {
            return None;
        }
        let start = self.pos;
        self.pos += 2;
        let name = self.read_name();
        self.skip_whitespace();
        if name.is_empty() || self.peek_char() != Some('>') {
            self.pos = start;
            return None;
        }
        self.advance(1);
        Some(name)
    }

    /// Parse an opening tag. Restores the cursor and returns `None` when the
    /// input is not a well-formed tag (for example a lone `<` or a tag that is
    /// never closed with `>`).
    fn parse_opening_tag(&mut self) -> Option<Tag> {
        let start = self.pos;
        if !self.remaining().starts_with('<') {
            return None;
        }
        self.advance(1);

        let name = self.read_name();
        if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.pos = start;
            return None;
        }

        let mut attributes = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            match self.peek_char() {
                None => {
                    self.pos = start;
                    return None;
                }
                Some('>') => {
                    self.advance(1);
                    break;
                }
                Some('/') => {
                    self.advance(1);
                    self.skip_whitespace();
                    if self.peek_char() == Some('>') {
                        self.advance(1);
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => {
                    let attr_name = self.read_name();
                    if attr_name.is_empty() {
                        // Skip characters that cannot start an attribute.
                        self.advance(1);
                        continue;
                    }
                    self.skip_whitespace();
                    let value = if self.peek_char() == Some('=') {
                        self.advance(1);
                        self.skip_whitespace();
                        self.parse_attribute_value()
                    } else {
                        String::new()
                    };
                    attributes.push((attr_name, decode_entities(&value)));
                }
            }
        }

        Some(Tag {
            name,
            attributes,
            self_closing,
        })
    }

    fn parse_attribute_value(&mut self) -> String {
        let mut value = String::new();
        match self.peek_char() {
            Some(quote @ ('"' | '\'')) => {
                self.advance(1);
                while let Some(c) = self.peek_char() {
                    self.advance(1);
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            }
            _ => {
                while let Some(c) = self.peek_char() {
                    if c.is_whitespace() || c == '>' {
                        break;
                    }
                    value.push(c);
                    self.advance(1);
                }
            }
        }
        value
    }

    /// Move past `</name>` (case-insensitive), or to the end of input.
    fn skip_past_closing(&mut self, name: &str) {
        let needle = format!("</{name}");
        match find_ignore_ascii_case(self.remaining(), &needle) {
            Some(idx) => {
                self.pos += idx;
                let rest = self.remaining();
                self.pos += rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
            }
            None => self.pos = self.input.len(),
        }
    }
}

/// Byte offset of the first ASCII case-insensitive match of `needle`.
/// `needle` must start with an ASCII byte so the offset is a char boundary.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let (hay, needle) = (haystack.as_bytes(), needle.as_bytes());
    if needle.is_empty() {
        return Some(0);
    }
    hay.windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
