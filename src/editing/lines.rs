//! Line-prefix edits: headers, quotes and list markers.

use super::{char_len, Selection, TextBuffer};

/// One insertion or removal at a line start, in character offsets of the
/// original text.
#[derive(Clone, Copy, Debug)]
struct LineEdit {
    at: usize,
    removed: usize,
    inserted: usize,
}

impl LineEdit {
    fn map(&self, pos: usize) -> usize {
        if pos < self.at {
            pos
        } else if self.removed > 0 {
            if pos < self.at + self.removed {
                self.at
            } else {
                pos - self.removed
            }
        } else {
            pos + self.inserted
        }
    }
}

/// Number of times `prefix` repeats at the start of `line`.
fn prefix_run(line: &str, prefix: &str) -> usize {
    let mut run = 0;
    let mut rest = line;
    while let Some(stripped) = rest.strip_prefix(prefix) {
        run += 1;
        rest = stripped;
    }
    run
}

/// Add one level of `prefix`. The separating space is only inserted when the
/// line had no prefix yet. `None` means the line is already at `max`.
fn add_prefix(line: &str, prefix: &str, max: usize) -> Option<String> {
    match prefix_run(line, prefix) {
        run if run >= max => None,
        0 => Some(format!("{prefix} {line}")),
        _ => Some(format!("{prefix}{line}")),
    }
}

/// Remove one level of `prefix`, plus the following space when the last level
/// goes away.
fn remove_prefix(line: &str, prefix: &str) -> Option<String> {
    let run = prefix_run(line, prefix);
    if run == 0 {
        return None;
    }
    let rest = &line[prefix.len()..];
    let rest = if run == 1 {
        rest.strip_prefix(' ').unwrap_or(rest)
    } else {
        rest
    };
    Some(rest.to_string())
}

/// Byte range of the line containing byte offset `pos`.
fn line_bounds(text: &str, pos: usize) -> (usize, usize) {
    let start = text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len());
    (start, end)
}

/// Toggle or stack `prefix` on the line holding the selection start.
///
/// With `max_instances == 1` a line that starts with exactly one `prefix`
/// loses it (and one following space); otherwise one level is added. With a
/// higher cap each call adds one more `prefix` until the cap is reached, after
/// which the call is a no-op.
pub fn line_start(buffer: &TextBuffer, prefix: &str, max_instances: usize) -> TextBuffer {
    if prefix.is_empty() {
        return buffer.clone();
    }
    let max = max_instances.max(1);
    let text = buffer.text();
    let (sel_start, _) = buffer.selection_bytes();
    let (line_from, line_to) = line_bounds(text, sel_start);
    let line = &text[line_from..line_to];

    let replaced = if max == 1 && prefix_run(line, prefix) == 1 {
        remove_prefix(line, prefix)
    } else {
        add_prefix(line, prefix, max)
    };
    let Some(new_line) = replaced else {
        return buffer.clone();
    };

    let edit = edit_for(text, line_from, line, &new_line);
    let mut out = String::with_capacity(text.len() + new_line.len());
    out.push_str(&text[..line_from]);
    out.push_str(&new_line);
    out.push_str(&text[line_to..]);

    let sel = buffer.selection();
    TextBuffer::new(out, Selection::new(edit.map(sel.start), edit.map(sel.end)))
}

/// Apply the line-prefix rule to every line the selection touches.
///
/// The first selected line decides the direction: if it already carries
/// `prefix`, one level is removed from every line that has one; otherwise one
/// level is added to every line still below `max_instances`.
pub fn insert_at_every_line(buffer: &TextBuffer, prefix: &str, max_instances: usize) -> TextBuffer {
    if prefix.is_empty() {
        return buffer.clone();
    }
    let max = max_instances.max(1);
    let text = buffer.text();
    let (sel_start, sel_end) = buffer.selection_bytes();
    let (block_from, _) = line_bounds(text, sel_start);
    let (_, block_to) = line_bounds(text, sel_end);
    let block = &text[block_from..block_to];

    let removing = block
        .split('\n')
        .next()
        .is_some_and(|first| prefix_run(first, prefix) > 0);

    let mut edits = Vec::new();
    let mut new_lines = Vec::new();
    let mut line_from = block_from;
    for line in block.split('\n') {
        let replaced = if removing {
            remove_prefix(line, prefix)
        } else {
            add_prefix(line, prefix, max)
        };
        match replaced {
            Some(new_line) => {
                edits.push(edit_for(text, line_from, line, &new_line));
                new_lines.push(new_line);
            }
            None => new_lines.push(line.to_string()),
        }
        line_from += line.len() + 1;
    }

    if edits.is_empty() {
        return buffer.clone();
    }

    let mut out = String::with_capacity(text.len() + edits.len() * (prefix.len() + 1));
    out.push_str(&text[..block_from]);
    out.push_str(&new_lines.join("\n"));
    out.push_str(&text[block_to..]);

    // Edits are ordered by position and expressed in original offsets, so
    // mapping back-to-front keeps earlier positions valid.
    let sel = buffer.selection();
    let map = |pos: usize| edits.iter().rev().fold(pos, |p, e| e.map(p));
    TextBuffer::new(out, Selection::new(map(sel.start), map(sel.end)))
}

/// Describe the change from `line` to `new_line` as a [`LineEdit`]. Prefix
/// edits only ever touch the start of the line.
fn edit_for(text: &str, line_from: usize, line: &str, new_line: &str) -> LineEdit {
    let at = char_len(&text[..line_from]);
    let old_len = char_len(line);
    let new_len = char_len(new_line);
    LineEdit {
        at,
        removed: old_len.saturating_sub(new_len),
        inserted: new_len.saturating_sub(old_len),
    }
}

