use regex::Regex;

use super::*;
use crate::editing::wrap::Delimiters;

fn buf(text: &str, start: usize, end: usize) -> TextBuffer {
    TextBuffer::new(text, Selection::new(start, end))
}

// ============================================================================
// TextBuffer
// ============================================================================

#[test]
fn test_buffer_clamps_out_of_range_selection() {
    let b = buf("abc", 2, 99);
    assert_eq!(b.selection(), Selection::new(2, 3));
    assert_eq!(b.selected_text(), "c");
}

#[test]
fn test_buffer_swaps_reversed_selection() {
    let b = buf("abcdef", 4, 1);
    assert_eq!(b.selection(), Selection::new(1, 4));
    assert_eq!(b.selected_text(), "bcd");
}

#[test]
fn test_buffer_char_offsets_with_unicode() {
    let b = buf("日本語テキスト", 3, 7);
    assert_eq!(b.char_len(), 7);
    assert_eq!(b.selected_text(), "テキスト");
}

// ============================================================================
// line_start
// ============================================================================

#[test]
fn test_header_cycles_up_to_cap() {
    let mut b = buf("Title", 0, 0);
    let expected = ["# Title", "## Title", "### Title", "#### Title", "##### Title"];
    for want in expected {
        b = line_start(&b, "#", 5);
        assert_eq!(b.text(), want);
    }
    let capped = line_start(&b, "#", 5);
    assert_eq!(capped, b);
}

#[test]
fn test_single_instance_prefix_toggles_off() {
    let b = buf("# Title", 4, 4);
    let out = line_start(&b, "#", 1);
    assert_eq!(out.text(), "Title");
    assert_eq!(out.selection(), Selection::caret(2));
}

#[test]
fn test_line_start_only_touches_selected_line() {
    let b = buf("first\nsecond\nthird", 8, 10);
    let out = line_start(&b, ">", 1);
    assert_eq!(out.text(), "first\n> second\nthird");
    assert_eq!(out.selected_text(), "co");
}

#[test]
fn test_line_start_caret_inside_removed_prefix_clamps_to_line() {
    let b = buf("x\n> quote", 3, 3);
    let out = line_start(&b, ">", 1);
    assert_eq!(out.text(), "x\nquote");
    assert_eq!(out.selection(), Selection::caret(2));
}

#[test]
fn test_line_start_empty_prefix_is_noop() {
    let b = buf("text", 0, 4);
    assert_eq!(line_start(&b, "", 3), b);
}

// ============================================================================
// insert_at_every_line
// ============================================================================

#[test]
fn test_every_line_removes_when_first_line_has_prefix() {
    let text = "- one\ntwo\n- three";
    let b = buf(text, 0, text.chars().count());
    let out = insert_at_every_line(&b, "-", 1);
    assert_eq!(out.text(), "one\ntwo\nthree");
    assert_eq!(out.selection(), Selection::new(0, 13));
}

#[test]
fn test_every_line_adds_when_first_line_lacks_prefix() {
    let text = "one\n- two\nthree";
    let b = buf(text, 0, text.chars().count());
    let out = insert_at_every_line(&b, "-", 1);
    assert_eq!(out.text(), "- one\n- two\n- three");
    assert_eq!(out.selection(), Selection::new(2, 19));
}

#[test]
fn test_every_line_selection_start_moves_by_first_line_only() {
    let text = "aa\nbb\ncc";
    let b = buf(text, 1, 7);
    let out = insert_at_every_line(&b, ">", 1);
    assert_eq!(out.text(), "> aa\n> bb\n> cc");
    assert_eq!(out.selection(), Selection::new(3, 13));
    assert_eq!(out.selected_text(), "a\n> bb\n> c");
}

#[test]
fn test_every_line_respects_cap() {
    let text = "## a\nb";
    let b = buf(text, 5, 6);
    let out = insert_at_every_line(&b, "#", 2);
    assert_eq!(out.text(), "## a\n# b");
}

#[test]
fn test_every_line_leaves_surrounding_lines() {
    let text = "keep\nx\ny\nkeep";
    let b = buf(text, 5, 8);
    let out = insert_at_every_line(&b, "1.", 1);
    assert_eq!(out.text(), "keep\n1. x\n1. y\nkeep");
}

// ============================================================================
// wrap_video_link
// ============================================================================

fn youtube() -> Regex {
    Regex::new(r"^https?://(www\.)?(youtube\.com/watch\?v=|youtu\.be/)[\w-]{11}").unwrap()
}

#[test]
fn test_video_wrap_skips_non_matching_selection() {
    let b = buf("https://example.com/clip.webm", 0, 29);
    let out = wrap_video_link(&b, &Delimiters::pair("youtube(", ")"), &youtube());
    assert_eq!(out, b);
}

#[test]
fn test_video_wrap_wraps_once() {
    let url = "https://youtu.be/dQw4w9WgXcQ";
    let b = buf(url, 0, url.len());
    let marker = Delimiters::pair("youtube(", ")");
    let once = wrap_video_link(&b, &marker, &youtube());
    assert_eq!(once.text(), format!("youtube({url})"));
    assert_eq!(once.selected_text(), url);

    let twice = wrap_video_link(&once, &marker, &youtube());
    assert_eq!(twice.text(), once.text());
}

// ============================================================================
// wrap_link
// ============================================================================

#[test]
fn test_link_around_url_puts_caret_in_brackets() {
    let b = buf("see https://anilist.co now", 4, 22);
    let out = wrap_link(&b, "https://anilist.co");
    assert_eq!(out.text(), "see [](https://anilist.co) now");
    assert_eq!(out.selection(), Selection::caret(5));
}

#[test]
fn test_link_around_text_puts_caret_in_parens() {
    let b = buf("read this", 5, 9);
    let out = wrap_link(&b, "this");
    assert_eq!(out.text(), "read [this]()");
    assert_eq!(out.selection(), Selection::caret(12));
}

#[test]
fn test_link_is_not_cancellable() {
    let b = buf("[x]()", 1, 2);
    let out = wrap_link(&b, "x");
    assert_eq!(out.text(), "[[x]()]()");
}
