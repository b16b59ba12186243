use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::editing::{wrap_selection, ImageWidth, Selection, TextBuffer};
use crate::markdown::LivePreview;
use crate::storage::{KeyValueStore, MemoryStore};

fn press(chord: &str) -> KeyEvent {
    KeyEvent::from_chord(chord).unwrap()
}

fn area(text: &str, start: usize, end: usize) -> TextSurface {
    TextSurface::text_area(TextBuffer::new(text, Selection::new(start, end)))
}

// ============================================================================
// Toggle laws over the default table
// ============================================================================

#[test]
fn every_default_wrap_toggles_back() {
    let config = MarkdownHotkeysConfig::new();
    let cases = [
        ("word", "say hi now", Selection::new(4, 6)),
        ("caret", "say hi now", Selection::new(4, 4)),
        ("caret at start", "hi", Selection::new(0, 0)),
        ("buffer start", "hi now", Selection::new(0, 2)),
        ("buffer end", "say hi", Selection::new(4, 6)),
        ("whole buffer", "hi", Selection::new(0, 2)),
        ("multi-byte", "名前 héllo 😀", Selection::new(3, 8)),
        ("multi-line", "a\nline1\nline2\nb", Selection::new(2, 13)),
    ];

    for mapping in config.by_type(MappingType::Wrap) {
        let delimiters = mapping.characters.as_ref().unwrap();
        let special = mapping.special_remove.as_ref();

        for (case, text, selection) in cases {
            let original = TextBuffer::new(text, selection);
            let label = format!("{} / {case}", mapping.description);

            let once = wrap_selection(&original, delimiters, special, true);
            assert_ne!(once, original, "{label} did not wrap");
            assert_eq!(once.selected_text(), original.selected_text(), "{label}");
            assert!(once.text().contains(delimiters.open.as_str()), "{label}");

            let twice = wrap_selection(&once, delimiters, special, true);
            assert_eq!(twice, original, "{label} did not toggle off");
        }
    }
}

#[test]
fn code_block_wraps_multi_line_selection_on_own_lines() {
    let config = MarkdownHotkeysConfig::new();
    let mapping = config.by_description("Code Block").unwrap();
    let buffer = TextBuffer::new("a\nline1\nline2\nb", Selection::new(2, 13));

    let out = wrap_selection(&buffer, mapping.characters.as_ref().unwrap(), None, true);
    assert_eq!(out.text(), "a\n```\nline1\nline2\n```\nb");
    assert_eq!(out.selected_text(), "line1\nline2");
}

#[test]
fn special_remove_takes_precedence_for_every_mapping() {
    let config = MarkdownHotkeysConfig::new();
    let with_special: Vec<_> = config
        .mappings()
        .iter()
        .filter(|m| m.special_remove.is_some())
        .collect();
    assert!(!with_special.is_empty());

    for mapping in with_special {
        let special = mapping.special_remove.as_ref().unwrap();
        let text = format!("a {}hi{} b", special.open, special.close);
        let start = 2 + special.open.chars().count();
        let buffer = TextBuffer::new(text, Selection::new(start, start + 2));

        let out = wrap_selection(
            &buffer,
            mapping.characters.as_ref().unwrap(),
            Some(special),
            true,
        );
        assert_eq!(out.text(), "a hi b", "{}", mapping.description);
        assert_eq!(out.selected_text(), "hi", "{}", mapping.description);
    }
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn dispatch_runs_bound_wrap() {
    let dispatcher = HotkeyDispatcher::from_config(&MarkdownHotkeysConfig::new());
    let mut surface = area("make bold", 5, 9);

    assert!(dispatcher.dispatch(&press("ctrl+b"), &mut surface, &DispatchContext::default()));
    assert_eq!(surface.text(), "make __bold__");
    assert_eq!(surface.buffer().selected_text(), "bold");

    assert!(dispatcher.dispatch(&press("ctrl+b"), &mut surface, &DispatchContext::default()));
    assert_eq!(surface.text(), "make bold");
}

#[test]
fn dispatch_ignores_unbound_chords() {
    let dispatcher = HotkeyDispatcher::from_config(&MarkdownHotkeysConfig::new());
    let mut surface = area("text", 0, 4);
    assert!(!dispatcher.dispatch(&press("ctrl+alt+z"), &mut surface, &DispatchContext::default()));
    assert_eq!(surface.text(), "text");
}

#[test]
fn dispatch_only_acts_on_text_areas() {
    let dispatcher = HotkeyDispatcher::from_config(&MarkdownHotkeysConfig::new());
    let buffer = TextBuffer::new("a { }", Selection::new(0, 1));
    for kind in [SurfaceKind::CodeEditor, SurfaceKind::Other] {
        let mut surface = TextSurface::new(kind, buffer.clone());
        assert!(!dispatcher.dispatch(&press("ctrl+b"), &mut surface, &DispatchContext::default()));
        assert_eq!(surface.text(), "a { }");
    }
}

#[test]
fn dispatch_header_and_lists() {
    let dispatcher = HotkeyDispatcher::from_config(&MarkdownHotkeysConfig::new());
    let ctx = DispatchContext::default();

    let mut surface = area("Title", 0, 0);
    dispatcher.dispatch(&press("ctrl+h"), &mut surface, &ctx);
    dispatcher.dispatch(&press("ctrl+h"), &mut surface, &ctx);
    assert_eq!(surface.text(), "## Title");

    let mut surface = area("a\nb", 0, 3);
    dispatcher.dispatch(&press("ctrl+shift+8"), &mut surface, &ctx);
    assert_eq!(surface.text(), "- a\n- b");
}

#[test]
fn dispatch_video_checks_url() {
    let dispatcher = HotkeyDispatcher::from_config(&MarkdownHotkeysConfig::new());
    let ctx = DispatchContext::default();

    let url = "https://youtu.be/dQw4w9WgXcQ";
    let mut surface = area(url, 0, url.len());
    assert!(dispatcher.dispatch(&press("ctrl+shift+m"), &mut surface, &ctx));
    assert_eq!(surface.text(), url);

    assert!(dispatcher.dispatch(&press("ctrl+shift+y"), &mut surface, &ctx));
    assert_eq!(surface.text(), format!("youtube({url})"));

    let clip = "https://x.y/clip.webm";
    let mut surface = area(clip, 0, clip.len());
    dispatcher.dispatch(&press("ctrl+shift+m"), &mut surface, &ctx);
    assert_eq!(surface.text(), format!("webm({clip})"));
}

#[test]
fn dispatch_link_uses_visible_selection() {
    let dispatcher = HotkeyDispatcher::from_config(&MarkdownHotkeysConfig::new());
    let url = "https://anilist.co";
    let mut surface = area(url, 0, url.len());
    let ctx = DispatchContext {
        selected_plain_text: url.to_string(),
        ..Default::default()
    };
    dispatcher.dispatch(&press("ctrl+k"), &mut surface, &ctx);
    assert_eq!(surface.text(), "[](https://anilist.co)");
    assert_eq!(surface.buffer().selection(), Selection::caret(1));
}

#[test]
fn dispatch_image_uses_configured_width() {
    let dispatcher = HotkeyDispatcher::from_config(&MarkdownHotkeysConfig::new());
    let mut surface = area("https://x/y.png", 0, 15);
    let ctx = DispatchContext {
        image_width: ImageWidth::percent(50),
        ..Default::default()
    };
    dispatcher.dispatch(&press("ctrl+shift+i"), &mut surface, &ctx);
    assert_eq!(surface.text(), "img50%(https://x/y.png)");
}

#[test]
fn disabled_mapping_is_not_bound() {
    let mut config = MarkdownHotkeysConfig::new();
    config.set_key("Bold", "").unwrap();
    let dispatcher = HotkeyDispatcher::from_config(&config);
    assert_eq!(dispatcher.len(), config.mappings().len() - 1);
    assert_eq!(dispatcher.command_for(&press("ctrl+b")), None);
}

#[test]
fn duplicate_chord_goes_to_first_in_table_order() {
    let mut config = MarkdownHotkeysConfig::new();
    config.restore_key("Italic", "ctrl+b").unwrap();
    let dispatcher = HotkeyDispatcher::from_config(&config);
    assert_eq!(dispatcher.command_for(&press("ctrl+b")), Some("Bold"));
}

#[test]
fn incomplete_mapping_is_skipped() {
    let broken = InputMapping::video(
        "alt+v",
        "Broken Video",
        crate::editing::Delimiters::pair("v(", ")"),
        "(",
    );
    let mut defaults = default_mappings();
    defaults.push(broken);
    let dispatcher = HotkeyDispatcher::from_config(&MarkdownHotkeysConfig::with_defaults(defaults));
    assert_eq!(dispatcher.command_for(&press("alt+v")), None);
    assert_eq!(dispatcher.len(), default_mappings().len());
}

#[test]
#[should_panic(expected = "'Link' is missing")]
fn missing_link_command_fails_fast_in_debug() {
    let defaults = default_mappings()
        .into_iter()
        .filter(|m| m.description != LINK)
        .collect();
    HotkeyDispatcher::from_config(&MarkdownHotkeysConfig::with_defaults(defaults));
}

// ============================================================================
// Observers
// ============================================================================

#[test]
fn dispatch_notifies_observers() {
    let dispatcher = HotkeyDispatcher::from_config(&MarkdownHotkeysConfig::new());
    let mut surface = area("~!x", 0, 0);

    let counts = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&counts);
    surface.subscribe(move |buffer| sink.borrow_mut().push(buffer.char_len()));

    let preview = Rc::new(RefCell::new(LivePreview::new()));
    let view = Rc::clone(&preview);
    surface.subscribe(move |buffer| view.borrow_mut().update(buffer));

    surface.set_buffer(TextBuffer::new("secret", Selection::new(0, 6)));
    dispatcher.dispatch(&press("ctrl+shift+s"), &mut surface, &DispatchContext::default());

    assert_eq!(*counts.borrow(), vec![6, 10]);
    assert!(preview.borrow().html().contains("markdown-spoiler"));
    assert_eq!(preview.borrow().render_count(), 2);
}

// ============================================================================
// Settings facade
// ============================================================================

#[test]
fn settings_capture_persists_and_rebinds() {
    let mut hotkeys = MarkdownHotkeys::load(MemoryStore::new());
    hotkeys
        .capture("Bold", &KeyEvent::new("J", Modifiers::ctrl()))
        .unwrap();

    let mut surface = area("x", 0, 1);
    assert!(hotkeys.dispatch(&press("ctrl+j"), &mut surface, &DispatchContext::default()));
    assert_eq!(surface.text(), "__x__");
    assert!(!hotkeys.dispatch(&press("ctrl+b"), &mut surface, &DispatchContext::default()));

    let row = hotkeys
        .rows()
        .into_iter()
        .find(|r| r.description == "Bold")
        .unwrap();
    assert_eq!(row.key, "ctrl+j");
    assert!(row.customized);

    let reloaded = MarkdownHotkeys::load(hotkeys.store().clone());
    assert_eq!(reloaded.config().by_description("Bold").unwrap().key, "ctrl+j");
}

#[test]
fn settings_capture_rejects_modifier_only_press() {
    let mut hotkeys = MarkdownHotkeys::load(MemoryStore::new());
    let err = hotkeys
        .capture("Bold", &KeyEvent::new("Shift", Modifiers::ctrl_shift()))
        .unwrap_err();
    assert!(matches!(err, crate::error::HotkeyError::InvalidChord { .. }));
}

#[test]
fn settings_reset_restores_defaults() {
    let mut hotkeys = MarkdownHotkeys::load(MemoryStore::new());
    hotkeys.set_key("Italic", "alt+i").unwrap();
    hotkeys.reset().unwrap();
    assert!(hotkeys.rows().iter().all(|r| !r.customized));
    assert_eq!(hotkeys.dispatcher().command_for(&press("ctrl+i")), Some("Italic"));
}

#[test]
fn settings_disabled_hotkeys_do_nothing() {
    let mut hotkeys = MarkdownHotkeys::load(MemoryStore::new());
    hotkeys.set_enabled(false);
    let mut surface = area("x", 0, 1);
    assert!(!hotkeys.dispatch(&press("ctrl+b"), &mut surface, &DispatchContext::default()));
}

#[test]
fn settings_run_command_ignores_shadowing_chord() {
    let mut store = MemoryStore::new();
    store
        .set(
            STORAGE_KEY,
            r#"{"version": 1, "mappings": [{"key": "ctrl+b", "description": "Italic"}]}"#,
        )
        .unwrap();
    let hotkeys = MarkdownHotkeys::load(store);
    assert_eq!(hotkeys.dispatcher().command_for(&press("ctrl+b")), Some("Bold"));

    let ctx = DispatchContext::default();
    let mut surface = area("x", 0, 1);
    assert!(hotkeys.run_command("Italic", &mut surface, &ctx).unwrap());
    assert_eq!(surface.text(), "_x_");

    let mut surface = area("x", 0, 1);
    assert!(hotkeys.run_command(LINK, &mut surface, &ctx).unwrap());
    assert_eq!(surface.text(), "[x]()");
}

#[test]
fn settings_run_command_rejects_unknown_and_skips_disabled() {
    let mut hotkeys = MarkdownHotkeys::load(MemoryStore::new());
    let ctx = DispatchContext::default();
    let mut surface = area("x", 0, 1);

    let err = hotkeys.run_command("Nope", &mut surface, &ctx).unwrap_err();
    assert!(matches!(
        err,
        crate::error::Error::Hotkey(crate::error::HotkeyError::UnknownCommand(_))
    ));

    hotkeys.set_key("Bold", "").unwrap();
    assert!(!hotkeys.run_command("Bold", &mut surface, &ctx).unwrap());
    hotkeys.set_enabled(false);
    assert!(!hotkeys.run_command("Italic", &mut surface, &ctx).unwrap());
    assert_eq!(surface.text(), "x");
}

#[test]
fn run_mapping_only_acts_on_text_areas() {
    let config = MarkdownHotkeysConfig::new();
    let bold = config.by_description("Bold").unwrap();
    let buffer = TextBuffer::new("a", Selection::new(0, 1));

    let mut editor = TextSurface::new(SurfaceKind::CodeEditor, buffer.clone());
    assert!(!run_mapping(bold, &mut editor, &DispatchContext::default()));
    assert_eq!(editor.text(), "a");

    let mut surface = TextSurface::text_area(buffer);
    assert!(run_mapping(bold, &mut surface, &DispatchContext::default()));
    assert_eq!(surface.text(), "__a__");
}
