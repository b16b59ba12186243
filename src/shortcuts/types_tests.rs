use super::types::*;

#[test]
fn parse_simple_chord() {
    let s = Shortcut::parse("ctrl+b").unwrap();
    assert_eq!(s.key, "b");
    assert_eq!(s.modifiers, Modifiers::ctrl());
}

#[test]
fn parse_is_case_and_space_insensitive() {
    let a = Shortcut::parse("Ctrl + Shift + K").unwrap();
    let b = Shortcut::parse("shift+ctrl+k").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.modifiers, Modifiers::ctrl_shift());
}

#[test]
fn parse_modifier_aliases() {
    let s = Shortcut::parse("command+option+control+a").unwrap();
    assert!(s.modifiers.cmd && s.modifiers.alt && s.modifiers.ctrl);
    assert!(!s.modifiers.shift);
}

#[test]
fn parse_punctuation_keys() {
    assert_eq!(Shortcut::parse("ctrl+`").unwrap().key, "backquote");
    assert_eq!(Shortcut::parse("ctrl+grave").unwrap().key, "backquote");
    assert_eq!(Shortcut::parse("ctrl+.").unwrap().key, "period");
    assert_eq!(Shortcut::parse("ctrl++").unwrap().key, "plus");
}

#[test]
fn parse_errors() {
    assert_eq!(Shortcut::parse("   "), Err(ShortcutParseError::Empty));
    assert_eq!(Shortcut::parse("ctrl+shift"), Err(ShortcutParseError::MissingKey));
    assert_eq!(
        Shortcut::parse("ctrl+a+b"),
        Err(ShortcutParseError::UnknownToken("b".to_string()))
    );
    assert_eq!(
        Shortcut::parse("ctrl+nosuchkey"),
        Err(ShortcutParseError::UnknownKey("nosuchkey".to_string()))
    );
}

#[test]
fn known_keys() {
    assert!(is_known_key("a"));
    assert!(is_known_key("7"));
    assert!(is_known_key("f12"));
    assert!(is_known_key("backquote"));
    assert!(!is_known_key("f25"));
    assert!(!is_known_key("A"));
    assert!(!is_known_key("hyper"));
}

#[test]
fn canonical_string_orders_modifiers() {
    let s = Shortcut::parse("shift+alt+ctrl+cmd+x").unwrap();
    assert_eq!(s.to_canonical_string(), "alt+cmd+ctrl+shift+x");
    assert_eq!(
        Shortcut::parse(&s.to_canonical_string()).unwrap(),
        s
    );
}

#[test]
fn matches_key_event_exactly() {
    let s = Shortcut::parse("ctrl+b").unwrap();
    assert!(s.matches(&KeyEvent::new("B", Modifiers::ctrl())));
    assert!(!s.matches(&KeyEvent::new("b", Modifiers::ctrl_shift())));
    assert!(!s.matches(&KeyEvent::new("i", Modifiers::ctrl())));

    let code = Shortcut::parse("ctrl+backquote").unwrap();
    assert!(code.matches(&KeyEvent::new("`", Modifiers::ctrl())));
}

#[test]
fn key_event_from_chord() {
    let event = KeyEvent::from_chord("ctrl+shift+s").unwrap();
    assert_eq!(event.key, "s");
    assert_eq!(event.modifiers, Modifiers::ctrl_shift());
}

#[test]
fn display_per_platform() {
    let s = Shortcut::parse("ctrl+shift+k").unwrap();
    assert_eq!(s.display_for_platform(Platform::MacOS), "⌃⇧K");
    assert_eq!(s.display_for_platform(Platform::Linux), "Ctrl+Shift+K");

    let code = Shortcut::parse("ctrl+`").unwrap();
    assert_eq!(code.display_for_platform(Platform::Windows), "Ctrl+`");
}
