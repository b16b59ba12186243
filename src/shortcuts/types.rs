//! Key chords: parsing, canonical form, matching and display.
//!
//! - `Shortcut` - a chord such as `ctrl+shift+k` (modifiers + key)
//! - `KeyEvent` - a key press reported by the host surface
//! - `ShortcutParseError` - why a chord string was rejected
//! - Platform-aware display (⌃⇧K on macOS, Ctrl+Shift+K elsewhere)

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when parsing a chord string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutParseError {
    #[error("shortcut string is empty")]
    Empty,
    #[error("shortcut has no key, only modifiers")]
    MissingKey,
    #[error("unknown token '{0}' in shortcut")]
    UnknownToken(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
}

/// Modifier keys held during a chord.
///
/// `cmd` is the platform key: Command on macOS, the Windows/Super key
/// elsewhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub cmd: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

impl Modifiers {
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    pub fn ctrl_shift() -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Default::default()
        }
    }

    pub fn any(&self) -> bool {
        self.cmd || self.ctrl || self.alt || self.shift
    }
}

/// Platform used for display formatting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

/// A key press as reported by an editing surface.
///
/// `key` may use any spelling [`canonicalize_key`] understands (`"B"`,
/// `"ArrowUp"`, `"Enter"`), so hosts can pass their native key names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// Build the event a user would produce by pressing `chord`.
    pub fn from_chord(chord: &str) -> Result<Self, ShortcutParseError> {
        let shortcut = Shortcut::parse(chord)?;
        Ok(Self {
            key: shortcut.key,
            modifiers: shortcut.modifiers,
        })
    }
}

/// A key chord consisting of modifier keys and a main key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shortcut {
    pub key: String,
    pub modifiers: Modifiers,
}

impl Shortcut {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: canonicalize_key(&key.into()),
            modifiers,
        }
    }

    /// Parse a chord such as `"ctrl+b"`, `"Ctrl + Shift + K"` or
    /// `"ctrl+backquote"`.
    pub fn parse(s: &str) -> Result<Self, ShortcutParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ShortcutParseError::Empty);
        }

        let mut modifiers = Modifiers::default();
        let mut key_part: Option<&str> = None;

        for part in split_chord(s) {
            match part.to_lowercase().as_str() {
                "cmd" | "command" | "meta" | "super" | "win" | "⌘" => modifiers.cmd = true,
                "ctrl" | "control" | "ctl" | "⌃" => modifiers.ctrl = true,
                "alt" | "opt" | "option" | "⌥" => modifiers.alt = true,
                "shift" | "⇧" => modifiers.shift = true,
                _ => {
                    if key_part.is_some() {
                        return Err(ShortcutParseError::UnknownToken(part.to_string()));
                    }
                    key_part = Some(part);
                }
            }
        }

        let key = key_part.ok_or(ShortcutParseError::MissingKey)?;
        let canonical_key = canonicalize_key(key);
        if !is_known_key(&canonical_key) {
            return Err(ShortcutParseError::UnknownKey(key.to_string()));
        }

        Ok(Self {
            key: canonical_key,
            modifiers,
        })
    }

    /// Whether a key press triggers this chord. Modifiers must match exactly.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        canonicalize_key(&event.key) == self.key && event.modifiers == self.modifiers
    }

    pub fn display(&self) -> String {
        self.display_for_platform(Platform::current())
    }

    pub fn display_for_platform(&self, platform: Platform) -> String {
        match platform {
            Platform::MacOS => {
                let mut s = String::new();
                if self.modifiers.ctrl {
                    s.push('⌃');
                }
                if self.modifiers.alt {
                    s.push('⌥');
                }
                if self.modifiers.shift {
                    s.push('⇧');
                }
                if self.modifiers.cmd {
                    s.push('⌘');
                }
                s.push_str(&self.key_display());
                s
            }
            Platform::Windows | Platform::Linux => {
                let mut parts: Vec<String> = Vec::new();
                if self.modifiers.ctrl {
                    parts.push("Ctrl".to_string());
                }
                if self.modifiers.alt {
                    parts.push("Alt".to_string());
                }
                if self.modifiers.shift {
                    parts.push("Shift".to_string());
                }
                if self.modifiers.cmd {
                    parts.push("Super".to_string());
                }
                parts.push(self.key_display());
                parts.join("+")
            }
        }
    }

    fn key_display(&self) -> String {
        match self.key.as_str() {
            "backquote" => "`",
            "period" => ".",
            "comma" => ",",
            "slash" => "/",
            "minus" => "-",
            "equal" => "=",
            "space" => "Space",
            "enter" => "Enter",
            "tab" => "Tab",
            k => return k.to_uppercase(),
        }
        .to_string()
    }

    /// Stable string form used for persistence and conflict checks, e.g.
    /// `"ctrl+shift+k"`.
    pub fn to_canonical_string(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if self.modifiers.alt {
            parts.push("alt");
        }
        if self.modifiers.cmd {
            parts.push("cmd");
        }
        if self.modifiers.ctrl {
            parts.push("ctrl");
        }
        if self.modifiers.shift {
            parts.push("shift");
        }
        parts.push(&self.key);
        parts.join("+")
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Split on `+` and whitespace, keeping a trailing `+` as the key itself
/// (`"ctrl++"` is Ctrl and the plus key).
fn split_chord(s: &str) -> Vec<&str> {
    let (body, plus_key) = match s.strip_suffix("++") {
        Some(body) => (body, true),
        None => (s, false),
    };
    let mut parts: Vec<&str> = body
        .split(|c: char| c == '+' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if plus_key {
        parts.push("+");
    }
    parts
}

/// Canonicalize a key name to the internal standard form.
pub fn canonicalize_key(key: &str) -> String {
    let key_lower = key.to_lowercase();
    match key_lower.as_str() {
        "arrowup" => "up",
        "arrowdown" => "down",
        "arrowleft" => "left",
        "arrowright" => "right",
        "return" => "enter",
        "esc" => "escape",
        " " | "spacebar" => "space",
        "/" => "slash",
        "\\" => "backslash",
        ";" => "semicolon",
        "'" => "quote",
        "," => "comma",
        "." | "dot" => "period",
        "[" => "bracketleft",
        "]" => "bracketright",
        "-" | "dash" | "hyphen" => "minus",
        "=" | "equals" => "equal",
        "+" => "plus",
        "`" | "backtick" | "grave" => "backquote",
        _ => return key_lower,
    }
    .to_string()
}

/// Check if a canonical key name is a key a chord can use.
pub fn is_known_key(key: &str) -> bool {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_ascii_lowercase() || c.is_ascii_digit();
    }
    if let Some(n) = key.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return (1..=24).contains(&n);
    }
    matches!(
        key,
        "space"
            | "enter"
            | "tab"
            | "escape"
            | "backspace"
            | "delete"
            | "up"
            | "down"
            | "left"
            | "right"
            | "home"
            | "end"
            | "pageup"
            | "pagedown"
            | "semicolon"
            | "quote"
            | "comma"
            | "period"
            | "slash"
            | "backslash"
            | "bracketleft"
            | "bracketright"
            | "minus"
            | "equal"
            | "plus"
            | "backquote"
    )
}
