//! Key definitions for lowering W3C key values to CDP key events.
//!
//! Key action values are either a printable grapheme or one of the W3C
//! reserved code points (U+E000 block). Each resolves to the DOM key,
//! code, Windows virtual key code and optional generated text.

/// Resolved definition of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDefinition {
    /// DOM `key` value.
    pub key: String,
    /// DOM `code` value.
    pub code: String,
    /// Windows virtual key code.
    pub key_code: u32,
    /// Key location (0 standard, 1 left, 2 right, 3 numpad).
    pub location: u32,
    /// Text the key generates, when any.
    pub text: Option<String>,
}

/// Modifier bits (alt=1, ctrl=2, meta=4, shift=8).
pub mod modifier {
    /// Alt.
    pub const ALT: u32 = 1;
    /// Control.
    pub const CTRL: u32 = 2;
    /// Meta / Command.
    pub const META: u32 = 4;
    /// Shift.
    pub const SHIFT: u32 = 8;
}

/// The modifier bit a key value contributes, if it is a modifier key.
pub fn modifier_bit(value: &str) -> Option<u32> {
    match value {
        "\u{E00A}" | "\u{E052}" => Some(modifier::ALT),
        "\u{E009}" | "\u{E051}" => Some(modifier::CTRL),
        "\u{E03D}" | "\u{E053}" => Some(modifier::META),
        "\u{E008}" | "\u{E050}" => Some(modifier::SHIFT),
        _ => None,
    }
}

/// Resolve a key action value.
///
/// Returns `None` for multi-code-point values that are not key commands.
pub fn key_definition(value: &str) -> Option<KeyDefinition> {
    let mut chars = value.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        // Multi-character grapheme: typed as text with no key identity.
        return Some(KeyDefinition {
            key: value.to_string(),
            code: String::new(),
            key_code: 0,
            location: 0,
            text: Some(value.to_string()),
        });
    }
    if ('\u{E000}'..='\u{F8FF}').contains(&first) {
        return special_key(first);
    }
    Some(printable_key(first))
}

fn printable_key(ch: char) -> KeyDefinition {
    let (code, key_code) = match ch {
        'a'..='z' => (
            format!("Key{}", ch.to_ascii_uppercase()),
            ch.to_ascii_uppercase() as u32,
        ),
        'A'..='Z' => (format!("Key{ch}"), ch as u32),
        '0'..='9' => (format!("Digit{ch}"), ch as u32),
        ' ' => ("Space".to_string(), 32),
        '-' => ("Minus".to_string(), 189),
        '=' => ("Equal".to_string(), 187),
        ',' => ("Comma".to_string(), 188),
        '.' => ("Period".to_string(), 190),
        '/' => ("Slash".to_string(), 191),
        ';' => ("Semicolon".to_string(), 186),
        '\'' => ("Quote".to_string(), 222),
        '[' => ("BracketLeft".to_string(), 219),
        ']' => ("BracketRight".to_string(), 221),
        '\\' => ("Backslash".to_string(), 220),
        '`' => ("Backquote".to_string(), 192),
        _ => (String::new(), 0),
    };
    KeyDefinition {
        key: ch.to_string(),
        code,
        key_code,
        location: 0,
        text: Some(ch.to_string()),
    }
}

fn named(key: &str, code: &str, key_code: u32, location: u32, text: Option<&str>) -> KeyDefinition {
    KeyDefinition {
        key: key.to_string(),
        code: code.to_string(),
        key_code,
        location,
        text: text.map(ToString::to_string),
    }
}

fn special_key(ch: char) -> Option<KeyDefinition> {
    let def = match ch {
        '\u{E003}' => named("Backspace", "Backspace", 8, 0, None),
        '\u{E004}' => named("Tab", "Tab", 9, 0, None),
        '\u{E006}' => named("Enter", "Enter", 13, 0, Some("\r")),
        '\u{E007}' => named("Enter", "NumpadEnter", 13, 3, Some("\r")),
        '\u{E008}' => named("Shift", "ShiftLeft", 16, 1, None),
        '\u{E009}' => named("Control", "ControlLeft", 17, 1, None),
        '\u{E00A}' => named("Alt", "AltLeft", 18, 1, None),
        '\u{E00B}' => named("Pause", "Pause", 19, 0, None),
        '\u{E00C}' => named("Escape", "Escape", 27, 0, None),
        '\u{E00D}' => named(" ", "Space", 32, 0, Some(" ")),
        '\u{E00E}' => named("PageUp", "PageUp", 33, 0, None),
        '\u{E00F}' => named("PageDown", "PageDown", 34, 0, None),
        '\u{E010}' => named("End", "End", 35, 0, None),
        '\u{E011}' => named("Home", "Home", 36, 0, None),
        '\u{E012}' => named("ArrowLeft", "ArrowLeft", 37, 0, None),
        '\u{E013}' => named("ArrowUp", "ArrowUp", 38, 0, None),
        '\u{E014}' => named("ArrowRight", "ArrowRight", 39, 0, None),
        '\u{E015}' => named("ArrowDown", "ArrowDown", 40, 0, None),
        '\u{E016}' => named("Insert", "Insert", 45, 0, None),
        '\u{E017}' => named("Delete", "Delete", 46, 0, None),
        '\u{E018}' => named(";", "Semicolon", 186, 0, Some(";")),
        '\u{E019}' => named("=", "Equal", 187, 0, Some("=")),
        '\u{E01A}' => named("0", "Numpad0", 96, 3, Some("0")),
        '\u{E01B}' => named("1", "Numpad1", 97, 3, Some("1")),
        '\u{E01C}' => named("2", "Numpad2", 98, 3, Some("2")),
        '\u{E01D}' => named("3", "Numpad3", 99, 3, Some("3")),
        '\u{E01E}' => named("4", "Numpad4", 100, 3, Some("4")),
        '\u{E01F}' => named("5", "Numpad5", 101, 3, Some("5")),
        '\u{E020}' => named("6", "Numpad6", 102, 3, Some("6")),
        '\u{E021}' => named("7", "Numpad7", 103, 3, Some("7")),
        '\u{E022}' => named("8", "Numpad8", 104, 3, Some("8")),
        '\u{E023}' => named("9", "Numpad9", 105, 3, Some("9")),
        '\u{E024}' => named("*", "NumpadMultiply", 106, 3, Some("*")),
        '\u{E025}' => named("+", "NumpadAdd", 107, 3, Some("+")),
        '\u{E027}' => named("-", "NumpadSubtract", 109, 3, Some("-")),
        '\u{E028}' => named(".", "NumpadDecimal", 110, 3, Some(".")),
        '\u{E029}' => named("/", "NumpadDivide", 111, 3, Some("/")),
        '\u{E031}' => named("F1", "F1", 112, 0, None),
        '\u{E032}' => named("F2", "F2", 113, 0, None),
        '\u{E033}' => named("F3", "F3", 114, 0, None),
        '\u{E034}' => named("F4", "F4", 115, 0, None),
        '\u{E035}' => named("F5", "F5", 116, 0, None),
        '\u{E036}' => named("F6", "F6", 117, 0, None),
        '\u{E037}' => named("F7", "F7", 118, 0, None),
        '\u{E038}' => named("F8", "F8", 119, 0, None),
        '\u{E039}' => named("F9", "F9", 120, 0, None),
        '\u{E03A}' => named("F10", "F10", 121, 0, None),
        '\u{E03B}' => named("F11", "F11", 122, 0, None),
        '\u{E03C}' => named("F12", "F12", 123, 0, None),
        '\u{E03D}' => named("Meta", "MetaLeft", 91, 1, None),
        '\u{E050}' => named("Shift", "ShiftRight", 16, 2, None),
        '\u{E051}' => named("Control", "ControlRight", 17, 2, None),
        '\u{E052}' => named("Alt", "AltRight", 18, 2, None),
        '\u{E053}' => named("Meta", "MetaRight", 92, 2, None),
        _ => return None,
    };
    Some(def)
}

/// macOS editing command for a Meta shortcut, when one applies.
pub fn macos_command(key: &str, shift: bool) -> Option<&'static str> {
    Some(match (key, shift) {
        ("a" | "A", _) => "SelectAll",
        ("c" | "C", _) => "Copy",
        ("v" | "V", _) => "Paste",
        ("x" | "X", _) => "Cut",
        ("z", false) | ("Z", false) => "Undo",
        ("z", true) | ("Z", true) => "Redo",
        _ => return None,
    })
}
