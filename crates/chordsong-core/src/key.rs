// Chordsong Key Table
// Maps host key identifiers to canonical base-key names

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::modifier::is_modifier_key;

/// Named host keys and their short mnemonic codes.
///
/// Single letters and digits never go through this table.
fn named_keys() -> &'static HashMap<&'static str, &'static str> {
    static NAMED_KEYS: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    NAMED_KEYS.get_or_init(|| {
        let mut names = HashMap::with_capacity(96);

        // Number row by name
        names.insert("ZERO", "0");
        names.insert("ONE", "1");
        names.insert("TWO", "2");
        names.insert("THREE", "3");
        names.insert("FOUR", "4");
        names.insert("FIVE", "5");
        names.insert("SIX", "6");
        names.insert("SEVEN", "7");
        names.insert("EIGHT", "8");
        names.insert("NINE", "9");

        // Arrows
        names.insert("LEFT_ARROW", "left");
        names.insert("RIGHT_ARROW", "right");
        names.insert("UP_ARROW", "up");
        names.insert("DOWN_ARROW", "down");

        // Function keys
        const FUNCTION_KEYS: [(&str, &str); 24] = [
            ("F1", "f1"),
            ("F2", "f2"),
            ("F3", "f3"),
            ("F4", "f4"),
            ("F5", "f5"),
            ("F6", "f6"),
            ("F7", "f7"),
            ("F8", "f8"),
            ("F9", "f9"),
            ("F10", "f10"),
            ("F11", "f11"),
            ("F12", "f12"),
            ("F13", "f13"),
            ("F14", "f14"),
            ("F15", "f15"),
            ("F16", "f16"),
            ("F17", "f17"),
            ("F18", "f18"),
            ("F19", "f19"),
            ("F20", "f20"),
            ("F21", "f21"),
            ("F22", "f22"),
            ("F23", "f23"),
            ("F24", "f24"),
        ];
        names.extend(FUNCTION_KEYS);

        // Numpad
        names.insert("NUMPAD_0", "n0");
        names.insert("NUMPAD_1", "n1");
        names.insert("NUMPAD_2", "n2");
        names.insert("NUMPAD_3", "n3");
        names.insert("NUMPAD_4", "n4");
        names.insert("NUMPAD_5", "n5");
        names.insert("NUMPAD_6", "n6");
        names.insert("NUMPAD_7", "n7");
        names.insert("NUMPAD_8", "n8");
        names.insert("NUMPAD_9", "n9");
        names.insert("NUMPAD_PERIOD", "n.");
        names.insert("NUMPAD_SLASH", "n/");
        names.insert("NUMPAD_ASTERIX", "n*");
        names.insert("NUMPAD_MINUS", "n-");
        names.insert("NUMPAD_PLUS", "n+");
        names.insert("NUMPAD_ENTER", "nenter");

        // Mouse
        names.insert("LEFTMOUSE", "m1");
        names.insert("MIDDLEMOUSE", "m2");
        names.insert("RIGHTMOUSE", "m3");
        names.insert("BUTTON4MOUSE", "m4");
        names.insert("BUTTON5MOUSE", "m5");
        names.insert("BUTTON6MOUSE", "m6");
        names.insert("BUTTON7MOUSE", "m7");
        names.insert("WHEELUPMOUSE", "mwu");
        names.insert("WHEELDOWNMOUSE", "mwd");

        // Navigation and editing
        names.insert("SPACE", "space");
        names.insert("TAB", "tab");
        names.insert("RET", "enter");
        names.insert("ESC", "esc");
        names.insert("BACK_SPACE", "backspace");
        names.insert("DEL", "del");
        names.insert("INSERT", "ins");
        names.insert("HOME", "home");
        names.insert("END", "end");
        names.insert("PAGE_UP", "pgup");
        names.insert("PAGE_DOWN", "pgdn");

        // Punctuation
        names.insert("ACCENT_GRAVE", "`");
        names.insert("MINUS", "-");
        names.insert("EQUAL", "=");
        names.insert("LEFT_BRACKET", "[");
        names.insert("RIGHT_BRACKET", "]");
        names.insert("BACK_SLASH", "\\");
        names.insert("SEMI_COLON", ";");
        names.insert("QUOTE", "'");
        names.insert("COMMA", ",");
        names.insert("PERIOD", ".");
        names.insert("SLASH", "/");

        names
    })
}

/// Canonical base-key name for a host key identifier
///
/// Returns `None` for pure modifiers and for identifiers the table does not
/// know about.
pub fn base_key_name(key_id: &str) -> Option<String> {
    if key_id.is_empty() || is_modifier_key(key_id) {
        return None;
    }

    let mut chars = key_id.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return Some(c.to_ascii_lowercase().to_string());
        }
        if c.is_ascii_digit() {
            return Some(c.to_string());
        }
    }

    named_keys().get(key_id).map(|name| (*name).to_string())
}

/// Check if the table knows a host key identifier
pub fn is_known_key(key_id: &str) -> bool {
    base_key_name(key_id).is_some()
}
