//! Key-press encoding into bracketed key notation.
//!
//! Printable characters typed without alt/ctrl/meta pass through as-is. Everything
//! else is wrapped in braces with modifier prefixes in the order
//! `alt+`, `ctrl+`, `meta+`, `shift+`, e.g. `{ctrl+a}` or `{shift+enter}`.

use crate::event::Modifiers;

/// Encode a `keydown` key value. Unrecognized named keys encode to an empty string.
pub fn encode_key(key: &str, modifiers: Modifiers) -> String {
    let mut chars = key.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch != '{' {
            // Shift is implied by the character itself here.
            if !modifiers.has_command_modifier() {
                return key.to_string();
            }
            return wrap(&ch.to_lowercase().collect::<String>(), modifiers);
        }
    }

    match special_key(key) {
        Some(name) => wrap(name, modifiers),
        None => String::new(),
    }
}

/// Token name for a named key, without braces.
pub fn special_key(key: &str) -> Option<&'static str> {
    let name = match key {
        "{" => "{",
        "ArrowDown" => "downarrow",
        "ArrowLeft" => "leftarrow",
        "ArrowRight" => "rightarrow",
        "ArrowUp" => "uparrow",
        "Backspace" => "backspace",
        "Delete" => "del",
        "Enter" => "enter",
        "Escape" => "esc",
        "Insert" => "insert",
        "PageDown" => "pagedown",
        "PageUp" => "pageup",
        _ => return None,
    };
    Some(name)
}

fn wrap(key: &str, modifiers: Modifiers) -> String {
    let mut token = String::with_capacity(key.len() + 2);
    token.push('{');
    if modifiers.alt {
        token.push_str("alt+");
    }
    if modifiers.ctrl {
        token.push_str("ctrl+");
    }
    if modifiers.meta {
        token.push_str("meta+");
    }
    if modifiers.shift {
        token.push_str("shift+");
    }
    token.push_str(key);
    token.push('}');
    token
}
