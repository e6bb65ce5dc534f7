// SPDX-License-Identifier: AGPL-3.0-or-later
//! XML/HTML escaping shared by the exporters

/// Escape the characters reserved in XML character data
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_text_into(&mut out, text);
    out
}

/// [`escape_text`], appending to `out`
pub fn escape_text_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Escape a value for a double-quoted attribute
pub fn escape_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            _ => escape_text_into(&mut out, c.encode_utf8(&mut [0; 4])),
        }
    }
    out
}
