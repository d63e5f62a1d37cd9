use crate::content::value_to_text;
use serde_json::Value;

/// Escape text for use as HTML content or as a quoted attribute value
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#039;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Escape an arbitrary JSON value; null becomes empty, non-strings are stringified
pub fn escape_value(value: &Value) -> String {
    escape_html(&value_to_text(value))
}
