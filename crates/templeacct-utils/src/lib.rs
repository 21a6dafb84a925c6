//! Small string and id helpers shared by the report crates

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Insert `separator` between every group of three digits.
///
/// `digits` must be the integer part only, without sign.
pub fn group_thousands(digits: &str, separator: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Escape text for interpolation into HTML element content or quoted attributes
pub fn escape_html(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-unique id for a page view
pub fn generate_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", now, seq)
}
