//! HTML helpers for feed bodies

/// Escape text for embedding in HTML content or attributes
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s);
    out
}

/// Escape `s` onto the end of `out`
pub fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Escaped text wrapped in a `<pre>` block
pub fn preformatted(text: &str) -> String {
    format!("<pre>{}</pre>", escape(text))
}
