//! Body unescaping for the structuring-template read
//!
//! The template endpoint returns its JSON document encoded a second time as
//! a JSON string: wrapped in quotes, quotes escaped as `\"` and literal
//! backslashes as `\\\`. This is a quirk of that one endpoint, not a general
//! JSON rule.

/// Undo the double encoding
///
/// Strips one pair of surrounding quotes if present, turns every `\\\` into a
/// single `\` and drops every other backslash.
pub fn unescape_body(body: &str) -> String {
    let inner = body
        .strip_prefix('"')
        .and_then(|b| b.strip_suffix('"'))
        .unwrap_or(body);

    let mut out = String::with_capacity(inner.len());
    let mut rest = inner;
    while let Some(c) = rest.chars().next() {
        if rest.starts_with(r"\\\") {
            out.push('\\');
            rest = &rest[3..];
        } else {
            if c != '\\' {
                out.push(c);
            }
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}

/// Apply the double encoding, the inverse of [`unescape_body`]
pub fn escape_body(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\\\"),
            '"' => out.push_str(r#"\""#),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
