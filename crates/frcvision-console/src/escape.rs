//! Escaping of server-supplied text for the two render targets: HTML markup
//! and a terminal.

/// Escape `& < > " ' / \` =` so `text` renders literally inside HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            other => out.push(other),
        }
    }
    out
}

/// Make `text` safe to print on a terminal: line breaks and tabs become
/// spaces, every other control character (ESC, CSI, BEL, ...) becomes `?`.
pub fn sanitize_terminal(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_tags_become_literal_text() {
        assert_eq!(
            escape_html("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;&#x2F;script&gt;"
        );
    }

    #[test]
    fn escapes_every_special_character() {
        assert_eq!(
            escape_html(r#"& < > " ' / ` ="#),
            "&amp; &lt; &gt; &quot; &#x27; &#x2F; &#x60; &#x3D;"
        );
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_html("camera 0 saved"), "camera 0 saved");
        assert_eq!(sanitize_terminal("camera 0 saved"), "camera 0 saved");
    }

    #[test]
    fn terminal_escape_sequences_are_neutralised() {
        assert_eq!(
            sanitize_terminal("\u{1b}[2J\u{1b}]0;owned\u{7}done"),
            "?[2J?]0;owned?done"
        );
        assert_eq!(sanitize_terminal("\u{9b}31m"), "?31m");
        assert_eq!(sanitize_terminal("two\nlines\r\tx"), "two lines  x");
    }
}
