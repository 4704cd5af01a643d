//! Quoted character-strings as they appear in zone file presentation format.

/// Longest data a single character-string can carry (RFC 1035 §3.3).
pub(crate) const MAX_CHARACTER_STRING: usize = 255;

/// Wrap `value` in one pair of double quotes, escaping `"` and `\`.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Quote `value` as one or more space separated character-strings of at most
/// [`MAX_CHARACTER_STRING`] bytes each. Chunks never split a UTF-8 sequence.
pub(crate) fn quote_split(value: &str) -> String {
    if value.len() <= MAX_CHARACTER_STRING {
        return quote(value);
    }
    let mut chunks = vec![];
    let mut start = 0;
    while start < value.len() {
        let mut end = (start + MAX_CHARACTER_STRING).min(value.len());
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        chunks.push(quote(&value[start..end]));
        start = end;
    }
    chunks.join(" ")
}

/// Parse a sequence of character-strings and join their data.
///
/// Quoted and bare segments are both accepted, separated by whitespace. `\X` escapes `X` and
/// `\DDD` is a decimal byte value. Returns `None` for an unterminated quote or a dangling
/// escape.
pub(crate) fn unquote(content: &str) -> Option<String> {
    let bytes = content.as_bytes();
    let mut data = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let quoted = bytes[i] == b'"';
        if quoted {
            i += 1;
        }
        let mut closed = !quoted;
        while i < bytes.len() {
            match bytes[i] {
                b'"' if quoted => {
                    i += 1;
                    closed = true;
                    break;
                }
                b if !quoted && b.is_ascii_whitespace() => break,
                b'\\' => {
                    let (byte, used) = unescape(&bytes[i + 1..])?;
                    data.push(byte);
                    i += 1 + used;
                }
                b => {
                    data.push(b);
                    i += 1;
                }
            }
        }
        if !closed {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

fn unescape(rest: &[u8]) -> Option<(u8, usize)> {
    match rest {
        [a, b, c, ..] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() => {
            let value = u16::from(a - b'0') * 100 + u16::from(b - b'0') * 10 + u16::from(c - b'0');
            u8::try_from(value).ok().map(|v| (v, 3))
        }
        [x, ..] => Some((*x, 1)),
        [] => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_specials() {
        assert_eq!(quote("hello world"), "\"hello world\"");
        assert_eq!(quote(r#"say "hi" \o/"#), r#""say \"hi\" \\o/""#);
    }

    #[test]
    fn long_values_are_split_and_rejoined() {
        let long = "a".repeat(300);
        let quoted = quote_split(&long);
        assert_eq!(quoted, format!("\"{}\" \"{}\"", "a".repeat(255), "a".repeat(45)));
        assert_eq!(unquote(&quoted).as_deref(), Some(long.as_str()));
    }

    #[test]
    fn split_respects_char_boundaries() {
        let long = "é".repeat(200);
        let quoted = quote_split(&long);
        assert_eq!(unquote(&quoted).as_deref(), Some(long.as_str()));
    }

    #[test]
    fn unquote_handles_escapes_and_bare_segments() {
        assert_eq!(unquote(r#""a\"b""#).as_deref(), Some("a\"b"));
        assert_eq!(unquote(r#""\226\157\164""#).as_deref(), Some("❤"));
        assert_eq!(unquote("bare").as_deref(), Some("bare"));
        assert_eq!(unquote(r#""one" "two""#).as_deref(), Some("onetwo"));
        assert_eq!(unquote(r#""""#).as_deref(), Some(""));
    }

    #[test]
    fn unquote_rejects_malformed() {
        assert_eq!(unquote("\"open"), None);
        assert_eq!(unquote("\"trailing\\"), None);
        assert_eq!(unquote(r#""\999""#), None);
    }
}
