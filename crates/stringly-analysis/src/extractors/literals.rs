//! Decoding of plain string literals.
//!
//! Only plain literals carry a usable value. Formatted strings (f-strings,
//! template literals) and byte strings decode to `None`.

/// Decode a Python `string` node's source text.
pub fn python_string_value(text: &str) -> Option<String> {
    let quote_at = text.find(['"', '\''])?;
    let (prefix, quoted) = text.split_at(quote_at);
    if !prefix.chars().all(|c| matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B' | 'f' | 'F' | 't' | 'T')) {
        return None;
    }
    if prefix.chars().any(|c| matches!(c, 'f' | 'F' | 't' | 'T' | 'b' | 'B')) {
        return None;
    }
    let raw = prefix.chars().any(|c| matches!(c, 'r' | 'R'));

    let delim = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        &quoted[..3]
    } else {
        &quoted[..1]
    };
    if quoted.len() < delim.len() * 2 || !quoted.ends_with(delim) {
        return None;
    }
    let inner = &quoted[delim.len()..quoted.len() - delim.len()];
    Some(if raw {
        inner.to_string()
    } else {
        unescape_python(inner)
    })
}

/// Decode a JavaScript/TypeScript `string` node's source text.
pub fn js_string_value(text: &str) -> Option<String> {
    let first = text.chars().next()?;
    if !matches!(first, '"' | '\'') || text.len() < 2 || !text.ends_with(first) {
        return None;
    }
    Some(unescape_js(&text[1..text.len() - 1]))
}

fn unescape_python(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            'x' => push_hex(&mut out, &mut chars, 2, "\\x"),
            'u' => push_hex(&mut out, &mut chars, 4, "\\u"),
            'U' => push_hex(&mut out, &mut chars, 8, "\\U"),
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            other => {
                // Unknown escapes (including \N{...}) are kept verbatim.
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn unescape_js(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            break;
        };
        match esc {
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            '0' if !chars.peek().is_some_and(|d| d.is_ascii_digit()) => out.push('\0'),
            'x' => push_hex(&mut out, &mut chars, 2, "x"),
            'u' if chars.peek() == Some(&'{') => {
                chars.next();
                let digits: String = chars.by_ref().take_while(|d| *d != '}').collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("u{");
                        out.push_str(&digits);
                        out.push('}');
                    }
                }
            }
            'u' => push_hex(&mut out, &mut chars, 4, "u"),
            other => out.push(other),
        }
    }
    out
}

/// Consume exactly `len` hex digits; on failure emit `fallback` plus whatever
/// was consumed.
fn push_hex(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    len: usize,
    fallback: &str,
) {
    let mut digits = String::with_capacity(len);
    while digits.len() < len {
        match chars.peek() {
            Some(d) if d.is_ascii_hexdigit() => {
                digits.push(*d);
                chars.next();
            }
            _ => break,
        }
    }
    let decoded = if digits.len() == len {
        u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
    } else {
        None
    };
    match decoded {
        Some(ch) => out.push(ch),
        None => {
            out.push_str(fallback);
            out.push_str(&digits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_plain_and_prefixed() {
        assert_eq!(python_string_value(r#""prod""#).as_deref(), Some("prod"));
        assert_eq!(python_string_value("'dev'").as_deref(), Some("dev"));
        assert_eq!(python_string_value(r#"u"x""#).as_deref(), Some("x"));
        assert_eq!(python_string_value(r#"r"a\nb""#).as_deref(), Some(r"a\nb"));
        assert_eq!(python_string_value(r#"f"{x}""#), None);
        assert_eq!(python_string_value(r#"rb"x""#), None);
        assert_eq!(python_string_value(r#"b'x'"#), None);
    }

    #[test]
    fn python_triple_quoted() {
        assert_eq!(python_string_value(r#""""a, b""""#).as_deref(), Some("a, b"));
        assert_eq!(python_string_value("'''x\ny'''").as_deref(), Some("x\ny"));
        assert_eq!(python_string_value(r#""""#).as_deref(), Some(""));
    }

    #[test]
    fn python_escapes() {
        assert_eq!(python_string_value(r#""a\tb\\c\"d""#).as_deref(), Some("a\tb\\c\"d"));
        assert_eq!(python_string_value(r#""\x41é\101""#).as_deref(), Some("AéA"));
        assert_eq!(python_string_value(r#""\N{DASH}""#).as_deref(), Some(r"\N{DASH}"));
    }

    #[test]
    fn js_strings() {
        assert_eq!(js_string_value(r#""a, b""#).as_deref(), Some("a, b"));
        assert_eq!(js_string_value(r"'it\'s'").as_deref(), Some("it's"));
        assert_eq!(js_string_value(r#""\u{1F680}\x41é""#).as_deref(), Some("🚀Aé"));
        assert_eq!(js_string_value("`tpl`"), None);
        assert_eq!(js_string_value("\""), None);
    }
}
