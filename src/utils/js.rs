//! JavaScript object literal to JSON conversion
//!
//! Player options are written as JS literals: bare keys, single-quoted
//! strings, trailing commas, comments and the odd `!0`. This rewrites
//! such a literal into strict JSON for `serde_json`.

use crate::error::HkError;
use serde_json::Value;

/// Rewrite a JS object literal as JSON text
pub fn js_to_json(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::with_capacity(code.len() + code.len() / 4);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => i = push_string(&chars, i, &mut out),
            '/' if chars.get(i + 1) == Some(&'*') || chars.get(i + 1) == Some(&'/') => {
                i = skip_comment(&chars, i);
            }
            ',' => {
                let next = skip_trivia(&chars, i + 1);
                if !matches!(chars.get(next), Some(']') | Some('}')) {
                    out.push(',');
                }
                i += 1;
            }
            '!' if matches!(chars.get(i + 1), Some('0') | Some('1'))
                && !chars.get(i + 2).map_or(false, |c| c.is_ascii_alphanumeric()) =>
            {
                out.push_str(if chars[i + 1] == '0' { "true" } else { "false" });
                i += 2;
            }
            c if is_ident_start(c) => {
                let end = scan_while(&chars, i, is_ident_char);
                let ident: String = chars[i..end].iter().collect();
                match ident.as_str() {
                    "true" | "false" | "null" => out.push_str(&ident),
                    "undefined" => out.push_str("null"),
                    _ => push_json_string(&ident, &mut out),
                }
                i = end;
            }
            c if c.is_ascii_digit() || (c == '.' && next_is_digit(&chars, i)) => {
                let end = scan_while(&chars, i, |c| c.is_ascii_alphanumeric() || c == '.');
                let end = extend_exponent(&chars, end);
                let number: String = chars[i..end].iter().collect();
                let is_key = chars.get(skip_trivia(&chars, end)) == Some(&':');
                let number = normalize_number(&number);
                if is_key {
                    push_json_string(&number, &mut out);
                } else {
                    out.push_str(&number);
                }
                i = end;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Parse a JS object literal into a JSON value
pub fn parse_js_object(code: &str) -> Result<Value, HkError> {
    Ok(serde_json::from_str(&js_to_json(code))?)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn next_is_digit(chars: &[char], i: usize) -> bool {
    chars.get(i + 1).map_or(false, |c| c.is_ascii_digit())
}

fn scan_while(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    while end < chars.len() && pred(chars[end]) {
        end += 1;
    }
    end
}

/// Pick up the sign of an exponent such as `1e-5`
fn extend_exponent(chars: &[char], end: usize) -> usize {
    let has_exponent = end > 0 && matches!(chars[end - 1], 'e' | 'E');
    let is_hex = chars[..end]
        .iter()
        .rev()
        .take_while(|c| c.is_ascii_alphanumeric())
        .any(|&c| c == 'x' || c == 'X');
    if has_exponent && !is_hex && matches!(chars.get(end), Some('+') | Some('-')) {
        scan_while(chars, end + 1, |c| c.is_ascii_digit())
    } else {
        end
    }
}

fn normalize_number(number: &str) -> String {
    let hex = number
        .strip_prefix("0x")
        .or_else(|| number.strip_prefix("0X"));
    if let Some(value) = hex.and_then(|h| u64::from_str_radix(h, 16).ok()) {
        return value.to_string();
    }
    if number.starts_with('.') {
        return format!("0{}", number);
    }
    if number.ends_with('.') {
        return number.trim_end_matches('.').to_string();
    }
    number.to_string()
}

/// Skip whitespace and comments, returning the next significant index
fn skip_trivia(chars: &[char], mut i: usize) -> usize {
    loop {
        i = scan_while(chars, i, char::is_whitespace);
        if chars.get(i) == Some(&'/') && matches!(chars.get(i + 1), Some('*') | Some('/')) {
            i = skip_comment(chars, i);
        } else {
            return i;
        }
    }
}

fn skip_comment(chars: &[char], i: usize) -> usize {
    if chars.get(i + 1) == Some(&'*') {
        let mut j = i + 2;
        while j + 1 < chars.len() {
            if chars[j] == '*' && chars[j + 1] == '/' {
                return j + 2;
            }
            j += 1;
        }
        chars.len()
    } else {
        scan_while(chars, i, |c| c != '\n')
    }
}

/// Copy a quoted JS string as a double-quoted JSON string
fn push_string(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    out.push('"');

    while i < chars.len() && chars[i] != quote {
        let c = chars[i];
        if c == '\\' {
            let Some(&escaped) = chars.get(i + 1) else {
                break;
            };
            i += 2;
            match escaped {
                '\'' => out.push('\''),
                '"' => out.push_str("\\\""),
                '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => {
                    out.push('\\');
                    out.push(escaped);
                }
                'v' => out.push_str("\\u000b"),
                '0' if !chars.get(i).map_or(false, |c| c.is_ascii_digit()) => {
                    out.push_str("\\u0000");
                }
                'u' if chars.get(i) == Some(&'{') => {
                    let close = scan_while(chars, i + 1, |c| c.is_ascii_hexdigit());
                    let hex: String = chars[i + 1..close].iter().collect();
                    let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
                    match decoded {
                        Some(c) if chars.get(close) == Some(&'}') => {
                            push_string_char(c, out);
                            i = close + 1;
                        }
                        _ => out.push('u'),
                    }
                }
                'u' => out.push_str("\\u"),
                'x' => {
                    let hex: String = chars.iter().skip(i).take(2).collect();
                    match u8::from_str_radix(&hex, 16) {
                        Ok(byte) if hex.len() == 2 => {
                            out.push_str(&format!("\\u{:04x}", byte));
                            i += 2;
                        }
                        _ => out.push('x'),
                    }
                }
                '\n' => {}
                other => out.push(other),
            }
            continue;
        }

        push_string_char(c, out);
        i += 1;
    }

    out.push('"');
    i + 1
}

/// Append one literal character inside a JSON string
fn push_string_char(c: char, out: &mut String) {
    match c {
        '"' => out.push_str("\\\""),
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
        c => out.push(c),
    }
}

fn push_json_string(value: &str, out: &mut String) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
}
