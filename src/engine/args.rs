//! Filter argument parsing.
//!
//! Turns the text between a filter's parentheses into typed slots:
//!
//! ```text
//! '$', , true, 2.5, {prefix:'$'}, [1,2], word
//!  │   │   │    │        │          │     └─ String("word")
//!  │   │   │    │        │          └─ Array
//!  │   │   │    │        └─ Object (bare keys / single quotes accepted)
//!  │   │   │    └─ Number
//!  │   │   └─ Bool
//!  │   └─ unset (None)
//!  └─ String("$")
//! ```
//!
//! The tokenizer is one slot regex applied repeatedly. Brackets are tagged
//! first (see `tagger.rs`) so a top-level `{..}`/`[..]` literal is a single
//! lazy match on its depth-1 markers. Arguments are simple literals; deeper
//! structure is handled only as far as tagging allows, and anything the regex
//! cannot make sense of degrades to a raw string instead of failing.

use super::tagger::{tag, untag};
use crate::RawArg;
use serde_json::Value;

/// Parse a comma separated argument list into typed slots.
///
/// Empty and whitespace-only slots become `None`. A blank list yields no
/// slots at all.
pub fn parse_args(raw: &str) -> Vec<RawArg> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let slot = regex!(r#"(?s)^\s*('[^']*'|"[^"]*"|\{1%.*?%1\}|\[1%.*?%1\]|[^,]*?)\s*(?:,|$)"#);
    let tagged = tag(raw);
    let mut rest = tagged.as_str();
    let mut args = Vec::new();

    while !rest.is_empty() {
        let Some(caps) = slot.captures(rest) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        if whole.end() == 0 {
            break;
        }
        let token = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        args.push(classify(token));
        rest = &rest[whole.end()..];
    }

    args
}

fn classify(token: &str) -> RawArg {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if token.len() >= 2 && (quoted_with(token, '\'') || quoted_with(token, '"')) {
        return Some(Value::String(untag(&token[1..token.len() - 1])));
    }

    if token.starts_with("{1%") || token.starts_with("[1%") {
        let literal = untag(token);
        return Some(parse_literal(&literal).unwrap_or(Value::String(literal)));
    }

    match token {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" => return Some(Value::Null),
        _ => {}
    }

    if regex!(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").is_match(token) {
        if let Ok(i) = token.parse::<i64>() {
            return Some(Value::from(i));
        }
        if let Ok(f) = token.parse::<f64>() {
            return Some(crate::value::number(f));
        }
    }

    Some(Value::String(untag(token)))
}

fn quoted_with(token: &str, quote: char) -> bool {
    token.starts_with(quote) && token.ends_with(quote)
}

/// Parse an object/array literal, accepting the relaxed form people write in
/// templates (`{prefix:'$', n:1}`) as well as strict JSON.
fn parse_literal(src: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(src) {
        return Some(value);
    }
    serde_json::from_str::<Value>(&normalize_literal(src)).ok()
}

/// Rewrite single-quoted strings and bare words into JSON strings.
fn normalize_literal(src: &str) -> String {
    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' || c == '"' {
            i += 1;
            out.push('"');
            while i < chars.len() && chars[i] != c {
                match chars[i] {
                    '\\' if i + 1 < chars.len() => {
                        if chars[i + 1] == '\'' {
                            out.push('\'');
                        } else {
                            out.push('\\');
                            out.push(chars[i + 1]);
                        }
                        i += 2;
                        continue;
                    }
                    '"' => out.push_str("\\\""),
                    ch => out.push(ch),
                }
                i += 1;
            }
            out.push('"');
            i += 1;
        } else if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' {
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || matches!(chars[i], '.' | '-' | '+')) {
                out.push(chars[i]);
                i += 1;
            }
        } else if c.is_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let next = chars[i..].iter().find(|ch| !ch.is_whitespace());
            let is_key = next == Some(&':');
            if !is_key && matches!(word.as_str(), "true" | "false" | "null") {
                out.push_str(&word);
            } else {
                out.push('"');
                out.push_str(&word);
                out.push('"');
            }
        } else {
            out.push(c);
            i += 1;
        }
    }

    out
}
