//! Placeholder scanning and in-place substitution.
//!
//! One regex recognises the whole placeholder grammar:
//!
//! ```text
//! {  <prefix>␠  <name>  | f(args) | g  ␠<suffix>  }
//!    └ non-word run      └ filter chain  └ run adjacent to `}`
//!      adjacent to `{`
//! ```
//!
//! `scan_and_replace` walks the template left to right, asks the caller for a
//! replacement per placeholder and splices it in. Substitutions change the
//! string length, so the cursor is moved to just past the inserted text after
//! every splice: inserted text is never rescanned and nothing after it is
//! skipped.
//!
//! ## Grammar notes
//!
//! - A `{` preceded by `\` never opens a placeholder. The backslash is kept.
//! - A prefix must contain at least one non-word character so that in
//!   `{name | upper}` the word `name` is read as the name, never as a prefix.
//! - Filter arguments may contain quotes and brackets, but no nested
//!   parentheses.

use super::chain::parse_chain;
use crate::Placeholder;
use regex::{Captures, Regex};

/// How repeated placeholders are substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanMode {
    /// Replace every later unescaped occurrence of the same placeholder text.
    /// Used for named values, where equal text always resolves equally.
    ReplaceAll,
    /// Replace only the occurrence just matched. Used for positional values,
    /// where `{}{}` must consume two different values.
    FirstOnly,
}

/// Cheap pre-check: a template without both braces has nothing to scan.
///
/// A `true` result does not guarantee a placeholder (`"{a:1}"` has none).
pub fn has_interpolation(template: &str) -> bool {
    template.contains('{') && template.contains('}')
}

fn placeholder_regex() -> &'static Regex {
    regex!(
        r#"\{(?:(?P<prefix>[^\s{}|]*[^A-Za-z0-9_\s{}|][^\s{}|]*)\s+)?\s*(?P<name>[A-Za-z0-9_]+)?(?P<filters>(?:\s*\|\s*[A-Za-z0-9_]*\s*(?:\((?:'[^']*'|"[^"]*"|[^()'"])*\))?)*)(?:\s+(?P<suffix>[^\s{}|]+))?\s*\}"#
    )
}

/// List the placeholders of `template` in order, without substituting.
pub fn parse_template(template: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    if !has_interpolation(template) {
        return found;
    }

    let re = placeholder_regex();
    let mut cursor = 0;
    while let Some(caps) = re.captures_at(template, cursor) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        if is_escaped(template, whole.start()) {
            cursor = whole.start() + 1;
            continue;
        }
        found.push(placeholder_from(&caps));
        cursor = whole.end();
    }
    found
}

/// Substitute every placeholder with the string `on_match` returns for it.
///
/// The first error returned by `on_match` stops the scan and is returned.
pub(crate) fn scan_and_replace<E>(
    template: &str,
    mode: ScanMode,
    mut on_match: impl FnMut(&Placeholder) -> Result<String, E>,
) -> Result<String, E> {
    if !has_interpolation(template) {
        return Ok(template.to_string());
    }

    let re = placeholder_regex();
    let mut out = template.to_string();
    let mut cursor = 0;

    loop {
        let placeholder = {
            let Some(caps) = re.captures_at(&out, cursor) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            if is_escaped(&out, whole.start()) {
                cursor = whole.start() + 1;
                continue;
            }
            placeholder_from(&caps)
        };

        let replacement = on_match(&placeholder)?;
        let start = placeholder.start;
        match mode {
            ScanMode::FirstOnly => out.replace_range(start..placeholder.end, &replacement),
            ScanMode::ReplaceAll => {
                let tail = replace_unescaped(&out, start, &placeholder.matched, &replacement);
                out.truncate(start);
                out.push_str(&tail);
            }
        }
        cursor = start + replacement.len();
    }

    Ok(out)
}

/// `text[from..]` with every occurrence of `needle` not preceded by `\`
/// replaced by `with`.
fn replace_unescaped(text: &str, from: usize, needle: &str, with: &str) -> String {
    let mut tail = String::with_capacity(text.len() - from);
    let mut last = from;
    for (idx, _) in text[from..].match_indices(needle) {
        let at = from + idx;
        if is_escaped(text, at) {
            continue;
        }
        tail.push_str(&text[last..at]);
        tail.push_str(with);
        last = at + needle.len();
    }
    tail.push_str(&text[last..]);
    tail
}

fn is_escaped(text: &str, brace: usize) -> bool {
    brace > 0 && text.as_bytes()[brace - 1] == b'\\'
}

fn placeholder_from(caps: &Captures<'_>) -> Placeholder {
    let group = |name: &str| caps.name(name).map(|m| m.as_str().trim()).unwrap_or("");
    let (start, end, matched) = caps.get(0).map(|m| (m.start(), m.end(), m.as_str())).unwrap_or((0, 0, ""));

    let filters = group("filters");
    Placeholder {
        name: group("name").to_string(),
        prefix: group("prefix").to_string(),
        suffix: group("suffix").to_string(),
        chain: if filters.is_empty() { Vec::new() } else { parse_chain(filters) },
        matched: matched.to_string(),
        start,
        end,
    }
}
