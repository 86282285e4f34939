//! Bracket depth tagging.
//!
//! The argument tokenizer is a single, non-recursive regex. To let it treat a
//! whole `{...}` or `[...]` literal as one token, brackets are first annotated
//! with their nesting depth:
//!
//! ```text
//! {a:[1,2],b:{c:3}}
//! {1%a:[1%1,2%1],b:{2%c:3%2}%1}
//! ```
//!
//! A top-level object is then simply `\{1%.*?%1\}`; inner regions carry a
//! higher depth and cannot close it early. `untag` strips the markers again.
//!
//! This is a token-extraction aid, not a validator: unbalanced input is tagged
//! on a best-effort basis and never rejected. Depth never drops below zero, so
//! a stray closer is left untouched.

use regex::Regex;

/// Bracket pairs handled when no explicit pairs are given.
pub(crate) const DEFAULT_PAIRS: &[(&str, &str)] = &[("{", "}"), ("[", "]")];

/// Tag `{}` and `[]` regions with depth markers.
pub fn tag(input: &str) -> String {
    tag_pairs(input, DEFAULT_PAIRS)
}

/// Remove the markers inserted by [`tag`].
///
/// Markers are stripped by pattern, so a fragment holding only one half of a
/// tagged pair is restored too.
pub fn untag(input: &str) -> String {
    if !input.contains('%') {
        return input.to_string();
    }
    let mut out = regex!(r"\{\d+%").replace_all(input, "{").into_owned();
    out = regex!(r"%\d+\}").replace_all(&out, "}").into_owned();
    out = regex!(r"\[\d+%").replace_all(&out, "[").into_owned();
    regex!(r"%\d+\]").replace_all(&out, "]").into_owned()
}

/// Tag each `(open, close)` pair in turn.
///
/// A pair is only processed when both of its delimiters occur in the input.
pub fn tag_pairs(input: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = input.to_string();
    for (open, close) in pairs {
        if needs_pair(&out, open, close) {
            out = tag_pair(&out, open, close);
        }
    }
    out
}

/// Inverse of [`tag_pairs`] for the same `pairs`.
pub fn untag_pairs(input: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = input.to_string();
    for (open, close) in pairs {
        if open.is_empty() || close.is_empty() {
            continue;
        }
        let opener = Regex::new(&format!(r"{}\d+%", regex::escape(open)));
        let closer = Regex::new(&format!(r"%\d+{}", regex::escape(close)));
        if let (Ok(opener), Ok(closer)) = (opener, closer) {
            out = opener.replace_all(&out, *open).into_owned();
            out = closer.replace_all(&out, *close).into_owned();
        }
    }
    out
}

fn needs_pair(input: &str, open: &str, close: &str) -> bool {
    !open.is_empty() && !close.is_empty() && input.contains(open) && input.contains(close)
}

fn tag_pair(input: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut depth = 0usize;
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        if rest.starts_with(open) {
            depth += 1;
            out.push_str(open);
            out.push_str(&depth.to_string());
            out.push('%');
            rest = &rest[open.len()..];
        } else if rest.starts_with(close) {
            if depth > 0 {
                out.push('%');
                out.push_str(&depth.to_string());
                depth -= 1;
            }
            out.push_str(close);
            rest = &rest[close.len()..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tags_nested_objects_and_arrays() {
        assert_eq!(tag("{a:[1,2],b:{c:3}}"), "{1%a:[1%1,2%1],b:{2%c:3%2}%1}");
        assert_eq!(tag("[[1],[2]]"), "[1%[2%1%2],[2%2%2]%1]");
    }

    #[test]
    fn skips_pairs_that_are_not_both_present() {
        assert_eq!(tag("a{b"), "a{b");
        assert_eq!(tag("x]"), "x]");
        assert_eq!(tag("plain"), "plain");
    }

    #[test]
    fn stray_closer_is_left_alone() {
        assert_eq!(tag("}{"), "}{1%");
        assert_eq!(untag("}{1%"), "}{");
    }

    #[test]
    fn lone_halves_are_untagged() {
        let tagged = tag("'{', '}'");
        assert_eq!(tagged, "'{1%', '%1}'");
        assert_eq!(untag("'{1%'"), "'{'");
        assert_eq!(untag("'%1}'"), "'}'");
        assert_eq!(untag("[2%"), "[");
        assert_eq!(untag_pairs("<b>1%", &[("<b>", "</b>")]), "<b>");
    }

    #[test]
    fn custom_pairs_round_trip() {
        let pairs = [("<b>", "</b>")];
        let tagged = tag_pairs("<b>x<b>y</b></b>", &pairs);
        assert_eq!(tagged, "<b>1%x<b>2%y%2</b>%1</b>");
        assert_eq!(untag_pairs(&tagged, &pairs), "<b>x<b>y</b></b>");
    }

    #[test]
    fn multibyte_text_survives() {
        let s = "{前缀:'元',v:[1]}";
        assert_eq!(untag(&tag(s)), s);
    }

    /// Text with properly nested `{}`/`[]` regions and no `%`.
    fn well_formed() -> impl Strategy<Value = String> {
        let leaf = proptest::string::string_regex("[a-z0-9 ,:'\"]{0,6}").unwrap();
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(|parts| parts.concat()),
                inner.clone().prop_map(|s| format!("{{{s}}}")),
                inner.prop_map(|s| format!("[{s}]")),
            ]
        })
    }

    proptest! {
        #[test]
        fn untag_inverts_tag(s in well_formed()) {
            prop_assert_eq!(untag(&tag(&s)), s);
        }
    }
}
