//! Filter chain parsing.
//!
//! ```text
//! "| add(2) | upper |  | pad_end(8, '|')"
//!        │
//!        v
//! [("add", [2]), ("upper", []), ("pad_end", [8, "|"])]
//! ```
//!
//! Empty segments (double or trailing pipes) are dropped. Order is textual;
//! priority reordering happens at execution time.

use super::args::parse_args;
use crate::FilterCall;

/// Parse the filter part of a placeholder, starting at its leading `|`.
pub fn parse_chain(text: &str) -> Vec<FilterCall> {
    let text = text.trim();
    let text = text.strip_prefix('|').unwrap_or(text);

    split_segments(text)
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(parse_segment)
        .collect()
}

fn parse_segment(segment: &str) -> FilterCall {
    match (segment.find('('), segment.rfind(')')) {
        (Some(open), Some(close)) if open < close => {
            FilterCall::new(segment[..open].trim(), parse_args(&segment[open + 1..close]))
        }
        _ => FilterCall::new(segment, Vec::new()),
    }
}

/// Split on `|` that are not inside quotes or parentheses.
fn split_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, '|') if depth == 0 => {
                segments.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push(&text[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_names_and_args() {
        let chain = parse_chain("| add(2) | upper | pad_end(8, '.')");
        assert_eq!(
            chain,
            vec![
                FilterCall::new("add", vec![Some(json!(2))]),
                FilterCall::new("upper", vec![]),
                FilterCall::new("pad_end", vec![Some(json!(8)), Some(json!("."))]),
            ]
        );
    }

    #[test]
    fn drops_empty_segments() {
        let chain = parse_chain("|a||b|");
        let names: Vec<_> = chain.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn empty_input_is_empty_chain() {
        assert!(parse_chain("").is_empty());
        assert!(parse_chain("  |  ").is_empty());
    }

    #[test]
    fn pipes_in_quoted_arguments_do_not_split() {
        let chain = parse_chain("| join(' | ') | upper");
        assert_eq!(chain[0], FilterCall::new("join", vec![Some(json!(" | "))]));
        assert_eq!(chain[1].name, "upper");
    }

    #[test]
    fn empty_parens_mean_no_args() {
        assert_eq!(parse_chain("|trim()"), vec![FilterCall::new("trim", vec![])]);
    }

    #[test]
    fn object_argument() {
        let chain = parse_chain("| unit({prefix:'$',suffix:'元'})");
        assert_eq!(chain, vec![FilterCall::new("unit", vec![Some(json!({"prefix": "$", "suffix": "元"}))])]);
    }
}
