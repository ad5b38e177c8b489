//! Query term highlighting

use std::ops::Range;

use regex::{Captures, Regex, RegexBuilder};
use tracing::warn;

/// Default CSS class of the `<mark>` wrapper.
pub const DEFAULT_HIGHLIGHT_CLASS: &str = "search-highlight";

/// Wrap every case-insensitive occurrence of each query token in
/// `<mark class="search-highlight">`.
#[must_use]
pub fn highlight(text: &str, query: &str) -> String {
    highlight_with_class(text, query, DEFAULT_HIGHLIGHT_CLASS)
}

/// [`highlight`] with a custom mark class.
///
/// Tokens are matched literally and applied one after another, so a later
/// token may match inside markup produced for an earlier one.
#[must_use]
pub fn highlight_with_class(text: &str, query: &str, class: &str) -> String {
    let mut out = text.to_string();
    for pattern in query.split_whitespace().filter_map(token_pattern) {
        out = pattern
            .replace_all(&out, |caps: &Captures<'_>| {
                format!("<mark class=\"{class}\">{}</mark>", &caps[0])
            })
            .into_owned();
    }
    out
}

/// Byte ranges of `text` matched by any query token, sorted and merged so
/// that overlapping or touching matches form one range.
#[must_use]
pub fn match_ranges(text: &str, query: &str) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = query
        .split_whitespace()
        .filter_map(token_pattern)
        .flat_map(|pattern| {
            pattern
                .find_iter(text)
                .map(|found| found.range())
                .collect::<Vec<_>>()
        })
        .filter(|range| !range.is_empty())
        .collect();
    ranges.sort_by_key(|range| (range.start, range.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

/// Split `text` into `(segment, matched)` pieces covering it in order.
#[must_use]
pub fn segments<'a>(text: &'a str, query: &str) -> Vec<(&'a str, bool)> {
    let mut out = Vec::new();
    let mut cursor = 0;
    for range in match_ranges(text, query) {
        if range.start > cursor {
            out.push((&text[cursor..range.start], false));
        }
        out.push((&text[range.clone()], true));
        cursor = range.end;
    }
    if cursor < text.len() {
        out.push((&text[cursor..], false));
    }
    out
}

fn token_pattern(token: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(token))
        .case_insensitive(true)
        .build()
        .map_err(|err| warn!(token, error = %err, "skipping unhighlightable token"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_case_insensitive_matches() {
        assert_eq!(
            highlight("Blocked Kitchen Drain", "drain"),
            "Blocked Kitchen <mark class=\"search-highlight\">Drain</mark>"
        );
    }

    #[test]
    fn text_without_matches_is_unchanged() {
        assert_eq!(highlight("Caulk Replacement", "faucet"), "Caulk Replacement");
        assert_eq!(highlight("Caulk Replacement", "   "), "Caulk Replacement");
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert_eq!(highlight("price (approx)", "(approx)"), "price <mark class=\"search-highlight\">(approx)</mark>");
        assert_eq!(highlight("a.b", "."), "a<mark class=\"search-highlight\">.</mark>b");
        assert_eq!(highlight("axb", "."), "axb");
    }

    #[test]
    fn every_occurrence_of_every_token() {
        let out = highlight_with_class("water leak, water damage", "water leak", "hl");
        assert_eq!(
            out,
            "<mark class=\"hl\">water</mark> <mark class=\"hl\">leak</mark>, <mark class=\"hl\">water</mark> damage"
        );
    }

    #[test]
    fn overlapping_matches_merge() {
        assert_eq!(match_ranges("Drainage drain", "drain age"), vec![0..8, 9..14]);
        assert!(match_ranges("Caulk", "").is_empty());
    }

    #[test]
    fn segments_cover_the_text() {
        assert_eq!(
            segments("Blocked Kitchen Drain", "kitchen"),
            vec![("Blocked ", false), ("Kitchen", true), (" Drain", false)]
        );
        assert_eq!(segments("Drain", "drain"), vec![("Drain", true)]);
    }
}
