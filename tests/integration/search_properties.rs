use proptest::prelude::*;

use homeguide::core::Category;
use homeguide::search::{highlight, match_ranges, tokenize, FilterSet, ScoredGuide, SearchIndex};

use crate::fixture::guide;

fn arb_category() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Kitchen),
        Just(Category::Bathroom),
        Just(Category::Outdoor),
        Just(Category::Emergency),
        Just(Category::Seasonal),
    ]
}

fn one_word_index() -> impl Strategy<Value = SearchIndex> {
    prop::collection::vec(("[a-z]{3,8}", arb_category()), 1..12).prop_map(|entries| {
        SearchIndex::build(
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (title, category))| guide(&format!("g-{i}"), &title, category, &[]))
                .collect(),
        )
    })
}

/// A strict substring of `word`, at least two characters long.
fn strict_substring(word: &str, len_seed: usize, start_seed: usize) -> String {
    let chars: Vec<char> = word.chars().collect();
    let len = 2 + len_seed % (chars.len() - 2);
    let start = start_seed % (chars.len() - len + 1);
    chars[start..start + len].iter().collect()
}

fn arb_index() -> impl Strategy<Value = SearchIndex> {
    prop::collection::vec(("[a-z]{2,8}( [a-z]{2,8}){0,4}", arb_category()), 1..12).prop_map(
        |entries| {
            SearchIndex::build(
                entries
                    .into_iter()
                    .enumerate()
                    .map(|(i, (title, category))| guide(&format!("g-{i}"), &title, category, &[]))
                    .collect(),
            )
        },
    )
}

proptest! {
    #[test]
    fn results_are_sorted_by_descending_score(index in arb_index(), query in "[a-z]{2,4}") {
        let ranked = index.query_scored(&query, &FilterSet::all());
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        prop_assert!(ranked.iter().all(|scored| scored.score > 0.0));
    }

    #[test]
    fn any_title_token_finds_its_guide(index in arb_index(), pick in any::<prop::sample::Index>(), word in any::<prop::sample::Index>()) {
        let target = pick.get(index.guides());
        let tokens: Vec<String> = tokenize(&target.title).collect();
        let token = word.get(&tokens);
        let found = index.query(token, &FilterSet::all());
        prop_assert!(found.iter().any(|g| g.id == target.id), "{token} did not find {}", target.id);
    }

    #[test]
    fn repeated_queries_give_identical_results(index in arb_index(), query in "[a-z]{2,4}( [a-z]{2,4})?") {
        let run = || -> Vec<(String, f64)> {
            index
                .query_scored(&query, &FilterSet::all())
                .into_iter()
                .map(|scored| (scored.guide.id.clone(), scored.score))
                .collect()
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn partial_matches_rank_at_or_below_exact_matches(
        index in one_word_index(),
        pick in any::<prop::sample::Index>(),
        len_seed in any::<usize>(),
        start_seed in any::<usize>(),
    ) {
        let source = pick.get(index.guides());
        let query = strict_substring(&source.title, len_seed, start_seed);
        let ranked = index.query_scored(&query, &FilterSet::all());
        prop_assert!(ranked.iter().any(|scored| scored.guide.id == source.id));

        let (exact, partial): (Vec<&ScoredGuide<'_>>, Vec<&ScoredGuide<'_>>) = ranked
            .iter()
            .partition(|scored| tokenize(&scored.guide.searchable_text()).any(|token| token == query));
        if let (Some(lowest_exact), Some(highest_partial)) = (
            exact.iter().map(|scored| scored.score).reduce(f64::min),
            partial.iter().map(|scored| scored.score).reduce(f64::max),
        ) {
            prop_assert!(lowest_exact >= highest_partial, "{query}: exact {lowest_exact} < partial {highest_partial}");
        }
    }

    #[test]
    fn every_result_contains_a_query_token(index in arb_index(), query in "[a-z]{2,4}( [a-z]{2,4})?") {
        let tokens: Vec<String> = tokenize(&query).collect();
        for found in index.query(&query, &FilterSet::all()) {
            let text = found.searchable_text().to_lowercase();
            prop_assert!(tokens.iter().any(|token| text.contains(token.as_str())));
        }
    }

    #[test]
    fn filters_only_remove_results(index in arb_index(), query in "[a-z]{2,3}", category in arb_category()) {
        let all: Vec<String> = index.query(&query, &FilterSet::all()).iter().map(|g| g.id.clone()).collect();
        let filtered = index.query(&query, &FilterSet::only(category.as_str()));
        let mut last = 0;
        for found in filtered {
            prop_assert_eq!(&found.category, &category);
            // Relative order is preserved.
            let position = all.iter().position(|id| *id == found.id).unwrap();
            prop_assert!(position >= last);
            last = position;
        }
    }

    #[test]
    fn highlight_keeps_the_visible_text(text in "[A-Za-z ]{0,40}", query in "[a-z]{2,4}") {
        let marked = highlight(&text, &query);
        let stripped = marked
            .replace("<mark class=\"search-highlight\">", "")
            .replace("</mark>", "");
        prop_assert_eq!(stripped, text.clone());
    }

    #[test]
    fn match_ranges_are_disjoint_and_in_bounds(text in "[a-z ]{0,40}", query in "[a-z]{1,3}( [a-z]{1,3})?") {
        let ranges = match_ranges(&text, &query);
        for range in &ranges {
            prop_assert!(range.start < range.end && range.end <= text.len());
        }
        for pair in ranges.windows(2) {
            prop_assert!(pair[0].end < pair[1].start);
        }
    }
}
