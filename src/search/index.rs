//! Inverted index and relevance scoring
//!
//! Every guide's searchable text is lowercased, split on whitespace, and each
//! token of at least two characters appends the guide to that token's posting
//! list. A guide is appended once per occurrence, so repeated words weigh more.
//!
//! Scoring per query token:
//! - `+1.0` for every posting of the exact token
//! - `+0.5` for every posting of any indexed token containing the query token
//!
//! An exact token contains itself, so exact hits collect both bonuses.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::core::Guide;

use super::filters::FilterSet;

const EXACT_WEIGHT: f64 = 1.0;
const PARTIAL_WEIGHT: f64 = 0.5;
const MIN_TOKEN_CHARS: usize = 2;

/// Split text into normalized index tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
}

/// A guide with its accumulated relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredGuide<'a> {
    pub guide: &'a Guide,
    pub score: f64,
}

/// In-memory inverted index over one guide collection.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    guides: Vec<Guide>,
    /// token -> positions into `guides`, one entry per occurrence
    postings: HashMap<String, Vec<usize>>,
}

impl SearchIndex {
    /// Build an index over `guides`.
    #[must_use]
    pub fn build(guides: Vec<Guide>) -> Self {
        let mut index = Self::default();
        index.rebuild(guides);
        index
    }

    /// Replace the collection and rebuild the index wholesale.
    pub fn rebuild(&mut self, guides: Vec<Guide>) {
        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, guide) in guides.iter().enumerate() {
            for token in tokenize(&guide.searchable_text()) {
                postings.entry(token).or_default().push(position);
            }
        }
        debug!(
            guides = guides.len(),
            tokens = postings.len(),
            "built search index"
        );
        self.guides = guides;
        self.postings = postings;
    }

    #[must_use]
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Guide> {
        self.guides.iter().find(|guide| guide.id == id)
    }

    /// Number of distinct indexed tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    /// Posting list for an exact token.
    #[must_use]
    pub fn postings(&self, token: &str) -> &[usize] {
        self.postings.get(token).map_or(&[], Vec::as_slice)
    }

    /// Ranked matches for `raw_query` that pass `filters`.
    ///
    /// Ties keep collection order. The caller is responsible for rejecting
    /// queries that are too short.
    #[must_use]
    pub fn query(&self, raw_query: &str, filters: &FilterSet) -> Vec<&Guide> {
        self.query_scored(raw_query, filters)
            .into_iter()
            .map(|scored| scored.guide)
            .collect()
    }

    /// Like [`SearchIndex::query`], keeping each guide's score.
    #[must_use]
    pub fn query_scored(&self, raw_query: &str, filters: &FilterSet) -> Vec<ScoredGuide<'_>> {
        let tokens: Vec<String> = tokenize(raw_query).collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut scores = vec![0.0_f64; self.guides.len()];
        for token in &tokens {
            for &position in self.postings(token) {
                scores[position] += EXACT_WEIGHT;
            }
            for (indexed, positions) in &self.postings {
                if indexed.contains(token.as_str()) {
                    for &position in positions {
                        scores[position] += PARTIAL_WEIGHT;
                    }
                }
            }
        }

        let mut ranked: Vec<ScoredGuide<'_>> = scores
            .iter()
            .enumerate()
            .filter(|(_, score)| **score > 0.0)
            .map(|(position, score)| ScoredGuide {
                guide: &self.guides[position],
                score: *score,
            })
            .collect();
        // Stable sort: equal scores stay in collection order.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.retain(|scored| filters.matches(scored.guide));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Category, Difficulty};

    fn guide(id: &str, title: &str, category: Category) -> Guide {
        Guide {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            content: String::new(),
            category,
            difficulty: Difficulty::Unspecified,
            time_estimate: String::new(),
            tools: Vec::new(),
            keywords: Vec::new(),
        }
    }

    fn ids<'a>(guides: &[&'a Guide]) -> Vec<&'a str> {
        guides.iter().map(|g| g.id.as_str()).collect()
    }

    fn scenario() -> SearchIndex {
        SearchIndex::build(vec![
            guide("k1", "Blocked Kitchen Drain", Category::Kitchen),
            guide("b1", "Toilet Running", Category::Bathroom),
        ])
    }

    #[test]
    fn tokenize_lowercases_and_drops_short_tokens() {
        let tokens: Vec<_> = tokenize("A Leaky  FAUCET x\tfix").collect();
        assert_eq!(tokens, vec!["leaky", "faucet", "fix"]);
    }

    #[test]
    fn query_finds_drain_in_kitchen_only() {
        let index = scenario();
        assert_eq!(ids(&index.query("drain", &FilterSet::all())), vec!["k1"]);
        assert!(index.query("drain", &FilterSet::only("bathroom")).is_empty());
    }

    #[test]
    fn partial_match_scores_half() {
        let index = scenario();
        let scored = index.query_scored("drai", &FilterSet::all());
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].guide.id, "k1");
        assert!((scored[0].score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn exact_match_collects_both_bonuses() {
        let index = scenario();
        let scored = index.query_scored("drain", &FilterSet::all());
        assert!((scored[0].score - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn repeated_words_weigh_more() {
        let mut repeated = guide("r1", "leak leak leak", Category::Kitchen);
        repeated.description = "pipe".into();
        let index = SearchIndex::build(vec![guide("s1", "leak pipe", Category::Kitchen), repeated]);
        assert_eq!(index.postings("leak").len(), 4);
        assert_eq!(ids(&index.query("leak", &FilterSet::all())), vec!["r1", "s1"]);
    }

    #[test]
    fn ties_keep_collection_order() {
        let index = SearchIndex::build(vec![
            guide("a", "water heater", Category::Kitchen),
            guide("b", "water softener", Category::Bathroom),
            guide("c", "water valve", Category::Outdoor),
        ]);
        assert_eq!(ids(&index.query("water", &FilterSet::all())), vec!["a", "b", "c"]);
    }

    #[test]
    fn scores_accumulate_across_tokens() {
        let index = SearchIndex::build(vec![
            guide("one", "kitchen sink", Category::Kitchen),
            guide("both", "kitchen sink drain", Category::Kitchen),
        ]);
        let ranked = index.query("sink drain", &FilterSet::all());
        assert_eq!(ids(&ranked), vec!["both", "one"]);
    }

    #[test]
    fn empty_and_short_queries_return_nothing() {
        let index = scenario();
        assert!(index.query("", &FilterSet::all()).is_empty());
        assert!(index.query("d", &FilterSet::all()).is_empty());
        assert!(index.query("zzzz", &FilterSet::all()).is_empty());
    }

    #[test]
    fn rebuild_replaces_previous_index() {
        let mut index = scenario();
        index.rebuild(vec![guide("n1", "Gutter cleaning", Category::Outdoor)]);
        assert!(index.query("drain", &FilterSet::all()).is_empty());
        assert_eq!(ids(&index.query("gutter", &FilterSet::all())), vec!["n1"]);
        assert!(index.get("k1").is_none());
    }

    #[test]
    fn category_tokens_are_indexed() {
        let index = scenario();
        assert_eq!(ids(&index.query("bathroom", &FilterSet::all())), vec!["b1"]);
    }
}
