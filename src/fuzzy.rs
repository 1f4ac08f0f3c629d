//! Patient name matching.
//!
//! Every search scores the whole candidate set. There is no index: tolerant
//! matching against any word of an arbitrary name cannot be answered by a
//! sorted prefix lookup, so cost grows linearly with the patient table.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::records::Patient;

/// Score given to names that match in no way at all. Never returned.
pub const NO_MATCH_SCORE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    StartsWith,
    WordStartsWith,
    Contains,
    Fuzzy,
    None,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::StartsWith => "starts_with",
            MatchKind::WordStartsWith => "word_starts_with",
            MatchKind::Contains => "contains",
            MatchKind::Fuzzy => "fuzzy",
            MatchKind::None => "none",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything with a display name that can be searched.
pub trait Candidate {
    /// `None` or an empty name keeps the record out of every result.
    fn name(&self) -> Option<&str>;
}

impl Candidate for Patient {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl Candidate for Value {
    fn name(&self) -> Option<&str> {
        self.get("name")?.as_str()
    }
}

impl Candidate for String {
    fn name(&self) -> Option<&str> {
        Some(self)
    }
}

impl Candidate for &str {
    fn name(&self) -> Option<&str> {
        Some(self)
    }
}

#[derive(Debug)]
pub struct ScoredMatch<'a, T> {
    pub candidate: &'a T,
    pub score: f32,
    pub kind: MatchKind,
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    // Keep the row over the shorter side.
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Scores `name` against `query`, lower is better. The first rule that
/// applies decides the score.
pub fn match_score(query: &str, name: &str) -> (f32, MatchKind) {
    let query = query.to_lowercase();
    let name = name.to_lowercase();

    if query == name {
        return (0.0, MatchKind::Exact);
    }
    if name.starts_with(&query) {
        return (1.0, MatchKind::StartsWith);
    }

    let words: Vec<&str> = name.split_whitespace().collect();
    if words.iter().any(|word| word.starts_with(query.as_str())) {
        return (1.5, MatchKind::WordStartsWith);
    }
    if name.contains(&query) {
        return (2.0, MatchKind::Contains);
    }

    match best_word_distance(&query, &words) {
        Some(distance) => (3.0 + distance as f32, MatchKind::Fuzzy),
        None => (NO_MATCH_SCORE, MatchKind::None),
    }
}

/// Smallest tolerated edit distance between the query and any word, either
/// against the word cut to the query's length or against the whole word.
fn best_word_distance(query: &str, words: &[&str]) -> Option<usize> {
    let query: Vec<char> = query.chars().collect();
    let prefix_tolerance = (query.len() / 3).max(1);

    words
        .iter()
        .filter_map(|word| {
            let word: Vec<char> = word.chars().collect();

            let prefix = (word.len() >= query.len())
                .then(|| levenshtein_chars(&query, &word[..query.len()]))
                .filter(|&d| d <= prefix_tolerance);

            let whole_tolerance = (word.len() / 3).max(2);
            let whole = Some(levenshtein_chars(&query, &word)).filter(|&d| d <= whole_tolerance);

            prefix.into_iter().chain(whole).min()
        })
        .min()
}

/// All candidates that match `query`, best first. Equal scores keep the
/// order the candidates were given in.
pub fn score_candidates<'a, T>(query: &str, candidates: &'a [T]) -> Vec<ScoredMatch<'a, T>>
where
    T: Candidate + Sync,
{
    let query = query.trim();
    if query.is_empty() {
        return vec![];
    }

    // rayon keeps input order when collecting
    let mut matches: Vec<ScoredMatch<'a, T>> = candidates
        .par_iter()
        .filter_map(|candidate| {
            let name = candidate.name().filter(|name| !name.is_empty())?;
            let (score, kind) = match_score(query, name);
            (score < NO_MATCH_SCORE).then_some(ScoredMatch {
                candidate,
                score,
                kind,
            })
        })
        .collect();

    matches.sort_by(|a, b| a.score.total_cmp(&b.score));
    matches
}

/// At most `limit` best matches for `query`.
pub fn search<'a, T>(query: &str, candidates: &'a [T], limit: usize) -> Vec<&'a T>
where
    T: Candidate + Sync,
{
    score_candidates(query, candidates)
        .into_iter()
        .take(limit)
        .map(|m| m.candidate)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    // ── helpers ──────────────────────────────────────────────────────────────

    fn names<'a>(results: &[&&'a str]) -> Vec<&'a str> {
        results.iter().map(|s| **s).collect()
    }

    fn kind_of(query: &str, name: &str) -> MatchKind {
        match_score(query, name).1
    }

    // ── levenshtein ──────────────────────────────────────────────────────────

    #[test]
    fn levenshtein_classic_pairs() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", ""), 0);
    }

    #[test]
    fn levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("café", "cafe"), 1);
        assert_eq!(levenshtein("zoë", "zoë"), 0);
    }

    // ── match_score ──────────────────────────────────────────────────────────

    #[test]
    fn exact_match_ignores_case() {
        assert_eq!(match_score("JOHN smith", "John Smith"), (0.0, MatchKind::Exact));
    }

    #[test]
    fn each_rule_reports_its_score() {
        assert_eq!(match_score("joh", "John Smith"), (1.0, MatchKind::StartsWith));
        assert_eq!(match_score("smi", "John Smith"), (1.5, MatchKind::WordStartsWith));
        assert_eq!(match_score("ohn", "John Smith"), (2.0, MatchKind::Contains));
        // "smyth" vs the first five chars of "smith"
        assert_eq!(match_score("smyth", "John Smith"), (4.0, MatchKind::Fuzzy));
        assert_eq!(match_score("zzzzzz", "John Smith"), (NO_MATCH_SCORE, MatchKind::None));
    }

    #[test]
    fn transposed_letters_match_the_whole_word() {
        // prefix tolerance for a 4 char query is 1, the whole word allows 2
        assert_eq!(match_score("jhon", "John Smith"), (5.0, MatchKind::Fuzzy));
    }

    #[test]
    fn fuzzy_takes_the_best_word() {
        // "jon" is one edit from the start of "jones" and far from "bob"
        assert_eq!(match_score("joh", "Bob Jones"), (4.0, MatchKind::Fuzzy));
    }

    #[test]
    fn short_words_skip_the_prefix_comparison() {
        // "al" is shorter than the query, only the whole-word check runs
        assert_eq!(kind_of("alx", "al"), MatchKind::Fuzzy);
        assert_eq!(kind_of("alexander", "al"), MatchKind::None);
    }

    // ── search ───────────────────────────────────────────────────────────────

    #[test]
    fn prefix_matches_rank_before_fuzzy_ones() {
        let candidates = ["John Smith", "Johnny Appleseed", "Bob Jones"];
        let results = search("joh", &candidates, 20);
        assert_eq!(
            names(&results),
            vec!["John Smith", "Johnny Appleseed", "Bob Jones"]
        );
    }

    #[test]
    fn equal_scores_keep_scan_order() {
        let candidates = ["Johnny", "John", "Jo Ann"];
        let scored = score_candidates("jo", &candidates);
        let order: Vec<&str> = scored.iter().map(|m| *m.candidate).collect();
        assert_eq!(order, vec!["Johnny", "John", "Jo Ann"]);
        assert!(scored.iter().all(|m| m.score == 1.0));
    }

    #[test]
    fn blank_query_returns_nothing() {
        let candidates = ["Alice", "Bob"];
        assert!(search("", &candidates, 10).is_empty());
        assert!(search("   ", &candidates, 10).is_empty());
    }

    #[test]
    fn unmatched_query_returns_nothing() {
        let candidates = ["Alice", "Bob"];
        assert!(search("xyz123nomatch", &candidates, 10).is_empty());
    }

    #[test]
    fn limit_keeps_the_better_match() {
        let candidates = ["Anna Smithson", "Smith"];
        let results = search("smith", &candidates, 1);
        assert_eq!(names(&results), vec!["Smith"]);
    }

    #[test]
    fn records_without_names_are_skipped() {
        let candidates = vec![
            json!({ "patient_id": "p1", "name": "" }),
            json!({ "patient_id": "p2" }),
            json!({ "patient_id": "p3", "name": "Ada Lovelace", "phone": "555" }),
        ];
        let results = search("ada", &candidates, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["patient_id"], "p3");
        assert_eq!(results[0]["phone"], "555", "extra fields pass through");
    }

    #[test]
    fn query_is_trimmed_before_scoring() {
        let candidates = ["Grace Hopper"];
        let scored = score_candidates("  grace hopper ", &candidates);
        assert_eq!(scored[0].kind, MatchKind::Exact);
    }

    // ── properties ───────────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn levenshtein_is_symmetric(a in "[a-zé ]{0,12}", b in "[a-zé ]{0,12}") {
            prop_assert_eq!(levenshtein(&a, &b), levenshtein(&b, &a));
        }

        #[test]
        fn levenshtein_is_zero_only_for_equal_inputs(a in "[a-c]{0,8}", b in "[a-c]{0,8}") {
            prop_assert_eq!(levenshtein(&a, &a), 0);
            prop_assert_eq!(levenshtein(&a, &b) == 0, a == b);
        }

        #[test]
        fn same_name_in_any_case_is_exact(name in "[a-zA-Z][a-zA-Z ]{0,15}") {
            prop_assert_eq!(match_score(&name.to_uppercase(), &name), (0.0, MatchKind::Exact));
        }

        #[test]
        fn prefixes_score_at_most_one(query in "[a-z]{1,6}", rest in "[a-z ]{0,10}") {
            let name = format!("{query}{rest}");
            prop_assert!(match_score(&query, &name).0 <= 1.0);
        }

        #[test]
        fn score_agrees_with_kind(query in "[a-d ]{1,6}", name in "[a-d ]{0,12}") {
            let (score, kind) = match_score(&query, &name);
            let consistent = match kind {
                MatchKind::Exact => score == 0.0,
                MatchKind::StartsWith => score == 1.0,
                MatchKind::WordStartsWith => score == 1.5,
                MatchKind::Contains => score == 2.0,
                MatchKind::Fuzzy => (3.0..NO_MATCH_SCORE).contains(&score),
                MatchKind::None => score == NO_MATCH_SCORE,
            };
            prop_assert!(consistent, "{kind} scored {score}");
        }

        #[test]
        fn results_are_sorted_and_bounded(
            query in "[a-e]{1,4}",
            candidates in prop::collection::vec("[a-e ]{0,10}", 0..20),
            limit in 1usize..8,
        ) {
            let scored = score_candidates(&query, &candidates);
            prop_assert!(scored.windows(2).all(|w| w[0].score <= w[1].score));
            prop_assert!(search(&query, &candidates, limit).len() <= limit);
        }
    }
}
