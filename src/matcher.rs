use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Matcher, Utf32Str};
use std::cmp::Reverse;

pub struct FuzzyMatcher {
    matcher: Matcher,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
        }
    }

    /// Ranks `candidates` (indices into `names`) by descending score and keeps
    /// at most `limit`. Names containing the query as a subsequence rank by
    /// nucleo score; the rest rank below them by `partial_ratio`. Equal scores
    /// keep their input order.
    pub fn rank(&mut self, query: &str, names: &[&str], candidates: &[usize], limit: usize) -> Vec<usize> {
        let atom = Self::atom(query);
        let needle = query.to_lowercase();
        let mut buf = Vec::new();

        let mut scored: Vec<(usize, (bool, u32))> = candidates
            .iter()
            .map(|&idx| {
                let haystack = Utf32Str::new(names[idx], &mut buf);
                let score = match atom.score(haystack, &mut self.matcher) {
                    Some(score) => (true, u32::from(score)),
                    None => (false, partial_ratio(&needle, &names[idx].to_lowercase())),
                };
                (idx, score)
            })
            .collect();

        scored.sort_by_key(|&(_, score)| Reverse(score));
        scored.truncate(limit);
        scored.into_iter().map(|(idx, _)| idx).collect()
    }

    fn atom(query: &str) -> Atom {
        Atom::new(query, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy, false)
    }
}

/// Best similarity (0..=100) between the shorter string and any window of
/// the longer one with the same length.
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    let (short, long) = if a.chars().count() <= b.chars().count() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0;
    }

    let long: Vec<char> = long.chars().collect();
    let width = short.chars().count();
    let best = long
        .windows(width)
        .map(|window| strsim::normalized_levenshtein(short, &window.iter().collect::<String>()))
        .fold(0.0_f64, f64::max);

    (best * 100.0).round() as u32
}
