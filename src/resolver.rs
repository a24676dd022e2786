//! Fuzzy resolution of user input to a canonical catalog title.
//!
//! Scoring is token-order-insensitive: both strings are lowercased, split on
//! non-alphanumeric runs, token-sorted and rejoined, then compared with a
//! normalized Levenshtein ratio on a 0-100 scale.

/// Score below which [`resolve`] reports no match.
pub const DEFAULT_SCORE_CUTOFF: f64 = 70.0;

/// Canonical form used for comparison: lowercase tokens in alphabetical
/// order, joined by single spaces.
fn token_sort_normalize(s: &str) -> String {
    let mut tokens: Vec<String> = s
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr_row[j + 1] = (curr_row[j] + 1)
                .min(prev_row[j + 1] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }
    prev_row[b.len()]
}

/// Token-order-insensitive similarity on a 0-100 scale.
/// 100 means identical token multisets.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let na = token_sort_normalize(a);
    let nb = token_sort_normalize(b);
    if na.is_empty() && nb.is_empty() {
        return 100.0;
    }
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    let dist = levenshtein(&na, &nb);
    let max_len = na.chars().count().max(nb.chars().count());
    100.0 * (1.0 - dist as f64 / max_len as f64)
}

/// Pick the candidate closest to `input`, or `None` when the best score
/// falls below `cutoff`.
///
/// Candidates tied on the maximum score resolve to the first one in
/// iteration order, keeping the result stable across runs.
pub fn resolve<'a, I>(candidates: I, input: &str, cutoff: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        let score = token_sort_ratio(input, candidate);
        // Strictly greater, so the first maximal candidate wins ties.
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }
    best.and_then(|(title, score)| (score >= cutoff).then_some(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLES: &[&str] = &["Alpha Rising", "Alpha Rise", "Gamma"];

    #[test]
    fn exact_title_scores_one_hundred() {
        assert_eq!(token_sort_ratio("Alpha Rising", "Alpha Rising"), 100.0);
    }

    #[test]
    fn ratio_ignores_token_order_and_case() {
        assert_eq!(token_sort_ratio("rising alpha", "Alpha Rising"), 100.0);
        assert_eq!(token_sort_ratio("GAMMA", "Gamma"), 100.0);
    }

    #[test]
    fn ratio_handles_empty_inputs() {
        assert_eq!(token_sort_ratio("", ""), 100.0);
        assert_eq!(token_sort_ratio("", "Gamma"), 0.0);
        assert_eq!(token_sort_ratio("   ", "Gamma"), 0.0);
    }

    #[test]
    fn resolve_is_idempotent_on_exact_titles() {
        for &title in TITLES {
            assert_eq!(resolve(TITLES.iter().copied(), title, 100.0), Some(title));
        }
    }

    #[test]
    fn resolve_tolerates_whitespace_and_case_noise() {
        assert_eq!(
            resolve(TITLES.iter().copied(), "alpha rising ", DEFAULT_SCORE_CUTOFF),
            Some("Alpha Rising")
        );
    }

    #[test]
    fn resolve_rejects_inputs_below_cutoff() {
        assert_eq!(
            resolve(TITLES.iter().copied(), "zzz nonexistent", DEFAULT_SCORE_CUTOFF),
            None
        );
    }

    #[test]
    fn resolve_returns_none_for_empty_candidate_set() {
        assert_eq!(resolve(std::iter::empty(), "anything", 0.0), None);
    }

    #[test]
    fn raising_the_cutoff_only_shrinks_the_resolvable_set() {
        let inputs = ["Alpha Rising", "alpha rise", "alpa rising", "zzz nonexistent"];
        let mut previous: Option<Vec<bool>> = None;
        for cutoff in [0.0, 40.0, 70.0, 90.0, 100.0] {
            let resolved: Vec<bool> = inputs
                .iter()
                .map(|input| resolve(TITLES.iter().copied(), input, cutoff).is_some())
                .collect();
            if let Some(prev) = &previous {
                for (was, is) in prev.iter().zip(&resolved) {
                    assert!(*was || !*is, "input resolved at a higher cutoff only");
                }
            }
            previous = Some(resolved);
        }
    }

    #[test]
    fn ties_resolve_to_the_first_candidate_in_order() {
        // Both candidates normalize to the same token string.
        let candidates = ["World Hero", "Hero World"];
        assert_eq!(
            resolve(candidates.iter().copied(), "hero world", 70.0),
            Some("World Hero")
        );
    }
}
