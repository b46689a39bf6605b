//! Fuzzy comparison between the predicted brand and the brand the user claims.
//!
//! The score is the Ratcliff/Obershelp "gestalt" ratio: find the longest common
//! block, recurse on the pieces left and right of it, and report
//! `2 * matched / (len(a) + len(b))`. Small spelling, casing or plural
//! differences stay well above the threshold while unrelated names fall far
//! below it.

use std::collections::HashMap;

/// Minimum similarity for the claimed brand to count as the predicted one.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Sequences at least this long get their most frequent elements excluded
/// from block seeding.
const POPULAR_MIN_LEN: usize = 200;

/// Outcome of comparing a predicted label with a claimed brand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub ratio: f64,
    pub matched: bool,
}

/// Applies the similarity threshold to label comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameMatcher {
    threshold: f64,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new(SIMILARITY_THRESHOLD)
    }
}

impl NameMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether a similarity ratio is high enough to be a match.
    pub fn is_match(&self, ratio: f64) -> bool {
        ratio >= self.threshold
    }

    /// Case-insensitively compares the predicted label with the claimed brand.
    pub fn compare(&self, predicted: &str, expected: &str) -> MatchResult {
        let ratio = similarity_ratio(predicted, expected);
        MatchResult {
            ratio,
            matched: self.is_match(ratio),
        }
    }
}

/// Case-insensitive similarity ratio in `[0, 1]`; `1.0` means identical.
///
/// Two empty strings are considered identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * SequenceMatcher::new(&a, &b).matched_len() as f64 / total as f64
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    // Positions of each element of `b`, minus popular elements.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        if b.len() >= POPULAR_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b2j }
    }

    /// Total size of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        matched
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given ranges.
    ///
    /// Ties go to the block that starts earliest in `a`, then earliest in `b`.
    fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i - 1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Popular elements never seed a block but may still extend one.
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(similarity_ratio("Nike", "nike"), 1.0);
        assert_eq!(similarity_ratio("PlayStation", "PLAYSTATION"), 1.0);
    }

    #[test]
    fn test_known_ratios() {
        assert_close(similarity_ratio("Nike", "Adidas"), 0.2);
        assert_close(similarity_ratio("Coca Cola", "coca-cola"), 16.0 / 18.0);
        assert_close(similarity_ratio("Levi's", "levis"), 10.0 / 11.0);
        assert_close(similarity_ratio("Nike", "nikes"), 8.0 / 9.0);
        assert_close(similarity_ratio("Nike", "nkie"), 0.75);
        assert_close(similarity_ratio("Mtn", "mtn dew"), 0.6);
        assert_close(similarity_ratio("private", "pirate"), 10.0 / 13.0);
        assert_close(similarity_ratio("abcd", "dcba"), 0.25);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("", "abc"), 0.0);
        assert_eq!(similarity_ratio("Nike", ""), 0.0);
    }

    #[test]
    fn test_popular_elements_in_long_sequences() {
        let a = format!("{}{}", "a".repeat(10), "b".repeat(300));
        let b = format!("{}{}", "b".repeat(300), "a".repeat(10));
        assert_eq!(similarity_ratio(&a, &b), 0.0);

        let same = "x".repeat(250);
        assert_eq!(similarity_ratio(&same, &same), 1.0);

        assert_close(similarity_ratio(&"abc".repeat(70), &"abd".repeat(70)), 4.0 / 420.0);
    }

    #[test]
    fn test_threshold_boundary() {
        let matcher = NameMatcher::default();
        assert!(!matcher.is_match(0.699));
        assert!(matcher.is_match(0.70));

        // 7 shared characters out of 10 + 10 is exactly 0.7
        let result = matcher.compare("abcdefghij", "abcdefgxyz");
        assert_eq!(result.ratio, 0.7);
        assert!(result.matched);

        let result = matcher.compare("Pepsi", "pepsi cola");
        assert!(result.ratio < 0.7);
        assert!(!result.matched);
    }

    #[test]
    fn test_custom_threshold() {
        let strict = NameMatcher::new(0.95);
        assert!(!strict.compare("Nike", "nikes").matched);
        assert!(strict.compare("Nike", "NIKE").matched);
        assert_eq!(strict.threshold(), 0.95);
    }
}
