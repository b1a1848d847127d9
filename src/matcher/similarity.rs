//! @ai:module:intent Symmetric similarity metrics over normalized strings
//! @ai:module:layer domain
//! @ai:module:public_api SimilarityMetric
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// @ai:intent Metric used to score two normalized strings in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    /// `1 - edit_distance / max_len`
    #[default]
    Levenshtein,
    /// Sørensen–Dice coefficient over character bigrams
    Dice,
}

impl SimilarityMetric {
    /// @ai:intent Get string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMetric::Levenshtein => "levenshtein",
            SimilarityMetric::Dice => "dice",
        }
    }

    /// @ai:intent Score two already-normalized strings
    /// @ai:post result in [0, 1]; 1.0 when a == b; symmetric
    /// @ai:effects pure
    pub fn score(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }

        match self {
            SimilarityMetric::Levenshtein => levenshtein_similarity(a, b),
            SimilarityMetric::Dice => dice_similarity(a, b),
        }
    }
}

impl std::fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SimilarityMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "levenshtein" => Ok(SimilarityMetric::Levenshtein),
            "dice" => Ok(SimilarityMetric::Dice),
            other => Err(format!("unknown similarity metric: {}", other)),
        }
    }
}

fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());

    if max_len == 0 {
        return 1.0;
    }

    1.0 - levenshtein_distance(&a, &b) as f64 / max_len as f64
}

/// Two-row dynamic programming edit distance.
fn levenshtein_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let insertion = curr[j] + 1;
            let deletion = prev[j + 1] + 1;
            curr[j + 1] = substitution.min(insertion).min(deletion);
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn dice_similarity(a: &str, b: &str) -> f64 {
    let a_bigrams = bigrams(a);
    let b_bigrams = bigrams(b);

    let a_total: usize = a_bigrams.values().sum();
    let b_total: usize = b_bigrams.values().sum();

    // Strings shorter than two characters have no bigrams; unequal ones score 0.
    if a_total == 0 || b_total == 0 {
        return 0.0;
    }

    let shared: usize = a_bigrams
        .iter()
        .map(|(gram, count)| b_bigrams.get(gram).map_or(0, |other| (*count).min(*other)))
        .sum();

    (2 * shared) as f64 / (a_total + b_total) as f64
}

fn bigrams(s: &str) -> HashMap<(char, char), usize> {
    let chars: Vec<char> = s.chars().collect();
    let mut counts = HashMap::new();

    for pair in chars.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance_known_values() {
        let d = |a: &str, b: &str| {
            levenshtein_distance(
                &a.chars().collect::<Vec<_>>(),
                &b.chars().collect::<Vec<_>>(),
            )
        };
        assert_eq!(d("kitten", "sitting"), 3);
        assert_eq!(d("", "abc"), 3);
        assert_eq!(d("flaw", "lawn"), 2);
        assert_eq!(d("same", "same"), 0);
    }

    #[test]
    fn test_levenshtein_similarity_bounds() {
        let metric = SimilarityMetric::Levenshtein;
        assert_eq!(metric.score("", ""), 1.0);
        assert_eq!(metric.score("", "abc"), 0.0);
        assert_eq!(metric.score("abc", "xyz"), 0.0);
        assert_eq!(metric.score("abc", "wxyz"), 0.0);
        assert!((metric.score("12mohm", "15mohm") - (5.0 / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_dice_similarity() {
        let metric = SimilarityMetric::Dice;
        assert_eq!(metric.score("night", "night"), 1.0);
        assert_eq!(metric.score("abc", "xyz"), 0.0);
        assert_eq!(metric.score("a", "b"), 0.0);
        assert_eq!(metric.score("", "ab"), 0.0);
        // ni ig gh ht vs na ac ch ht: one shared bigram
        assert!((metric.score("night", "nacht") - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_are_symmetric() {
        let pairs = [
            ("dec 4, 2024", "december 4, 2024"),
            ("rohs compliant", "rohs compliance"),
            ("", "x"),
            ("ab", "ba"),
        ];
        for metric in [SimilarityMetric::Levenshtein, SimilarityMetric::Dice] {
            for (a, b) in pairs {
                assert_eq!(metric.score(a, b), metric.score(b, a), "{} {:?}", metric, (a, b));
            }
        }
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("Dice".parse::<SimilarityMetric>(), Ok(SimilarityMetric::Dice));
        assert!("cosine".parse::<SimilarityMetric>().is_err());
    }
}
