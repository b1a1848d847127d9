//! @ai:module:intent Fuzzy comparison of extracted text against expected values
//! @ai:module:layer domain
//! @ai:module:public_api StringMatcher, ComparisonResult, NormalizeOptions, SimilarityMetric, normalize, compare
//! @ai:module:stateless true

pub mod normalize;
pub mod similarity;

pub use normalize::{NormalizeOptions, DEFAULT_PUNCTUATION};
pub use similarity::SimilarityMetric;

use crate::error::MatchError;
use serde::{Deserialize, Serialize};

/// Threshold used when a caller does not pick one.
pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// @ai:intent Outcome of comparing one actual/expected pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub similarity: f64,
    pub meets_threshold: bool,
}

/// @ai:intent Normalizes and fuzzily compares strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringMatcher {
    options: NormalizeOptions,
    metric: SimilarityMetric,
}

impl StringMatcher {
    /// @ai:intent Create a matcher with default normalization and Levenshtein scoring
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Create a matcher with explicit normalization rules and metric
    /// @ai:effects pure
    pub fn with_options(options: NormalizeOptions, metric: SimilarityMetric) -> Self {
        Self { options, metric }
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// @ai:intent Canonicalize a string
    /// @ai:effects pure
    pub fn normalize(&self, input: &str) -> String {
        self.options.apply(input)
    }

    /// @ai:intent Exact equality after normalization
    /// @ai:effects pure
    pub fn matches(&self, actual: &str, expected: &str) -> bool {
        self.normalize(actual) == self.normalize(expected)
    }

    /// @ai:intent Score two strings and test the score against a threshold
    /// @ai:pre threshold in [0, 1]
    /// @ai:post similarity == 1.0 when normalize(a) == normalize(b)
    /// @ai:effects pure
    pub fn compare(
        &self,
        actual: &str,
        expected: &str,
        threshold: f64,
    ) -> Result<ComparisonResult, MatchError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MatchError::InvalidThreshold(threshold));
        }

        let similarity = self
            .metric
            .score(&self.normalize(actual), &self.normalize(expected));

        Ok(ComparisonResult {
            similarity,
            meets_threshold: similarity >= threshold,
        })
    }
}

/// @ai:intent Normalize with the default rules
/// @ai:effects pure
pub fn normalize(input: &str) -> String {
    NormalizeOptions::default().apply(input)
}

/// @ai:intent Compare with the default matcher
/// @ai:effects pure
pub fn compare(actual: &str, expected: &str, threshold: f64) -> Result<ComparisonResult, MatchError> {
    StringMatcher::new().compare(actual, expected, threshold)
}
