//! @ai:module:intent Deterministic string canonicalization before comparison
//! @ai:module:layer domain
//! @ai:module:public_api NormalizeOptions, DEFAULT_PUNCTUATION
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};

/// Punctuation removed by default. Separators such as `.`, `,` and `'` are
/// kept because they carry meaning in dates, units and titles.
pub const DEFAULT_PUNCTUATION: &str = ";/#!$%^&*:{}=-_`~()";

/// @ai:intent Normalization rules applied before comparing strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    #[serde(default = "default_strip_punctuation")]
    pub strip_punctuation: bool,
    #[serde(default = "default_punctuation")]
    pub punctuation: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            strip_punctuation: default_strip_punctuation(),
            punctuation: default_punctuation(),
        }
    }
}

fn default_strip_punctuation() -> bool {
    true
}

fn default_punctuation() -> String {
    DEFAULT_PUNCTUATION.to_string()
}

impl NormalizeOptions {
    /// @ai:intent Options that only fold case and whitespace
    /// @ai:effects pure
    pub fn whitespace_only() -> Self {
        Self {
            strip_punctuation: false,
            punctuation: String::new(),
        }
    }

    /// @ai:intent Canonicalize a string: lower-case, drop punctuation, collapse and trim whitespace
    /// @ai:post apply(apply(s)) == apply(s)
    /// @ai:effects pure
    pub fn apply(&self, input: &str) -> String {
        let lowered = input.to_lowercase();

        let stripped: String = if self.strip_punctuation && !self.punctuation.is_empty() {
            lowered
                .chars()
                .filter(|c| !self.punctuation.contains(*c))
                .collect()
        } else {
            lowered
        };

        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_case() {
        let opts = NormalizeOptions::default();
        assert_eq!(opts.apply("  RoHS \t Compliant\n"), "rohs compliant");
    }

    #[test]
    fn test_strips_default_punctuation() {
        let opts = NormalizeOptions::default();
        assert_eq!(opts.apply("EAR-99 (ECCN)"), "ear99 eccn");
        assert_eq!(opts.apply("a - b"), "a b");
    }

    #[test]
    fn test_keeps_dates_readable() {
        let opts = NormalizeOptions::default();
        assert_eq!(opts.apply("Dec 4, 2024"), "dec 4, 2024");
    }

    #[test]
    fn test_whitespace_only_keeps_punctuation() {
        let opts = NormalizeOptions::whitespace_only();
        assert_eq!(opts.apply(" A-B "), "a-b");
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(NormalizeOptions::default().apply(""), "");
        assert_eq!(NormalizeOptions::default().apply("  -- "), "");
    }

    #[test]
    fn test_idempotent() {
        let opts = NormalizeOptions::default();
        for s in [
            "",
            "  Hello,   World!  ",
            "UAW Region 9A Endorses Brad Lander for Mayor",
            "12 mOhm :: (approx)",
            "Ünïcödé  ΣΊΣΥΦΟΣ",
            "tab\tand\nnewline",
        ] {
            let once = opts.apply(s);
            assert_eq!(opts.apply(&once), once, "not idempotent for {:?}", s);
        }
    }
}
