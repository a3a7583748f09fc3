//! Fuzzy filtering for table search.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Case-insensitive fuzzy matcher.
pub struct Matcher {
    inner: SkimMatcherV2,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            inner: SkimMatcherV2::default().ignore_case(),
        }
    }

    /// Returns `true` if `pattern` fuzzy-matches `text`.
    ///
    /// Characters of the pattern must appear in order but need not be
    /// adjacent, so `"blpn"` matches `"Blue pen"`. An empty pattern matches
    /// everything.
    pub fn matches(&self, text: &str, pattern: &str) -> bool {
        pattern.is_empty() || self.inner.fuzzy_match(text, pattern).is_some()
    }

    /// Check if any of the provided texts match the pattern.
    pub fn matches_any<'a>(&self, texts: impl IntoIterator<Item = &'a str>, pattern: &str) -> bool {
        texts.into_iter().any(|text| self.matches(text, pattern))
    }
}
