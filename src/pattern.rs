//! URL pattern matching

use std::fmt;

use regex::Regex;

use crate::record::Record;
use crate::{NetCacheError, Result};

/// Regular expression tested against a record's full URL
///
/// Matching is unanchored, so `x/1` matches `https://x/1?a=b`. Existence
/// checks and waits share this one predicate.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    regex: Regex,
}

impl UrlPattern {
    /// Compile a pattern
    ///
    /// # Errors
    ///
    /// Returns error if the expression is not a valid regex
    pub fn new(source: &str) -> Result<Self> {
        Regex::new(source)
            .map(|regex| Self { regex })
            .map_err(|e| NetCacheError::InvalidPattern(e.to_string()))
    }

    /// Whether the record's URL matches
    #[must_use]
    pub fn matches<P>(&self, record: &Record<P>) -> bool {
        self.regex.is_match(record.url())
    }

    /// Whether an arbitrary URL matches
    #[must_use]
    pub fn matches_url(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    /// Source text of the pattern
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl From<Regex> for UrlPattern {
    fn from(regex: Regex) -> Self {
        Self { regex }
    }
}

impl std::str::FromStr for UrlPattern {
    type Err = NetCacheError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.regex.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Candidate, RequestPayload};

    #[test]
    fn test_unanchored_match() {
        let pattern = UrlPattern::new(r"x/1").unwrap();
        let record = Candidate::new("https://x/1?q=2", RequestPayload::default()).into_record(0);

        assert!(pattern.matches(&record));
        assert!(!pattern.matches_url("https://x/2"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = UrlPattern::new("(unclosed").unwrap_err();
        assert!(matches!(err, NetCacheError::InvalidPattern(_)));
    }

    #[test]
    fn test_display_round_trips_source() {
        let pattern: UrlPattern = r"api/v\d+".parse().unwrap();
        assert_eq!(pattern.to_string(), r"api/v\d+");
        assert_eq!(pattern.as_str(), r"api/v\d+");
    }
}
