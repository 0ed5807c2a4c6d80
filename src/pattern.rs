//! Extension match patterns.
//!
//! A [`MatchPattern`] scopes where a content script applies. The supported
//! grammar is a deliberate simplification of the formal WebExtensions
//! match-pattern grammar: `<all_urls>` matches everything, and any other
//! pattern is treated as a glob over the candidate string
//! `protocol//host/pathname` where `.` is literal and `*` matches any
//! sequence. This is the documented contract, not a best-effort subset of
//! the full grammar (no scheme-set matching, no implicit path semantics).
//!
//! Malformed patterns never match. One broken descriptor must not block the
//! other descriptors declared for the same page, so compilation failure is
//! reported once through `tracing` and the pattern degrades to a predicate
//! that is always `false`.
//!
//! # Example
//!
//! ```
//! use url::Url;
//! use viewbridge::MatchPattern;
//!
//! let pattern = MatchPattern::new("https://example.com/*");
//! let url = Url::parse("https://example.com/page").unwrap();
//! assert!(pattern.matches(&url));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;
use url::Url;

// ============================================================================
// MatchPattern
// ============================================================================

/// A compiled URL match pattern.
///
/// Immutable; compiled once at construction. Matching is a pure predicate
/// with no side effects, evaluated once per descriptor per page.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "String")]
pub struct MatchPattern {
    /// The pattern source text as declared in the manifest.
    raw: String,
    /// Compiled matcher.
    kind: PatternKind,
}

/// Compiled form of a pattern.
#[derive(Debug, Clone)]
enum PatternKind {
    /// `<all_urls>` — matches every URL.
    AllUrls,
    /// Anchored glob over `protocol//host/pathname`.
    Glob(Regex),
    /// Pattern failed to compile; never matches.
    Invalid,
}

impl MatchPattern {
    /// Pattern text that matches every URL.
    pub const ALL_URLS: &'static str = "<all_urls>";

    /// Compiles a pattern from its manifest text.
    ///
    /// Literal dots are escaped and `*` translates to "any sequence"; the
    /// resulting expression is anchored at both ends. A pattern that does
    /// not compile is kept as a never-matching predicate.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();

        if raw == Self::ALL_URLS {
            return Self {
                raw,
                kind: PatternKind::AllUrls,
            };
        }

        let translated = format!(
            "^{}$",
            raw.replace('.', r"\.").replace('*', ".*")
        );

        let kind = match Regex::new(&translated) {
            Ok(regex) => PatternKind::Glob(regex),
            Err(err) => {
                warn!(pattern = %raw, error = %err, "Match pattern failed to compile, will never match");
                PatternKind::Invalid
            }
        };

        Self { raw, kind }
    }

    /// Returns the pattern source text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if this pattern is `<all_urls>`.
    #[inline]
    #[must_use]
    pub fn is_all_urls(&self) -> bool {
        matches!(self.kind, PatternKind::AllUrls)
    }

    /// Returns `true` if the pattern failed to compile.
    #[inline]
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self.kind, PatternKind::Invalid)
    }

    /// Tests whether this pattern matches a page URL.
    ///
    /// The candidate tested is `protocol//host/pathname` of the page, with
    /// the port included when it is not the scheme default (matching what a
    /// renderer reports as `location.host`).
    #[must_use]
    pub fn matches(&self, page_url: &Url) -> bool {
        match &self.kind {
            PatternKind::AllUrls => true,
            PatternKind::Glob(regex) => regex.is_match(&candidate(page_url)),
            PatternKind::Invalid => false,
        }
    }

    /// Tests whether any pattern in a list matches (logical OR).
    ///
    /// An empty list matches nothing.
    #[must_use]
    pub fn any_matches(patterns: &[MatchPattern], page_url: &Url) -> bool {
        patterns.iter().any(|pattern| pattern.matches(page_url))
    }
}

impl fmt::Display for MatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for MatchPattern {
    fn from(pattern: String) -> Self {
        Self::new(pattern)
    }
}

impl From<&str> for MatchPattern {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

impl PartialEq for MatchPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for MatchPattern {}

// ============================================================================
// Candidate String
// ============================================================================

/// Builds the candidate string `protocol//host/pathname` for a page URL.
fn candidate(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("test url")
    }

    #[test]
    fn test_all_urls_matches_everything() {
        let pattern = MatchPattern::new("<all_urls>");
        assert!(pattern.is_all_urls());
        assert!(pattern.matches(&url("https://example.com/")));
        assert!(pattern.matches(&url("http://localhost:8080/a/b?q=1")));
        assert!(pattern.matches(&url("ftp://files.example.org/pub")));
    }

    #[test]
    fn test_glob_wildcard() {
        let pattern = MatchPattern::new("https://example.com/*");
        assert!(pattern.matches(&url("https://example.com/")));
        assert!(pattern.matches(&url("https://example.com/page")));
        assert!(pattern.matches(&url("https://example.com/a/b/c")));
        assert!(!pattern.matches(&url("https://other.com/page")));
    }

    #[test]
    fn test_dot_is_literal() {
        let pattern = MatchPattern::new("https://a.example.com/*");
        assert!(pattern.matches(&url("https://a.example.com/x")));
        // an unescaped dot would let "axexample" through
        assert!(!pattern.matches(&url("https://axexample.com/x")));
    }

    #[test]
    fn test_exact_literal_pattern() {
        // no `*` or `.` anywhere: only an exact candidate match passes
        let pattern = MatchPattern::new("https://host/path");
        assert!(pattern.matches(&url("https://host/path")));
        assert!(!pattern.matches(&url("https://host/path2")));
        assert!(!pattern.matches(&url("https://host/pat")));
    }

    #[test]
    fn test_query_string_ignored() {
        let pattern = MatchPattern::new("https://example.com/page");
        assert!(pattern.matches(&url("https://example.com/page?utm=1")));
    }

    #[test]
    fn test_non_default_port_in_candidate() {
        let pattern = MatchPattern::new("http://localhost:3000/*");
        assert!(pattern.matches(&url("http://localhost:3000/app")));
        assert!(!pattern.matches(&url("http://localhost:4000/app")));
    }

    #[test]
    fn test_default_port_omitted() {
        let pattern = MatchPattern::new("https://example.com/");
        assert!(pattern.matches(&url("https://example.com:443/")));
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        let pattern = MatchPattern::new("https://example.com/(unclosed");
        assert!(pattern.is_invalid());
        assert!(!pattern.matches(&url("https://example.com/(unclosed")));
    }

    #[test]
    fn test_any_matches_is_logical_or() {
        let patterns = vec![
            MatchPattern::new("https://a.com/*"),
            MatchPattern::new("https://b.com/*"),
        ];
        assert!(MatchPattern::any_matches(&patterns, &url("https://b.com/x")));
        assert!(!MatchPattern::any_matches(&patterns, &url("https://c.com/x")));
        assert!(!MatchPattern::any_matches(&[], &url("https://a.com/x")));
    }

    #[test]
    fn test_deserialize_from_string() {
        let pattern: MatchPattern = serde_json::from_str(r#""https://example.com/*""#)
            .expect("deserialize");
        assert_eq!(pattern.as_str(), "https://example.com/*");
        assert!(pattern.matches(&url("https://example.com/p")));
    }

    proptest! {
        #[test]
        fn prop_all_urls_matches_any_http_url(host in "[a-z]{1,10}", path in "[a-z0-9/]{0,20}") {
            let pattern = MatchPattern::new("<all_urls>");
            let page = Url::parse(&format!("https://{host}.com/{path}")).unwrap();
            prop_assert!(pattern.matches(&page));
        }

        #[test]
        fn prop_literal_pattern_matches_only_itself(
            host in "[a-z]{1,10}",
            path in "[a-z0-9]{1,10}",
            other in "[a-z0-9]{1,10}",
        ) {
            // hosts without dots keep the pattern wildcard-free
            let pattern = MatchPattern::new(format!("https://{host}/{path}"));
            let same = Url::parse(&format!("https://{host}/{path}")).unwrap();
            prop_assert!(pattern.matches(&same));

            if other != path {
                let different = Url::parse(&format!("https://{host}/{other}")).unwrap();
                prop_assert!(!pattern.matches(&different));
            }
        }
    }
}
