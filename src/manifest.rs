//! Manifest-derived content script descriptors.
//!
//! A privileged process hands the renderer one [`ExtensionPreferences`]
//! record per installed extension at page-load time. Records optionally
//! carry the extension's declared [`ContentScript`] list; everything here is
//! read-only for the lifetime of a page.
//!
//! # Manifest shape
//!
//! ```json
//! {
//!   "extension_id": "abcdef",
//!   "name": "Example Extension",
//!   "content_scripts": [{
//!     "matches": ["https://example.com/*"],
//!     "run_at": "document_end",
//!     "js": [{ "url": "a.js", "code": "1+1" }]
//!   }]
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use url::Url;

use crate::identifiers::ExtensionId;
use crate::pattern::MatchPattern;

// ============================================================================
// RunAt
// ============================================================================

/// Declared trigger point of a content script.
///
/// Unknown or missing values fall back to [`RunAt::DocumentIdle`], which
/// schedules on the DOM-ready phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAt {
    /// Fire on the start-of-document phase.
    DocumentStart,
    /// Fire on the end-of-document phase.
    DocumentEnd,
    /// Fire on DOM-ready (the default and the catch-all).
    #[default]
    #[serde(other)]
    DocumentIdle,
}

// ============================================================================
// Payloads
// ============================================================================

/// A script payload: source text plus a logical origin URL for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptPayload {
    /// Logical origin of the script, reported in stack traces.
    pub url: String,
    /// Script source text.
    pub code: String,
}

/// A stylesheet payload: CSS text plus a logical origin URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StylePayload {
    /// Logical origin of the stylesheet.
    pub url: String,
    /// Stylesheet text.
    pub code: String,
}

// ============================================================================
// ContentScript
// ============================================================================

/// One content script declaration from an extension manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentScript {
    /// URL patterns scoping where this script applies.
    #[serde(default)]
    pub matches: Vec<MatchPattern>,

    /// Trigger point within the page load.
    #[serde(default, alias = "runAt")]
    pub run_at: RunAt,

    /// Script payloads to execute in the extension's isolated world.
    #[serde(default)]
    pub js: Vec<ScriptPayload>,

    /// Stylesheet payloads to insert into the page's render tree.
    #[serde(default)]
    pub css: Vec<StylePayload>,
}

impl ContentScript {
    /// Returns `true` if at least one declared pattern matches the page.
    ///
    /// Eligibility is a logical OR across the pattern list.
    #[must_use]
    pub fn is_eligible(&self, page_url: &Url) -> bool {
        MatchPattern::any_matches(&self.matches, page_url)
    }

    /// Returns `true` if this declaration carries no payloads at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.js.is_empty() && self.css.is_empty()
    }
}

// ============================================================================
// ExtensionPreferences
// ============================================================================

/// Per-extension record delivered by the privileged process at page load.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionPreferences {
    /// Identifier of the extension.
    #[serde(alias = "extensionId")]
    pub extension_id: ExtensionId,

    /// Human-readable extension name; doubles as the isolated world name.
    pub name: String,

    /// Declared content scripts, if any.
    #[serde(default)]
    pub content_scripts: Option<Vec<ContentScript>>,
}

impl ExtensionPreferences {
    /// Returns `true` if this extension declares any content scripts.
    #[inline]
    #[must_use]
    pub fn has_content_scripts(&self) -> bool {
        self.content_scripts
            .as_ref()
            .is_some_and(|scripts| !scripts.is_empty())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("test url")
    }

    #[test]
    fn test_run_at_deserialization() {
        assert_eq!(
            serde_json::from_str::<RunAt>(r#""document_start""#).unwrap(),
            RunAt::DocumentStart
        );
        assert_eq!(
            serde_json::from_str::<RunAt>(r#""document_end""#).unwrap(),
            RunAt::DocumentEnd
        );
        assert_eq!(
            serde_json::from_str::<RunAt>(r#""document_idle""#).unwrap(),
            RunAt::DocumentIdle
        );
    }

    #[test]
    fn test_run_at_unknown_falls_back_to_idle() {
        let run_at: RunAt = serde_json::from_str(r#""document_weird""#).unwrap();
        assert_eq!(run_at, RunAt::DocumentIdle);
    }

    #[test]
    fn test_content_script_deserialization() {
        let json = r#"{
            "matches": ["https://example.com/*"],
            "run_at": "document_end",
            "js": [{ "url": "a.js", "code": "1+1" }]
        }"#;

        let script: ContentScript = serde_json::from_str(json).expect("deserialize");
        assert_eq!(script.run_at, RunAt::DocumentEnd);
        assert_eq!(script.js.len(), 1);
        assert!(script.css.is_empty());
        assert!(script.is_eligible(&url("https://example.com/page")));
        assert!(!script.is_eligible(&url("https://other.com/page")));
    }

    #[test]
    fn test_content_script_run_at_camel_case_alias() {
        let json = r#"{ "matches": ["<all_urls>"], "runAt": "document_start" }"#;
        let script: ContentScript = serde_json::from_str(json).expect("deserialize");
        assert_eq!(script.run_at, RunAt::DocumentStart);
        assert!(script.is_empty());
    }

    #[test]
    fn test_content_script_defaults() {
        let script: ContentScript = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(script.run_at, RunAt::DocumentIdle);
        assert!(script.matches.is_empty());
        assert!(script.is_empty());
        // no patterns means never eligible
        assert!(!script.is_eligible(&url("https://example.com/")));
    }

    #[test]
    fn test_preferences_without_content_scripts() {
        let json = r#"{ "extension_id": "abc", "name": "Example" }"#;
        let prefs: ExtensionPreferences = serde_json::from_str(json).expect("deserialize");
        assert!(!prefs.has_content_scripts());
    }

    #[test]
    fn test_preferences_with_content_scripts() {
        let json = r#"{
            "extensionId": "abc",
            "name": "Example",
            "content_scripts": [{ "matches": ["<all_urls>"] }]
        }"#;
        let prefs: ExtensionPreferences = serde_json::from_str(json).expect("deserialize");
        assert_eq!(prefs.extension_id, ExtensionId::new("abc"));
        assert!(prefs.has_content_scripts());
    }
}
