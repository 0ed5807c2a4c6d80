//! Type-safe identifiers for shell entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time:
//! a [`ViewId`] cannot be passed where a [`WindowId`] is expected, and an
//! [`IsolatedWorldId`] is never confused with either.
//!
//! | Type | Underlying | Identifies |
//! |------|-----------|------------|
//! | [`ExtensionId`] | `String` | An installed extension |
//! | [`ViewId`] | `u32` | A per-tab content view |
//! | [`WindowId`] | `u32` | A top-level shell window |
//! | [`GuestInstanceId`] | `i32` | The guest renderer instance hosting a page |
//! | [`IsolatedWorldId`] | `u32` | An isolated script execution context |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// ExtensionId
// ============================================================================

/// Identifier of an installed extension.
///
/// Opaque string assigned by the extension loader; used as the key of the
/// isolated world map and as the host component of rewritten script origins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionId(String);

impl ExtensionId {
    /// Creates an extension ID from any string-like value.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExtensionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ExtensionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// ViewId
// ============================================================================

/// Identifier of a per-tab content view.
///
/// Stamped onto every relayed lifecycle event so the owning window can tell
/// which view produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub u32);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ViewId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

// ============================================================================
// WindowId
// ============================================================================

/// Identifier of a top-level shell window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WindowId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

// ============================================================================
// GuestInstanceId
// ============================================================================

/// Identifier of the guest renderer instance hosting a page.
///
/// `-1` means the page is not hosted in a guest instance (top-level content);
/// the host passes the real id on the renderer command line otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestInstanceId(pub i32);

impl GuestInstanceId {
    /// Sentinel for pages that are not guest-hosted.
    pub const NONE: Self = Self(-1);

    /// Returns `true` if this page runs inside a guest instance.
    #[inline]
    #[must_use]
    pub fn is_guest(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for GuestInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for GuestInstanceId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

// ============================================================================
// IsolatedWorldId
// ============================================================================

/// Identifier of an isolated script execution context within a page.
///
/// Allocated per extension by decrementing from [`IsolatedWorldId::CEILING`];
/// stable for the extension's presence in the page and never shared between
/// two extensions in the same page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IsolatedWorldId(pub u32);

impl IsolatedWorldId {
    /// Reserved ceiling the allocator decrements from.
    ///
    /// The ceiling itself is never handed out; the first extension in a page
    /// receives `CEILING - 1`.
    pub const CEILING: Self = Self(999);
}

impl fmt::Display for IsolatedWorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for IsolatedWorldId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_id_display() {
        let id = ExtensionId::new("abcdef123456");
        assert_eq!(id.to_string(), "abcdef123456");
        assert_eq!(id.as_str(), "abcdef123456");
    }

    #[test]
    fn test_extension_id_from_str() {
        let id: ExtensionId = "ext-1".into();
        assert_eq!(id, ExtensionId::new("ext-1"));
    }

    #[test]
    fn test_view_id_roundtrip() {
        let id = ViewId(7);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "7");
        let back: ViewId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn test_guest_instance_sentinel() {
        assert!(!GuestInstanceId::NONE.is_guest());
        assert!(GuestInstanceId(0).is_guest());
        assert!(GuestInstanceId(12).is_guest());
    }

    #[test]
    fn test_world_id_ceiling() {
        assert_eq!(IsolatedWorldId::CEILING, IsolatedWorldId(999));
        assert!(IsolatedWorldId(998) < IsolatedWorldId::CEILING);
    }
}
