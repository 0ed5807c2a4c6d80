//! Error types for viewbridge.
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`].
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Worlds | [`Error::WorldsExhausted`], [`Error::WorldSetup`], [`Error::UnknownExtension`] |
//! | Host | [`Error::Host`], [`Error::ScriptExecution`] |
//! | Windows | [`Error::PopupWindow`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::{ExtensionId, IsolatedWorldId};

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // World Errors
    // ========================================================================
    /// The isolated world id space is exhausted.
    ///
    /// Returned when the allocator has decremented past the usable range.
    #[error("Isolated world ids exhausted below ceiling {ceiling}")]
    WorldsExhausted {
        /// The ceiling allocation started from.
        ceiling: IsolatedWorldId,
    },

    /// Isolated world configuration failed.
    ///
    /// Returned when the host rejects the world id or the global-object probe
    /// cannot be evaluated. No registry entry is recorded; the next page load
    /// retries setup from scratch.
    #[error("World setup failed for extension {extension_id}: {message}")]
    WorldSetup {
        /// Extension whose world could not be configured.
        extension_id: ExtensionId,
        /// Description of the failure.
        message: String,
    },

    /// No world was declared for the extension in this page.
    ///
    /// Returned when `ensure_context` is called for an extension the manifest
    /// enumeration never registered.
    #[error("No isolated world declared for extension {extension_id}")]
    UnknownExtension {
        /// The undeclared extension.
        extension_id: ExtensionId,
    },

    // ========================================================================
    // Host Errors
    // ========================================================================
    /// Generic host runtime failure.
    ///
    /// Embedders surface failures of host operations through this variant.
    #[error("Host error: {message}")]
    Host {
        /// Description of the host failure.
        message: String,
    },

    /// Script execution failed inside the target context.
    #[error("Script execution failed: {message}")]
    ScriptExecution {
        /// Error message from the executed script.
        message: String,
    },

    // ========================================================================
    // Window Errors
    // ========================================================================
    /// Popup window creation failed.
    #[error("Popup window failed: {message}")]
    PopupWindow {
        /// Description of the window failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a worlds-exhausted error.
    #[inline]
    pub fn worlds_exhausted(ceiling: IsolatedWorldId) -> Self {
        Self::WorldsExhausted { ceiling }
    }

    /// Creates a world setup error.
    #[inline]
    pub fn world_setup(extension_id: ExtensionId, message: impl Into<String>) -> Self {
        Self::WorldSetup {
            extension_id,
            message: message.into(),
        }
    }

    /// Creates an unknown extension error.
    #[inline]
    pub fn unknown_extension(extension_id: ExtensionId) -> Self {
        Self::UnknownExtension { extension_id }
    }

    /// Creates a host error.
    #[inline]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }

    /// Creates a script execution error.
    #[inline]
    pub fn script_execution(message: impl Into<String>) -> Self {
        Self::ScriptExecution {
            message: message.into(),
        }
    }

    /// Creates a popup window error.
    #[inline]
    pub fn popup_window(message: impl Into<String>) -> Self {
        Self::PopupWindow {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error is recoverable.
    ///
    /// World setup failures leave no registry entry, so the next applicable
    /// page load retries the whole setup.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::WorldSetup { .. } | Self::Host { .. })
    }

    /// Returns `true` if this is a world-management error.
    #[inline]
    #[must_use]
    pub fn is_world_error(&self) -> bool {
        matches!(
            self,
            Self::WorldsExhausted { .. } | Self::WorldSetup { .. } | Self::UnknownExtension { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::world_setup(ExtensionId::new("abc"), "host rejected id");
        assert_eq!(
            err.to_string(),
            "World setup failed for extension abc: host rejected id"
        );
    }

    #[test]
    fn test_worlds_exhausted_display() {
        let err = Error::worlds_exhausted(IsolatedWorldId::CEILING);
        assert_eq!(
            err.to_string(),
            "Isolated world ids exhausted below ceiling 999"
        );
    }

    #[test]
    fn test_is_recoverable() {
        let setup = Error::world_setup(ExtensionId::new("abc"), "probe failed");
        let exhausted = Error::worlds_exhausted(IsolatedWorldId::CEILING);

        assert!(setup.is_recoverable());
        assert!(!exhausted.is_recoverable());
    }

    #[test]
    fn test_is_world_error() {
        let unknown = Error::unknown_extension(ExtensionId::new("abc"));
        let host = Error::host("boom");

        assert!(unknown.is_world_error());
        assert!(!host.is_world_error());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
