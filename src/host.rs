//! Host runtime collaborator traits.
//!
//! viewbridge is a policy layer: every effectful operation (running a script
//! in an isolated world, inserting CSS, opening a popup window, talking to
//! the privileged process) is delegated to the embedding GUI runtime through
//! the traits in this module. The crate never assumes which runtime sits on
//! the other side.
//!
//! | Trait | Responsibility |
//! |-------|----------------|
//! | [`ScriptHost`] | Isolated world configuration and script/CSS execution |
//! | [`WindowHost`] | Popup creation and view-directed messages |
//! | [`RuntimeBridge`] | Forwarding runtime messages to the privileged process |
//! | [`ApiFactory`] | Producing the extension API surface exposed into a world |

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::Result;
use crate::identifiers::{ExtensionId, GuestInstanceId, IsolatedWorldId, ViewId};

// ============================================================================
// ScriptSource
// ============================================================================

/// A script to execute, with its diagnostic origin.
///
/// The `url` shows up in stack traces and devtools as the script's origin;
/// injected payloads carry a rewritten `scheme://extensionId/path` origin so
/// failures point at the owning extension rather than the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSource {
    /// Script source text.
    pub code: String,
    /// Diagnostic origin URL, if any.
    pub url: Option<String>,
}

impl ScriptSource {
    /// Creates a script source with a diagnostic origin.
    #[inline]
    #[must_use]
    pub fn new(code: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            url: Some(url.into()),
        }
    }

    /// Creates a script source with no origin (internal snippets).
    #[inline]
    #[must_use]
    pub fn anonymous(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            url: None,
        }
    }
}

// ============================================================================
// ScriptHost
// ============================================================================

/// Host operations on a page's script execution contexts.
///
/// Implementations wrap the embedding runtime's frame API. All methods are
/// invoked from the single event-loop thread and must not block.
pub trait ScriptHost {
    /// Assigns a human-readable name and security origin to a world id.
    fn set_isolated_world_info(
        &mut self,
        world: IsolatedWorldId,
        name: &str,
        security_origin: &str,
    ) -> Result<()>;

    /// Executes a script inside an isolated world, returning its value.
    fn execute_in_isolated_world(
        &mut self,
        world: IsolatedWorldId,
        source: &ScriptSource,
    ) -> Result<Value>;

    /// Executes a script in the page's own (non-isolated) context.
    fn execute_in_page(&mut self, source: &ScriptSource) -> Result<Value>;

    /// Inserts a stylesheet into the page's render tree.
    ///
    /// Styles apply to the page itself; no isolation is involved.
    fn insert_css(&mut self, css: &str) -> Result<()>;

    /// Lifts the host's concurrent-listener ceiling.
    ///
    /// Called once before scheduling, since each descriptor/phase pair may
    /// register its own one-shot listener and some hosts warn past a default
    /// limit. Hosts without such a limit keep the default no-op.
    fn raise_listener_limit(&mut self) {}
}

// ============================================================================
// WindowHost
// ============================================================================

/// Host operations on top-level windows.
pub trait WindowHost {
    /// Opens a new top-level window of the given size.
    ///
    /// Returns the name of the completion channel the new window will signal
    /// once it is ready. The channel name carries a 4-byte routing prefix;
    /// the remainder addresses the originating view.
    fn open_window(&mut self, width: u32, height: u32) -> Result<String>;

    /// Sends a named payload to a content view.
    fn send_to_view(&mut self, view: ViewId, channel: &str, payload: Value);
}

// ============================================================================
// RuntimeBridge
// ============================================================================

/// Outbound channel to the privileged process.
///
/// Used to forward "deliver message to runtime" notifications; delivery is
/// fire-and-forget with no acknowledgment.
pub trait RuntimeBridge {
    /// Emits a runtime message toward the privileged process.
    fn emit_runtime_message(&mut self, message: Value);
}

// ============================================================================
// ApiFactory
// ============================================================================

/// Produces the API surface an extension sees inside its isolated world.
///
/// The returned object is published into the world's global under `chrome`
/// and the configured native alias. Construction of the surface is the
/// embedder's concern; this crate only places it.
pub trait ApiFactory {
    /// Builds the API surface for one extension in one guest instance.
    fn api_surface(&self, extension_id: &ExtensionId, guest: GuestInstanceId) -> Value;
}

// ============================================================================
// Tests
// ============================================================================
