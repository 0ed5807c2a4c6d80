//! viewbridge - Content-script policy and view event relay for browser shells.
//!
//! This library is the policy layer of an embedded browser shell. It decides
//! *what runs where and when* for extension content scripts and relays
//! content view lifecycle events to the owning window, while every effectful
//! operation is delegated to the embedding GUI runtime through traits.
//!
//! # Architecture
//!
//! Four cooperating pieces, all driven by externally delivered events on a
//! single event-loop thread:
//!
//! - **Pattern matcher** ([`MatchPattern`]) — glob-style URL patterns scoping
//!   where content scripts apply.
//! - **Script scheduler** ([`ScriptScheduler`]) — binds js/css payloads to
//!   page load phases and fires them at most once per phase transition.
//! - **Isolated world registry** ([`WorldRegistry`]) — allocates one isolated
//!   execution context per extension per page and performs idempotent,
//!   all-or-nothing context setup.
//! - **Event relay** ([`EventRelay`]) — forwards `(event, view_id, args…)`
//!   tuples from a content view to its owning window.
//!
//! # Quick Start
//!
//! ```no_run
//! use url::Url;
//! use viewbridge::{
//!     ApiFactory, ExtensionPreferences, GuestInstanceId, LoadPhase, PageSession,
//!     Result, ScriptHost, SessionConfig,
//! };
//!
//! fn inject(
//!     host: &mut dyn ScriptHost,
//!     api: &dyn ApiFactory,
//!     preferences: &[ExtensionPreferences],
//! ) -> Result<()> {
//!     let page_url = Url::parse("https://example.com/page").unwrap();
//!     let mut session = PageSession::new(GuestInstanceId::NONE, SessionConfig::default());
//!
//!     session.load_page(preferences, &page_url, api, host)?;
//!
//!     // fired as the host reports the page's load phases
//!     session.deliver(LoadPhase::DocumentStart, host);
//!     session.deliver(LoadPhase::DocumentEnd, host);
//!     session.deliver(LoadPhase::DomReady, host);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pattern`] | Match-pattern compilation and evaluation |
//! | [`manifest`] | Manifest-derived content script descriptors |
//! | [`inject`] | Scheduling, isolated worlds, page sessions |
//! | [`relay`] | View lifecycle event relay |
//! | [`host`] | Host runtime collaborator traits |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Host runtime collaborator traits.
///
/// The seams between this policy layer and the embedding GUI runtime.
pub mod host;

/// Type-safe identifiers for shell entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Content script injection: scheduling, isolated worlds, page sessions.
pub mod inject;

/// Manifest-derived content script descriptors.
pub mod manifest;

/// Extension match patterns.
pub mod pattern;

/// View lifecycle event relay.
pub mod relay;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Host traits
pub use host::{ApiFactory, RuntimeBridge, ScriptHost, ScriptSource, WindowHost};

// Identifier types
pub use identifiers::{ExtensionId, GuestInstanceId, IsolatedWorldId, ViewId, WindowId};

// Injection types
pub use inject::{
    BackgroundMessage, LoadPhase, PageSession, ScriptScheduler, SessionConfig, SharedSession,
    WorldAllocator, WorldRegistry, WorldSetup,
};

// Manifest types
pub use manifest::{ContentScript, ExtensionPreferences, RunAt, ScriptPayload, StylePayload};

// Pattern types
pub use pattern::MatchPattern;

// Relay types
pub use relay::{Delivery, EventRelay, NEW_WINDOW_SENTINEL, RelayMessage, ViewEvent};
