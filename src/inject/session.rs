//! Per-page injection session.
//!
//! A [`PageSession`] owns all injection state for one page: the world
//! allocator, the world registry and the scheduler. It replaces the ambient
//! per-process globals of older shells with explicit state constructed at
//! session start and dropped at session end, so multiple coexisting pages
//! never share hidden state.
//!
//! # Flow
//!
//! 1. [`PageSession::load_page`] consumes the manifest-derived preferences
//!    in enumeration order, allocates one world per extension that declares
//!    content scripts, and queues payloads of the descriptors whose patterns
//!    match the page URL.
//! 2. The embedder calls [`PageSession::deliver`] as the host reports load
//!    phases; payloads fire in first-registered, first-fired order.
//! 3. [`PageSession::handle_background`] reacts to inbound background
//!    channel notifications (runtime messages, extension removal).

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Result;
use crate::host::{ApiFactory, RuntimeBridge, ScriptHost};
use crate::identifiers::{ExtensionId, GuestInstanceId};
use crate::inject::scheduler::{LoadPhase, ScriptScheduler};
use crate::inject::worlds::{WorldAllocator, WorldRegistry, WorldSetup};
use crate::manifest::ExtensionPreferences;

// ============================================================================
// Constants
// ============================================================================

/// Removal result value that actually drives registry cleanup.
const REMOVAL_OK: &str = "OK";

// ============================================================================
// SessionConfig
// ============================================================================

/// Configuration of a page session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Second global name the extension API is published under, next to
    /// `chrome`.
    pub native_alias: String,

    /// Make the DOM-ready fallback one-shot instead of the faithful
    /// re-fire-per-signal behavior.
    pub dedupe_dom_ready: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            native_alias: "browser".to_string(),
            dedupe_dom_ready: false,
        }
    }
}

// ============================================================================
// BackgroundMessage
// ============================================================================

/// Inbound notification on the background channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BackgroundMessage {
    /// Deliver a message to the extension runtime in the privileged process.
    RuntimeMessage {
        /// Opaque message payload, forwarded verbatim.
        payload: Value,
    },

    /// An extension was removed, with the removal result.
    ExtensionRemoved {
        /// The removed extension.
        #[serde(alias = "extensionId")]
        extension_id: ExtensionId,
        /// Removal result; only `"OK"` drives cleanup.
        result: String,
    },
}

// ============================================================================
// PageSession
// ============================================================================

/// All injection state for one page.
#[derive(Debug)]
pub struct PageSession {
    guest: GuestInstanceId,
    config: SessionConfig,
    allocator: WorldAllocator,
    worlds: WorldRegistry,
    scheduler: ScriptScheduler,
}

impl PageSession {
    /// Creates a session for a page hosted in `guest`.
    #[must_use]
    pub fn new(guest: GuestInstanceId, config: SessionConfig) -> Self {
        let worlds = WorldRegistry::new(config.native_alias.clone());
        let scheduler = ScriptScheduler::new(config.dedupe_dom_ready);
        Self {
            guest,
            config,
            allocator: WorldAllocator::new(),
            worlds,
            scheduler,
        }
    }

    /// Consumes manifest preferences and schedules eligible descriptors.
    ///
    /// Extensions are processed in enumeration order; each extension that
    /// declares content scripts gets a world id whether or not any of its
    /// descriptors matches this particular page. Descriptors are eligible
    /// when at least one of their patterns matches `page_url`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::WorldsExhausted`] if more extensions declare
    /// content scripts than the world id space can hold.
    pub fn load_page(
        &mut self,
        preferences: &[ExtensionPreferences],
        page_url: &Url,
        api: &dyn ApiFactory,
        host: &mut dyn ScriptHost,
    ) -> Result<()> {
        if preferences.iter().any(ExtensionPreferences::has_content_scripts) {
            // each descriptor/phase pair may register its own one-shot
            // listener on the host side
            host.raise_listener_limit();
        }

        let security_origin = page_url.origin().ascii_serialization();

        for preference in preferences {
            let Some(scripts) = preference.content_scripts.as_deref() else {
                continue;
            };
            if scripts.is_empty() {
                continue;
            }

            let extension_id = &preference.extension_id;
            let world = self.allocator.allocate()?;
            self.worlds.declare(
                extension_id.clone(),
                WorldSetup {
                    world,
                    name: preference.name.clone(),
                    security_origin: security_origin.clone(),
                    api: api.api_surface(extension_id, self.guest),
                },
            );

            for script in scripts {
                if script.is_eligible(page_url) {
                    self.scheduler.schedule(script, extension_id);
                } else {
                    trace!(
                        extension = %extension_id,
                        page = %page_url,
                        "Descriptor not eligible for page"
                    );
                }
            }
        }

        Ok(())
    }

    /// Fires the payloads bound to a delivered load phase.
    pub fn deliver(&mut self, phase: LoadPhase, host: &mut dyn ScriptHost) {
        self.scheduler.deliver(phase, host, &mut self.worlds);
    }

    /// Handles an inbound background channel notification.
    ///
    /// Runtime messages are forwarded verbatim to the privileged process;
    /// an extension removal with result `"OK"` drops the extension's world
    /// mapping so its next injection re-runs the one-time setup.
    pub fn handle_background(&mut self, message: BackgroundMessage, runtime: &mut dyn RuntimeBridge) {
        match message {
            BackgroundMessage::RuntimeMessage { payload } => {
                runtime.emit_runtime_message(payload);
            }
            BackgroundMessage::ExtensionRemoved {
                extension_id,
                result,
            } => {
                if result == REMOVAL_OK {
                    debug!(extension = %extension_id, "Extension removed, dropping world mapping");
                    self.worlds.remove(&extension_id);
                } else {
                    trace!(extension = %extension_id, %result, "Ignoring failed removal");
                }
            }
        }
    }

    /// Returns the guest instance hosting this page.
    #[inline]
    #[must_use]
    pub fn guest(&self) -> GuestInstanceId {
        self.guest
    }

    /// Returns the session configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the world registry for inspection.
    #[inline]
    #[must_use]
    pub fn worlds(&self) -> &WorldRegistry {
        &self.worlds
    }

    /// Returns the number of payloads queued for a phase.
    #[inline]
    #[must_use]
    pub fn queued(&self, phase: LoadPhase) -> usize {
        self.scheduler.queued(phase)
    }
}

// ============================================================================
// SharedSession
// ============================================================================

/// A page session shareable across host event callbacks.
///
/// All callbacks run on the single event-loop thread, so the lock is
/// uncontended; it exists to hand one session to several callback
/// registrations without ambient globals.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<PageSession>>,
}

impl SharedSession {
    /// Wraps a session for shared use.
    #[must_use]
    pub fn new(session: PageSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Runs a closure against the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut PageSession) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

// ============================================================================
// Tests
// ============================================================================
