//! Isolated world allocation and registry.
//!
//! Each extension injecting into a page gets its own isolated execution
//! context. Ids are allocated by decrementing from
//! [`IsolatedWorldId::CEILING`] as extensions are encountered in manifest
//! enumeration order; an id, once assigned, is stable for that extension's
//! presence in the page and never shared with another extension.
//!
//! [`WorldRegistry::ensure_context`] is the idempotent setup operation: the
//! first call for an extension names the world, probes its global object and
//! publishes the extension API surface under `chrome` and the configured
//! native alias; later calls are no-ops. Setup is all-or-nothing — a failed
//! host call records no mapping, so the next attempt is not skipped as
//! "already done".

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::host::{ScriptHost, ScriptSource};
use crate::identifiers::{ExtensionId, IsolatedWorldId};

// ============================================================================
// WorldAllocator
// ============================================================================

/// Allocates isolated world ids by decrement from a reserved ceiling.
///
/// The ceiling itself is never handed out; the first allocation yields
/// `CEILING - 1`.
#[derive(Debug)]
pub struct WorldAllocator {
    next: u32,
}

impl WorldAllocator {
    /// Creates an allocator starting at [`IsolatedWorldId::CEILING`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: IsolatedWorldId::CEILING.0,
        }
    }

    /// Allocates the next world id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorldsExhausted`] once the id space below the
    /// ceiling is used up.
    pub fn allocate(&mut self) -> Result<IsolatedWorldId> {
        self.next = self
            .next
            .checked_sub(1)
            .ok_or_else(|| Error::worlds_exhausted(IsolatedWorldId::CEILING))?;
        Ok(IsolatedWorldId(self.next))
    }
}

impl Default for WorldAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// WorldSetup
// ============================================================================

/// Declared configuration of one extension's isolated world.
///
/// Recorded at manifest enumeration time; consumed lazily by
/// [`WorldRegistry::ensure_context`] on the first injection.
#[derive(Debug, Clone)]
pub struct WorldSetup {
    /// The allocated world id.
    pub world: IsolatedWorldId,
    /// Human-readable world name (the extension's manifest name).
    pub name: String,
    /// Security origin assigned to the world (the page origin).
    pub security_origin: String,
    /// API surface published into the world's global object.
    pub api: Value,
}

// ============================================================================
// WorldRegistry
// ============================================================================

/// Per-page map from extension to its configured isolated world.
///
/// All mutation happens on the single event-loop thread; idempotence of
/// [`ensure_context`](Self::ensure_context) holds under re-entrant calls
/// from within an event callback because the mapping is recorded before the
/// method returns and checked before any host call.
#[derive(Debug)]
pub struct WorldRegistry {
    /// Worlds declared at enumeration time, setup not necessarily run yet.
    declared: FxHashMap<ExtensionId, WorldSetup>,
    /// The isolated world map proper: extensions with completed setup.
    active: FxHashMap<ExtensionId, IsolatedWorldId>,
    /// Second global name the API surface is published under.
    native_alias: String,
}

impl WorldRegistry {
    /// Creates an empty registry publishing under `chrome` and `native_alias`.
    #[must_use]
    pub fn new(native_alias: impl Into<String>) -> Self {
        Self {
            declared: FxHashMap::default(),
            active: FxHashMap::default(),
            native_alias: native_alias.into(),
        }
    }

    /// Declares an extension's world configuration.
    ///
    /// Called once per extension during manifest enumeration. Re-declaring
    /// replaces the pending configuration but leaves an already configured
    /// world untouched.
    pub fn declare(&mut self, extension_id: ExtensionId, setup: WorldSetup) {
        trace!(extension = %extension_id, world = %setup.world, "Declaring isolated world");
        self.declared.insert(extension_id, setup);
    }

    /// Ensures the extension's isolated world is configured, idempotently.
    ///
    /// On the first call for an extension: names the world, sets its
    /// security origin, probes the world global (`window`) and publishes the
    /// declared API surface under `chrome` and the native alias. Subsequent
    /// calls return the recorded id without touching the host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownExtension`] when no world was declared, and
    /// [`Error::WorldSetup`] when a host call fails. A failed setup records
    /// nothing; the next call retries from scratch.
    pub fn ensure_context(
        &mut self,
        host: &mut dyn ScriptHost,
        extension_id: &ExtensionId,
    ) -> Result<IsolatedWorldId> {
        if let Some(&world) = self.active.get(extension_id) {
            return Ok(world);
        }

        let setup = self
            .declared
            .get(extension_id)
            .ok_or_else(|| Error::unknown_extension(extension_id.clone()))?
            .clone();

        host.set_isolated_world_info(setup.world, &setup.name, &setup.security_origin)
            .map_err(|err| Error::world_setup(extension_id.clone(), err.to_string()))?;

        // Probe the world global before publishing anything into it.
        host.execute_in_isolated_world(setup.world, &ScriptSource::anonymous("window"))
            .map_err(|err| Error::world_setup(extension_id.clone(), err.to_string()))?;

        let snippet = publish_snippet(&setup.api, &self.native_alias)?;
        host.execute_in_isolated_world(setup.world, &ScriptSource::anonymous(snippet))
            .map_err(|err| Error::world_setup(extension_id.clone(), err.to_string()))?;

        self.active.insert(extension_id.clone(), setup.world);
        debug!(extension = %extension_id, world = %setup.world, "Isolated world configured");
        Ok(setup.world)
    }

    /// Removes an extension's world mapping after uninstall.
    ///
    /// The declaration stays: a later injection for a reinstalled extension
    /// re-runs the full setup instead of being skipped as already done.
    pub fn remove(&mut self, extension_id: &ExtensionId) -> Option<IsolatedWorldId> {
        let removed = self.active.remove(extension_id);
        if let Some(world) = removed {
            debug!(extension = %extension_id, world = %world, "Isolated world mapping removed");
        }
        removed
    }

    /// Returns the configured world id for an extension, if setup ran.
    #[inline]
    #[must_use]
    pub fn world_for(&self, extension_id: &ExtensionId) -> Option<IsolatedWorldId> {
        self.active.get(extension_id).copied()
    }

    /// Returns the number of extensions with completed world setup.
    #[inline]
    #[must_use]
    pub fn configured_count(&self) -> usize {
        self.active.len()
    }
}

// ============================================================================
// Alias Publication
// ============================================================================

/// Builds the snippet publishing the API surface under both global names.
fn publish_snippet(api: &Value, native_alias: &str) -> Result<String> {
    let api_json = serde_json::to_string(api)?;
    let alias_json = serde_json::to_string(native_alias)?;
    Ok(format!(
        "(() => {{ const api = {api_json}; window.chrome = api; window[{alias_json}] = api; }})();"
    ))
}

// ============================================================================
// Tests
// ============================================================================
