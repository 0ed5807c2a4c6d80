//! Phase-based script scheduling.
//!
//! The scheduler binds the payloads of eligible content scripts to page
//! load phases and fires them when the host delivers those phases.
//!
//! Trigger policy by `run_at`:
//!
//! | `run_at` | Phase | One-shot |
//! |----------|-------|----------|
//! | `document_start` | [`LoadPhase::DocumentStart`] | yes |
//! | `document_end` | [`LoadPhase::DocumentEnd`] | yes |
//! | anything else | [`LoadPhase::DomReady`] | configurable |
//!
//! Some hosts emit DOM-ready more than once per load. The faithful behavior
//! re-fires DOM-ready payloads each time; setting `dedupe_dom_ready` makes
//! that phase one-shot as well instead of silently replicating the
//! asymmetry.
//!
//! A page navigating away before a phase fires simply never delivers that
//! phase; the queued injections are dropped with the scheduler, holding no
//! long-lived resources. A failing payload is logged and does not stop the
//! payloads scheduled after it.

// ============================================================================
// Imports
// ============================================================================

use std::mem;

use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Result;
use crate::host::{ScriptHost, ScriptSource};
use crate::identifiers::ExtensionId;
use crate::inject::worlds::WorldRegistry;
use crate::manifest::{ContentScript, RunAt};

// ============================================================================
// LoadPhase
// ============================================================================

/// A named point in a page's loading sequence.
///
/// Within one page load the host delivers phases in declaration order:
/// `DocumentStart` strictly before `DocumentEnd` strictly before `DomReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadPhase {
    /// Start of document parsing.
    DocumentStart,
    /// End of document parsing.
    DocumentEnd,
    /// DOM ready.
    DomReady,
}

impl LoadPhase {
    /// Maps a declared `run_at` value to its trigger phase.
    #[inline]
    #[must_use]
    pub fn for_run_at(run_at: RunAt) -> Self {
        match run_at {
            RunAt::DocumentStart => Self::DocumentStart,
            RunAt::DocumentEnd => Self::DocumentEnd,
            RunAt::DocumentIdle => Self::DomReady,
        }
    }
}

// ============================================================================
// Injection
// ============================================================================

/// One bound payload awaiting its phase.
#[derive(Debug, Clone)]
enum Injection {
    /// Script payload, executed inside the owning extension's world.
    Script {
        extension_id: ExtensionId,
        url: String,
        code: String,
    },
    /// Stylesheet payload, inserted into the page's render tree.
    Style { url: String, code: String },
}

// ============================================================================
// ScriptScheduler
// ============================================================================

/// Schedules content script payloads against page load phases.
#[derive(Debug)]
pub struct ScriptScheduler {
    document_start: Vec<Injection>,
    document_end: Vec<Injection>,
    dom_ready: Vec<Injection>,
    /// One-shot DOM-ready instead of the faithful re-fire behavior.
    dedupe_dom_ready: bool,
    dom_ready_fired: bool,
}

impl ScriptScheduler {
    /// Creates an empty scheduler.
    ///
    /// `dedupe_dom_ready` selects the one-shot DOM-ready policy.
    #[must_use]
    pub fn new(dedupe_dom_ready: bool) -> Self {
        Self {
            document_start: Vec::new(),
            document_end: Vec::new(),
            dom_ready: Vec::new(),
            dedupe_dom_ready,
            dom_ready_fired: false,
        }
    }

    /// Binds the payloads of one eligible descriptor.
    ///
    /// The caller has already confirmed eligibility against the page URL;
    /// payloads are queued in declaration order on the descriptor's phase.
    pub fn schedule(&mut self, descriptor: &ContentScript, extension_id: &ExtensionId) {
        let phase = LoadPhase::for_run_at(descriptor.run_at);

        debug!(
            extension = %extension_id,
            ?phase,
            js = descriptor.js.len(),
            css = descriptor.css.len(),
            "Scheduling content script"
        );

        for js in &descriptor.js {
            self.queue_for(phase).push(Injection::Script {
                extension_id: extension_id.clone(),
                url: js.url.clone(),
                code: js.code.clone(),
            });
        }

        for css in &descriptor.css {
            self.queue_for(phase).push(Injection::Style {
                url: css.url.clone(),
                code: css.code.clone(),
            });
        }
    }

    /// Returns the number of payloads currently queued for a phase.
    #[must_use]
    pub fn queued(&self, phase: LoadPhase) -> usize {
        match phase {
            LoadPhase::DocumentStart => self.document_start.len(),
            LoadPhase::DocumentEnd => self.document_end.len(),
            LoadPhase::DomReady => self.dom_ready.len(),
        }
    }

    /// Fires the payloads bound to a delivered phase.
    ///
    /// `document_start` and `document_end` queues drain on first delivery,
    /// so a repeated phase signal fires nothing. DOM-ready payloads are
    /// retained and re-fired on repeated signals unless the scheduler was
    /// built with `dedupe_dom_ready`.
    ///
    /// Failures of individual payloads are logged and skipped; they never
    /// block independently scheduled payloads.
    pub fn deliver(
        &mut self,
        phase: LoadPhase,
        host: &mut dyn ScriptHost,
        worlds: &mut WorldRegistry,
    ) {
        let injections: Vec<Injection> = match phase {
            LoadPhase::DocumentStart => mem::take(&mut self.document_start),
            LoadPhase::DocumentEnd => mem::take(&mut self.document_end),
            LoadPhase::DomReady => {
                if self.dedupe_dom_ready {
                    if self.dom_ready_fired {
                        return;
                    }
                    self.dom_ready_fired = true;
                }
                self.dom_ready.clone()
            }
        };

        for injection in injections {
            if let Err(err) = fire(injection, host, worlds) {
                warn!(?phase, error = %err, "Injection payload failed");
            }
        }
    }

    fn queue_for(&mut self, phase: LoadPhase) -> &mut Vec<Injection> {
        match phase {
            LoadPhase::DocumentStart => &mut self.document_start,
            LoadPhase::DocumentEnd => &mut self.document_end,
            LoadPhase::DomReady => &mut self.dom_ready,
        }
    }
}

// ============================================================================
// Firing
// ============================================================================

/// Fires a single bound payload.
fn fire(injection: Injection, host: &mut dyn ScriptHost, worlds: &mut WorldRegistry) -> Result<()> {
    match injection {
        Injection::Script {
            extension_id,
            url,
            code,
        } => {
            let world = worlds.ensure_context(host, &extension_id)?;
            let origin = rewrite_origin(&extension_id, &url);
            host.execute_in_isolated_world(world, &ScriptSource::new(code, origin))?;
            Ok(())
        }
        Injection::Style { url, code } => {
            trace!(%url, "Inserting stylesheet");
            host.insert_css(&code)
        }
    }
}

/// Rewrites a payload origin to `scheme://extensionId/path`.
///
/// Stack traces then attribute failures to the owning extension rather than
/// the page. Relative payload URLs fall back to the `extension` scheme with
/// the raw URL as path.
fn rewrite_origin(extension_id: &ExtensionId, raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => format!("{}://{}{}", parsed.scheme(), extension_id, parsed.path()),
        Err(_) => format!("extension://{}/{}", extension_id, raw.trim_start_matches('/')),
    }
}

// ============================================================================
// Tests
// ============================================================================
