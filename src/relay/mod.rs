//! Lifecycle event relay.
//!
//! The relay is a typed pass-through: for the fixed set of view lifecycle
//! events in [`events::EVENT_TABLE`] it forwards `(event, view_id, args…)`
//! tuples to the owning window's message channel, preserving which view
//! produced each event. It performs no business logic.
//!
//! The one special case is a "new-window" event whose third positional
//! argument carries the internal popup sentinel: instead of forwarding, the
//! relay suppresses default handling, opens a fixed-size popup through the
//! [`WindowHost`] and notifies the originating page with
//! `{url, follow: true}` once the popup signals its completion channel.
//!
//! Subscription is fire-and-forget: event names the host never emits simply
//! never reach [`EventRelay::deliver`], and names the relay does not know
//! are dropped with a trace log.

// ============================================================================
// Modules
// ============================================================================

pub mod events;

pub use events::{EVENT_TABLE, ViewEvent};

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace, warn};

use crate::host::WindowHost;
use crate::identifiers::ViewId;

// ============================================================================
// Constants
// ============================================================================

/// Sentinel distinguishing an internal popup request from a regular
/// new-window navigation; carried as the event's third positional argument.
pub const NEW_WINDOW_SENTINEL: &str = "new-window";

/// Positional index of the sentinel within new-window event args.
const SENTINEL_INDEX: usize = 2;

/// Default popup window size.
const DEFAULT_POPUP_SIZE: (u32, u32) = (800, 500);

/// Length of the routing prefix on popup completion channel names.
const COMPLETION_PREFIX_LEN: usize = 4;

// ============================================================================
// RelayMessage
// ============================================================================

/// One forwarded event tuple on the window message channel.
///
/// Delivery is fire-and-forget with no acknowledgment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayMessage {
    /// Wire name of the originating event.
    pub event: String,
    /// View that produced the event.
    pub view_id: ViewId,
    /// Original positional event arguments.
    pub args: Vec<Value>,
}

// ============================================================================
// Delivery
// ============================================================================

/// Outcome of delivering one view event to the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The event was forwarded to the owning window.
    Forwarded,
    /// The event was consumed to open a popup window.
    PopupOpened,
    /// The event was dropped (unknown name, closed channel, failed popup).
    Dropped,
}

// ============================================================================
// EventRelay
// ============================================================================

/// Relays one content view's lifecycle events to its owning window.
pub struct EventRelay {
    view_id: ViewId,
    window_tx: UnboundedSender<RelayMessage>,
    /// Popup completion channel → URL of the page that requested the popup.
    pending_popups: FxHashMap<String, String>,
    popup_size: (u32, u32),
}

impl EventRelay {
    /// Creates a relay for `view_id` forwarding onto `window_tx`.
    #[must_use]
    pub fn new(view_id: ViewId, window_tx: UnboundedSender<RelayMessage>) -> Self {
        Self {
            view_id,
            window_tx,
            pending_popups: FxHashMap::default(),
            popup_size: DEFAULT_POPUP_SIZE,
        }
    }

    /// Overrides the synthesized popup window size.
    #[must_use]
    pub fn with_popup_size(mut self, width: u32, height: u32) -> Self {
        self.popup_size = (width, height);
        self
    }

    /// Returns the view this relay is bound to.
    #[inline]
    #[must_use]
    pub fn view_id(&self) -> ViewId {
        self.view_id
    }

    /// Delivers one raw view event.
    ///
    /// Unknown event names are dropped; everything else is forwarded as a
    /// [`RelayMessage`], except the popup-sentinel new-window case which is
    /// consumed here.
    pub fn deliver(
        &mut self,
        host: &mut dyn WindowHost,
        event_name: &str,
        args: Vec<Value>,
    ) -> Delivery {
        let Some(event) = ViewEvent::from_name(event_name) else {
            trace!(event = %event_name, view = %self.view_id, "Dropping unknown view event");
            return Delivery::Dropped;
        };

        if event == ViewEvent::NewWindow && is_popup_request(&args) {
            return self.open_popup(host, &args);
        }

        let message = RelayMessage {
            event: event_name.to_string(),
            view_id: self.view_id,
            args,
        };
        match self.window_tx.send(message) {
            Ok(()) => Delivery::Forwarded,
            Err(_) => {
                trace!(event = %event_name, view = %self.view_id, "Window channel closed, dropping relay");
                Delivery::Dropped
            }
        }
    }

    /// Signals that a popup's completion channel fired.
    ///
    /// Notifies the originating page once with `{url, follow: true}` on the
    /// channel name minus its routing prefix, then forgets the popup.
    /// Returns `false` for channels with no pending popup.
    pub fn popup_ready(&mut self, host: &mut dyn WindowHost, channel: &str) -> bool {
        let Some(url) = self.pending_popups.remove(channel) else {
            return false;
        };

        let view_channel = channel
            .get(COMPLETION_PREFIX_LEN..)
            .filter(|stripped| !stripped.is_empty())
            .unwrap_or(channel);
        host.send_to_view(
            self.view_id,
            view_channel,
            json!({ "url": url, "follow": true }),
        );
        true
    }

    /// Returns the number of popups awaiting their completion signal.
    #[inline]
    #[must_use]
    pub fn pending_popups(&self) -> usize {
        self.pending_popups.len()
    }

    fn open_popup(&mut self, host: &mut dyn WindowHost, args: &[Value]) -> Delivery {
        let url = args
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let (width, height) = self.popup_size;
        match host.open_window(width, height) {
            Ok(channel) => {
                debug!(view = %self.view_id, %url, %channel, "Opened popup window");
                self.pending_popups.insert(channel, url);
                Delivery::PopupOpened
            }
            Err(err) => {
                warn!(view = %self.view_id, error = %err, "Popup window creation failed");
                Delivery::Dropped
            }
        }
    }
}

/// Checks the positional sentinel marking an internal popup request.
fn is_popup_request(args: &[Value]) -> bool {
    args.get(SENTINEL_INDEX).and_then(Value::as_str) == Some(NEW_WINDOW_SENTINEL)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::mpsc;

    use crate::error::{Error, Result};

    #[derive(Default)]
    struct RecordingWindowHost {
        opened: Vec<(u32, u32)>,
        sent: Vec<(ViewId, String, Value)>,
        fail_open: bool,
        next_channel: String,
    }

    impl WindowHost for RecordingWindowHost {
        fn open_window(&mut self, width: u32, height: u32) -> Result<String> {
            if self.fail_open {
                return Err(Error::popup_window("no windows left"));
            }
            self.opened.push((width, height));
            Ok(self.next_channel.clone())
        }

        fn send_to_view(&mut self, view: ViewId, channel: &str, payload: Value) {
            self.sent.push((view, channel.to_string(), payload));
        }
    }

    fn relay() -> (EventRelay, mpsc::UnboundedReceiver<RelayMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventRelay::new(ViewId(7), tx), rx)
    }

    #[test]
    fn test_known_event_forwarded_with_view_identity() {
        let (mut relay, mut rx) = relay();
        let mut host = RecordingWindowHost::default();

        let args = vec![json!("https://example.com"), json!(-105)];
        let delivery = relay.deliver(&mut host, "did-fail-load", args.clone());
        assert_eq!(delivery, Delivery::Forwarded);

        let message = rx.try_recv().expect("one relay message");
        assert_eq!(message.event, "did-fail-load");
        assert_eq!(message.view_id, ViewId(7));
        assert_eq!(message.args, args);
        // and no other relay fires
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unknown_event_dropped() {
        let (mut relay, mut rx) = relay();
        let mut host = RecordingWindowHost::default();

        let delivery = relay.deliver(&mut host, "did-teleport", vec![]);
        assert_eq!(delivery, Delivery::Dropped);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_regular_new_window_forwarded() {
        let (mut relay, mut rx) = relay();
        let mut host = RecordingWindowHost::default();

        // third argument is a disposition, not the popup sentinel
        let args = vec![json!("https://example.com"), json!(""), json!("foreground-tab")];
        let delivery = relay.deliver(&mut host, "new-window", args);
        assert_eq!(delivery, Delivery::Forwarded);
        assert!(host.opened.is_empty());

        let message = rx.try_recv().expect("forwarded new-window");
        assert_eq!(message.event, "new-window");
    }

    #[test]
    fn test_popup_request_opens_default_size_window() {
        let (mut relay, mut rx) = relay();
        let mut host = RecordingWindowHost {
            next_channel: "win-popup-ready".to_string(),
            ..RecordingWindowHost::default()
        };

        let args = vec![
            json!("https://example.com/popup"),
            json!(""),
            json!(NEW_WINDOW_SENTINEL),
        ];
        let delivery = relay.deliver(&mut host, "new-window", args);
        assert_eq!(delivery, Delivery::PopupOpened);
        assert_eq!(host.opened, vec![(800, 500)]);
        assert_eq!(relay.pending_popups(), 1);
        // the event itself is consumed, not forwarded
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_popup_ready_notifies_originating_view_once() {
        let (mut relay, _rx) = relay();
        let mut host = RecordingWindowHost {
            next_channel: "win-popup-ready".to_string(),
            ..RecordingWindowHost::default()
        };

        let args = vec![
            json!("https://example.com/popup"),
            json!(""),
            json!(NEW_WINDOW_SENTINEL),
        ];
        relay.deliver(&mut host, "new-window", args);

        assert!(relay.popup_ready(&mut host, "win-popup-ready"));
        assert_eq!(relay.pending_popups(), 0);

        let (view, channel, payload) = host.sent.pop().expect("completion notification");
        assert_eq!(view, ViewId(7));
        // 4-byte routing prefix stripped
        assert_eq!(channel, "popup-ready");
        assert_eq!(
            payload,
            json!({ "url": "https://example.com/popup", "follow": true })
        );

        // second signal on the same channel is a no-op
        assert!(!relay.popup_ready(&mut host, "win-popup-ready"));
        assert!(host.sent.is_empty());
    }

    #[test]
    fn test_failed_popup_creation_dropped() {
        let (mut relay, mut rx) = relay();
        let mut host = RecordingWindowHost {
            fail_open: true,
            ..RecordingWindowHost::default()
        };

        let args = vec![json!("https://x.com"), json!(""), json!(NEW_WINDOW_SENTINEL)];
        let delivery = relay.deliver(&mut host, "new-window", args);
        assert_eq!(delivery, Delivery::Dropped);
        assert_eq!(relay.pending_popups(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_window_channel_drops_silently() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut relay = EventRelay::new(ViewId(1), tx);
        let mut host = RecordingWindowHost::default();

        let delivery = relay.deliver(&mut host, "dom-ready", vec![]);
        assert_eq!(delivery, Delivery::Dropped);
    }

    #[test]
    fn test_custom_popup_size() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut relay = EventRelay::new(ViewId(1), tx).with_popup_size(1024, 768);
        let mut host = RecordingWindowHost {
            next_channel: "win-ready".to_string(),
            ..RecordingWindowHost::default()
        };

        let args = vec![json!("https://x.com"), json!(""), json!(NEW_WINDOW_SENTINEL)];
        relay.deliver(&mut host, "new-window", args);
        assert_eq!(host.opened, vec![(1024, 768)]);
    }
}
