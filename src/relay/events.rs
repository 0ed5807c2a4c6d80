//! The fixed table of relayed view lifecycle events.
//!
//! Adding or removing an event is a data change to [`EVENT_TABLE`], not a
//! control-flow change: the relay subscribes to exactly the names listed
//! here and forwards each one the same way.

// ============================================================================
// ViewEvent
// ============================================================================

/// A named lifecycle event emitted by a content view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewEvent {
    /// The view began loading.
    DidStartLoading,
    /// The view stopped loading.
    DidStopLoading,
    /// The load failed.
    DidFailLoad,
    /// The load finished.
    DidFinishLoad,
    /// Navigation is about to start.
    WillNavigate,
    /// Navigation committed.
    DidNavigate,
    /// In-page navigation (fragment/pushState).
    DidNavigateInPage,
    /// A frame finished loading.
    DidFrameFinishLoad,
    /// The page favicon changed.
    PageFaviconUpdated,
    /// The page title changed.
    PageTitleSet,
    /// The DOM is ready.
    DomReady,
    /// A console message was logged.
    ConsoleMessage,
    /// The hovered target URL changed.
    UpdateTargetUrl,
    /// Media started playing.
    MediaStartedPlaying,
    /// Media paused.
    MediaPaused,
    /// The page entered HTML fullscreen.
    EnterHtmlFullScreen,
    /// The page left HTML fullscreen.
    LeaveHtmlFullScreen,
    /// The page requested a new window.
    NewWindow,
    /// A context menu was requested.
    ContextMenu,
    /// An IPC message arrived from the page.
    IpcMessage,
}

/// Event-name table the relay dispatches from.
pub const EVENT_TABLE: &[(&str, ViewEvent)] = &[
    ("did-start-loading", ViewEvent::DidStartLoading),
    ("did-stop-loading", ViewEvent::DidStopLoading),
    ("did-fail-load", ViewEvent::DidFailLoad),
    ("did-finish-load", ViewEvent::DidFinishLoad),
    ("will-navigate", ViewEvent::WillNavigate),
    ("did-navigate", ViewEvent::DidNavigate),
    ("did-navigate-in-page", ViewEvent::DidNavigateInPage),
    ("did-frame-finish-load", ViewEvent::DidFrameFinishLoad),
    ("page-favicon-updated", ViewEvent::PageFaviconUpdated),
    ("page-title-set", ViewEvent::PageTitleSet),
    ("dom-ready", ViewEvent::DomReady),
    ("console-message", ViewEvent::ConsoleMessage),
    ("update-target-url", ViewEvent::UpdateTargetUrl),
    ("media-started-playing", ViewEvent::MediaStartedPlaying),
    ("media-paused", ViewEvent::MediaPaused),
    ("enter-html-full-screen", ViewEvent::EnterHtmlFullScreen),
    ("leave-html-full-screen", ViewEvent::LeaveHtmlFullScreen),
    ("new-window", ViewEvent::NewWindow),
    ("context-menu", ViewEvent::ContextMenu),
    ("ipc-message", ViewEvent::IpcMessage),
];

impl ViewEvent {
    /// Returns the wire name of this event.
    #[must_use]
    pub fn name(self) -> &'static str {
        EVENT_TABLE
            .iter()
            .find(|(_, event)| *event == self)
            .map(|(name, _)| *name)
            .unwrap_or_default()
    }

    /// Looks an event up by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        EVENT_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, event)| *event)
    }

    /// Returns all wire names the relay subscribes to.
    #[must_use]
    pub fn names() -> impl Iterator<Item = &'static str> {
        EVENT_TABLE.iter().map(|(name, _)| *name)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for (name, event) in EVENT_TABLE {
            assert_eq!(event.name(), *name);
            assert_eq!(ViewEvent::from_name(name), Some(*event));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(ViewEvent::from_name("did-teleport"), None);
    }

    #[test]
    fn test_table_has_no_duplicate_names() {
        let mut names: Vec<_> = ViewEvent::names().collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EVENT_TABLE.len());
    }
}
