//! Foreground-change events.

/// Platform value for a window-state-changed accessibility event.
const WINDOW_STATE_CHANGED_CODE: &str = "32";

/// Kind of platform event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A window gained focus.
    WindowStateChanged,
    /// Anything else the platform reports.
    Other,
}

impl EventKind {
    /// Parse a kind token from the event feed.
    pub fn parse(token: &str) -> Self {
        match token {
            "window_state_changed"
            | "window-state-changed"
            | "TYPE_WINDOW_STATE_CHANGED"
            | WINDOW_STATE_CHANGED_CODE => Self::WindowStateChanged,
            _ => Self::Other,
        }
    }
}

/// A single focus transition reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundEvent {
    /// App that produced the event. May be missing.
    pub source_app_id: Option<String>,
    pub kind: EventKind,
}

impl ForegroundEvent {
    /// A window-state-changed event for `app_id`.
    pub fn focus(app_id: impl Into<String>) -> Self {
        Self {
            source_app_id: Some(app_id.into()),
            kind: EventKind::WindowStateChanged,
        }
    }

    /// Parse one line of the feed: `<kind> [<app_id>]`.
    ///
    /// Returns `None` for blank lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let kind = EventKind::parse(parts.next()?);
        let source_app_id = parts.next().map(str::to_string);

        Some(Self {
            source_app_id,
            kind,
        })
    }

    /// Source id, treating an empty string as missing.
    pub fn source(&self) -> Option<&str> {
        self.source_app_id.as_deref().filter(|id| !id.is_empty())
    }
}
