//! Transient status notices.
//!
//! The terminal counterpart of the platform's toast messages: a notice is
//! raised with a title, a message, and a severity, then disappears on its own
//! five seconds later. Raising a notice never blocks anything — the UI loop
//! calls [`NoticeBoard::prune`] once per tick and expired notices simply stop
//! being rendered.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::style::Color;

/// How long a notice stays visible.
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// At most this many notices are kept; older ones are dropped first.
const MAX_NOTICES: usize = 4;

/// Notice severity, mirroring the status palette used across the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Danger,
    Warning,
    Info,
}

impl Severity {
    /// Colour used when rendering a notice of this severity.
    pub fn color(self) -> Color {
        match self {
            Severity::Success => Color::Green,
            Severity::Danger => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Info => Color::Cyan,
        }
    }
}

/// A single transient message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    raised_at: Instant,
}

impl Notice {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.raised_at) >= NOTICE_TTL
    }
}

/// Holds the currently visible notices, newest last.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: VecDeque<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise a notice that auto-dismisses after five seconds.
    pub fn push(&mut self, title: impl Into<String>, message: impl Into<String>, severity: Severity) {
        self.push_at(title, message, severity, Instant::now());
    }

    fn push_at(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        raised_at: Instant,
    ) {
        self.notices.push_back(Notice {
            title: title.into(),
            message: message.into(),
            severity,
            raised_at,
        });
        while self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }

    /// Drop every notice whose lifetime has elapsed as of `now`.
    pub fn prune(&mut self, now: Instant) {
        self.notices.retain(|n| !n.expired(now));
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_one(raised_at: Instant) -> NoticeBoard {
        let mut board = NoticeBoard::new();
        board.push_at("Error", "Failed to load users", Severity::Danger, raised_at);
        board
    }

    #[test]
    fn notice_survives_until_ttl() {
        let t0 = Instant::now();
        let mut board = board_with_one(t0);

        board.prune(t0 + Duration::from_millis(4_999));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn notice_expires_at_ttl() {
        let t0 = Instant::now();
        let mut board = board_with_one(t0);

        board.prune(t0 + Duration::from_secs(5));
        assert!(board.is_empty());
    }

    #[test]
    fn oldest_notices_are_capped() {
        let t0 = Instant::now();
        let mut board = NoticeBoard::new();
        for i in 0..6 {
            board.push_at(format!("n{i}"), "m", Severity::Info, t0);
        }

        assert_eq!(board.len(), MAX_NOTICES);
        // The two oldest were dropped.
        assert_eq!(board.iter().next().unwrap().title, "n2");
    }

    #[test]
    fn severity_colors_follow_status_palette() {
        assert_eq!(Severity::Success.color(), Color::Green);
        assert_eq!(Severity::Danger.color(), Color::Red);
        assert_eq!(Severity::Warning.color(), Color::Yellow);
        assert_eq!(Severity::Info.color(), Color::Cyan);
    }
}
