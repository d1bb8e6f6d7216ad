//! One-at-a-time operator notifications with auto-dismiss.

use std::time::{Duration, Instant};

pub const DEFAULT_AUTO_HIDE: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Increases with every `show`, so a replacement is distinguishable from a repaint.
    pub sequence: u64,
    pub message: String,
    pub severity: Severity,
    pub opened_at: Instant,
    pub auto_hide: Duration,
}

impl Notification {
    pub fn expires_at(&self) -> Instant {
        self.opened_at + self.auto_hide
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }
}

#[derive(Debug, Clone)]
pub struct NotificationChannel {
    current: Option<Notification>,
    auto_hide: Duration,
    next_sequence: u64,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_HIDE)
    }
}

impl NotificationChannel {
    pub fn new(auto_hide: Duration) -> Self {
        Self {
            current: None,
            auto_hide,
            next_sequence: 1,
        }
    }

    /// Replaces whatever is visible. No queueing.
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) -> &Notification {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.current.insert(Notification {
            sequence,
            message: message.into(),
            severity,
            opened_at: Instant::now(),
            auto_hide: self.auto_hide,
        })
    }

    pub fn success(&mut self, message: impl Into<String>) -> &Notification {
        self.show(message, Severity::Success)
    }

    pub fn error(&mut self, message: impl Into<String>) -> &Notification {
        self.show(message, Severity::Error)
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn active(&self, now: Instant) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|notification| !notification.is_expired(now))
    }

    /// Last message shown, expired or not.
    pub fn latest(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn dismiss_expired(&mut self, now: Instant) -> bool {
        if self
            .current
            .as_ref()
            .is_some_and(|notification| notification.is_expired(now))
        {
            self.current = None;
            return true;
        }
        false
    }
}
