//! Transient toast notifications.

use chrono::{DateTime, Duration, Utc};

/// Toasts close themselves after 5 seconds.
pub const DEFAULT_AUTO_CLOSE_MS: i64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub auto_close: Duration,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            created_at: Utc::now(),
            auto_close: Duration::milliseconds(DEFAULT_AUTO_CLOSE_MS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.created_at + self.auto_close
    }

    /// Fraction of the display time left, from 1.0 down to 0.0.
    pub fn remaining_fraction(&self, now: DateTime<Utc>) -> f64 {
        let total = self.auto_close.num_milliseconds().max(1) as f64;
        let left = (self.created_at + self.auto_close - now).num_milliseconds() as f64;
        (left / total).clamp(0.0, 1.0)
    }
}

/// Active toasts, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    toasts: Vec<Toast>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Toast::new(ToastKind::Error, message));
    }

    pub fn dismiss(&mut self, index: usize) -> Option<Toast> {
        (index < self.toasts.len()).then(|| self.toasts.remove(index))
    }

    pub fn dismiss_latest(&mut self) -> Option<Toast> {
        self.toasts.pop()
    }

    /// Drop expired toasts. Returns how many were removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| !t.is_expired(now));
        before - self.toasts.len()
    }

    pub fn active(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires_after_auto_close() {
        let toast = Toast::new(ToastKind::Error, "Invalid credentials");
        assert!(!toast.is_expired(toast.created_at));
        assert!(!toast.is_expired(toast.created_at + Duration::milliseconds(4999)));
        assert!(toast.is_expired(toast.created_at + Duration::milliseconds(5000)));
    }

    #[test]
    fn test_remaining_fraction() {
        let toast = Toast::new(ToastKind::Info, "hi");
        assert_eq!(toast.remaining_fraction(toast.created_at), 1.0);
        let half = toast.remaining_fraction(toast.created_at + Duration::milliseconds(2500));
        assert!((half - 0.5).abs() < 1e-9);
        assert_eq!(toast.remaining_fraction(toast.created_at + Duration::seconds(60)), 0.0);
    }

    #[test]
    fn test_prune_and_dismiss() {
        let mut notifications = Notifications::new();
        let mut old = Toast::new(ToastKind::Error, "old");
        old.created_at = Utc::now() - Duration::seconds(10);
        notifications.push(old);
        notifications.error("fresh");
        notifications.error("newest");

        assert_eq!(notifications.prune_expired(Utc::now()), 1);
        assert_eq!(notifications.active().len(), 2);

        assert_eq!(notifications.dismiss_latest().map(|t| t.message), Some("newest".to_string()));
        assert_eq!(notifications.dismiss(5), None);
        assert_eq!(notifications.dismiss(0).map(|t| t.message), Some("fresh".to_string()));
        assert!(notifications.is_empty());
    }
}
