use std::collections::VecDeque;

use crate::error::FlockError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Where user-facing outcomes go: colored lines on the CLI, toasts in the TUI.
pub trait Notifier {
    fn notify(&mut self, kind: NoticeKind, message: &str);

    fn success(&mut self, message: &str) {
        self.notify(NoticeKind::Success, message);
    }

    fn info(&mut self, message: &str) {
        self.notify(NoticeKind::Info, message);
    }

    /// Domain errors become warnings with their own wording; anything else
    /// is an error prefixed with the failed action.
    fn failure(&mut self, action: &str, err: &anyhow::Error) {
        match err.downcast_ref::<FlockError>() {
            Some(domain) => {
                log::warn!("{} rejected: {}", action, domain);
                self.notify(NoticeKind::Warning, &domain.to_string());
            }
            None => {
                log::error!("{} failed: {:#}", action, err);
                self.notify(NoticeKind::Error, &format!("Failed to {}: {}", action, err));
            }
        }
    }
}

/// Most recent notices, oldest dropped first.
#[derive(Debug, Clone)]
pub struct Toasts {
    items: VecDeque<Notice>,
    capacity: usize,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::with_capacity(5)
    }
}

impl Toasts {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn dismiss(&mut self) {
        self.items.pop_back();
    }
}

impl Notifier for Toasts {
    fn notify(&mut self, kind: NoticeKind, message: &str) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(Notice {
            kind,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn toasts_keep_only_the_newest() {
        let mut toasts = Toasts::with_capacity(2);
        toasts.info("one");
        toasts.info("two");
        toasts.success("three");
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts.latest().map(|n| n.message.as_str()), Some("three"));
        assert_eq!(toasts.iter().next().map(|n| n.message.as_str()), Some("two"));
    }

    #[test]
    fn domain_errors_are_warnings() {
        let mut toasts = Toasts::default();
        let err: anyhow::Error = FlockError::validation("amount", "must be greater than 0").into();
        toasts.failure("record donation", &err);
        let notice = toasts.latest().unwrap();
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert_eq!(notice.message, "amount: must be greater than 0");

        toasts.failure("record donation", &anyhow!("database is locked"));
        let notice = toasts.latest().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Failed to record donation: database is locked");
    }
}
