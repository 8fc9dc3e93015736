//! Notices raised when a user action fails.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// A failed user action: what was attempted and what went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub detail: String,
}

impl Notice {
    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
        }
    }
}

/// Shared, bounded list of pending notices. Clones see the same list.
/// Pushing past capacity drops the oldest notice.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    pending: Arc<Mutex<VecDeque<Notice>>>,
    capacity: usize,
}

impl NoticeBoard {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            pending: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn push(&self, notice: Notice) {
        tracing::debug!(title = %notice.title, detail = %notice.detail, "Notice raised");
        let mut pending = self.lock();
        while pending.len() >= self.capacity {
            pending.pop_front();
        }
        pending.push_back(notice);
    }

    /// Oldest first, without consuming.
    pub fn visible(&self) -> Vec<Notice> {
        self.lock().iter().cloned().collect()
    }

    /// Take every pending notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notice>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
