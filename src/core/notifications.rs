// src/core/notifications.rs
use chrono::Local;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

use crate::types::{Notification, NotificationKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub notification: Notification,
    pub expires_at: Instant,
}

/// Two newest-first views over one stream of notifications: a short-lived
/// toast queue and a bounded log. Ids are never reused, even across
/// [`NotificationStore::reset`].
#[derive(Debug)]
pub struct NotificationStore {
    toasts: VecDeque<Toast>,
    log: VecDeque<Notification>,
    next_id: u64,
    toast_capacity: usize,
    log_capacity: usize,
    toast_ttl: Duration,
}

impl NotificationStore {
    pub fn new(toast_capacity: usize, log_capacity: usize, toast_ttl: Duration) -> Self {
        Self {
            toasts: VecDeque::with_capacity(toast_capacity + 1),
            log: VecDeque::with_capacity(log_capacity + 1),
            next_id: 0,
            toast_capacity,
            log_capacity,
            toast_ttl,
        }
    }

    /// Records a notification in both views and returns its id.
    pub fn push(
        &mut self,
        ticker: &str,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> u64 {
        self.next_id += 1;
        let notification = Notification {
            id: self.next_id,
            ticker: ticker.to_string(),
            kind,
            message: message.into(),
            timestamp: Local::now(),
            read: false,
        };

        self.toasts.push_front(Toast {
            notification: notification.clone(),
            expires_at: now + self.toast_ttl,
        });
        self.toasts.truncate(self.toast_capacity);

        self.log.push_front(notification);
        self.log.truncate(self.log_capacity);

        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.notification.id != id);
        self.toasts.len() != before
    }

    /// Drops every toast whose deadline has passed. Returns how many went.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires_at > now);
        before - self.toasts.len()
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.toasts.iter().map(|t| t.expires_at).min()
    }

    /// Empties the log only; visible toasts stay until they expire.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn mark_all_read(&mut self) {
        for n in self.log.iter_mut() {
            n.read = true;
        }
        for t in self.toasts.iter_mut() {
            t.notification.read = true;
        }
    }

    pub fn unread_count(&self) -> usize {
        self.log.iter().filter(|n| !n.read).count()
    }

    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn log(&self) -> impl Iterator<Item = &Notification> {
        self.log.iter()
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    pub fn toast_len(&self) -> usize {
        self.toasts.len()
    }

    pub fn reset(&mut self) {
        self.toasts.clear();
        self.log.clear();
    }
}
