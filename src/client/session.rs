use uuid::Uuid;

use crate::domain::notification::{DeliveryMethod, Notification};

/// Transport state of one browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Joined,
}

/// Whether the environment lets the session raise desktop alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPermission {
    Granted,
    Denied,
    Unavailable,
}

/// Side effect the caller should perform after a push was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Desktop { title: String, body: String },
    SoundAndToast { title: String, body: String },
}

/// A local mutation whose matching server write has not completed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite {
    MarkRead(Uuid),
    MarkAllRead,
    Delete(Uuid),
}

/// One browser tab's view of its notification list.
///
/// The list is a cache of the store, newest first, installed by `seed` and
/// mutated optimistically from then on. Mutations never roll back: when a
/// server write fails the session only remembers that it has diverged, and
/// the next full `seed` is the reconciliation point.
pub struct Session {
    state: ConnectionState,
    permission: AlertPermission,
    notifications: Vec<Notification>,
    pending: Vec<PendingWrite>,
    diverged: bool,
}

impl Session {
    pub fn new(permission: AlertPermission) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            permission,
            notifications: Vec::new(),
            pending: Vec::new(),
            diverged: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn connect_started(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    pub fn joined(&mut self) {
        self.state = ConnectionState::Joined;
    }

    pub fn connection_lost(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    /// Alert permission resolves asynchronously in the browser, so it can
    /// change after construction.
    pub fn set_permission(&mut self, permission: AlertPermission) {
        self.permission = permission;
    }

    /// Installs a full fetch as the local list, keeping only in-app
    /// notifications. Clears the pending-write ledger and the diverged
    /// flag: after a seed, local and persisted state agree again.
    pub fn seed(&mut self, notifications: Vec<Notification>) {
        self.notifications = notifications
            .into_iter()
            .filter(|n| n.delivery_method == DeliveryMethod::InApp)
            .collect();
        self.pending.clear();
        self.diverged = false;
    }

    /// Accepts one pushed notification. A duplicate id leaves the list
    /// untouched and raises nothing; otherwise the notification is
    /// prepended and the caller gets the alert to perform.
    pub fn receive_push(&mut self, notification: Notification) -> Option<Alert> {
        if self.notifications.iter().any(|n| n.id == notification.id) {
            return None;
        }

        let title = notification.title.clone();
        let body = notification.message.clone();
        self.notifications.insert(0, notification);

        Some(match self.permission {
            AlertPermission::Granted => Alert::Desktop { title, body },
            AlertPermission::Denied | AlertPermission::Unavailable => {
                Alert::SoundAndToast { title, body }
            }
        })
    }

    /// Optimistically flips one notification to read and records the
    /// pending server write. Returns false when the id is not displayed.
    pub fn mark_read(&mut self, id: Uuid) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.is_read = true;
                self.pending.push(PendingWrite::MarkRead(id));
                true
            }
            None => false,
        }
    }

    /// Optimistically flips every unread notification and records the
    /// pending server write. Returns how many were flipped.
    pub fn mark_all_read(&mut self) -> usize {
        let mut flipped = 0;
        for notification in self.notifications.iter_mut().filter(|n| !n.is_read) {
            notification.is_read = true;
            flipped += 1;
        }
        self.pending.push(PendingWrite::MarkAllRead);
        flipped
    }

    /// Optimistically removes one notification and records the pending
    /// server write. Returns false when the id is not displayed.
    pub fn delete(&mut self, id: Uuid) -> bool {
        match self.notifications.iter().position(|n| n.id == id) {
            Some(index) => {
                self.notifications.remove(index);
                self.pending.push(PendingWrite::Delete(id));
                true
            }
            None => false,
        }
    }

    /// Settles one pending write. A failed write does not undo the local
    /// mutation; the session just flags that it has diverged from the
    /// store until the next `seed`.
    pub fn write_completed(&mut self, write: &PendingWrite, success: bool) {
        if let Some(index) = self.pending.iter().position(|p| p == write) {
            self.pending.remove(index);
        }
        if !success {
            self.diverged = true;
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Drives the unread badge.
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }

    pub fn pending_writes(&self) -> &[PendingWrite] {
        &self.pending
    }

    pub fn diverged(&self) -> bool {
        self.diverged
    }
}
