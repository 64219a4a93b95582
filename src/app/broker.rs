use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::notification::Notification;

/// Process-unique handle for one WebSocket connection.
pub type ConnectionId = u64;

type Sender = mpsc::UnboundedSender<Notification>;

#[derive(Default)]
struct Rooms {
    by_user: HashMap<String, HashMap<ConnectionId, Sender>>,
    by_connection: HashMap<ConnectionId, String>,
}

/// Fan-out hub for realtime in-app delivery. One room per user id; a
/// connection sits in at most one room at a time. Every mutator takes the
/// lock exactly once and never awaits while holding it, so the two maps
/// always agree.
#[derive(Default)]
pub struct Broker {
    rooms: Mutex<Rooms>,
    next_connection_id: AtomicU64,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the id a connection task uses for its lifetime.
    pub fn connection_id(&self) -> ConnectionId {
        self.next_connection_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Puts a connection in a user's room. Re-joining the same room is a
    /// no-op; joining a different room moves the connection out of its old
    /// one.
    pub fn join(&self, connection: ConnectionId, user_id: &str, sender: Sender) {
        let mut rooms = self.rooms();
        if let Some(previous) = rooms
            .by_connection
            .insert(connection, user_id.to_string())
        {
            if previous != user_id {
                remove_member(&mut rooms.by_user, &previous, connection);
            }
        }
        rooms
            .by_user
            .entry(user_id.to_string())
            .or_default()
            .insert(connection, sender);
    }

    /// Drops a connection from whichever room holds it and prunes the room
    /// once it is empty. Unknown ids are a no-op.
    pub fn leave(&self, connection: ConnectionId) {
        let mut rooms = self.rooms();
        if let Some(user_id) = rooms.by_connection.remove(&connection) {
            remove_member(&mut rooms.by_user, &user_id, connection);
        }
    }

    /// Sends a copy of the notification to every live member of the user's
    /// room and returns the delivered count. An empty or absent room is a
    /// quiet zero. A member whose channel has closed is skipped, not
    /// evicted; its owning task removes it via `leave` when it exits.
    pub fn publish(&self, user_id: &str, notification: &Notification) -> usize {
        let rooms = self.rooms();
        let members = match rooms.by_user.get(user_id) {
            Some(members) => members,
            None => return 0,
        };

        let mut delivered = 0;
        for (connection, sender) in members {
            if sender.send(notification.clone()).is_ok() {
                delivered += 1;
            } else {
                debug!(connection, user_id, "skipped closed realtime channel");
            }
        }
        delivered
    }

    /// Live connection count for one user's room.
    pub fn room_size(&self, user_id: &str) -> usize {
        self.rooms().by_user.get(user_id).map_or(0, HashMap::len)
    }

    fn rooms(&self) -> MutexGuard<'_, Rooms> {
        // No mutator can panic while holding the guard, so a poisoned lock
        // still protects a consistent table.
        self.rooms.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn remove_member(
    by_user: &mut HashMap<String, HashMap<ConnectionId, Sender>>,
    user_id: &str,
    connection: ConnectionId,
) {
    if let Some(members) = by_user.get_mut(user_id) {
        members.remove(&connection);
        if members.is_empty() {
            by_user.remove(user_id);
        }
    }
}
