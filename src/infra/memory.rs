use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::notification::{NewNotification, Notification};
use crate::domain::user::User;
use crate::infra::directory::UserDirectory;
use crate::infra::store::NotificationStore;

/// Notification store backed by process memory. Used by the test suite and
/// by single-process development runs (`STORE_BACKEND=memory`).
#[derive(Default)]
pub struct MemoryStore {
    // Insertion order, oldest first; reads walk it backwards so listings
    // come out newest first.
    rows: RwLock<Vec<Notification>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert(&self, new: NewNotification) -> Result<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            kind: new.kind,
            delivery_method: new.delivery_method,
            title: new.title,
            message: new.message,
            is_read: false,
            created_at: OffsetDateTime::now_utc(),
        };
        let mut rows = self
            .rows
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        rows.push(notification.clone());
        Ok(notification)
    }

    async fn list_all(&self) -> Result<Vec<Notification>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(rows.iter().rev().cloned().collect())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(rows
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        match rows
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(row) => {
                row.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        let mut updated = 0;
        for row in rows.iter_mut().filter(|n| n.user_id == user_id && !n.is_read) {
            row.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        match rows.iter().position(|n| n.id == id && n.user_id == user_id) {
            Some(index) => {
                rows.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Directory backed by process memory; tests and development seed it
/// through `put`.
#[derive(Default)]
pub struct MemoryDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, user: User) -> Result<()> {
        let mut users = self
            .users
            .write()
            .map_err(|_| anyhow!("memory directory lock poisoned"))?;
        users.insert(user.id.clone(), user);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find(&self, user_id: &str) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| anyhow!("memory directory lock poisoned"))?;
        Ok(users.get(user_id).cloned())
    }
}
