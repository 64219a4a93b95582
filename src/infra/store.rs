use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::notification::{NewNotification, Notification};

/// Persistence seam for notifications. Missing rows are reported through
/// return values; `Err` is reserved for backend failures.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persists a new notification, assigning id and creation time.
    async fn insert(&self, new: NewNotification) -> Result<Notification>;

    /// Every notification, newest first.
    async fn list_all(&self) -> Result<Vec<Notification>>;

    /// One user's notifications, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Notification>>;

    /// Returns false when the id does not exist or is owned by another user.
    async fn mark_read(&self, user_id: &str, id: Uuid) -> Result<bool>;

    /// Flips every unread notification for the user; returns how many.
    async fn mark_all_read(&self, user_id: &str) -> Result<u64>;

    /// Returns false when the id does not exist or is owned by another user.
    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool>;

    /// Backend liveness probe for the health endpoint.
    async fn ping(&self) -> Result<()>;
}
