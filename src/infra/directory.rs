use anyhow::Result;
use async_trait::async_trait;

use crate::domain::user::User;

/// Lookup seam for the account system that owns user records. Email
/// delivery resolves recipients through this; we never write to it.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find(&self, user_id: &str) -> Result<Option<User>>;
}
