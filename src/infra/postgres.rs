use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Executor, Row};
use uuid::Uuid;

use crate::domain::notification::{NewNotification, Notification};
use crate::domain::user::User;
use crate::infra::db::Db;
use crate::infra::directory::UserDirectory;
use crate::infra::store::NotificationStore;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Applies the idempotent schema at startup. The file runs as one simple
/// protocol batch, so it may hold multiple statements.
pub async fn ensure_schema(db: &Db) -> Result<()> {
    db.pool().execute(SCHEMA).await?;
    Ok(())
}

#[derive(Clone)]
pub struct PostgresStore {
    db: Db,
}

impl PostgresStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

fn decode(row: &PgRow) -> Result<Notification> {
    let id: Uuid = row.get("id");
    let kind: String = row.get("kind");
    let delivery_method: String = row.get("delivery_method");
    Ok(Notification {
        id,
        user_id: row.get("user_id"),
        kind: kind
            .parse()
            .map_err(|_| anyhow!("notification {id} has unknown kind {kind:?}"))?,
        delivery_method: delivery_method.parse().map_err(|_| {
            anyhow!("notification {id} has unknown delivery method {delivery_method:?}")
        })?,
        title: row.get("title"),
        message: row.get("message"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl NotificationStore for PostgresStore {
    async fn insert(&self, new: NewNotification) -> Result<Notification> {
        let row = sqlx::query(
            "INSERT INTO notifications (id, user_id, kind, delivery_method, title, message) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, user_id, kind, delivery_method, title, message, is_read, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new.user_id)
        .bind(new.kind.as_str())
        .bind(new.delivery_method.as_str())
        .bind(&new.title)
        .bind(&new.message)
        .fetch_one(self.db.pool())
        .await?;

        decode(&row)
    }

    async fn list_all(&self) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT id, user_id, kind, delivery_method, title, message, is_read, created_at \
             FROM notifications \
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(decode).collect()
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT id, user_id, kind, delivery_method, title, message, is_read, created_at \
             FROM notifications \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(decode).collect()
    }

    async fn mark_read(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = TRUE \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = TRUE \
             WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await
    }
}

#[derive(Clone)]
pub struct PostgresDirectory {
    db: Db,
}

impl PostgresDirectory {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PostgresDirectory {
    async fn find(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
        }))
    }
}
